//! Localization aliases built from marker-delimited table ranges
//!
//! The equipment table lists canonical item ids next to their localized
//! display names; the attribute table does the same for column names. Both
//! are loaded into bidirectional maps, so a lookup of either side returns the
//! other.

use crate::error::{Error, Result};
use crate::table::{Row, Table};
use std::collections::HashMap;
use tracing::debug;

/// Column of a range row that holds the localized text
pub const LOCALIZED_COLUMN: usize = 3;

/// Start/end marker pair of a named range, e.g. `weapon_name;weapon_name;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeMarkers {
    pub start: String,
    pub end: String,
}

impl RangeMarkers {
    /// Markers for a range name as laid out in the game tables
    pub fn named(range: &str) -> Self {
        Self {
            start: format!("{range};{range};"),
            end: format!("{range}_end;{range}_end;"),
        }
    }
}

/// Rows strictly between the first start marker row and the first end marker row
pub fn build_range<'a>(table: &'a Table, markers: &RangeMarkers) -> Result<&'a [Row]> {
    let start = find_marker(table, &markers.start)?;
    let end = find_marker(table, &markers.end)?;

    if end <= start {
        return Ok(&[]);
    }
    Ok(&table.rows[start + 1..end])
}

/// Locate a marker row, failing if it does not exist
pub fn find_marker(table: &Table, marker: &str) -> Result<usize> {
    table
        .find_marker(marker)
        .ok_or_else(|| Error::MarkerNotFound {
            table: table.name.clone(),
            marker: marker.to_string(),
        })
}

/// A string map that resolves in both directions
#[derive(Debug, Clone, Default)]
pub struct BiMap {
    forward: HashMap<String, String>,
}

impl BiMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `a <-> b`
    pub fn insert(&mut self, a: &str, b: &str) {
        self.forward.insert(a.to_string(), b.to_string());
        self.forward.insert(b.to_string(), a.to_string());
    }

    /// The counterpart of `key`, whichever side it is on
    pub fn get(&self, key: &str) -> Option<&str> {
        self.forward.get(key).map(String::as_str)
    }

    /// Check whether `key` is registered on either side
    pub fn contains(&self, key: &str) -> bool {
        self.forward.contains_key(key)
    }

    /// Number of directed entries
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    fn load_rows(&mut self, rows: &[Row]) {
        for row in rows {
            let key = row.id();
            if key.is_empty() {
                continue;
            }
            let Some(localized) = row.get(LOCALIZED_COLUMN) else {
                continue;
            };
            self.insert(key, localized);
        }
    }
}

/// Equipment and attribute alias maps
///
/// The two maps are independent; a lookup never crosses between them.
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    /// Canonical item id <-> localized display name
    pub equipment: BiMap,
    /// Canonical column name <-> localized column name
    pub attribute: BiMap,
}

impl AliasMap {
    /// Create empty maps
    pub fn new() -> Self {
        Self::default()
    }

    /// Register equipment names from every range in `ranges`
    pub fn load_equipment(&mut self, table: &Table, ranges: &[RangeMarkers]) -> Result<()> {
        for markers in ranges {
            let rows = build_range(table, markers)?;
            debug!(table = %table.name, range = %markers.start, rows = rows.len(), "loading equipment aliases");
            self.equipment.load_rows(rows);
        }
        Ok(())
    }

    /// Register attribute names from every range in `ranges`
    pub fn load_attributes(&mut self, table: &Table, ranges: &[RangeMarkers]) -> Result<()> {
        for markers in ranges {
            let rows = build_range(table, markers)?;
            debug!(table = %table.name, range = %markers.start, rows = rows.len(), "loading attribute aliases");
            self.attribute.load_rows(rows);
        }
        Ok(())
    }

    /// Localized form of a column name, if one is registered
    pub fn attribute_synonym(&self, field: &str) -> Option<&str> {
        self.attribute.get(field)
    }

    /// Resolve an override key to a header index: exact name, then via synonym
    pub fn resolve_column(&self, header: &[String], key: &str) -> Option<usize> {
        header.iter().position(|h| h == key).or_else(|| {
            self.attribute
                .get(key)
                .and_then(|canonical| header.iter().position(|h| h == canonical))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equipment_table() -> Table {
        Table::parse(
            "equipment",
            "id;a;b;text\n\
             weapon_name;weapon_name;\n\
             sword;x;x;Sword_zh\n\
             ;x;x;orphan\n\
             axe;x;x;Axe_zh\n\
             weapon_name_end;weapon_name_end;\n\
             armor_name;armor_name;\n\
             helm;x;x;Helm_zh\n\
             armor_name_end;armor_name_end;\n",
        )
        .unwrap()
    }

    #[test]
    fn test_markers_named() {
        let m = RangeMarkers::named("weapon_name");
        assert_eq!(m.start, "weapon_name;weapon_name;");
        assert_eq!(m.end, "weapon_name_end;weapon_name_end;");
    }

    #[test]
    fn test_build_range_is_exclusive() {
        let table = equipment_table();
        let rows = build_range(&table, &RangeMarkers::named("weapon_name")).unwrap();

        let ids: Vec<&str> = rows.iter().map(Row::id).collect();
        assert_eq!(ids, vec!["sword", "", "axe"]);
    }

    #[test]
    fn test_build_range_missing_marker() {
        let table = equipment_table();
        let err = build_range(&table, &RangeMarkers::named("ring_name")).unwrap_err();
        assert!(matches!(err, Error::MarkerNotFound { .. }));
    }

    #[test]
    fn test_equipment_aliases_are_symmetric() {
        let table = equipment_table();
        let mut aliases = AliasMap::new();
        aliases
            .load_equipment(
                &table,
                &[RangeMarkers::named("weapon_name"), RangeMarkers::named("armor_name")],
            )
            .unwrap();

        assert_eq!(aliases.equipment.get("sword"), Some("Sword_zh"));
        assert_eq!(aliases.equipment.get("Sword_zh"), Some("sword"));
        assert_eq!(aliases.equipment.get("Helm_zh"), Some("helm"));
        // rows with an empty id are skipped
        assert!(!aliases.equipment.contains("orphan"));
        // namespaces stay apart
        assert_eq!(aliases.attribute_synonym("sword"), None);
    }

    #[test]
    fn test_resolve_column() {
        let mut aliases = AliasMap::new();
        aliases.attribute.insert("damage", "伤害");
        let header: Vec<String> = ["id", "name", "damage"].iter().map(|s| s.to_string()).collect();

        assert_eq!(aliases.resolve_column(&header, "damage"), Some(2));
        assert_eq!(aliases.resolve_column(&header, "伤害"), Some(2));
        assert_eq!(aliases.resolve_column(&header, "weight"), None);
    }
}
