//! Synthesize new rows from parent rows
//!
//! A synthesis file declares one section per new row. Each section names a
//! `parent` row to clone and overrides some of its columns. Overriding the
//! name also registers a display name and description in the equipment
//! table, and the parent's sprites are duplicated for the new row.

use crate::alias::{build_range, find_marker, AliasMap, RangeMarkers, LOCALIZED_COLUMN};
use crate::error::{Error, Result};
use crate::export::export_to_overrides;
use crate::host::AssetHost;
use crate::merger::NAME_COLUMN;
use crate::overrides::{OverrideStore, Section};
use crate::table::{Row, Table};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Key naming the row a section is cloned from
pub const PARENT_KEY: &str = "parent";

/// Which equipment ranges a synthesized row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentKind {
    Weapon,
    Armor,
}

impl EquipmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EquipmentKind::Weapon => "weapon",
            EquipmentKind::Armor => "armor",
        }
    }

    /// The `{kind}_name` range of the equipment table
    pub fn name_range(self) -> RangeMarkers {
        RangeMarkers::named(&format!("{}_name", self.as_str()))
    }

    /// The `{kind}_desc` range of the equipment table
    pub fn desc_range(self) -> RangeMarkers {
        RangeMarkers::named(&format!("{}_desc", self.as_str()))
    }
}

impl fmt::Display for EquipmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row built from its parent, plus the display name to register for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedRow {
    pub row: Row,
    pub display_name: Option<String>,
}

/// Clone `parent` and splice in the section's overrides
///
/// The new row's identifier is the section name. A `name` override stores the
/// section name in the row and returns the override text as the display name
/// when the two differ. Keys that match no column are ignored.
pub fn synthesize_row(parent: &Row, header: &[String], aliases: &AliasMap, section: &Section) -> SynthesizedRow {
    let id = section.name();
    let mut row = parent.clone();
    row.set(0, id);
    let mut display_name = None;

    for (key, value) in section.entries() {
        let Some(idx) = aliases.resolve_column(header, key) else {
            debug!(row = id, key, "override key matches no column");
            continue;
        };

        if header[idx] == NAME_COLUMN {
            if value != id {
                display_name = Some(value.to_string());
            }
            row.set(idx, id);
        } else {
            row.set(idx, value);
        }
    }

    SynthesizedRow { row, display_name }
}

/// Register the display name and description of a new equipment id
///
/// The name row is `id;id;id;display;id;...` padded with `id` to the table
/// width and goes right before the `{kind}_name` end marker. The parent's
/// description row is copied under the new id right before the `{kind}_desc`
/// end marker.
pub fn insert_name_translation(
    equipment: &mut Table,
    id: &str,
    display_name: &str,
    kind: EquipmentKind,
    parent_id: &str,
) -> Result<()> {
    let desc_markers = kind.desc_range();
    let mut desc_row = build_range(equipment, &desc_markers)?
        .iter()
        .find(|r| r.id() == parent_id)
        .cloned()
        .ok_or_else(|| Error::DescriptionNotFound {
            kind: kind.to_string(),
            parent: parent_id.to_string(),
        })?;
    desc_row.set(0, id);

    let width = equipment.column_count().max(LOCALIZED_COLUMN + 1);
    let mut name_row = Row::new(vec![id.to_string(); width]);
    name_row.set(LOCALIZED_COLUMN, display_name);

    let name_end = find_marker(equipment, &kind.name_range().end)?;
    equipment.rows.insert(name_end, name_row);

    let desc_end = find_marker(equipment, &desc_markers.end)?;
    equipment.rows.insert(desc_end, desc_row);

    debug!(id, display_name, %kind, "name translation inserted");
    Ok(())
}

/// Copy the sprite `from` under the name `to`
///
/// Returns false when the source sprite does not exist or the target already
/// does.
pub fn duplicate_sprite<H: AssetHost + ?Sized>(host: &mut H, from: &str, to: &str) -> Result<bool> {
    if host.find_sprite(to, false).is_some() {
        debug!(sprite = to, "sprite already exists");
        return Ok(false);
    }

    let copy = host
        .find_sprite(from, false)
        .or_else(|| host.find_sprite(from, true))
        .map(|s| s.duplicate(to));

    match copy {
        Some(sprite) => {
            host.create_sprite(sprite)?;
            Ok(true)
        }
        None => {
            warn!(sprite = from, "parent sprite not found, skipping");
            Ok(false)
        }
    }
}

/// Tables and sprite roles a synthesis run works against
#[derive(Debug, Clone, Copy)]
pub struct SynthesisTarget<'a> {
    /// Table receiving the new rows
    pub table: &'a str,
    /// Shared equipment name/description table
    pub equipment: &'a str,
    pub kind: EquipmentKind,
    /// Sprite name prefixes, one per image role
    pub sprite_prefixes: &'a [String],
}

/// Result of a synthesis run
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    /// The target table after all rows were appended
    pub table: Table,
    /// The equipment table after all translations were inserted
    pub equipment: Table,
    /// Identifiers of the appended rows, in order
    pub rows_added: Vec<String>,
    pub sprites_duplicated: usize,
    /// Override projection of `table`
    pub table_snapshot: OverrideStore,
    /// Override projection of `equipment`
    pub equipment_snapshot: OverrideStore,
}

/// Append one row per section that declares a parent, then write both tables back
///
/// Sprites are duplicated only once every section has been built, so a failed
/// run leaves the host unchanged.
pub fn synthesize_rows<H: AssetHost + ?Sized>(
    host: &mut H,
    target: SynthesisTarget<'_>,
    store: &OverrideStore,
    aliases: &AliasMap,
) -> Result<SynthesisOutcome> {
    let mut table = host.table(target.table)?;
    let mut equipment = host.table(target.equipment)?;
    let mut rows_added = Vec::new();
    let mut sprite_copies = Vec::new();

    for section in store.sections() {
        let Some(parent_id) = section.get(PARENT_KEY) else {
            continue;
        };
        let id = section.name();

        let parent = table
            .find_row(parent_id)
            .filter(|_| !parent_id.is_empty())
            .ok_or_else(|| Error::ParentNotFound {
                table: target.table.to_string(),
                parent: parent_id.to_string(),
            })?;
        let synthesized = synthesize_row(parent, &table.header, aliases, section);

        if let Some(display_name) = &synthesized.display_name {
            insert_name_translation(&mut equipment, id, display_name, target.kind, parent_id)?;
        }
        table.rows.push(synthesized.row);
        rows_added.push(id.to_string());

        for prefix in target.sprite_prefixes {
            sprite_copies.push((format!("{prefix}{parent_id}"), format!("{prefix}{id}")));
        }

        debug!(table = target.table, row = id, parent = parent_id, "row synthesized");
    }

    let mut sprites_duplicated = 0;
    for (from, to) in &sprite_copies {
        if duplicate_sprite(host, from, to)? {
            sprites_duplicated += 1;
        }
    }

    host.set_table(target.table, table.clone())?;
    host.set_table(target.equipment, equipment.clone())?;

    info!(
        table = target.table,
        rows = rows_added.len(),
        sprites = sprites_duplicated,
        "synthesis complete"
    );

    Ok(SynthesisOutcome {
        table_snapshot: export_to_overrides(&table, aliases),
        equipment_snapshot: export_to_overrides(&equipment, aliases),
        table,
        equipment,
        rows_added,
        sprites_duplicated,
    })
}
