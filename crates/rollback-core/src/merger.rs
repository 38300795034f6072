//! Merge override sections into existing table rows

use crate::alias::AliasMap;
use crate::error::{Error, Result};
use crate::host::AssetHost;
use crate::overrides::{OverrideStore, Section};
use crate::table::{Row, Table};
use tracing::{debug, info};

/// Column that holds the equipment name and goes through the equipment aliases
pub const NAME_COLUMN: &str = "name";

/// Look up an override value by column name: exact key, then localized synonym
pub fn resolve_value<'a>(section: &'a Section, aliases: &AliasMap, field: &str) -> Option<&'a str> {
    section.get(field).or_else(|| {
        aliases
            .attribute_synonym(field)
            .and_then(|synonym| section.get(synonym))
    })
}

/// Rebuild a row from its override section, one header column at a time
///
/// Columns the section does not mention come back empty; the original values
/// are not carried over. The identifier column keeps `row_id` unless the
/// section sets it.
pub fn rebuild_row(row_id: &str, header: &[String], aliases: &AliasMap, section: &Section) -> Result<Row> {
    let fields = header
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            if field == NAME_COLUMN {
                return resolve_name(row_id, aliases, section);
            }
            let fallback = if idx == 0 { row_id } else { "" };
            Ok(resolve_value(section, aliases, field)
                .unwrap_or(fallback)
                .to_string())
        })
        .collect::<Result<Vec<String>>>()?;

    Ok(Row::new(fields))
}

fn resolve_name(row_id: &str, aliases: &AliasMap, section: &Section) -> Result<String> {
    let value = resolve_value(section, aliases, NAME_COLUMN).ok_or_else(|| Error::MissingName {
        row: row_id.to_string(),
    })?;

    aliases
        .equipment
        .get(value)
        .map(str::to_string)
        .ok_or_else(|| Error::UnresolvedAlias {
            row: row_id.to_string(),
            value: value.to_string(),
        })
}

/// Produce a new table where every row with a matching section is rebuilt
///
/// Rows without a section pass through unchanged; header, row count and row
/// order are preserved.
pub fn merge_overrides(table: &Table, store: &OverrideStore, aliases: &AliasMap) -> Result<Table> {
    let mut merged = Table::new(table.name.clone(), table.header.clone());
    merged.layout = table.layout;
    merged.rows.reserve(table.rows.len());

    for row in &table.rows {
        match store.section(row.id()) {
            Some(section) => {
                let rebuilt = rebuild_row(row.id(), &table.header, aliases, section)?;
                debug!(table = %table.name, row = row.id(), "row overridden");
                merged.rows.push(rebuilt);
            }
            None => merged.rows.push(row.clone()),
        }
    }

    Ok(merged)
}

/// Count of rows in `table` that `store` would override
pub fn overridden_rows(table: &Table, store: &OverrideStore) -> usize {
    table
        .rows
        .iter()
        .filter(|r| store.section_exists(r.id()))
        .count()
}

/// Result of merging an override file into a host table
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub table: Table,
    pub rows_overridden: usize,
}

/// Merge overrides into a host table and hand the result back to the host
pub fn apply_overrides<H: AssetHost + ?Sized>(
    host: &mut H,
    table_name: &str,
    store: &OverrideStore,
    aliases: &AliasMap,
) -> Result<MergeOutcome> {
    let table = host.table(table_name)?;
    let rows_overridden = overridden_rows(&table, store);
    let merged = merge_overrides(&table, store, aliases)?;
    host.set_table(table_name, merged.clone())?;

    info!(table = table_name, rows = rows_overridden, "overrides merged");
    Ok(MergeOutcome {
        table: merged,
        rows_overridden,
    })
}
