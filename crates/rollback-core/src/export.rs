//! Export tables as editable override snapshots and CSV
//!
//! The snapshot is the inverse of the merge: each live row becomes a section
//! and each non-empty field a key, localized where an alias exists.

use crate::alias::AliasMap;
use crate::error::{Error, Result};
use crate::merger::NAME_COLUMN;
use crate::overrides::OverrideStore;
use crate::table::Table;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Rows with an empty field here are placeholders and are not exported
pub const LIVENESS_COLUMN: usize = 2;

/// Project a table onto an override store
pub fn export_to_overrides(table: &Table, aliases: &AliasMap) -> OverrideStore {
    let mut store = OverrideStore::new();
    let name_key = aliases.attribute_synonym(NAME_COLUMN).unwrap_or(NAME_COLUMN);

    for row in &table.rows {
        if row.get(LIVENESS_COLUMN).unwrap_or("").is_empty() {
            continue;
        }
        let section = row.id();

        for (field, value) in table.header.iter().zip(&row.fields) {
            if value.is_empty() {
                continue;
            }

            if field == NAME_COLUMN {
                if let Some(display) = aliases.equipment.get(value) {
                    store.set_value(section, name_key, display);
                    continue;
                }
            }

            match aliases.attribute_synonym(field) {
                Some(synonym) => store.set_value(section, synonym, value),
                None => store.set_value(section, field, value),
            }
        }
    }

    store
}

/// Write a table as comma-separated values
pub fn export_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let path = path.as_ref();
    let csv_err = |e: csv::Error| Error::Csv {
        path: path.to_path_buf(),
        source: e,
    };

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    writer.write_record(&table.header).map_err(csv_err)?;
    for row in &table.rows {
        writer.write_record(&row.fields).map_err(csv_err)?;
    }
    writer.flush()?;

    Ok(())
}

/// Write `{table}.csv` and `{table}.ini` into `dir`, creating it if needed
pub fn export_snapshot<P: AsRef<Path>>(table: &Table, aliases: &AliasMap, dir: P) -> Result<Vec<PathBuf>> {
    write_snapshot(table, &export_to_overrides(table, aliases), dir)
}

/// Write a table and an already projected override store into `dir`
///
/// Existing files are replaced.
pub fn write_snapshot<P: AsRef<Path>>(table: &Table, store: &OverrideStore, dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let csv_path = dir.join(format!("{}.csv", table.name));
    export_csv(table, &csv_path)?;

    let ini_path = dir.join(format!("{}.ini", table.name));
    store.save(&ini_path)?;

    debug!(table = %table.name, dir = %dir.display(), "snapshot written");
    Ok(vec![csv_path, ini_path])
}
