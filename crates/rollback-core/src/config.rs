//! Patch configuration: which tables to touch and with which override files

use crate::alias::RangeMarkers;
use crate::error::{Error, Result};
use crate::synth::EquipmentKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Names of the game tables the patch works with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCatalog {
    pub weapons: String,
    pub armor: String,
    /// Equipment names and descriptions
    pub equipment: String,
    /// Localized attribute names
    pub attributes: String,
}

impl Default for TableCatalog {
    fn default() -> Self {
        Self {
            weapons: "gml_GlobalScript_table_weapons".to_string(),
            armor: "gml_GlobalScript_table_armor".to_string(),
            equipment: "gml_GlobalScript_table_equipment".to_string(),
            attributes: "gml_GlobalScript_table_attributes".to_string(),
        }
    }
}

/// Merge a packaged override file into an existing table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeJob {
    pub table: String,
    /// Path of the override file inside the mod package
    pub overrides: String,
}

/// Append rows declared in a packaged override file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisJob {
    pub kind: EquipmentKind,
    pub table: String,
    /// Path of the override file inside the mod package
    pub overrides: String,
}

/// A full patch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    pub tables: TableCatalog,
    /// Ranges of the equipment table mapping ids to display names
    pub equipment_ranges: Vec<String>,
    /// Ranges of the attribute table mapping column names to localized names
    pub attribute_ranges: Vec<String>,
    pub merges: Vec<MergeJob>,
    pub synthesis: Vec<SynthesisJob>,
    /// Sprite name prefixes duplicated for every synthesized row
    pub sprite_prefixes: Vec<String>,
    /// Where to export the patched tables before patching
    pub snapshot_dir: Option<PathBuf>,
    /// Where to export the patched tables after patching
    pub inspect_dir: Option<PathBuf>,
}

impl Default for PatchConfig {
    fn default() -> Self {
        let tables = TableCatalog::default();
        let merges = [&tables.weapons, &tables.armor]
            .into_iter()
            .map(|table| MergeJob {
                table: table.clone(),
                overrides: format!("{table}.gml"),
            })
            .collect();

        Self {
            equipment_ranges: vec!["weapon_name".to_string(), "armor_name".to_string()],
            attribute_ranges: vec!["attribute_text".to_string()],
            merges,
            synthesis: Vec::new(),
            sprite_prefixes: ["s_inv_", "s_loot_", "s_char_", "s_charleft_"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            snapshot_dir: None,
            inspect_dir: None,
            tables,
        }
    }
}

impl PatchConfig {
    /// Load a config from JSON; missing fields take their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the config to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn equipment_markers(&self) -> Vec<RangeMarkers> {
        self.equipment_ranges.iter().map(|r| RangeMarkers::named(r)).collect()
    }

    pub fn attribute_markers(&self) -> Vec<RangeMarkers> {
        self.attribute_ranges.iter().map(|r| RangeMarkers::named(r)).collect()
    }

    /// Tables touched by a merge or synthesis job, first mention first
    pub fn patched_tables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let jobs = self
            .merges
            .iter()
            .map(|m| m.table.as_str())
            .chain(self.synthesis.iter().map(|s| s.table.as_str()));
        for name in jobs {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}
