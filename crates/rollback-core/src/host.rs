//! Boundary to the host asset store
//!
//! The engines never reach for global state: everything they read or write
//! goes through an [`AssetHost`].

use crate::error::{Error, Result};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Host-provided access to tables, packaged mod files and sprites
pub trait AssetHost {
    /// Get a copy of a named table; unknown names are an error
    fn table(&self, name: &str) -> Result<Table>;

    /// Replace a named table
    fn set_table(&mut self, name: &str, table: Table) -> Result<()>;

    /// Read a text file bundled with the mod
    fn packaged_text(&self, path: &str) -> Result<String>;

    /// Find a sprite by name
    fn find_sprite(&self, name: &str, ignore_case: bool) -> Option<&SpriteRecord>;

    /// Add a new sprite
    fn create_sprite(&mut self, sprite: SpriteRecord) -> Result<()>;
}

/// A texture page entry shared between sprites
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureRef {
    /// Texture page item name
    pub name: String,
}

/// Sprite margins in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

/// An image asset record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteRecord {
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub margins: Margins,
    #[serde(default)]
    pub transparent: bool,
    #[serde(default)]
    pub smooth: bool,
    #[serde(default)]
    pub preload: bool,
    #[serde(default)]
    pub bbox_mode: u32,
    #[serde(default)]
    pub sep_masks: u32,
    #[serde(default)]
    pub origin_x: i32,
    #[serde(default)]
    pub origin_y: i32,
    /// Playback speed type (frames per second or per game frame)
    #[serde(default)]
    pub speed_type: u32,
    #[serde(default)]
    pub playback_speed: f32,
    /// Frame textures, shared with every copy of this sprite
    #[serde(default)]
    pub textures: Vec<Arc<TextureRef>>,
}

impl SpriteRecord {
    /// A copy under a new name; the texture list is shared, not deep-copied
    pub fn duplicate(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

/// An in-memory host
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    pub tables: BTreeMap<String, Table>,
    pub packaged: BTreeMap<String, String>,
    pub sprites: Vec<SpriteRecord>,
}

impl MemoryHost {
    /// Create an empty host
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table under its own name
    pub fn insert_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Add a packaged mod file
    pub fn insert_packaged(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.packaged.insert(path.into(), text.into());
    }
}

impl AssetHost for MemoryHost {
    fn table(&self, name: &str) -> Result<Table> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    fn set_table(&mut self, name: &str, mut table: Table) -> Result<()> {
        table.name = name.to_string();
        self.tables.insert(name.to_string(), table);
        Ok(())
    }

    fn packaged_text(&self, path: &str) -> Result<String> {
        self.packaged
            .get(path)
            .cloned()
            .ok_or_else(|| Error::PackagedFileNotFound(path.to_string()))
    }

    fn find_sprite(&self, name: &str, ignore_case: bool) -> Option<&SpriteRecord> {
        if ignore_case {
            let name = name.to_lowercase();
            self.sprites.iter().find(|s| s.name.to_lowercase() == name)
        } else {
            self.sprites.iter().find(|s| s.name == name)
        }
    }

    fn create_sprite(&mut self, sprite: SpriteRecord) -> Result<()> {
        self.sprites.push(sprite);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprite(name: &str) -> SpriteRecord {
        SpriteRecord {
            name: name.to_string(),
            width: 27,
            height: 54,
            margins: Margins { left: 1, right: 26, top: 2, bottom: 53 },
            transparent: true,
            smooth: false,
            preload: true,
            bbox_mode: 0,
            sep_masks: 1,
            origin_x: 13,
            origin_y: 27,
            speed_type: 0,
            playback_speed: 30.0,
            textures: vec![Arc::new(TextureRef { name: "page_0".to_string() })],
        }
    }

    #[test]
    fn test_missing_table_is_error() {
        let host = MemoryHost::new();
        assert!(matches!(host.table("nope"), Err(Error::TableNotFound(_))));
    }

    #[test]
    fn test_find_sprite_case() {
        let mut host = MemoryHost::new();
        host.create_sprite(sprite("s_inv_Sword")).unwrap();

        assert!(host.find_sprite("s_inv_sword", false).is_none());
        assert!(host.find_sprite("s_inv_sword", true).is_some());
        assert!(host.find_sprite("s_inv_Sword", false).is_some());
    }

    #[test]
    fn test_duplicate_shares_textures() {
        let original = sprite("s_inv_sword");
        let copy = original.duplicate("s_inv_newsword");

        assert_eq!(copy.name, "s_inv_newsword");
        assert_eq!(copy.margins, original.margins);
        assert_eq!(copy.playback_speed, original.playback_speed);
        assert!(Arc::ptr_eq(&copy.textures[0], &original.textures[0]));
    }
}
