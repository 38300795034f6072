//! Directory-backed asset host
//!
//! Layout of a data directory:
//! - `tables/**/<name>.txt`: one semicolon-delimited table per file
//! - `sprites.json`: array of sprite records
//!
//! Packaged override files are read relative to the mod directory.

use rollback_core::{AssetHost, Error, MemoryHost, Result, SpriteRecord, Table};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

const TABLES_DIR: &str = "tables";
const TABLE_EXTENSION: &str = "txt";
const SPRITES_FILE: &str = "sprites.json";

pub struct DirectoryHost {
    data_dir: PathBuf,
    mod_dir: Option<PathBuf>,
    inner: MemoryHost,
    /// Where each table was loaded from
    paths: BTreeMap<String, PathBuf>,
    /// Tables replaced through `set_table` since loading
    dirty: BTreeSet<String>,
    sprites_dirty: bool,
}

impl DirectoryHost {
    /// Load every table and sprite under `data_dir`
    ///
    /// A missing `tables/` directory is an error.
    pub fn open<P: AsRef<Path>>(data_dir: P, mod_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let mut inner = MemoryHost::new();
        let mut paths = BTreeMap::new();

        for entry in WalkDir::new(data_dir.join(TABLES_DIR)).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == TABLE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let content = read_file(path)?;
            let table = Table::parse(name, &content)?;
            debug!(table = name, rows = table.row_count(), "table loaded");

            paths.insert(name.to_string(), path.to_path_buf());
            inner.insert_table(table);
        }

        let sprites_path = data_dir.join(SPRITES_FILE);
        if sprites_path.exists() {
            inner.sprites = serde_json::from_str(&read_file(&sprites_path)?)?;
        }

        info!(
            data_dir = %data_dir.display(),
            tables = inner.tables.len(),
            sprites = inner.sprites.len(),
            "asset directory loaded"
        );

        Ok(Self {
            data_dir,
            mod_dir,
            inner,
            paths,
            dirty: BTreeSet::new(),
            sprites_dirty: false,
        })
    }

    /// Names of every loaded table
    pub fn table_names(&self) -> Vec<&str> {
        self.inner.tables.keys().map(String::as_str).collect()
    }

    /// Write changed tables and sprites back to the data directory
    ///
    /// Tables that were never replaced are left untouched on disk.
    pub fn save(&self) -> Result<()> {
        for name in &self.dirty {
            let table = self.inner.table(name)?;
            let path = match self.paths.get(name) {
                Some(path) => path.clone(),
                None => self
                    .data_dir
                    .join(TABLES_DIR)
                    .join(format!("{name}.{TABLE_EXTENSION}")),
            };
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, table.to_text())?;
        }

        if self.sprites_dirty {
            let sprites = serde_json::to_string_pretty(&self.inner.sprites)?;
            fs::write(self.data_dir.join(SPRITES_FILE), sprites)?;
        }
        debug!(tables = self.dirty.len(), sprites = self.sprites_dirty, "asset directory saved");
        Ok(())
    }
}

impl AssetHost for DirectoryHost {
    fn table(&self, name: &str) -> Result<Table> {
        self.inner.table(name)
    }

    fn set_table(&mut self, name: &str, table: Table) -> Result<()> {
        self.inner.set_table(name, table)?;
        self.dirty.insert(name.to_string());
        Ok(())
    }

    fn packaged_text(&self, path: &str) -> Result<String> {
        let Some(mod_dir) = &self.mod_dir else {
            return Err(Error::PackagedFileNotFound(path.to_string()));
        };

        let full = mod_dir.join(path);
        match fs::read_to_string(&full) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::PackagedFileNotFound(path.to_string())),
            Err(e) => Err(Error::FileRead { path: full, source: e }),
        }
    }

    fn find_sprite(&self, name: &str, ignore_case: bool) -> Option<&SpriteRecord> {
        self.inner.find_sprite(name, ignore_case)
    }

    fn create_sprite(&mut self, sprite: SpriteRecord) -> Result<()> {
        self.inner.create_sprite(sprite)?;
        self.sprites_dirty = true;
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let tables = dir.path().join("tables").join("nested");
        fs::create_dir_all(&tables).unwrap();
        fs::write(tables.join("weapons.txt"), "name;damage\nsword;10\n").unwrap();
        fs::write(tables.join("notes.md"), "ignored").unwrap();
        fs::write(
            dir.path().join("sprites.json"),
            r#"[{ "name": "s_inv_sword", "width": 27, "height": 54 }]"#,
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_open_loads_tables_and_sprites() {
        let dir = data_dir();
        let host = DirectoryHost::open(dir.path(), None).unwrap();

        assert_eq!(host.table_names(), vec!["weapons"]);
        assert_eq!(host.table("weapons").unwrap().rows[0].line(), "sword;10");
        assert!(host.find_sprite("S_INV_SWORD", true).is_some());
    }

    #[test]
    fn test_save_writes_back_in_place() {
        let dir = data_dir();
        let mut host = DirectoryHost::open(dir.path(), None).unwrap();

        let mut table = host.table("weapons").unwrap();
        table.rows[0].set(1, "99");
        host.set_table("weapons", table).unwrap();
        host.save().unwrap();

        let text = fs::read_to_string(dir.path().join("tables/nested/weapons.txt")).unwrap();
        assert_eq!(text, "name;damage\nsword;99\n");
    }

    #[test]
    fn test_save_leaves_untouched_tables_alone() {
        let dir = data_dir();
        let armor = dir.path().join("tables/armor.txt");
        fs::write(&armor, "name;armor\r\nhelm;5").unwrap();
        let sprites_before = fs::read_to_string(dir.path().join("sprites.json")).unwrap();

        let mut host = DirectoryHost::open(dir.path(), None).unwrap();
        let weapons = host.table("weapons").unwrap();
        host.set_table("weapons", weapons).unwrap();
        host.save().unwrap();

        assert_eq!(fs::read_to_string(&armor).unwrap(), "name;armor\r\nhelm;5");
        assert_eq!(fs::read_to_string(dir.path().join("sprites.json")).unwrap(), sprites_before);
    }

    #[test]
    fn test_open_without_tables_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = DirectoryHost::open(dir.path(), None);
        assert!(matches!(result, Err(Error::WalkDir(_))));
    }

    #[test]
    fn test_packaged_text() {
        let dir = data_dir();
        let mod_dir = tempfile::tempdir().unwrap();
        fs::write(mod_dir.path().join("over.ini"), "[sword]\ndamage=1\n").unwrap();

        let host = DirectoryHost::open(dir.path(), Some(mod_dir.path().to_path_buf())).unwrap();

        assert!(host.packaged_text("over.ini").unwrap().contains("damage=1"));
        assert!(matches!(
            host.packaged_text("missing.ini"),
            Err(Error::PackagedFileNotFound(_))
        ));
    }
}
