//! Override files: sectioned `key=value` documents with case-insensitive names
//!
//! Each section name is a row identifier and each key a (possibly localized)
//! column name. The same format is used for the snapshots written by the
//! export path.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::trace;

/// Section holding keys that appear before any `[section]` header
pub const GLOBAL_SECTION: &str = "global";

/// An ordered, case-insensitive section -> key -> value store
#[derive(Debug, Clone)]
pub struct OverrideStore {
    sections: Vec<Section>,
    index: HashMap<String, usize>,
}

/// One `[name]` block of an override store
#[derive(Debug, Clone)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl Section {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Section name as first written
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check whether a key exists (case-insensitive)
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(&fold(key))
    }

    /// Get a value by key (case-insensitive)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(&fold(key))
            .map(|&i| self.entries[i].1.as_str())
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Key/value pairs in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the section has no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Last write wins; the key keeps its first spelling and position
    fn set(&mut self, key: &str, value: &str) {
        match self.index.get(&fold(key)) {
            Some(&i) => self.entries[i].1 = value.to_string(),
            None => {
                self.index.insert(fold(key), self.entries.len());
                self.entries.push((key.to_string(), value.to_string()));
            }
        }
    }
}

impl Default for OverrideStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OverrideStore {
    /// Create a store holding only an empty `global` section
    pub fn new() -> Self {
        let mut store = Self {
            sections: Vec::new(),
            index: HashMap::new(),
        };
        store.section_mut(GLOBAL_SECTION);
        store
    }

    /// Parse override text
    ///
    /// Blank lines and lines starting with `;` or `#` are skipped. Lines without
    /// a `=` past the first character are ignored.
    pub fn parse(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    /// Parse already split lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::new();
        let mut current = GLOBAL_SECTION.to_string();

        for line in lines {
            let line = line.as_ref().trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
                current = line[1..line.len() - 1].trim().to_string();
                store.section_mut(&current);
                continue;
            }

            match line.find('=') {
                Some(pos) if pos > 0 => {
                    let key = line[..pos].trim();
                    let value = line[pos + 1..].trim();
                    store.set_value(&current, key, value);
                }
                _ => trace!(line, "ignoring malformed override line"),
            }
        }

        store
    }

    /// Load a store from disk; a missing file yields an empty store
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::parse(&content))
    }

    /// Check whether a section exists (case-insensitive)
    pub fn section_exists(&self, section: &str) -> bool {
        self.index.contains_key(&fold(section))
    }

    /// Check whether a key exists in a section (case-insensitive)
    pub fn key_exists(&self, section: &str, key: &str) -> bool {
        self.section(section).is_some_and(|s| s.contains_key(key))
    }

    /// Get a section by name (case-insensitive)
    pub fn section(&self, section: &str) -> Option<&Section> {
        self.index.get(&fold(section)).map(|&i| &self.sections[i])
    }

    /// All sections in insertion order, `global` first
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Section names in insertion order
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(Section::name).collect()
    }

    /// Keys of a section in insertion order, empty if the section is absent
    pub fn keys(&self, section: &str) -> Vec<&str> {
        self.section(section)
            .map(|s| s.keys().collect())
            .unwrap_or_default()
    }

    /// Get a value (case-insensitive on both section and key)
    pub fn value(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Set a value, creating the section if needed
    pub fn set_value(&mut self, section: &str, key: &str, value: &str) {
        self.section_mut(section).set(key, value);
    }

    /// Write every section to `path`, replacing any existing file
    ///
    /// The `global` header line is never written; its keys come first.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_text())?;
        Ok(())
    }

    /// Serialize to a string in the on-disk format
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    fn section_mut(&mut self, name: &str) -> &mut Section {
        let folded = fold(name);
        let idx = match self.index.get(&folded) {
            Some(&i) => i,
            None => {
                self.sections.push(Section::new(name));
                self.index.insert(folded, self.sections.len() - 1);
                self.sections.len() - 1
            }
        };
        &mut self.sections[idx]
    }
}

impl fmt::Display for OverrideStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            let is_global = section.name == GLOBAL_SECTION;
            if is_global && section.is_empty() {
                continue;
            }
            if !is_global {
                writeln!(f, "[{}]", section.name)?;
            }
            for (key, value) in section.entries() {
                writeln!(f, "{}={}", key, value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn fold(s: &str) -> String {
    s.to_lowercase()
}
