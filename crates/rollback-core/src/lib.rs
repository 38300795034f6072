//! rollback-core: override merging and row synthesis for game data tables
//!
//! This library provides functionality to:
//! - Parse semicolon-delimited game tables and sectioned override files
//! - Build localization alias maps from marker-delimited table ranges
//! - Rebuild table rows from per-row override sections
//! - Synthesize new rows (with names, descriptions and sprites) from parent rows
//! - Export tables back to editable override snapshots and CSV

pub mod alias;
pub mod config;
pub mod error;
pub mod export;
pub mod host;
pub mod merger;
pub mod overrides;
pub mod pipeline;
pub mod synth;
pub mod table;

pub use alias::{build_range, AliasMap, BiMap, RangeMarkers};
pub use config::{MergeJob, PatchConfig, SynthesisJob, TableCatalog};
pub use error::{Error, Result};
pub use export::{export_csv, export_snapshot, export_to_overrides, write_snapshot};
pub use host::{AssetHost, Margins, MemoryHost, SpriteRecord, TextureRef};
pub use merger::{apply_overrides, merge_overrides, rebuild_row, MergeOutcome};
pub use overrides::{OverrideStore, Section, GLOBAL_SECTION};
pub use pipeline::{load_aliases, run_patch, PatchReport};
pub use synth::{
    insert_name_translation, synthesize_row, synthesize_rows, EquipmentKind, SynthesisOutcome, SynthesisTarget,
};
pub use table::{Row, Table, TextLayout, DELIMITER};
