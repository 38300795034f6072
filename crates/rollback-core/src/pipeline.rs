//! The patch step: aliases, snapshots, merges, synthesis
//!
//! Every job runs in order and the first failure aborts the whole run.

use crate::alias::AliasMap;
use crate::config::PatchConfig;
use crate::error::Result;
use crate::export::{export_snapshot, write_snapshot};
use crate::host::AssetHost;
use crate::merger::apply_overrides;
use crate::overrides::OverrideStore;
use crate::synth::{synthesize_rows, EquipmentKind, SynthesisTarget};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Outcome of one merge job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeSummary {
    pub table: String,
    pub overrides: String,
    pub rows_overridden: usize,
}

/// Outcome of one synthesis job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisSummary {
    pub table: String,
    pub kind: EquipmentKind,
    pub overrides: String,
    pub rows_added: Vec<String>,
    pub sprites_duplicated: usize,
}

/// What a patch run did
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchReport {
    /// When the patch was applied
    pub applied_at: DateTime<Utc>,
    pub merges: Vec<MergeSummary>,
    pub syntheses: Vec<SynthesisSummary>,
    /// Snapshot files written, in order, each listed once
    pub files_written: Vec<PathBuf>,
}

impl PatchReport {
    fn new() -> Self {
        Self {
            applied_at: Utc::now(),
            merges: Vec::new(),
            syntheses: Vec::new(),
            files_written: Vec::new(),
        }
    }

    /// Record written files, skipping paths already listed
    fn record_files(&mut self, paths: Vec<PathBuf>) {
        for path in paths {
            if !self.files_written.contains(&path) {
                self.files_written.push(path);
            }
        }
    }

    /// Save the report to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Build the alias maps from the configured equipment and attribute tables
pub fn load_aliases<H: AssetHost + ?Sized>(host: &H, config: &PatchConfig) -> Result<AliasMap> {
    let mut aliases = AliasMap::new();

    let equipment = host.table(&config.tables.equipment)?;
    aliases.load_equipment(&equipment, &config.equipment_markers())?;

    let attributes = host.table(&config.tables.attributes)?;
    aliases.load_attributes(&attributes, &config.attribute_markers())?;

    info!(
        equipment = aliases.equipment.len(),
        attributes = aliases.attribute.len(),
        "aliases loaded"
    );
    Ok(aliases)
}

/// Run every configured job against `host`
pub fn run_patch<H: AssetHost + ?Sized>(host: &mut H, config: &PatchConfig) -> Result<PatchReport> {
    let mut report = PatchReport::new();
    let aliases = load_aliases(&*host, config)?;

    if let Some(dir) = &config.snapshot_dir {
        for name in config.patched_tables() {
            let table = host.table(name)?;
            report.record_files(export_snapshot(&table, &aliases, dir)?);
        }
    }

    for job in &config.merges {
        let store = OverrideStore::parse(&host.packaged_text(&job.overrides)?);
        let outcome = apply_overrides(host, &job.table, &store, &aliases)?;

        if let Some(dir) = &config.inspect_dir {
            report.record_files(export_snapshot(&outcome.table, &aliases, dir)?);
        }
        report.merges.push(MergeSummary {
            table: job.table.clone(),
            overrides: job.overrides.clone(),
            rows_overridden: outcome.rows_overridden,
        });
    }

    for job in &config.synthesis {
        let store = OverrideStore::parse(&host.packaged_text(&job.overrides)?);
        let target = SynthesisTarget {
            table: &job.table,
            equipment: &config.tables.equipment,
            kind: job.kind,
            sprite_prefixes: &config.sprite_prefixes,
        };
        let outcome = synthesize_rows(host, target, &store, &aliases)?;

        if let Some(dir) = &config.inspect_dir {
            report.record_files(write_snapshot(&outcome.table, &outcome.table_snapshot, dir)?);
            report.record_files(write_snapshot(&outcome.equipment, &outcome.equipment_snapshot, dir)?);
        }
        report.syntheses.push(SynthesisSummary {
            table: job.table.clone(),
            kind: job.kind,
            overrides: job.overrides.clone(),
            rows_added: outcome.rows_added,
            sprites_duplicated: outcome.sprites_duplicated,
        });
    }

    info!(
        merges = report.merges.len(),
        syntheses = report.syntheses.len(),
        files = report.files_written.len(),
        "patch complete"
    );
    Ok(report)
}
