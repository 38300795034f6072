//! Rollback CLI
//!
//! Applies override patches to a directory of game tables and exports
//! editable snapshots of them.

mod host;

use clap::{Parser, Subcommand};
use host::DirectoryHost;
use rollback_core::{export_snapshot, load_aliases, run_patch, AssetHost, OverrideStore, PatchConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rollback")]
#[command(about = "Merge override files into game data tables", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply every merge and synthesis job, then write the tables back
    Patch {
        /// Data directory holding tables/ and sprites.json
        #[arg(short, long)]
        data: PathBuf,

        /// Mod directory holding the override files
        #[arg(short, long)]
        mod_dir: PathBuf,

        /// Patch config (JSON); defaults to the stock catalog
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Export tables here before patching
        #[arg(long)]
        snapshot_dir: Option<PathBuf>,

        /// Export tables here after patching
        #[arg(long)]
        inspect_dir: Option<PathBuf>,

        /// Write the patch report (JSON) here
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Export one table as CSV plus an editable override file
    Export {
        /// Data directory holding tables/ and sprites.json
        #[arg(short, long)]
        data: PathBuf,

        /// Table name
        #[arg(short, long)]
        table: String,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Patch config (JSON) naming the alias tables
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the sections and keys of an override file
    Show {
        /// Path to the override file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Write the default patch config
    InitConfig {
        /// Output path for the config file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> rollback_core::Result<()> {
    match command {
        Commands::Patch {
            data,
            mod_dir,
            config,
            snapshot_dir,
            inspect_dir,
            report,
        } => cmd_patch(&data, mod_dir, config.as_deref(), snapshot_dir, inspect_dir, report.as_deref()),
        Commands::Export {
            data,
            table,
            output,
            config,
        } => cmd_export(&data, &table, &output, config.as_deref()),
        Commands::Show { file } => cmd_show(&file),
        Commands::InitConfig { output } => cmd_init_config(&output),
    }
}

fn load_config(path: Option<&Path>) -> rollback_core::Result<PatchConfig> {
    match path {
        Some(path) => PatchConfig::load(path),
        None => Ok(PatchConfig::default()),
    }
}

fn cmd_patch(
    data: &Path,
    mod_dir: PathBuf,
    config_path: Option<&Path>,
    snapshot_dir: Option<PathBuf>,
    inspect_dir: Option<PathBuf>,
    report_path: Option<&Path>,
) -> rollback_core::Result<()> {
    let mut config = load_config(config_path)?;
    if snapshot_dir.is_some() {
        config.snapshot_dir = snapshot_dir;
    }
    if inspect_dir.is_some() {
        config.inspect_dir = inspect_dir;
    }

    let mut host = DirectoryHost::open(data, Some(mod_dir))?;
    let report = run_patch(&mut host, &config)?;
    host.save()?;

    println!("Patch applied at {}", report.applied_at.to_rfc3339());
    for merge in &report.merges {
        println!(
            "  {}: {} rows overridden from {}",
            merge.table, merge.rows_overridden, merge.overrides
        );
    }
    for synthesis in &report.syntheses {
        println!(
            "  {}: {} {} rows added, {} sprites duplicated",
            synthesis.table,
            synthesis.rows_added.len(),
            synthesis.kind,
            synthesis.sprites_duplicated
        );
    }
    if !report.files_written.is_empty() {
        println!("  {} snapshot files written", report.files_written.len());
    }

    if let Some(path) = report_path {
        report.save(path)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn cmd_export(data: &Path, table_name: &str, output: &Path, config_path: Option<&Path>) -> rollback_core::Result<()> {
    let config = load_config(config_path)?;
    let host = DirectoryHost::open(data, None)?;

    let aliases = load_aliases(&host, &config)?;
    let table = match host.table(table_name) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Available tables: {}", host.table_names().join(", "));
            return Err(e);
        }
    };
    let written = export_snapshot(&table, &aliases, output)?;

    println!("Exported {} rows of {}", table.row_count(), table_name);
    for path in &written {
        println!("  - {}", path.display());
    }

    Ok(())
}

fn cmd_show(file: &Path) -> rollback_core::Result<()> {
    let store = OverrideStore::open(file)?;

    println!("File: {}", file.display());
    println!();

    for section in store.sections() {
        if section.is_empty() {
            continue;
        }
        println!("[{}] ({} keys)", section.name(), section.len());
        for (key, value) in section.entries() {
            println!("  {} = {}", key, value);
        }
    }

    Ok(())
}

fn cmd_init_config(output: &Path) -> rollback_core::Result<()> {
    PatchConfig::default().save(output)?;
    println!("Created config file: {}", output.display());
    println!();
    println!("Edit the file to configure your patch, then run:");
    println!(
        "  rollback patch --data <dir> --mod-dir <dir> --config {}",
        output.display()
    );

    Ok(())
}
