use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use nd_core::time::{now_utc, parse_timestamp};
use nd_core::{AnalysisReport, DetectionMode};
use nd_store::{SnapshotCache, SnapshotStore, Settings};

#[derive(Parser)]
#[command(name = "nd", about = "Narrative detection and momentum scoring")]
struct Cli {
    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect narratives in a JSON item file and store the snapshot
    Analyze {
        /// Items: a JSON array, {"content": [...]} or {"signals": [...]}
        items: PathBuf,

        /// TOML config with [engine] settings and [[taxonomy]] entries
        #[arg(long)]
        config: Option<PathBuf>,

        /// Detection strategy (overrides the config)
        #[arg(long, value_parser = ["auto", "content", "signal"])]
        mode: Option<String>,

        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Do not persist the snapshot
        #[arg(long)]
        no_store: bool,

        /// Analysis time (ISO-8601); defaults to the current time
        #[arg(long)]
        now: Option<String>,
    },

    /// Show the most recent snapshot
    Latest {
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored snapshots, newest first
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Delete all but the newest snapshots
    Prune {
        #[arg(long)]
        keep: usize,
    },

    /// Print the narrative catalog in use
    Taxonomy {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn data_dir() -> PathBuf {
    std::env::var("ND_DATA_DIR")
        .ok()
        .map(PathBuf::from)
        .unwrap_or_else(nd_store::default_base_dir)
}

fn open_store() -> Result<SnapshotStore> {
    let base = data_dir();
    nd_store::open_store(&base)
        .with_context(|| format!("failed to open snapshot store in {}", base.display()))
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Analyze {
            items,
            config,
            mode,
            output,
            no_store,
            now,
        } => cmd_analyze(
            items,
            config.as_deref(),
            mode.as_deref(),
            output.as_deref(),
            *no_store,
            now.as_deref(),
        ),
        Commands::Latest { json } => cmd_latest(*json),
        Commands::History { limit } => cmd_history(*limit),
        Commands::Prune { keep } => cmd_prune(*keep),
        Commands::Taxonomy { config } => cmd_taxonomy(config.as_deref()),
    }
}

fn load_settings(config: Option<&Path>) -> Result<Settings> {
    Settings::load_or_default(config).with_context(|| match config {
        Some(p) => format!("failed to load config {}", p.display()),
        None => "failed to load default config".to_string(),
    })
}

fn cmd_analyze(
    items_path: &Path,
    config: Option<&Path>,
    mode: Option<&str>,
    output: Option<&Path>,
    no_store: bool,
    now: Option<&str>,
) -> Result<()> {
    let mut settings = load_settings(config)?;
    if let Some(mode) = mode {
        settings.engine.detection_mode = DetectionMode::from_str_lossy(mode);
    }
    let engine = settings.into_engine().context("invalid engine configuration")?;

    let now = match now {
        Some(raw) => parse_timestamp(raw)
            .with_context(|| format!("--now is not a valid timestamp: {raw}"))?,
        None => now_utc(),
    };

    let items = nd_store::read_items(items_path)
        .with_context(|| format!("failed to read items from {}", items_path.display()))?;

    let report = if no_store {
        engine.analyze(&items, now)
    } else {
        let cache = SnapshotCache::new(open_store()?);
        let snapshot = cache
            .refresh(&engine, &items, now)
            .context("failed to refresh snapshot")?;
        eprintln!("stored snapshot {}", snapshot.record.id);
        snapshot.report
    };

    match output {
        Some(path) => {
            nd_store::write_report(path, &report)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "{} narratives from {} items written to {}",
                report.narrative_count,
                report.total_items_analyzed,
                path.display()
            );
        }
        None => {
            let json = nd_store::report_to_json(&report).context("failed to serialize report")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    println!("analyzed:   {}", report.analysis_timestamp);
    println!("strategy:   {}", report.strategy);
    println!("items:      {}", report.total_items_analyzed);
    println!("narratives: {}", report.narrative_count);
    for n in &report.narratives {
        println!(
            "  {:<32} {:<12} momentum={:.3} confidence={:.3} n={}",
            n.name, n.momentum_trend, n.momentum_score, n.confidence, n.frequency
        );
    }
    if !report.rising.is_empty() {
        let names: Vec<&str> = report.rising.iter().map(|r| r.name.as_str()).collect();
        println!("rising:     {}", names.join(", "));
    }
}

fn cmd_latest(json: bool) -> Result<()> {
    let store = open_store()?;
    let Some(snapshot) = store.latest().context("failed to load latest snapshot")? else {
        println!("(no snapshots)");
        return Ok(());
    };

    if json {
        let out = nd_store::report_to_json(&snapshot.report).context("failed to serialize report")?;
        println!("{out}");
    } else {
        println!("snapshot:   {}", snapshot.record.id);
        print_report(&snapshot.report);
    }
    Ok(())
}

fn cmd_history(limit: usize) -> Result<()> {
    let store = open_store()?;
    let records = store.list(limit).context("failed to list snapshots")?;
    if records.is_empty() {
        println!("(no snapshots)");
        return Ok(());
    }
    if let Some(last) = store.last_refresh().context("failed to read last refresh")? {
        println!("last refresh: {last}");
    }
    for r in records {
        println!(
            "{}  {}  {:<8} {} narratives",
            r.id, r.refreshed_at, r.strategy, r.narrative_count
        );
    }
    Ok(())
}

fn cmd_prune(keep: usize) -> Result<()> {
    let store = open_store()?;
    let removed = store.prune(keep).context("failed to prune snapshots")?;
    println!("pruned {removed} snapshots, kept at most {keep}");
    Ok(())
}

fn cmd_taxonomy(config: Option<&Path>) -> Result<()> {
    let settings = load_settings(config)?;
    for entry in settings.taxonomy.entries() {
        println!("{}: {}", entry.name, entry.keywords.join(", "));
    }
    Ok(())
}
