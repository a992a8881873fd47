//! The `kiln` command: build asset paths through the cache and report.
//!
//! Parsing lives in [`Cli`], the build itself in [`run`], so both can be
//! driven from tests without spawning the binary.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use kiln_converters::default_registry;
use kiln_engine::{
    ArenaConfig, AssetManager, FlushOutcome, LoadReport, ManagerConfig, ManagerStats,
    MappedFileSource, StartupError,
};
use kiln_snapshot::SnapshotError;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// ── Arguments ───────────────────────────────────────────────────

/// Build assets, reusing cached conversions of unchanged sources.
#[derive(Parser, Debug, Clone)]
#[command(name = "kiln", version, about)]
pub struct Cli {
    /// Source paths to build, relative to --root.
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Cache snapshot file, read at startup and rewritten when anything
    /// was converted.
    #[arg(long, default_value = ManagerConfig::DEFAULT_SNAPSHOT_PATH)]
    pub cache: PathBuf,

    /// Directory relative source paths are resolved against.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Maximum dependency nesting depth.
    #[arg(long, default_value_t = ManagerConfig::DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Capacity of the converted-asset arena in MiB.
    #[arg(long, default_value_t = ArenaConfig::DEFAULT_ASSET_BYTES >> 20)]
    pub asset_mib: usize,

    /// Log load decisions (-v) or everything (-vv). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Manager configuration for these arguments.
    ///
    /// The cache path is made absolute first so `--root` never applies
    /// to it.
    pub fn manager_config(&self) -> Result<ManagerConfig, CliError> {
        let cache = std::path::absolute(&self.cache).map_err(|source| CliError::CachePath {
            path: self.cache.clone(),
            source,
        })?;
        let asset_bytes = self.asset_mib.saturating_mul(1 << 20);
        Ok(ManagerConfig::new(cache)
            .with_max_depth(self.max_depth)
            .with_arena(ArenaConfig::default().with_asset_bytes(asset_bytes)))
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "info,kiln_engine=debug,kiln_converters=debug",
            _ => "trace",
        }
    }
}

/// Install the global `tracing` subscriber.
pub fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

// ── CliError ────────────────────────────────────────────────────

/// Errors that stop a build before it produces a report.
#[derive(Debug)]
pub enum CliError {
    /// The cache path could not be made absolute.
    CachePath {
        /// The path as given.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The manager could not start.
    Startup(StartupError),
    /// The cache could not be written back.
    Flush(SnapshotError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CachePath { path, source } => {
                write!(f, "invalid cache path '{}': {source}", path.display())
            }
            Self::Startup(e) => write!(f, "{e}"),
            Self::Flush(e) => write!(f, "failed to write cache: {e}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CachePath { source, .. } => Some(source),
            Self::Startup(e) => Some(e),
            Self::Flush(e) => Some(e),
        }
    }
}

impl From<StartupError> for CliError {
    fn from(e: StartupError) -> Self {
        Self::Startup(e)
    }
}

impl From<SnapshotError> for CliError {
    fn from(e: SnapshotError) -> Self {
        Self::Flush(e)
    }
}

// ── Build ───────────────────────────────────────────────────────

/// Result of one build.
#[derive(Debug)]
pub struct Summary {
    /// Per-path results.
    pub report: LoadReport,
    /// What the cache flush did; `None` when a fatal error skipped it.
    pub flush: Option<FlushOutcome>,
    /// Manager counters at the end of the build.
    pub stats: ManagerStats,
}

impl Summary {
    /// Whether every requested path resolved and nothing fatal happened.
    pub fn success(&self) -> bool {
        !self.report.has_fatal() && self.report.failed() == 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.report;
        writeln!(f, "loaded:     {}", r.loaded())?;
        writeln!(f, "cache hits: {}", r.cache_hits())?;
        writeln!(f, "converted:  {}", r.converted())?;
        write!(f, "failed:     {}", r.failed())
    }
}

/// Build every path in `cli`, then flush the cache unless a fatal error
/// ended the session.
pub fn run(cli: &Cli) -> Result<Summary, CliError> {
    let config = cli.manager_config()?;
    let source = match &cli.root {
        Some(root) => MappedFileSource::with_root(root),
        None => MappedFileSource::new(),
    };
    let mut manager = AssetManager::new(config, source, default_registry())?;

    let report = manager.load_all(&cli.paths);
    for (path, err) in report.failures() {
        error!(path, error = %err, "build failed");
    }

    let flush = if report.has_fatal() {
        None
    } else {
        Some(manager.flush_cache()?)
    };
    let stats = manager.stats();
    info!(
        conversions = stats.conversions,
        cache_hits = stats.cache_hits,
        asset_bytes = stats.asset_bytes_used,
        "build finished"
    );
    Ok(Summary {
        report,
        flush,
        stats,
    })
}
