use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use textmap::{OverlapDetector, ResolutionPolicy};

/// Extract text regions from a PDF and draw them as bounding boxes.
///
/// Writes `{stem}_annotated.pdf` next to the input unless `--output` is given.
#[derive(Debug, Parser)]
#[command(name = "pdf-textmap", about, version)]
pub struct Cli {
    /// Path to the input PDF file
    #[arg(value_name = "PDF")]
    pub pdf_path: PathBuf,

    /// Page range to process, 1-indexed (e.g. '1,3,5', '1-5', '1,3-5,10'). Default: all pages
    #[arg(long, value_name = "RANGE")]
    pub pages: Option<String>,

    /// Remove redundant overlapping text blocks before annotating
    #[arg(long)]
    pub filter_overlapping: bool,

    /// Which block of an overlapping pair survives (with --filter-overlapping)
    #[arg(long, value_enum, default_value_t = StrategyArg::KeepLargest)]
    pub overlap_strategy: StrategyArg,

    /// Coverage ratio (intersection / smaller area) at which two blocks overlap
    #[arg(long, value_name = "RATIO", default_value_t = OverlapDetector::DEFAULT_THRESHOLD)]
    pub overlap_threshold: f64,

    /// Password for an encrypted PDF
    #[arg(long, value_name = "PASSWORD")]
    pub encryption_password: Option<String>,

    /// Save extracted blocks as JSON. Without FILENAME uses {pdfname}_textmap.json
    #[arg(long, value_name = "FILENAME", num_args = 0..=1)]
    pub save_json: Option<Option<String>>,

    /// Where to write the annotated PDF. Default: {pdfname}_annotated.pdf next to the input
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Logging verbosity (RUST_LOG overrides it)
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

/// Overlap resolution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Keep the larger block of each overlapping pair
    #[value(name = "keep_largest")]
    KeepLargest,
    /// Keep the block that was extracted first
    #[value(name = "keep_first")]
    KeepFirst,
}

impl From<StrategyArg> for ResolutionPolicy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::KeepLargest => ResolutionPolicy::KeepLargest,
            StrategyArg::KeepFirst => ResolutionPolicy::KeepFirst,
        }
    }
}

/// Logging level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}
