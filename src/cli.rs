use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::{DuplicatePolicy, ParseMode};
use crate::pipeline::parser::AutoSelectConfig;
use crate::pipeline::reconstruct::ReconstructConfig;

#[derive(Parser, Debug)]
#[command(
    name = "vocab-import",
    version,
    about = "Turn pasted or OCR-scanned vocabulary lists into a vocabulary store"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Reconstruct(ReconstructArgs),
    Parse(ParseArgs),
    Review(ReviewArgs),
    Import(ImportArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Plain text file with one vocabulary item per line.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// JSON array of OCR fragments with normalized bounding boxes.
    #[arg(long)]
    pub fragments: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct GeometryArgs {
    #[arg(long, default_value_t = 0.012)]
    pub min_line_threshold: f64,

    #[arg(long, default_value_t = 0.6)]
    pub line_height_factor: f64,

    #[arg(long, default_value_t = 6)]
    pub min_column_lines: usize,

    #[arg(long, default_value_t = 0.15)]
    pub column_gap_threshold: f64,
}

impl GeometryArgs {
    pub fn config(&self) -> ReconstructConfig {
        ReconstructConfig {
            min_line_threshold: self.min_line_threshold,
            line_height_factor: self.line_height_factor,
            min_column_lines: self.min_column_lines,
            column_gap_threshold: self.column_gap_threshold,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct AutoSelectArgs {
    #[arg(long, default_value_t = 6)]
    pub auto_sample_lines: usize,

    #[arg(long, default_value_t = 4)]
    pub auto_min_lines: usize,

    #[arg(long, default_value_t = 2)]
    pub auto_min_pairs: usize,
}

impl AutoSelectArgs {
    pub fn config(&self) -> AutoSelectConfig {
        AutoSelectConfig {
            sample_lines: self.auto_sample_lines,
            min_lines: self.auto_min_lines,
            min_matching_pairs: self.auto_min_pairs,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ReconstructArgs {
    #[arg(long)]
    pub fragments: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub geometry: GeometryArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long, value_enum, default_value_t = ParseMode::Auto)]
    pub mode: ParseMode,

    #[arg(long)]
    pub session_out: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[command(flatten)]
    pub geometry: GeometryArgs,

    #[command(flatten)]
    pub auto_select: AutoSelectArgs,
}

#[derive(Args, Debug, Clone)]
#[group(id = "review_action", required = true, multiple = false)]
pub struct ReviewAction {
    #[arg(long, default_value_t = false)]
    pub reparse: bool,

    #[arg(long, value_name = "ROW_ID", requires_all = ["term", "meaning"])]
    pub edit: Option<String>,

    #[arg(long, value_name = "ROW_ID")]
    pub confirm: Option<String>,

    #[arg(long, value_name = "ROW_ID")]
    pub delete: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ReviewArgs {
    #[arg(long)]
    pub session: PathBuf,

    #[command(flatten)]
    pub action: ReviewAction,

    /// New parse mode applied before `--reparse`. The auto-selection
    /// thresholds stored in the session are reused.
    #[arg(long, value_enum, requires = "reparse")]
    pub mode: Option<ParseMode>,

    #[arg(long)]
    pub term: Option<String>,

    #[arg(long)]
    pub meaning: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    #[arg(long, default_value = ".cache/vocab-import")]
    pub store_root: PathBuf,

    /// Reviewed session file; its rows are merged as edited.
    #[arg(long, conflicts_with_all = ["input", "fragments"])]
    pub session: Option<PathBuf>,

    #[arg(long)]
    pub input: Option<PathBuf>,

    #[arg(long, conflicts_with = "input")]
    pub fragments: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ParseMode::Auto)]
    pub mode: ParseMode,

    #[arg(long, value_enum, default_value_t = DuplicatePolicy::Skip)]
    pub policy: DuplicatePolicy,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    /// Merge into a staged copy and write only the report; the store and
    /// any legacy database are left as they are.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    #[command(flatten)]
    pub geometry: GeometryArgs,

    #[command(flatten)]
    pub auto_select: AutoSelectArgs,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/vocab-import")]
    pub store_root: PathBuf,
}
