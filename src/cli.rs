use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub const DEFAULT_OUTPUT_PATH: &str = "applicant_data.csv";

#[derive(Parser, Debug)]
#[command(
    name = "applicant-extract",
    version,
    about = "Extract applicant details from a folder of PDF submissions into a CSV report",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Log per-file field misses and other debug detail.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub extract: ExtractArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract applicant records and write the CSV report (default).
    Extract(ExtractArgs),
    /// List the PDFs of a directory with their digests, without extracting.
    Inventory(InventoryArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Folder containing the PDF files. Prompted for when omitted.
    pub directory: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = TextBackend::PdfExtract)]
    pub backend: TextBackend,

    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    pub directory: PathBuf,

    #[arg(long, default_value = "applicant_inventory.json")]
    pub manifest_path: PathBuf,

    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum TextBackend {
    PdfExtract,
    Pdftotext,
}

impl TextBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PdfExtract => "pdf-extract",
            Self::Pdftotext => "pdftotext",
        }
    }
}
