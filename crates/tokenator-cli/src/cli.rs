use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tokenator_core::ReportFormat;

#[derive(Parser)]
#[command(name = "tokenator")]
#[command(about = "Check whether documents fit a 1M token context window", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count tokens for a set of documents
    Count {
        #[command(flatten)]
        input: InputArgs,

        /// Print the batch as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a usage report for a set of documents
    Report {
        #[command(flatten)]
        input: InputArgs,

        /// Report format (default from config: markdown)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Output file (default from config, else stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show config file location and effective settings
    Config,
}

#[derive(Args)]
pub struct InputArgs {
    /// Files, directories or glob patterns (txt, md, pdf, docx)
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// API key for exact counts; token counts are estimated without one
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Markdown,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Markdown => ReportFormat::Markdown,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}
