//! Command-line definitions

use crate::settings::{InputOrder, JobSettings};
use clap::{Args, Parser, Subcommand, ValueEnum};
use doc_merge::SeedPolicy;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "book-of-status")]
#[command(about = "Concatenate ODT status reports into one document", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Merge ODT documents into one composite document
    Merge(MergeArgs),
}

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Documents to merge, in order
    pub files: Vec<PathBuf>,

    /// Also merge every .odt file in this directory
    #[arg(short, long)]
    pub input_dir: Option<PathBuf>,

    /// Order of documents found with --input-dir
    #[arg(long, value_enum)]
    pub order: Option<InputOrder>,

    /// Where to write the merged document
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// What the merged document starts from
    #[arg(long, value_enum)]
    pub seed: Option<SeedArg>,

    /// Do not start each document on a new page
    #[arg(long)]
    pub no_page_breaks: bool,

    /// Revision for the revision token; defaults to the current git commit
    #[arg(long)]
    pub revision: Option<String>,

    /// JSON settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl MergeArgs {
    /// Layer the flags that were given over `settings`
    pub fn apply(&self, mut settings: JobSettings) -> JobSettings {
        if let Some(order) = self.order {
            settings.order = order;
        }
        if let Some(output) = &self.output {
            settings.output = output.clone();
        }
        if let Some(seed) = self.seed {
            settings.seed_policy = seed.into();
        }
        if self.no_page_breaks {
            settings.page_breaks = false;
        }
        settings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeedArg {
    /// Start from the first document; its styles keep their names
    First,
    /// Start from a blank document; every document's styles are renamed
    Empty,
}

impl From<SeedArg> for SeedPolicy {
    fn from(seed: SeedArg) -> Self {
        match seed {
            SeedArg::First => SeedPolicy::FirstDocument,
            SeedArg::Empty => SeedPolicy::EmptyDocument,
        }
    }
}
