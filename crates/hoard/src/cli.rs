use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Download files listed in YAML manifests and verify their SHA-256 digests.
#[derive(Debug, Parser)]
#[command(name = "hoard", version)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
#[command(after_help = "EXAMPLES:
    # Download everything in a manifest
    hoard downloads.yaml

    # Layer a local override on top of a shared manifest
    hoard base.yaml local.yaml --parallel 16

    # Write a manifest for the files already in a directory
    hoard generate ./dist > dist.yaml
")]
pub struct Cli {
    #[command(flatten)]
    pub download: DownloadArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Manifest files, merged in order
    #[arg(value_name = "CONFIG", required = true)]
    pub configs: Vec<PathBuf>,

    /// Number of downloads to run at once
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Attempts per file before giving up
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Do not draw progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a manifest for every file under a directory
    Generate {
        /// Directory to scan
        dir: PathBuf,
    },
}
