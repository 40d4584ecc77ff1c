//! CLI parse: clap types for twig. No behavior; definitions only.

use crate::store::StorageBackend;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// twig - content-addressed version control on a Merkle staging tree
#[derive(Parser)]
#[command(name = "twig", version)]
#[command(about = "Content-addressed version control on a Merkle staging tree")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Repository directory (any directory inside the working tree)
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty repository
    Init {
        /// Object store backend (fs or sled)
        #[arg(long)]
        backend: Option<StorageBackend>,
    },
    /// Stage files; directories are staged recursively
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Remove paths from the staging area; working files are kept
    Rm {
        /// Accepted for familiarity; removal always leaves the working copy alone
        #[arg(long)]
        cached: bool,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Record the staging area as a new commit
    Commit {
        /// Stage modified and deleted tracked files first
        #[arg(short = 'a', long = "all")]
        all: bool,
        /// Commit message
        #[arg(short = 'm', long = "message", default_value = "No Comment")]
        message: String,
    },
    /// Show commit history, newest first
    Log {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Show at most this many commits
        #[arg(short = 'n', long)]
        max_count: Option<usize>,
    },
    /// Show staged, unstaged and untracked changes
    Status,
}
