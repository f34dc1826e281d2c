//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use illustfetch_core::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_REFERER, DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS,
};

/// Batch download illustration collections by author or bookmark.
///
/// Fetches every work of the requested authors or bookmark collections into
/// per-collection directories, skipping works already on disk.
#[derive(Parser, Debug)]
#[command(name = "illustfetch")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Catalog file listing authors and bookmark collections
    #[arg(short, long)]
    pub catalog: PathBuf,

    /// Base directory to download into
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Concurrent download workers (1-64)
    #[arg(short, long, default_value_t = DEFAULT_WORKERS as u8, value_parser = clap::value_parser!(u8).range(1..=64))]
    pub workers: u8,

    /// Fetch attempts per work before it is dropped (1-50)
    #[arg(short, long, default_value_t = DEFAULT_MAX_ATTEMPTS as u8, value_parser = clap::value_parser!(u8).range(1..=50))]
    pub max_attempts: u8,

    /// Per-attempt timeout in seconds (1-600)
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=600))]
    pub timeout: u64,

    /// Proxy URL for all requests (e.g. http://127.0.0.1:8080)
    #[arg(short, long)]
    pub proxy: Option<String>,

    /// Referer header sent with artifact requests
    #[arg(long, default_value = DEFAULT_REFERER)]
    pub referer: String,

    /// Keep an author's existing directory name when their display name changed
    #[arg(long)]
    pub no_auto_rename: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// What to download.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download every work of the given author ids
    Authors {
        /// Author ids to download, in order
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Download a bookmark collection
    Bookmarks {
        /// Download the private collection instead of the public one
        #[arg(long)]
        private: bool,
    },
}
