use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mwmbl", about = "Community search index crawl worker")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Enable debug-level logging
    #[arg(short, long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Request batches from the coordinator and crawl them
    Crawl {
        /// Number of URLs to crawl concurrently per batch
        #[arg(short = 'j', long)]
        num_threads: Option<usize>,
    },
    /// Harvest items from the Hacker News board API
    Hn,
}
