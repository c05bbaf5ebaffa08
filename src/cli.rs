use clap::{Parser, Subcommand};

use crate::search::ExportFormat;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum HistoryArgs {
    /// Print recent queries, newest first
    List {},
    /// Forget a single query
    Remove {
        /// Query exactly as stored
        query: String,
    },
    /// Forget every query
    Clear {},
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search bookmarks (tag:, site:, 排除: and "phrases" are supported)
    Search {
        /// Search query
        #[clap(allow_hyphen_values = true)]
        query: String,

        /// Let the AI take part when it is configured
        #[clap(long, default_value = "false")]
        ai: bool,

        /// Don't record the query in history
        #[clap(long, default_value = "false")]
        no_history: bool,

        /// Output format: json, csv or html
        #[clap(short, long, default_value = "json")]
        format: ExportFormat,
    },
    /// Rank bookmarks with the AI only
    Ai {
        #[clap(allow_hyphen_values = true)]
        query: String,

        /// Fail instead of falling back to local search
        #[clap(long, default_value = "false")]
        strict: bool,
    },
    /// Local search with a small limit, skipping zero-score matches
    Quick {
        #[clap(allow_hyphen_values = true)]
        query: String,
    },
    /// Local search with a raised limit for advanced queries
    Advanced {
        #[clap(allow_hyphen_values = true)]
        query: String,
    },
    /// Suggest completions for a partial query
    Suggest {
        input: String,

        /// Ask the AI for related queries instead
        #[clap(long, default_value = "false")]
        ai: bool,
    },
    /// Print a single bookmark
    Get {
        /// Bookmark id
        id: String,
    },
    /// Manage search history
    History {
        #[clap(subcommand)]
        action: HistoryArgs,
    },
    /// Add a bookmark to the local store
    Add {
        /// a url
        #[clap(short, long)]
        url: String,

        /// Bookmark title
        #[clap(short, long)]
        title: String,

        /// Bookmark description
        #[clap(short, long)]
        description: Option<String>,

        /// Comma separated tags
        #[clap(short = 'g', long)]
        tags: Option<String>,
    },
}
