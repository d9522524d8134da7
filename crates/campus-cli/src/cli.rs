use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// campus: command-line client for the campus realtime feed.
#[derive(Parser, Debug)]
#[command(name = "campus", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// User id to act as.
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Explicit bearer token. Defaults to the user id.
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Hydrate the identity from `GET /api/users/{userId}` before connecting.
    #[arg(long, global = true)]
    pub fetch_profile: bool,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stream feed updates, notifications, and connection state until Ctrl-C.
    Watch,

    /// Publish a post.
    Post {
        /// Department the post belongs to.
        #[arg(short, long)]
        department: String,

        /// Optional image URL.
        #[arg(long)]
        image: Option<String>,

        content: String,
    },

    /// Like a post.
    Like { post_id: String },

    /// Comment on a post.
    Comment { post_id: String, content: String },

    /// List notifications over REST.
    Notifications {
        /// Mark every notification read afterwards.
        #[arg(long)]
        mark_all_read: bool,
    },
}

pub fn parse() -> Args {
    Args::parse()
}
