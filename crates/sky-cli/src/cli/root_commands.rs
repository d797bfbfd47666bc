use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Log in, print the session's identity and token expirations, then log out.
    Login,
    /// Keep a session alive, refreshing tokens as they near expiry, until Ctrl-C.
    Watch(WatchArgs),
    /// Search posts with an authenticated session.
    Search(SearchArgs),
    /// Show the effective configuration (passwords redacted).
    StatusConfig,
}

#[derive(Clone, Debug, Args)]
pub struct WatchArgs {
    /// Seconds between status reports.
    #[arg(long, default_value_t = 60)]
    pub report_every: u64,
}

#[derive(Clone, Debug, Args)]
pub struct SearchArgs {
    /// Search query.
    pub query: String,

    /// Ranking order: top or latest.
    #[arg(long)]
    pub sort: Option<String>,

    /// Only posts by this handle or DID.
    #[arg(long)]
    pub author: Option<String>,

    /// Only posts mentioning this handle or DID.
    #[arg(long)]
    pub mentions: Option<String>,

    /// Only posts in this language (ISO 639 code).
    #[arg(long)]
    pub lang: Option<String>,

    /// Only posts at or after this timestamp or date.
    #[arg(long)]
    pub since: Option<String>,

    /// Only posts before this timestamp or date.
    #[arg(long)]
    pub until: Option<String>,

    /// Only posts with this hashtag (repeatable, without the `#`).
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Pagination cursor from a previous search.
    #[arg(long)]
    pub cursor: Option<String>,
}
