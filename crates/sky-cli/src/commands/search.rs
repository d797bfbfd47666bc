use serde::Serialize;
use sky_auth::{SearchPostsOutput, SearchPostsRequest};
use sky_config::SkyConfig;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::SearchArgs;
use crate::output::output;

#[derive(Serialize)]
struct SearchResponse {
    query: String,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    hits_total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<String>,
    posts: Vec<serde_json::Value>,
}

impl SearchResponse {
    fn new(query: String, output: SearchPostsOutput) -> Self {
        Self {
            query,
            count: output.posts.len(),
            hits_total: output.hits_total,
            cursor: output.cursor,
            posts: output.posts,
        }
    }
}

fn build_request(args: &SearchArgs, limit: Option<u32>) -> SearchPostsRequest {
    let mut request = SearchPostsRequest::new(args.query.clone());
    request.sort.clone_from(&args.sort);
    request.author.clone_from(&args.author);
    request.mentions.clone_from(&args.mentions);
    request.lang.clone_from(&args.lang);
    request.since.clone_from(&args.since);
    request.until.clone_from(&args.until);
    request.tag.clone_from(&args.tags);
    request.cursor.clone_from(&args.cursor);
    request.limit = limit;
    request
}

/// Handle `sky search`.
pub async fn handle(
    args: &SearchArgs,
    config: &SkyConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let (transport, manager) = bootstrap::open_session(config).await?;

    let request = build_request(args, flags.limit);
    let result = transport.search_posts(&request).await;
    manager.close().await;

    let found = result?;
    output(&SearchResponse::new(args.query.clone(), found), flags.format)
}
