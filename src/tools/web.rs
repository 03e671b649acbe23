//! `search_web` and `fetch_url` backends.
//!
//! Both talk to an external service configured on the context. A missing
//! service is a configuration failure raised before any request is built.

use crate::context::ToolContext;
use crate::tools::gate::{BackendResult, ToolBackend};
use crate::tools::output::ToolSuccess;
use crate::tools::parse_args;
use crate::types::{Error, Result, WebServiceConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const DEFAULT_SEARCH_LIMIT: i64 = 5;
const MAX_SEARCH_LIMIT: i64 = 20;
const SEARCH_TIMEOUT_SECS: u64 = 30;

fn authorized(ctx: &ToolContext, service: &WebServiceConfig) -> reqwest::RequestBuilder {
    let mut request = ctx
        .http()
        .post(&service.base_url)
        .bearer_auth(&service.api_key);
    for (name, value) in &service.custom_headers {
        request = request.header(name.as_str(), value.as_str());
    }
    request
}

async fn check_status(response: reqwest::Response, service: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::network(format!(
        "{} service returned {}: {}",
        service,
        status,
        body.trim()
    )))
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    limit: Option<i64>,
    include_content: Option<bool>,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    text_query: &'a str,
    limit: i64,
    enable_page_crawling: bool,
    timeout_seconds: u64,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    search_results: Vec<SearchResult>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SearchResult {
    #[serde(default)]
    site_name: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    date: String,
}

fn render_results(results: &[SearchResult], include_content: bool) -> String {
    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            out.push_str("---\n\n");
        }
        out.push_str(&format!("Title: {}\n", result.title));
        if !result.date.is_empty() {
            out.push_str(&format!("Date: {}\n", result.date));
        }
        out.push_str(&format!("URL: {}\n", result.url));
        out.push_str(&format!("Summary: {}\n\n", result.snippet));
        if include_content && !result.content.is_empty() {
            out.push_str(&result.content);
            out.push_str("\n\n");
        }
    }
    out
}

/// `search_web` backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchWeb;

#[async_trait]
impl ToolBackend for SearchWeb {
    async fn execute(&self, ctx: &ToolContext, args: Value) -> BackendResult {
        let service = ctx
            .search_service()
            .ok_or_else(|| Error::config("search service is not configured"))?;
        let args: SearchArgs = parse_args(args)?;

        let limit = args.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        if !(1..=MAX_SEARCH_LIMIT).contains(&limit) {
            return Err(Error::validation(format!(
                "limit must be between 1 and {}",
                MAX_SEARCH_LIMIT
            ))
            .into());
        }
        let include_content = args.include_content.unwrap_or(false);

        let body = SearchRequest {
            text_query: &args.query,
            limit,
            enable_page_crawling: include_content,
            timeout_seconds: SEARCH_TIMEOUT_SECS,
        };
        tracing::debug!(query = %args.query, limit, "searching web");

        let response = authorized(ctx, service)
            .json(&body)
            .send()
            .await
            .map_err(Error::from)?;
        let response = check_status(response, "search").await?;
        let parsed: SearchResponse = response.json().await.map_err(Error::from)?;

        let results = parsed.search_results;
        let empty = results.is_empty();
        let mut success = ToolSuccess::new(render_results(&results, include_content))
            .with_data(json!({ "results": results }));
        if empty {
            success = success.with_message("No search results found.");
        }
        Ok(success)
    }
}

#[derive(Debug, Deserialize)]
struct FetchArgs {
    url: String,
}

/// `fetch_url` backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchUrl;

#[async_trait]
impl ToolBackend for FetchUrl {
    async fn execute(&self, ctx: &ToolContext, args: Value) -> BackendResult {
        let service = ctx
            .fetch_service()
            .ok_or_else(|| Error::config("fetch service is not configured"))?;
        let args: FetchArgs = parse_args(args)?;

        let url = reqwest::Url::parse(&args.url)
            .map_err(|e| Error::validation(format!("invalid url `{}`: {}", args.url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::validation(format!(
                "unsupported url scheme `{}`",
                url.scheme()
            ))
            .into());
        }
        tracing::debug!(url = %url, "fetching url");

        let response = authorized(ctx, service)
            .header(reqwest::header::ACCEPT, "text/markdown")
            .json(&json!({ "url": url.as_str() }))
            .send()
            .await
            .map_err(Error::from)?;
        let response = check_status(response, "fetch").await?;
        let text = response.text().await.map_err(Error::from)?;

        if text.trim().is_empty() {
            return Ok(ToolSuccess::new("").with_message("The response body is empty."));
        }
        Ok(ToolSuccess::new(text)
            .with_message("The returned content is the main text content extracted from the page."))
    }
}
