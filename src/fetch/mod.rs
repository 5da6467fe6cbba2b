// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

/// Where the comparison records are served by default.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/get_comparison_data";

async fn get_text_core(client: &Client, url: &Url) -> Result<String> {
    debug!("Fetching text from {}", url);
    client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .text()
        .await
        .with_context(|| format!("Reading text from {}", url))
}

/// Issue a single GET to `url` and parse the body as JSON.
///
/// An empty (or all-whitespace) body is `Ok(None)`; transport errors, error
/// statuses and malformed JSON are errors. No retries.
pub async fn fetch_json(client: &Client, url: &Url) -> Result<Option<Value>> {
    let body = get_text_core(client, url).await?;
    if body.trim().is_empty() {
        debug!(%url, "empty response body");
        return Ok(None);
    }
    trace!(%url, bytes = body.len(), "parsing JSON");
    let value = serde_json::from_str(&body)
        .with_context(|| format!("Parsing JSON from {}", url))?;
    Ok(Some(value))
}
