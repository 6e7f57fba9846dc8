mod client;
mod basic;

pub use client::HttpClient;
pub use basic::BasicClient;

use anyhow::{Context, Result};
use bytes::Bytes;
use tracing::debug;

pub async fn fetch_bytes<C: HttpClient>(
    client: &C,
    url: &str,
) -> Result<Bytes> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse()?,
    );

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?)
}

/// Loads input bytes from a local file path or, for `http(s)://` sources, over HTTP.
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Bytes> {
    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        fetch_bytes(client, source)
            .await
            .with_context(|| format!("failed to fetch {source}"))?
    } else {
        Bytes::from(
            tokio::fs::read(source)
                .await
                .with_context(|| format!("failed to read {source}"))?,
        )
    };
    debug!(source, bytes = bytes.len(), "Source loaded");
    Ok(bytes)
}
