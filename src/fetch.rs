use anyhow::{Context, Result};
use reqwest::Client;

// The upstream site serves a captcha page to unknown clients; identify as a
// plain desktop browser.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/48.0.2564.109 Safari/537.36";

pub fn client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// Fetch one page body. HTTP error statuses become errors, so a failing
/// upstream halts the crawl instead of feeding garbage to the parsers.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let body = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Request failed: {}", url))?
        .error_for_status()
        .with_context(|| format!("HTTP error fetching {}", url))?
        .text()
        .await
        .with_context(|| format!("Failed to read body: {}", url))?;
    Ok(body)
}
