//! Shared HTTP helpers for page fetches and API clients.

use std::time::Duration;

use reqwest::Client;

use crate::config::HttpConfig;
use crate::error::{Result, RecsError};

pub fn build_client(config: &HttpConfig) -> Result<Client> {
    let mut builder = Client::builder().user_agent(config.user_agent.clone());
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// Returns the response unchanged on success, or [`RecsError::Api`] with
/// the status and body otherwise.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response> {
    if !resp.status().is_success() {
        return Err(RecsError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// GET a page and return its body.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let resp = client.get(url).send().await?;
    let resp = check_response(resp).await?;
    Ok(resp.text().await?)
}
