// src/core/net.rs
// Blocking HTTP GET. One request per call: no retry, no timeout override,
// redirects per reqwest defaults.

use reqwest::blocking::Client;

use crate::error::{ConfigError, FetchError};

/// A fetched page. The status is kept so callers decide what counts as success.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

impl Page {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Anything that can turn a URL into a page body.
pub trait PageSource: Send + Sync {
    fn get(&self, url: &str) -> Result<Page, FetchError>;
}

pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(user_agent: &str) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Use a preconfigured client (proxy settings, TLS roots, ...).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl PageSource for HttpSource {
    fn get(&self, url: &str) -> Result<Page, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(|e| FetchError::Body(e.to_string()))?;
        logd!("GET {url} -> {status} ({} bytes)", body.len());
        Ok(Page { status, body })
    }
}
