use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};

/// Base URL of the Unsplash API.
const API_BASE_URL: &str = "https://api.unsplash.com";

/// Version pinned through the `Accept-Version` header.
const ACCEPT_VERSION: &str = "v1";

/// A thin wrapper around the blocking HTTP client that owns the credential
/// and the base URL, so every call site builds requests the same way.
#[derive(Debug, Clone)]
pub(crate) struct RequestSender {
    client: Client,
    base_url: String,
    access_key: String,
}

impl RequestSender {
    /// Creates a sender carrying the given access key on metadata calls.
    pub(crate) fn new(access_key: impl Into<String>) -> Self {
        RequestSender {
            client: Client::new(),
            base_url: API_BASE_URL.to_string(),
            access_key: access_key.into(),
        }
    }

    /// Sender for binary downloads, which carry no authorization.
    pub(crate) fn anonymous() -> Self {
        Self::new("")
    }

    /// Points all metadata calls at a different host. Used by tests to target
    /// a local server.
    pub(crate) fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Requests one page of random photo metadata.
    pub(crate) fn get_photos_page(&self, count: usize) -> Result<Response> {
        let url = format!("{}/photos/random/?count={}", self.base_url, count);
        self.client
            .get(&url)
            .header("Accept-Version", ACCEPT_VERSION)
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .send()
            .with_context(|| format!("Metadata request to {url} failed"))
    }

    /// Issues a plain streaming GET for an image binary.
    pub(crate) fn get_bytes(&self, url: &str) -> Result<Response> {
        self.client
            .get(url)
            .send()
            .with_context(|| format!("Image request to {url} failed"))
    }
}
