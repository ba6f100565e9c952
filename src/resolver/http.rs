use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use tracing::debug;

use crate::{
    api::tracks::{StreamRef, Track},
    common::{errors::ResolveError, types::AnyResult},
    resolver::plugin::TrackResolver,
};

/// Resolver for direct audio stream URLs.
///
/// Supports both http:// and https:// protocols. The URL is probed with a
/// HEAD request; anything that does not look like an audio stream is
/// rejected as an unsupported format rather than not-found.
pub struct HttpResolver {
    url_regex: Regex,
    client: reqwest::Client,
}

impl HttpResolver {
    pub fn new() -> AnyResult<Self> {
        Ok(Self {
            // Matches http:// or https:// URLs
            url_regex: Regex::new(r"^https?://")?,
            client: reqwest::Client::builder()
                .user_agent(concat!("queuelink/", env!("CARGO_PKG_VERSION")))
                .build()?,
        })
    }

    fn is_playable_content_type(content_type: &str) -> bool {
        content_type.starts_with("audio/")
            || content_type.starts_with("video/")
            || content_type == "application/octet-stream"
            || content_type.is_empty()
    }

    fn title_from(url: &str, headers: &HeaderMap) -> String {
        headers
            .get("icy-name")
            .and_then(|h| h.to_str().ok())
            .or_else(|| {
                headers
                    .get("content-disposition")
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.split("filename=\"").nth(1))
                    .and_then(|s| s.split('"').next())
            })
            .unwrap_or_else(|| {
                url.split('/')
                    .next_back()
                    .and_then(|s| s.split('?').next())
                    .filter(|s| !s.is_empty())
                    .unwrap_or("Audio Stream")
            })
            .to_string()
    }
}

#[async_trait]
impl TrackResolver for HttpResolver {
    fn name(&self) -> &str {
        "http"
    }

    fn can_handle(&self, identifier: &str) -> bool {
        self.url_regex.is_match(identifier)
    }

    async fn resolve(&self, identifier: &str) -> Result<Track, ResolveError> {
        debug!("Probing HTTP source: {}", identifier);

        let resp = self
            .client
            .head(identifier)
            .send()
            .await
            .map_err(|e| ResolveError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ResolveError::NotFound(identifier.to_string()));
        }
        if !resp.status().is_success() {
            return Err(ResolveError::Network(format!("HTTP {}", resp.status())));
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !Self::is_playable_content_type(content_type) {
            return Err(ResolveError::UnsupportedFormat(identifier.to_string()));
        }

        let title = Self::title_from(identifier, resp.headers());
        Ok(Track::new(title, StreamRef::new(identifier)))
    }
}
