// crates/primary-user-graph/src/client.rs
// ============================================================================
// Module: Graph HTTP Client
// Description: Bounded, authenticated JSON requests against the REST API.
// Purpose: Centralize transport policy for every remote collaborator.
// Dependencies: primary-user-core, reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! [`GraphClient`] owns one blocking HTTP client configured with a timeout, a
//! user agent, and redirects disabled. Every request carries the bearer
//! token; every response body is read under a byte limit. Collection
//! responses are followed through `@odata.nextLink` up to a page cap, and
//! next links must stay on the configured origin.
//!
//! Failures map onto [`RemoteError`]: transport problems become
//! `Transport`, non-success statuses become `Rejected` with the service's
//! error message, and undecodable bodies become `InvalidResponse`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use primary_user_core::RemoteError;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::model::ErrorEnvelope;
use crate::model::Page;
use crate::odata::set_query;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the Graph client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphClientConfig {
    /// API base URL, including any version segment.
    pub base_url: String,
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// Maximum pages followed per collection.
    pub max_pages: u32,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for GraphClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://graph.microsoft.com/beta".to_string(),
            allow_http: false,
            timeout_ms: 5_000,
            max_response_bytes: 8 * 1024 * 1024,
            max_pages: 500,
            user_agent: "primary-user-sync/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Client construction errors.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The base URL is malformed or uses a disallowed scheme.
    #[error("invalid graph base url: {0}")]
    BaseUrl(String),
    /// The bearer token is missing or blank.
    #[error("graph bearer token is empty")]
    EmptyToken,
    /// The HTTP client could not be built.
    #[error("graph http client build failed: {0}")]
    Client(String),
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Authenticated client for the directory and device-management API.
pub struct GraphClient {
    /// Client configuration, including limits and policy.
    config: GraphClientConfig,
    /// Parsed base URL.
    base: Url,
    /// Bearer token sent with every request.
    token: String,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl GraphClient {
    /// Creates a client for the configured API.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] when the base URL or token is unusable or the
    /// HTTP client cannot be created.
    pub fn new(config: GraphClientConfig, token: impl Into<String>) -> Result<Self, GraphError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(GraphError::EmptyToken);
        }
        let base = Url::parse(config.base_url.trim())
            .map_err(|err| GraphError::BaseUrl(err.to_string()))?;
        match base.scheme() {
            "https" => {}
            "http" if config.allow_http => {}
            other => return Err(GraphError::BaseUrl(format!("unsupported scheme {other}"))),
        }
        if base.cannot_be_a_base() || base.host_str().is_none() {
            return Err(GraphError::BaseUrl("base url must include a host".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| GraphError::Client(err.to_string()))?;
        Ok(Self {
            config,
            base,
            token: token.trim().to_string(),
            client,
        })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &GraphClientConfig {
        &self.config
    }

    /// Returns the absolute URL for a resource path below the base URL.
    ///
    /// Each segment is percent-encoded independently.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::InvalidResponse("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Returns an endpoint URL with query parameters.
    pub(crate) fn endpoint_with_query(
        &self,
        segments: &[&str],
        params: &[(&str, &str)],
    ) -> Result<Url, RemoteError> {
        let mut url = self.endpoint(segments)?;
        set_query(&mut url, params);
        Ok(url)
    }

    /// Fetches and decodes a JSON resource.
    pub(crate) fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RemoteError> {
        let response = self.send(self.client.get(url))?;
        let body = self.read_success(response)?;
        decode(&body)
    }

    /// Fetches a JSON resource, mapping `404 Not Found` to `None`.
    pub(crate) fn get_optional<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, RemoteError> {
        let response = self.send(self.client.get(url))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = self.read_success(response)?;
        decode(&body).map(Some)
    }

    /// Fetches every item of a paged collection.
    ///
    /// Fails when more than `max_pages` pages would be needed, or when a next
    /// link leaves the configured origin.
    pub(crate) fn get_collection<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, RemoteError> {
        let mut items = Vec::new();
        let mut next = Some(url);
        let mut pages: u32 = 0;
        while let Some(url) = next.take() {
            if pages >= self.config.max_pages {
                return Err(RemoteError::InvalidResponse(format!(
                    "collection exceeds page limit of {}",
                    self.config.max_pages
                )));
            }
            pages += 1;
            let page: Page<T> = self.get_json(url)?;
            items.extend(page.value);
            if let Some(link) = page.next_link {
                next = Some(self.validate_next_link(&link)?);
            }
        }
        Ok(items)
    }

    /// Posts a JSON body and expects an empty success response.
    pub(crate) fn post_json(&self, url: Url, body: &Value) -> Result<(), RemoteError> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| RemoteError::InvalidResponse(format!("request encoding failed: {err}")))?;
        let request = self.client.post(url).header(CONTENT_TYPE, "application/json").body(payload);
        let response = self.send(request)?;
        self.read_success(response)?;
        Ok(())
    }

    /// Returns the base URL as text, without a trailing slash.
    pub(crate) fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Sends an authenticated request.
    fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        request
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|err| RemoteError::Transport(err.without_url().to_string()))
    }

    /// Reads a response body, converting non-success statuses to errors.
    fn read_success(&self, mut response: Response) -> Result<Vec<u8>, RemoteError> {
        let status = response.status();
        let body = read_response_limited(&mut response, self.config.max_response_bytes)?;
        if status.is_success() {
            return Ok(body);
        }
        Err(RemoteError::Rejected {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    /// Checks that a next link shares the base URL's origin.
    fn validate_next_link(&self, link: &str) -> Result<Url, RemoteError> {
        let url = Url::parse(link)
            .map_err(|err| RemoteError::InvalidResponse(format!("invalid next link: {err}")))?;
        if url.origin() != self.base.origin() {
            return Err(RemoteError::InvalidResponse(
                "next link points outside the api origin".to_string(),
            ));
        }
        Ok(url)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes a JSON body.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, RemoteError> {
    serde_json::from_slice(body)
        .map_err(|err| RemoteError::InvalidResponse(format!("json decode failed: {err}")))
}

/// Extracts the service error message from a failure body.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body) {
        match (envelope.error.code, envelope.error.message) {
            (Some(code), Some(message)) => return format!("{code}: {message}"),
            (None, Some(message)) => return message,
            (Some(code), None) => return code,
            (None, None) => {}
        }
    }
    status.canonical_reason().unwrap_or("request failed").to_string()
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(response: &mut Response, max_bytes: usize) -> Result<Vec<u8>, RemoteError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| RemoteError::InvalidResponse("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(RemoteError::InvalidResponse("response exceeds size limit".to_string()));
    }
    let mut buf = Vec::new();
    let limit = max_bytes_u64.saturating_add(1);
    let mut handle = response.take(limit);
    handle
        .read_to_end(&mut buf)
        .map_err(|err| RemoteError::Transport(format!("failed to read response: {err}")))?;
    if buf.len() > max_bytes {
        return Err(RemoteError::InvalidResponse("response exceeds size limit".to_string()));
    }
    if let Some(expected) = expected_len {
        let expected = usize::try_from(expected)
            .map_err(|_| RemoteError::InvalidResponse("invalid response length".to_string()))?;
        if buf.len() < expected {
            return Err(RemoteError::Transport("response truncated".to_string()));
        }
    }
    Ok(buf)
}
