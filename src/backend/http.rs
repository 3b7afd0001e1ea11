//! HTTP implementation of the backend contracts.
//!
//! # Security Note - Logging
//!
//! The API token is attached through `RedactedHeader`, which never prints the
//! token, and the resulting header value is flagged as sensitive so reqwest
//! leaves it out of its own debug output.

use std::fmt;
use std::time::Duration;

use reqwest::header::{self, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Config;
use crate::error::{NewsdeskError, Result};
use crate::types::{EntityKind, ResolvedEntity};

use super::error::ApiError;
use super::{EntityLookup, ListingBackend, Mutation, MutationBackend, Page, PageQuery};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Authorization header value that redacts itself when formatted
struct RedactedHeader {
    value: String,
}

impl RedactedHeader {
    fn bearer(token: &str) -> Self {
        Self {
            value: format!("Bearer {token}"),
        }
    }

    fn as_header_value(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&self.value).map_err(|_| {
            NewsdeskError::Config("API token contains characters not allowed in a header".to_string())
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Display for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Debug for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactedHeader")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
struct BatchLookupBody<'a> {
    ids: &'a [String],
}

#[derive(Serialize)]
struct StatusBody<'a> {
    status: &'a str,
}

/// Client for the content API
#[derive(Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl HttpBackend {
    /// Create a backend rooted at `base_url`.
    ///
    /// Configures the HTTP client with a 30s connect timeout and 60s total timeout.
    pub fn new(base_url: &str, token: Option<SecretString>) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(NewsdeskError::Config(format!(
                "API base URL '{base_url}' cannot have paths appended"
            )));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config.api_base_url().ok_or_else(|| {
            NewsdeskError::Config(
                "no API base URL configured; set api.base_url or NEWSDESK_API_URL".to_string(),
            )
        })?;
        Self::new(&base_url, config.api_token())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended (each one percent-encoded)
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NewsdeskError::Config("API base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let mut builder = self
            .client
            .request(method, url)
            .header(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            let auth = RedactedHeader::bearer(token.expose_secret());
            builder = builder.header(header::AUTHORIZATION, auth.as_header_value()?);
        }
        Ok(builder)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        let mut error = ApiError::with_status(message, status);
        if let Some(seconds) = retry_after {
            error = error.with_retry_after(seconds);
        }
        Err(error.into())
    }
}

/// Best-effort message from an error response body
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
                return Some(msg.to_string());
            }
        }
    }
    Some(body.chars().take(MAX_ERROR_BODY_CHARS).collect())
}

impl ListingBackend for HttpBackend {
    fn fetch_page<I>(
        &self,
        endpoint: &str,
        query: &PageQuery,
    ) -> impl std::future::Future<Output = Result<Page<I>>> + Send
    where
        I: DeserializeOwned + Send,
    {
        async move {
            let url = self.url(&[endpoint])?;
            let builder = self.request(Method::GET, url)?.query(&query.to_pairs());
            let response = self.send(builder).await?;
            Ok(response.json::<Page<I>>().await?)
        }
    }
}

impl EntityLookup for HttpBackend {
    fn lookup(
        &self,
        kind: EntityKind,
        ids: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<ResolvedEntity>>> + Send {
        async move {
            let url = self.url(&[kind.collection(), "batch"])?;
            let builder = self
                .request(Method::POST, url)?
                .json(&BatchLookupBody { ids });
            let response = self.send(builder).await?;
            Ok(response.json::<Vec<ResolvedEntity>>().await?)
        }
    }
}

impl MutationBackend for HttpBackend {
    fn mutate(
        &self,
        endpoint: &str,
        mutation: &Mutation,
    ) -> impl std::future::Future<Output = Result<()>> + Send {
        async move {
            let builder = match mutation {
                Mutation::Delete { id } => {
                    let url = self.url(&[endpoint, id.as_str()])?;
                    self.request(Method::DELETE, url)?
                }
                Mutation::Duplicate { id } => {
                    let url = self.url(&[endpoint, id.as_str(), "duplicate"])?;
                    self.request(Method::POST, url)?
                }
                Mutation::SetStatus { id, status } => {
                    let url = self.url(&[endpoint, id.as_str(), "status"])?;
                    self.request(Method::PATCH, url)?
                        .json(&StatusBody { status })
                }
            };
            self.send(builder).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_header_display() {
        let header = RedactedHeader::bearer("secret-token-12345");
        assert_eq!(format!("{}", header), "[REDACTED]");
        let debug_str = format!("{:?}", header);
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("secret-token"));
    }

    #[test]
    fn test_redacted_header_value_is_sensitive() {
        let value = RedactedHeader::bearer("token123").as_header_value().unwrap();
        assert!(value.is_sensitive());
        assert_eq!(value.to_str().unwrap(), "Bearer token123");
    }

    #[test]
    fn test_redacted_header_rejects_newlines() {
        assert!(RedactedHeader::bearer("bad\ntoken").as_header_value().is_err());
    }

    #[test]
    fn test_url_appends_segments() {
        let backend = HttpBackend::new("https://cms.example.com/api/v1/", None).unwrap();
        assert_eq!(
            backend.url(&["jobs"]).unwrap().as_str(),
            "https://cms.example.com/api/v1/jobs"
        );

        let backend = HttpBackend::new("https://cms.example.com/api/v1", None).unwrap();
        assert_eq!(
            backend.url(&["organisations", "batch"]).unwrap().as_str(),
            "https://cms.example.com/api/v1/organisations/batch"
        );
    }

    #[test]
    fn test_url_encodes_ids() {
        let backend = HttpBackend::new("https://cms.example.com/", None).unwrap();
        assert_eq!(
            backend.url(&["posts", "a/b c"]).unwrap().as_str(),
            "https://cms.example.com/posts/a%2Fb%20c"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(HttpBackend::new("mailto:desk@example.com", None).is_err());
        assert!(HttpBackend::new("not a url", None).is_err());
    }

    #[test]
    fn test_error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"message":"status is invalid"}"#),
            Some("status is invalid".to_string())
        );
        assert_eq!(
            error_message(r#"{"error":"forbidden"}"#),
            Some("forbidden".to_string())
        );
        assert_eq!(error_message("  "), None);
        assert_eq!(error_message("plain failure"), Some("plain failure".to_string()));
        assert_eq!(
            error_message(&"x".repeat(500)).map(|m| m.len()),
            Some(MAX_ERROR_BODY_CHARS)
        );
    }
}
