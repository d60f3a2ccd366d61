// src/services/proxy_service.rs
use actix_web::web::Bytes;
use log::{debug, warn};
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::{Value, json};
use thiserror::Error;

pub const GENERIC_PROXY_MESSAGE: &str = "Proxy error";
pub const GENERIC_MEDIA_MESSAGE: &str = "Media proxy error";
pub const MEDIA_CACHE_CONTROL: &str = "public, max-age=60";

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("client build error: {0}")]
    Client(String),
}

/// Verbs the backend relay accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl ForwardMethod {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            ForwardMethod::Get => reqwest::Method::GET,
            ForwardMethod::Post => reqwest::Method::POST,
            ForwardMethod::Put => reqwest::Method::PUT,
            ForwardMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn carries_body(self) -> bool {
        matches!(self, ForwardMethod::Post | ForwardMethod::Put)
    }
}

#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: ForwardMethod,
    /// Raw path after the proxy prefix, still percent-encoded.
    pub tail: String,
    /// Raw query string without the leading '?'.
    pub query: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Whatever the upstream answered, success or not.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl UpstreamResponse {
    async fn read(resp: reqwest::Response) -> Result<Self, ProxyError> {
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await?;
        Ok(Self {
            status,
            content_type,
            body,
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// `{base}/{segments}{?query}` with empty segments dropped, so leading,
/// trailing or doubled slashes in `tail` never produce `//`.
pub fn build_target_url(base: &str, tail: &str, query: &str) -> String {
    let path = tail
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    let mut target = format!("{base}/{path}");
    if !query.is_empty() {
        target.push('?');
        target.push_str(query);
    }
    target
}

/// Static-file origin of the upstream: the API base with one `/api` suffix
/// removed.
pub fn media_origin(api_base: &str) -> String {
    api_base.strip_suffix("/api").unwrap_or(api_base).to_string()
}

pub fn build_upstream_client(allow_insecure_tls: bool) -> Result<Client, ProxyError> {
    if allow_insecure_tls {
        warn!("upstream TLS certificate validation is disabled");
    }
    Client::builder()
        .user_agent(concat!("portfolio-gallery/", env!("CARGO_PKG_VERSION")))
        .danger_accept_invalid_certs(allow_insecure_tls)
        .build()
        .map_err(|e| ProxyError::Client(e.to_string()))
}

/// Error envelope for a failed upstream call: a JSON body passes through,
/// plain text is wrapped as `{message}`, an empty body gets the generic
/// message.
pub fn normalize_error_body(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return json!({ "message": GENERIC_PROXY_MESSAGE });
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => value,
        Err(_) => json!({ "message": String::from_utf8_lossy(body).trim() }),
    }
}

#[derive(Clone)]
pub struct BackendProxy {
    client: Client,
    base_url: String,
}

impl BackendProxy {
    /// `base_url` is expected without a trailing slash.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn forward(&self, req: ForwardRequest) -> Result<UpstreamResponse, ProxyError> {
        let target = build_target_url(&self.base_url, &req.tail, &req.query);
        debug!("forwarding {:?} {}", req.method, target);

        let mut builder = self
            .client
            .request(req.method.as_reqwest(), &target)
            .header(ACCEPT, "application/json");

        if req.method.carries_body() {
            if let Some(content_type) = &req.content_type {
                builder = builder.header(CONTENT_TYPE, content_type.as_str());
            }
            builder = builder.body(req.body);
        }

        let upstream = UpstreamResponse::read(builder.send().await?).await?;
        if !upstream.is_success() {
            warn!("upstream {} answered {}", target, upstream.status);
        }
        Ok(upstream)
    }
}

#[derive(Clone)]
pub struct MediaProxy {
    client: Client,
    origin: String,
}

impl MediaProxy {
    /// Derives the static-file origin from the API base.
    pub fn new(client: Client, api_base_url: &str) -> Self {
        Self {
            client,
            origin: media_origin(api_base_url),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub async fn fetch(&self, tail: &str, query: &str) -> Result<UpstreamResponse, ProxyError> {
        let target = build_target_url(&self.origin, tail, query);
        debug!("fetching media {}", target);

        let upstream = UpstreamResponse::read(self.client.get(&target).send().await?).await?;
        if !upstream.is_success() {
            warn!("media upstream {} answered {}", target, upstream.status);
        }
        Ok(upstream)
    }
}
