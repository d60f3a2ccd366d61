// src/services/api_client.rs
use std::time::Duration;

use log::error;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Client, Method};
use serde_json::Value;
use thiserror::Error;

use crate::services::proxy_service::media_origin;

/// The only error UI code ever sees. `Display` is the display-ready
/// message; status, url and body are kept for logging.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: Option<u16>,
    pub url: String,
    pub body: Option<Value>,
}

enum Payload {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// Typed calls against the upstream resources, always through the backend
/// proxy prefix.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    /// e.g. `http://localhost:8080/api/backend`
    proxy_base: String,
    /// Real upstream base, used for logs and media urls.
    api_base_url: String,
}

impl ApiClient {
    pub fn new(
        proxy_base: impl Into<String>,
        api_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        let proxy_base: String = proxy_base.into();
        let api_base_url: String = api_base_url.into();
        Ok(Self {
            client,
            proxy_base: proxy_base.trim_end_matches('/').to_string(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Upstream origin without the `/api` suffix.
    pub fn backend_origin(&self) -> String {
        media_origin(&self.api_base_url)
    }

    /// Absolute url for a media path stored by the upstream. Absolute
    /// http(s) urls are returned as they are.
    pub fn to_media_url(&self, path: Option<&str>) -> Option<String> {
        let path = path.filter(|p| !p.is_empty())?;
        if is_absolute_http_url(path) {
            return Some(path.to_string());
        }
        Some(format!("{}/{}", self.backend_origin(), path.trim_start_matches('/')))
    }

    // Projects

    pub async fn get_projects(&self) -> Result<Value, ApiError> {
        self.call(Method::GET, "Projects", Payload::Empty).await
    }

    pub async fn get_project_by_id(&self, id: i64) -> Result<Value, ApiError> {
        self.call(Method::GET, &format!("Projects/{id}"), Payload::Empty).await
    }

    pub async fn create_project(&self, form: Form) -> Result<Value, ApiError> {
        self.call(Method::POST, "Projects/with-image", Payload::Multipart(form))
            .await
    }

    pub async fn update_project(&self, id: i64, form: Form) -> Result<Value, ApiError> {
        self.call(
            Method::PUT,
            &format!("Projects/{id}/with-image"),
            Payload::Multipart(form),
        )
        .await
    }

    pub async fn delete_project(&self, id: i64) -> Result<Value, ApiError> {
        self.call(Method::DELETE, &format!("Projects/{id}"), Payload::Empty)
            .await
    }

    // Users

    pub async fn get_users(&self) -> Result<Value, ApiError> {
        self.call(Method::GET, "Users", Payload::Empty).await
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<Value, ApiError> {
        self.call(Method::GET, &format!("Users/{id}"), Payload::Empty).await
    }

    pub async fn create_user(&self, form: Form) -> Result<Value, ApiError> {
        self.call(Method::POST, "Users/with-image", Payload::Multipart(form))
            .await
    }

    pub async fn update_user(&self, id: i64, form: Form) -> Result<Value, ApiError> {
        self.call(
            Method::PUT,
            &format!("Users/{id}/with-image"),
            Payload::Multipart(form),
        )
        .await
    }

    pub async fn delete_user(&self, id: i64) -> Result<Value, ApiError> {
        self.call(Method::DELETE, &format!("Users/{id}"), Payload::Empty)
            .await
    }

    // Points

    pub async fn get_points(&self) -> Result<Value, ApiError> {
        self.call(Method::GET, "Points", Payload::Empty).await
    }

    pub async fn get_point_by_id(&self, id: i64) -> Result<Value, ApiError> {
        self.call(Method::GET, &format!("Points/{id}"), Payload::Empty).await
    }

    pub async fn create_point(&self, point: Value) -> Result<Value, ApiError> {
        self.call(Method::POST, "Points", Payload::Json(point)).await
    }

    pub async fn update_point(&self, id: i64, point: Value) -> Result<Value, ApiError> {
        self.call(Method::PUT, &format!("Points/{id}"), Payload::Json(point))
            .await
    }

    pub async fn delete_point(&self, id: i64) -> Result<Value, ApiError> {
        self.call(Method::DELETE, &format!("Points/{id}"), Payload::Empty)
            .await
    }

    // Contact messages

    pub async fn get_contact_messages(&self) -> Result<Value, ApiError> {
        self.call(Method::GET, "ContactMessages", Payload::Empty).await
    }

    pub async fn get_contact_message_by_id(&self, id: i64) -> Result<Value, ApiError> {
        self.call(Method::GET, &format!("ContactMessages/{id}"), Payload::Empty)
            .await
    }

    pub async fn create_contact_message(&self, message: Value) -> Result<Value, ApiError> {
        self.call(Method::POST, "ContactMessages", Payload::Json(message))
            .await
    }

    pub async fn update_contact_message(&self, id: i64, message: Value) -> Result<Value, ApiError> {
        self.call(
            Method::PUT,
            &format!("ContactMessages/{id}"),
            Payload::Json(message),
        )
        .await
    }

    pub async fn delete_contact_message(&self, id: i64) -> Result<Value, ApiError> {
        self.call(Method::DELETE, &format!("ContactMessages/{id}"), Payload::Empty)
            .await
    }

    async fn call(&self, method: Method, path: &str, payload: Payload) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.proxy_base, path);
        let builder = self.client.request(method, &url);
        let builder = match payload {
            Payload::Empty => builder,
            Payload::Json(body) => builder.json(&body),
            Payload::Multipart(form) => builder.multipart(form),
        };

        let resp = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => {
                return Err(self.fail(&url, e.status().map(|s| s.as_u16()), None, Some(&e)));
            }
        };

        let status = resp.status();
        let bytes = match resp.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.fail(&url, Some(status.as_u16()), None, Some(&e))),
        };
        let body = parse_body(&bytes);

        if !status.is_success() {
            return Err(self.fail(&url, Some(status.as_u16()), body, None));
        }
        Ok(body.unwrap_or(Value::Null))
    }

    fn fail(
        &self,
        url: &str,
        status: Option<u16>,
        body: Option<Value>,
        cause: Option<&reqwest::Error>,
    ) -> ApiError {
        error!(
            "API error: base_url={} proxy={} url={} status={:?} body={:?} cause={:?}",
            self.api_base_url,
            self.proxy_base,
            url,
            status,
            body,
            cause.map(|e| e.to_string())
        );
        ApiError {
            message: error_message(url, status, body.as_ref()),
            status,
            url: url.to_string(),
            body,
        }
    }
}

/// `http://` or `https://`, scheme matched case-insensitively.
fn is_absolute_http_url(path: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        path.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    Some(
        serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned())),
    )
}

/// Upstream `message`, then `title`, then a generic network message.
fn error_message(url: &str, status: Option<u16>, body: Option<&Value>) -> String {
    let server_message = body.and_then(|b| {
        ["message", "title"].iter().find_map(|key| {
            b.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    });

    server_message.unwrap_or_else(|| match status {
        Some(code) => format!("network error (status {code}) calling {url}"),
        None => format!("network error calling {url}"),
    })
}
