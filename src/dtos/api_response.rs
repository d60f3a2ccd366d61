// src/dtos/api_response.rs
use actix_web::HttpResponse;
use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::web::JsonConfig;
use serde::Serialize;

/// `{status, message, data}` envelope used by the portfolio endpoints.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(status: StatusCode, message: &str, data: T) -> HttpResponse {
        HttpResponse::build(status).json(ApiResponse {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    pub fn error(status: StatusCode, message: &str) -> HttpResponse {
        HttpResponse::build(status).json(ApiResponse::<()> {
            status: "error".to_string(),
            message: message.to_string(),
            data: None,
        })
    }
}

/// JSON bodies above this size are rejected.
pub const JSON_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Malformed or oversized JSON bodies answer with the error envelope.
pub fn json_config() -> JsonConfig {
    JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err, _req| {
            let message = err.to_string();
            InternalError::from_response(err, ApiResponse::error(StatusCode::BAD_REQUEST, &message))
                .into()
        })
}
