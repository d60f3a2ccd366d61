// src/handlers/proxy_handlers.rs
use actix_web::http::{Method, StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, web};
use log::error;
use serde_json::json;

use crate::AppState;
use crate::services::proxy_service::{
    ForwardMethod, ForwardRequest, GENERIC_MEDIA_MESSAGE, GENERIC_PROXY_MESSAGE,
    MEDIA_CACHE_CONTROL, normalize_error_body,
};

/// Raw (still percent-encoded) path below `prefix`.
fn tail_after<'a>(req: &'a HttpRequest, prefix: &str) -> &'a str {
    req.uri().path().strip_prefix(prefix).unwrap_or_default()
}

fn status_of(code: u16, fallback: StatusCode) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(fallback)
}

pub fn media_content_type(upstream: Option<String>) -> String {
    upstream
        .filter(|ct| !ct.trim().is_empty())
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string())
}

/// GET|POST|PUT|DELETE {PROXY_PREFIX}/{tail}
pub async fn forward_backend(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> HttpResponse {
    let method = if req.method() == Method::GET {
        ForwardMethod::Get
    } else if req.method() == Method::POST {
        ForwardMethod::Post
    } else if req.method() == Method::PUT {
        ForwardMethod::Put
    } else if req.method() == Method::DELETE {
        ForwardMethod::Delete
    } else {
        return HttpResponse::MethodNotAllowed().finish();
    };

    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let forward = ForwardRequest {
        method,
        tail: tail_after(&req, &state.proxy_prefix).to_string(),
        query: req.query_string().to_string(),
        content_type,
        body,
    };

    match state.backend_proxy.forward(forward).await {
        Ok(upstream) if upstream.is_success() => {
            let mut resp = HttpResponse::build(status_of(upstream.status, StatusCode::OK));
            if upstream.body.is_empty() {
                return resp.finish();
            }
            let content_type = upstream
                .content_type
                .unwrap_or_else(|| mime::APPLICATION_JSON.to_string());
            resp.content_type(content_type).body(upstream.body)
        }
        Ok(upstream) => HttpResponse::build(status_of(upstream.status, StatusCode::BAD_GATEWAY))
            .json(normalize_error_body(&upstream.body)),
        Err(e) => {
            error!("backend proxy failed for {}: {}", req.uri(), e);
            HttpResponse::InternalServerError().json(json!({ "message": GENERIC_PROXY_MESSAGE }))
        }
    }
}

/// GET {MEDIA_PREFIX}/{tail}
pub async fn forward_media(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let tail = tail_after(&req, &state.media_prefix);

    match state.media_proxy.fetch(tail, req.query_string()).await {
        Ok(upstream) if upstream.is_success() => {
            HttpResponse::build(status_of(upstream.status, StatusCode::OK))
                .content_type(media_content_type(upstream.content_type))
                .insert_header((header::CACHE_CONTROL, MEDIA_CACHE_CONTROL))
                .body(upstream.body)
        }
        Ok(upstream) => HttpResponse::build(status_of(upstream.status, StatusCode::BAD_GATEWAY))
            .content_type(mime::TEXT_PLAIN_UTF_8)
            .body(format!(
                "{}: upstream responded with status {}",
                GENERIC_MEDIA_MESSAGE, upstream.status
            )),
        Err(e) => {
            error!("media proxy failed for {}: {}", req.uri(), e);
            HttpResponse::BadGateway()
                .content_type(mime::TEXT_PLAIN_UTF_8)
                .body(GENERIC_MEDIA_MESSAGE)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::configure;
    use crate::tests::support::{spawn_fake_upstream, test_state};
    use actix_web::{App, test};
    use serde_json::Value;

    macro_rules! proxy_app {
        ($api_base:expr) => {
            test::init_service(App::new().configure(configure(test_state($api_base)))).await
        };
    }

    fn closed_local_base() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}/api")
    }

    #[actix_web::test]
    async fn get_forwards_path_and_query() {
        let upstream = spawn_fake_upstream();
        let app = proxy_app!(&upstream.api_base());

        let req = test::TestRequest::get()
            .uri("/api/backend/Projects/5?x=1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], 5);
        assert_eq!(body["query"], "x=1");

        let req = test::TestRequest::get()
            .uri("/api/backend/inspect?a=b")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["accept"], "application/json");
        assert_eq!(body["query"], "a=b");

        upstream.stop().await;
    }

    #[actix_web::test]
    async fn upstream_error_passes_through() {
        let upstream = spawn_fake_upstream();
        let app = proxy_app!(&upstream.api_base());

        let req = test::TestRequest::get()
            .uri("/api/backend/Projects/404")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "not found" }));

        let req = test::TestRequest::get()
            .uri("/api/backend/unavailable")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "upstream down" }));

        let req = test::TestRequest::get()
            .uri("/api/backend/ContactMessages")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "Proxy error" }));

        upstream.stop().await;
    }

    #[actix_web::test]
    async fn connection_failure_yields_generic_error() {
        let app = proxy_app!(&closed_local_base());

        let req = test::TestRequest::get()
            .uri("/api/backend/Projects")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "Proxy error" }));
    }

    #[actix_web::test]
    async fn post_forwards_large_raw_body_and_content_type() {
        let upstream = spawn_fake_upstream();
        let app = proxy_app!(&upstream.api_base());

        let payload = vec![b'x'; 2 * 1024 * 1024];
        let req = test::TestRequest::post()
            .uri("/api/backend/inspect")
            .insert_header((header::CONTENT_TYPE, "application/octet-stream"))
            .set_payload(payload.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["method"], "POST");
        assert_eq!(body["bodyLen"], payload.len());
        assert_eq!(body["contentType"], "application/octet-stream");

        let req = test::TestRequest::put()
            .uri("/api/backend/inspect")
            .set_json(json!({ "a": 1 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["method"], "PUT");
        assert_eq!(body["contentType"], "application/json");

        upstream.stop().await;
    }

    #[actix_web::test]
    async fn delete_forwards_without_body() {
        let upstream = spawn_fake_upstream();
        let app = proxy_app!(&upstream.api_base());

        let req = test::TestRequest::delete()
            .uri("/api/backend/inspect")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{\"ignored\":true}")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["method"], "DELETE");
        assert_eq!(body["bodyLen"], 0);

        let req = test::TestRequest::delete()
            .uri("/api/backend/Projects/5")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        upstream.stop().await;
    }

    #[actix_web::test]
    async fn media_is_served_with_cache_header() {
        let upstream = spawn_fake_upstream();
        let app = proxy_app!(&upstream.api_base());

        let req = test::TestRequest::get()
            .uri("/admin/media/images/a.png")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
        assert_eq!(
            resp.headers().get(header::CACHE_CONTROL).unwrap(),
            "public, max-age=60"
        );
        let bytes = test::read_body(resp).await;
        assert_eq!(bytes.as_ref(), &[137u8, 80, 78, 71]);

        upstream.stop().await;
    }

    #[actix_web::test]
    async fn media_failures_are_plain_text() {
        let upstream = spawn_fake_upstream();
        let app = proxy_app!(&upstream.api_base());

        let req = test::TestRequest::get()
            .uri("/admin/media/images/missing.png")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.headers().get(header::CACHE_CONTROL).is_none());
        let bytes = test::read_body(resp).await;
        assert_eq!(
            bytes.as_ref(),
            b"Media proxy error: upstream responded with status 404"
        );

        upstream.stop().await;

        let app = proxy_app!(&closed_local_base());
        let req = test::TestRequest::get()
            .uri("/admin/media/images/a.png")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let bytes = test::read_body(resp).await;
        assert_eq!(bytes.as_ref(), b"Media proxy error");
    }
}
