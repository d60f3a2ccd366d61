// Shared fixtures: a fake upstream API and an in-process proxy server.
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::{Server, ServerHandle};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};

use crate::AppState;
use crate::config::Config;
use crate::handlers::configure;
use crate::repositories::storage::MemoryStorage;

pub struct TestServer {
    base: String,
    handle: ServerHandle,
}

impl TestServer {
    /// `http://127.0.0.1:{port}`
    pub fn base(&self) -> String {
        self.base.clone()
    }

    /// Base of the fake upstream's API root.
    pub fn api_base(&self) -> String {
        format!("{}/api", self.base)
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

fn content_type(req: &HttpRequest) -> String {
    req.headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn has_image(body: &[u8]) -> bool {
    String::from_utf8_lossy(body).contains("filename=\"a.png\"")
}

async fn list_projects() -> HttpResponse {
    HttpResponse::Ok().json(json!([{ "id": 1, "title": "Alpha" }]))
}

async fn get_project(req: HttpRequest, path: web::Path<String>) -> HttpResponse {
    if path.as_str() == "5" {
        HttpResponse::Ok().json(json!({ "id": 5, "query": req.query_string() }))
    } else {
        HttpResponse::NotFound().json(json!({ "message": "not found" }))
    }
}

async fn create_with_image(req: HttpRequest, body: web::Bytes) -> HttpResponse {
    HttpResponse::Created().json(json!({
        "contentType": content_type(&req),
        "size": body.len(),
        "hasImage": has_image(&body),
    }))
}

async fn update_with_image(req: HttpRequest, path: web::Path<String>, body: web::Bytes) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "id": path.into_inner(),
        "contentType": content_type(&req),
        "hasImage": has_image(&body),
    }))
}

async fn no_content() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

async fn get_user(_path: web::Path<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "title": "Validation failed" }))
}

async fn get_point(path: web::Path<String>) -> HttpResponse {
    if path.as_str() == "0" {
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
    HttpResponse::Ok().json(json!({ "id": path.into_inner() }))
}

async fn create_point(body: web::Json<Value>) -> HttpResponse {
    HttpResponse::Created().json(json!({ "received": body.into_inner() }))
}

async fn update_point(path: web::Path<String>, body: web::Json<Value>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "id": path.into_inner(), "received": body.into_inner() }))
}

async fn contact_messages_failure() -> HttpResponse {
    HttpResponse::InternalServerError().finish()
}

async fn plain_text_failure() -> HttpResponse {
    HttpResponse::ServiceUnavailable()
        .content_type("text/plain")
        .body("upstream down")
}

async fn inspect(req: HttpRequest, body: web::Bytes) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "method": req.method().as_str(),
        "bodyLen": body.len(),
        "contentType": content_type(&req),
        "accept": req.headers().get("accept").and_then(|v| v.to_str().ok()),
        "query": req.query_string(),
    }))
}

async fn png() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("image/png")
        .body(vec![137u8, 80, 78, 71])
}

async fn missing_media() -> HttpResponse {
    HttpResponse::NotFound().body("nope")
}

pub fn fake_upstream_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(usize::MAX))
        .route("/api/Projects", web::get().to(list_projects))
        .route("/api/Projects/with-image", web::post().to(create_with_image))
        .route("/api/Projects/{id}", web::get().to(get_project))
        .route("/api/Projects/{id}", web::delete().to(no_content))
        .route("/api/Users/{id}", web::get().to(get_user))
        .route("/api/Users/{id}/with-image", web::put().to(update_with_image))
        .route("/api/Points", web::post().to(create_point))
        .route("/api/Points/{id}", web::get().to(get_point))
        .route("/api/Points/{id}", web::put().to(update_point))
        .route("/api/ContactMessages", web::get().to(contact_messages_failure))
        .route("/api/unavailable", web::get().to(plain_text_failure))
        .route("/api/inspect", web::route().to(inspect))
        .route("/images/a.png", web::get().to(png))
        .route("/images/missing.png", web::get().to(missing_media));
}

fn start(server: Server, addr: SocketAddr) -> TestServer {
    let handle = server.handle();
    actix_web::rt::spawn(server);
    TestServer {
        base: format!("http://{addr}"),
        handle,
    }
}

pub fn spawn_fake_upstream() -> TestServer {
    let server = HttpServer::new(|| App::new().configure(fake_upstream_routes))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind fake upstream");
    let addr = server.addrs()[0];
    start(server.run(), addr)
}

pub fn test_config(api_base: &str) -> Config {
    let api_base = api_base.to_string();
    Config::from_lookup(move |key| match key {
        "API_BASE_URL" => Some(api_base.clone()),
        _ => None,
    })
    .expect("test config")
}

pub fn test_state(api_base: &str) -> web::Data<AppState> {
    let state = AppState::from_config(&test_config(api_base), Arc::new(MemoryStorage::new()))
        .expect("test state");
    web::Data::new(state)
}

/// The real application, proxying to `api_base`.
pub fn spawn_proxy_app(api_base: &str) -> TestServer {
    let state = test_state(api_base);
    let server = HttpServer::new(move || App::new().configure(configure(state.clone())))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind proxy app");
    let addr = server.addrs()[0];
    start(server.run(), addr)
}
