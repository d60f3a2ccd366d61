// src/main.rs
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use log::{error, info, warn};

use portfolio_gallery::AppState;
use portfolio_gallery::config::Config;
use portfolio_gallery::handlers::configure;
use portfolio_gallery::repositories::storage::{FileStorage, KeyValueStorage, MemoryStorage};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    info!("Upstream API: {}", config.api_base_url);
    info!("Proxy prefix: {} | media prefix: {}", config.proxy_prefix, config.media_prefix);
    let storage: Arc<dyn KeyValueStorage> = match FileStorage::open(&config.data_dir) {
        Ok(s) => {
            info!("Portfolio data directory: {}", s.root().display());
            Arc::new(s)
        }
        Err(e) => {
            warn!(
                "Cannot open data directory {} ({}); portfolios will not survive a restart",
                config.data_dir.display(),
                e
            );
            Arc::new(MemoryStorage::new())
        }
    };

    let state = match AppState::from_config(&config, storage) {
        Ok(s) => web::Data::new(s),
        Err(e) => {
            error!("Failed to build upstream client: {}", e);
            std::process::exit(1);
        }
    };

    if state.insecure_upstream_tls {
        warn!("ALLOW_INSECURE_UPSTREAM_TLS is on; use only against development upstreams");
    }

    let bind_address = format!("0.0.0.0:{}", config.port);
    info!("Starting server on {}", bind_address);

    let allowed_origins = config.allowed_origins.clone();
    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                "content-type",
                "accept",
                "x-requested-with",
                "x-portfolio-password",
            ])
            .max_age(3600);

        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure(state.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
