pub mod portfolio_handlers;
pub mod proxy_handlers;

use actix_web::web;

use crate::AppState;
use crate::dtos::api_response::json_config;
use portfolio_handlers::{
    create_portfolio, delete_portfolio, get_portfolio, list_portfolios, update_portfolio,
    verify_portfolio_password,
};
use proxy_handlers::{forward_backend, forward_media};

/// Registers state, the portfolio endpoints and both proxy mounts.
pub fn configure(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        let proxy_prefix = state.proxy_prefix.clone();
        let media_prefix = state.media_prefix.clone();

        cfg.app_data(state)
            .app_data(json_config())
            .service(list_portfolios)
            .service(create_portfolio)
            .service(verify_portfolio_password)
            .service(get_portfolio)
            .service(update_portfolio)
            .service(delete_portfolio)
            .service(
                web::scope(&proxy_prefix)
                    // forwarded bodies are not size-limited
                    .app_data(web::PayloadConfig::new(usize::MAX))
                    .service(
                        web::resource("/{tail:.*}")
                            .route(web::get().to(forward_backend))
                            .route(web::post().to(forward_backend))
                            .route(web::put().to(forward_backend))
                            .route(web::delete().to(forward_backend)),
                    ),
            )
            .service(
                web::scope(&media_prefix)
                    .service(web::resource("/{tail:.*}").route(web::get().to(forward_media))),
            );
    }
}
