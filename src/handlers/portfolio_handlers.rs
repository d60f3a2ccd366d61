// src/handlers/portfolio_handlers.rs
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, delete, get, post, put, web};
use log::{error, info, warn};

use crate::AppState;
use crate::dtos::api_response::ApiResponse;
use crate::dtos::portfolio_dtos::{
    CreatePortfolioRequest, PortfolioOut, UpdatePortfolioRequest, VerifyPasswordRequest,
    VerifyPasswordResponse,
};
use crate::middleware::password_extractor::EditPassword;

/// GET /api/portfolios
/// Gallery listing, in storage order
#[get("/api/portfolios")]
pub async fn list_portfolios(state: web::Data<AppState>) -> impl Responder {
    let portfolios: Vec<PortfolioOut> = state
        .store
        .list()
        .into_iter()
        .map(PortfolioOut::from)
        .collect();

    ApiResponse::success(StatusCode::OK, "Portfolios retrieved", portfolios)
}

/// GET /api/portfolios/{id}
#[get("/api/portfolios/{id}")]
pub async fn get_portfolio(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    match state.store.get_by_id(&id) {
        Some(portfolio) => ApiResponse::success(
            StatusCode::OK,
            "Portfolio retrieved",
            PortfolioOut::from(portfolio),
        ),
        None => ApiResponse::error(StatusCode::NOT_FOUND, "Portfolio not found"),
    }
}

/// POST /api/portfolios
#[post("/api/portfolios")]
pub async fn create_portfolio(
    state: web::Data<AppState>,
    body: web::Json<CreatePortfolioRequest>,
) -> impl Responder {
    let CreatePortfolioRequest { fields, password } = body.into_inner();

    if fields.name.trim().is_empty() {
        return ApiResponse::error(StatusCode::BAD_REQUEST, "Name is required");
    }
    if password.is_empty() {
        return ApiResponse::error(StatusCode::BAD_REQUEST, "Password is required");
    }

    let id = state.store.generate_id();
    match state.store.save(fields.into_portfolio(id, password)) {
        Ok(saved) => {
            info!("created portfolio {}", saved.id);
            ApiResponse::success(
                StatusCode::CREATED,
                "Portfolio created",
                PortfolioOut::from(saved),
            )
        }
        Err(e) => {
            error!("failed to create portfolio: {}", e);
            ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save portfolio")
        }
    }
}

/// POST /api/portfolios/{id}/verify
/// Unlocks the edit form; no lockout or attempt counting
#[post("/api/portfolios/{id}/verify")]
pub async fn verify_portfolio_password(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<VerifyPasswordRequest>,
) -> impl Responder {
    let valid = state.store.verify_password(&path, &body.password);
    let message = if valid { "Password accepted" } else { "Incorrect password" };
    ApiResponse::success(StatusCode::OK, message, VerifyPasswordResponse { valid })
}

/// PUT /api/portfolios/{id}
/// Whole-object replace, gated by the X-Portfolio-Password header
#[put("/api/portfolios/{id}")]
pub async fn update_portfolio(
    state: web::Data<AppState>,
    path: web::Path<String>,
    password: EditPassword,
    body: web::Json<UpdatePortfolioRequest>,
) -> impl Responder {
    let id = path.into_inner();
    let Some(existing) = state.store.get_by_id(&id) else {
        return ApiResponse::error(StatusCode::NOT_FOUND, "Portfolio not found");
    };

    if !state.store.verify_password(&id, &password.0) {
        warn!("rejected edit of portfolio {}: incorrect password", id);
        return ApiResponse::error(StatusCode::UNAUTHORIZED, "Incorrect password");
    }

    let UpdatePortfolioRequest {
        fields,
        password: new_password,
    } = body.into_inner();
    if fields.name.trim().is_empty() {
        return ApiResponse::error(StatusCode::BAD_REQUEST, "Name is required");
    }

    let password = new_password
        .filter(|p| !p.is_empty())
        .unwrap_or(existing.password);
    let mut portfolio = fields.into_portfolio(id, password);
    portfolio.created_at = existing.created_at;

    match state.store.save(portfolio) {
        Ok(saved) => {
            info!("updated portfolio {}", saved.id);
            ApiResponse::success(StatusCode::OK, "Portfolio updated", PortfolioOut::from(saved))
        }
        Err(e) => {
            error!("failed to update portfolio: {}", e);
            ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save portfolio")
        }
    }
}

/// DELETE /api/portfolios/{id}
/// Idempotent; deleting an unknown id still answers 204
#[delete("/api/portfolios/{id}")]
pub async fn delete_portfolio(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    match state.store.delete(&id) {
        Ok(()) => {
            info!("deleted portfolio {}", id);
            HttpResponse::NoContent().finish()
        }
        Err(e) => {
            error!("failed to delete portfolio {}: {}", id, e);
            ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete portfolio")
        }
    }
}
