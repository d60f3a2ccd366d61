pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::config::Config;
use crate::repositories::portfolio_store::PortfolioStore;
use crate::repositories::storage::KeyValueStorage;
use crate::services::proxy_service::{BackendProxy, MediaProxy, ProxyError, build_upstream_client};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PortfolioStore>,
    pub backend_proxy: BackendProxy,
    pub media_proxy: MediaProxy,
    pub proxy_prefix: String,
    pub media_prefix: String,
    /// Upstream certificates are not validated.
    pub insecure_upstream_tls: bool,
}

impl AppState {
    pub fn from_config(
        config: &Config,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Result<Self, ProxyError> {
        let client = build_upstream_client(config.allow_insecure_upstream_tls)?;
        Ok(Self {
            store: Arc::new(PortfolioStore::new(storage)),
            backend_proxy: BackendProxy::new(client.clone(), config.api_base_url.clone()),
            media_proxy: MediaProxy::new(client, &config.api_base_url),
            proxy_prefix: config.proxy_prefix.clone(),
            media_prefix: config.media_prefix.clone(),
            insecure_upstream_tls: config.allow_insecure_upstream_tls,
        })
    }
}
