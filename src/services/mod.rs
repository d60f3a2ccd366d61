pub mod api_client;
pub mod proxy_service;
