pub mod api_response;
pub mod portfolio_dtos;
