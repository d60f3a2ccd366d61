pub mod portfolio_store;
pub mod storage;
