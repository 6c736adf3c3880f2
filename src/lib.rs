pub mod api;
pub mod components;
pub mod config;
pub mod context;
pub mod error;
pub mod storage;
