pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod location;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod retry;
pub mod server;
pub mod service;
pub mod synthetic;
