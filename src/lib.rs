pub mod airlines;
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod filter;
pub mod location;
pub mod logging;
pub mod models;
pub mod render;
pub mod server;
pub mod ui;
pub mod weather;
