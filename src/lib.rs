pub mod api;
pub mod app;
pub mod config;
pub mod inbox;
pub mod ui;
pub mod utils;
