pub mod api;
pub mod blooms;
pub mod config;
pub mod error;
pub mod layout;
pub mod loader;
pub mod render;
pub mod types;
