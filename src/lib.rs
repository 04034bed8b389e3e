pub mod config;
pub mod logger;
pub mod modal;
pub mod render;
pub mod tou;
