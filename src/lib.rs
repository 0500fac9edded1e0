pub mod api;
pub mod background;
pub mod config;
pub mod generate;
pub mod metrics;
pub mod paste;
pub mod secrets;
pub mod server;
pub mod storage;
