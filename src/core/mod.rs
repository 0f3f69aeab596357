pub mod chart;
pub mod config;
pub mod cost;
pub mod error;
pub mod formatter;
pub mod http;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod process;
pub mod render;
pub mod report;
pub mod sources;
pub mod store;
