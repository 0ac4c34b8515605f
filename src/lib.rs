pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod message;
pub mod observability;
pub mod payload;
pub mod request;
pub mod reshape;
pub mod response;
pub mod source;
pub mod streams;
pub mod types;

// Ports and their adapters for the outbound request layer
pub mod app;
pub mod infra;
