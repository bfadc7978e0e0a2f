//! Modelhub - terminal administrative console for a multi-model LLM gateway

pub mod api;
pub mod bus;
pub mod casing;
pub mod cli;
pub mod config;
pub mod error;
pub mod id;
pub mod store;
pub mod tui;
