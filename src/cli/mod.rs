//! Non-interactive CLI commands.

pub mod config;
pub mod conversation;
pub mod model;
pub mod provider;
pub mod run;
