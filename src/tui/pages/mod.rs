//! Page renderers, one per console route.

pub mod chat;
pub mod dashboard;
pub mod models;
pub mod providers;
pub mod settings;
pub mod users;
