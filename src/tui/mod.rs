//! Terminal UI for the gateway console.

pub mod app;
pub mod components;
pub mod forms;
pub mod input;
pub mod pages;
pub mod route;
pub mod theme;
pub mod ui;

pub use app::run;
