//! Run command - starts the TUI.

use anyhow::Result;

/// Execute the run command (starts TUI)
pub async fn execute() -> Result<()> {
    // Initialize configuration
    let config = crate::config::Config::load().await?;

    // Start TUI
    crate::tui::run(config).await
}
