//! Model CLI commands.

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::api::Services;
use crate::config::Config;

/// List all models
pub async fn list() -> Result<()> {
    let config = Config::load().await?;
    let services = Services::from_config(&config)?;
    let models = services.models.get_all().await?;

    if models.is_empty() {
        println!("No models registered.");
        return Ok(());
    }

    println!(
        "{:<38} {:<20} {:<14} {}",
        "ID".bold(),
        "Name".bold(),
        "Family".bold(),
        "Capabilities".bold()
    );
    println!("{}", "-".repeat(96));

    for model in models {
        let capabilities = model
            .capabilities
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<38} {:<20} {:<14} {}",
            model.id.to_string().dimmed(),
            model.name,
            model.family,
            capabilities
        );
    }

    Ok(())
}

/// Show a model's implementations
pub async fn show(id: &str) -> Result<()> {
    let config = Config::load().await?;
    let services = Services::from_config(&config)?;
    let model_id = id.parse()?;
    let model = services.models.get_one(model_id).await?;
    let mut implementations = services.implementations.get_all(model_id).await?;
    implementations.sort_by_key(|i| i.sort_order);

    println!("Model: {} ({})", model.name.bold(), model.family);
    if let Some(description) = &model.description {
        println!("Description: {}", description);
    }
    println!("\nImplementations: {}", implementations.len());

    for implementation in implementations {
        let state = if implementation.is_available {
            "available".green().to_string()
        } else {
            "unavailable".red().to_string()
        };
        let window = implementation
            .context_window
            .map(|w| format!("{}k ctx", w / 1000))
            .unwrap_or_default();
        println!(
            "  {} {} {} {}",
            implementation.provider_model_id,
            implementation.version.dimmed(),
            window,
            state
        );
    }

    Ok(())
}
