//! Provider CLI commands.

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::api::Services;
use crate::config::Config;

/// List all providers
pub async fn list() -> Result<()> {
    let config = Config::load().await?;
    let services = Services::from_config(&config)?;
    let providers = services.providers.get_all().await?;

    if providers.is_empty() {
        println!("No providers registered.");
        return Ok(());
    }

    println!(
        "{:<38} {:<16} {:<36} {:<6}",
        "ID".bold(),
        "Name".bold(),
        "Base URL".bold(),
        "Keys".bold()
    );
    println!("{}", "-".repeat(96));

    for provider in providers {
        println!(
            "{:<38} {:<16} {:<36} {:<6}",
            provider.id.to_string().dimmed(),
            provider.name,
            provider.base_url,
            provider.api_keys_count
        );
    }

    Ok(())
}

/// Show provider details including keys and quota
pub async fn show(id: &str) -> Result<()> {
    let config = Config::load().await?;
    let services = Services::from_config(&config)?;
    let provider = services.providers.get_one(id.parse()?).await?;

    println!("Provider: {}", provider.name.bold());
    println!("ID: {}", provider.id);
    println!("Base URL: {}", provider.base_url);
    if let Some(description) = &provider.description {
        println!("Description: {}", description);
    }

    match &provider.free_quota {
        Some(quota) => {
            println!(
                "Free quota: {} {} ({})",
                quota.amount,
                provider
                    .free_quota_type
                    .and_then(|t| serde_json::to_value(t).ok())
                    .and_then(|v| v.as_str().map(String::from))
                    .unwrap_or_default(),
                quota.reset_period.label()
            );
        }
        None => println!("Free quota: {}", "none".dimmed()),
    }

    let mut keys = services.keys.get_all(provider.id).await?;
    keys.sort_by_key(|k| k.sort_order);
    println!("\nAPI keys: {}", keys.len());
    for key in keys {
        println!(
            "  {}. {} {}",
            key.sort_order + 1,
            key.alias,
            key.key_preview.unwrap_or_default().dimmed()
        );
    }

    Ok(())
}
