//! Conversation management CLI commands.

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::api::Services;
use crate::config::Config;

/// List all conversations
pub async fn list() -> Result<()> {
    let config = Config::load().await?;
    let services = Services::from_config(&config)?;
    let conversations = services.conversations.get_all().await?;

    if conversations.is_empty() {
        println!("No conversations found.");
        return Ok(());
    }

    println!(
        "{:<38} {:<40} {:<20}",
        "ID".bold(),
        "Title".bold(),
        "Updated".bold()
    );
    println!("{}", "-".repeat(98));

    for conversation in conversations {
        // Truncate title if too long
        let title = if conversation.title.chars().count() > 38 {
            let short: String = conversation.title.chars().take(35).collect();
            format!("{}...", short)
        } else {
            conversation.title.clone()
        };
        println!(
            "{:<38} {:<40} {:<20}",
            conversation.id.to_string().dimmed(),
            title,
            conversation.updated_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

/// Show conversation details
pub async fn show(id: &str) -> Result<()> {
    let config = Config::load().await?;
    let services = Services::from_config(&config)?;
    let conversation_id = id.parse()?;
    let conversation = services.conversations.get_one(conversation_id).await?;
    let turns = services.conversations.get_turns(conversation_id).await?;

    println!("Conversation: {}", conversation.title.bold());
    println!("ID: {}", conversation.id);
    println!("Created: {}", conversation.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Updated: {}", conversation.updated_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(prompt) = &conversation.system_prompt {
        println!("System prompt: {}", prompt);
    }
    println!("\nTurns: {}", turns.iter().filter(|t| !t.is_deleted).count());

    Ok(())
}

/// Delete a conversation
pub async fn delete(id: &str) -> Result<()> {
    let config = Config::load().await?;
    let services = Services::from_config(&config)?;
    let conversation_id = id.parse()?;

    let conversation = services.conversations.get_one(conversation_id).await?;
    println!("Deleting conversation: {} ({})", conversation.title, conversation.id);

    services.conversations.delete(conversation_id).await?;

    println!("Conversation deleted.");

    Ok(())
}
