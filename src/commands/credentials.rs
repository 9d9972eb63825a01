use anyhow::{bail, Result};

use super::{read_line, Input};
use crate::ai_providers::{AIProvider, CredentialStore};
use crate::conversation::ConversationController;
use crate::error::Error;
use crate::validation::validate_api_key;

/// Save a key for `provider`, asking for it when not given
pub async fn set_key(
    store: &CredentialStore,
    provider: AIProvider,
    api_key: Option<String>,
    input: &mut Input,
) -> Result<()> {
    let api_key = match api_key {
        Some(key) => key,
        None => match read_line(input, &format!("API key ({}): ", provider.key_hint())).await? {
            Some(key) => key,
            None => bail!("No API key entered"),
        },
    };

    validate_api_key(provider, &api_key)?;
    store.save(provider, &api_key).map_err(Error::persistence)?;

    println!("Saved API key for {}", provider.display_name());

    Ok(())
}

/// Print the active provider and its masked key
pub fn show_key(store: &CredentialStore) -> Result<()> {
    match store.load().map_err(Error::persistence)? {
        Some(credential) => println!(
            "{} ({})",
            credential.provider.as_str().to_uppercase(),
            credential.masked_key()
        ),
        None => println!("No AI provider configured"),
    }

    Ok(())
}

pub fn delete_key(store: &CredentialStore, provider: AIProvider) -> Result<()> {
    store.delete(provider).map_err(Error::persistence)?;
    println!("Deleted API key for {}", provider.display_name());
    Ok(())
}

/// Ask for a provider and key until a client is installed. Returns false if
/// input ended first.
pub async fn prompt_credential(
    controller: &ConversationController,
    input: &mut Input,
) -> Result<bool> {
    println!("Choose AI Provider & Enter API Key");
    for provider in AIProvider::ALL {
        println!("  {:<10} {}", provider.as_str(), provider.display_name());
    }

    loop {
        let Some(tag) = read_line(input, "Provider [openai]: ").await? else {
            return Ok(false);
        };
        let tag = if tag.is_empty() { "openai".to_string() } else { tag };

        let provider: AIProvider = match tag.parse() {
            Ok(provider) => provider,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        let Some(api_key) = read_line(input, &format!("API key ({}): ", provider.key_hint())).await?
        else {
            return Ok(false);
        };

        match controller.set_credential(provider, &api_key).await {
            Ok(()) => {
                println!("Using {}", provider.as_str().to_uppercase());
                return Ok(true);
            }
            Err(e) => println!("{}", e.user_message()),
        }
    }
}
