use anyhow::{anyhow, bail, Result};
use std::path::{Path, PathBuf};

use super::credentials::prompt_credential;
use super::{read_line, Input};
use crate::ai_providers::AIProvider;
use crate::conversation::{ConversationController, Role};
use crate::documents::UploadedFile;

const HELP: &str = "\
Type a question and press enter. Commands:
  /upload <file>          load a PDF as context (max 50MB)
  /provider <tag> <key>   switch AI provider (openai, anthropic, google)
  /history                print the conversation so far
  /quit                   leave";

/// Interactive chat loop
pub async fn run_chat(
    controller: &ConversationController,
    pdf: Option<PathBuf>,
    input: &mut Input,
) -> Result<()> {
    // 1. Restore the saved provider or ask for one
    if !ensure_provider(controller, input).await? {
        return Ok(());
    }

    // 2. Optional document given on the command line
    if let Some(path) = pdf {
        upload(controller, &path).await;
    }

    println!("{}", HELP);

    // 3. Read-eval loop
    while let Some(line) = read_line(input, "> ").await? {
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').unwrap_or((line.as_str(), "")) {
            ("/quit" | "/exit", _) => break,
            ("/help", _) => println!("{}", HELP),
            ("/history", _) => print_history(controller).await,
            ("/upload", path) if !path.trim().is_empty() => {
                upload(controller, Path::new(path.trim())).await;
            }
            ("/provider", args) => switch_provider(controller, args).await,
            _ if line.starts_with('/') => println!("Unknown command. Type /help for help."),
            _ => {
                if !send(controller, &line).await && !prompt_credential(controller, input).await? {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Load `pdf`, ask one question and print the answer
pub async fn ask(
    controller: &ConversationController,
    pdf: Option<PathBuf>,
    question: &str,
    input: &mut Input,
) -> Result<()> {
    if !ensure_provider(controller, input).await? {
        bail!("No AI provider configured");
    }

    if let Some(path) = pdf {
        if !upload(controller, &path).await {
            bail!("Could not load {}", path.display());
        }
    }

    let reply = controller
        .submit(question)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    println!("{}", reply.content);

    Ok(())
}

async fn ensure_provider(controller: &ConversationController, input: &mut Input) -> Result<bool> {
    match controller.restore_credential().await {
        Ok(Some(provider)) => {
            println!("Using {}", provider.as_str().to_uppercase());
            return Ok(true);
        }
        Ok(None) => {}
        Err(e) => println!("{} with saved key", e.user_message()),
    }

    prompt_credential(controller, input).await
}

/// Submit one message and print the reply. Returns false when the session
/// needs a credential before it can continue.
async fn send(controller: &ConversationController, content: &str) -> bool {
    match controller.submit(content).await {
        Ok(reply) => {
            println!("{}", reply.content);
            true
        }
        Err(e) => {
            println!("{}", e.user_message());
            !e.needs_credentials()
        }
    }
}

/// Returns whether the document is now active
async fn upload(controller: &ConversationController, path: &Path) -> bool {
    let file = match UploadedFile::from_path(path).await {
        Ok(file) => file,
        Err(e) => {
            println!("{:#}", e);
            return false;
        }
    };

    println!("Processing {}...", file.name);

    match controller.upload(file).await {
        Ok(document) => {
            println!(
                "I've processed \"{}\". You can now ask questions about its content.",
                document.name
            );
            true
        }
        Err(e) => {
            println!("{}", e.user_message());
            false
        }
    }
}

async fn switch_provider(controller: &ConversationController, args: &str) {
    let mut parts = args.split_whitespace();
    let (Some(tag), Some(api_key)) = (parts.next(), parts.next()) else {
        println!("Usage: /provider <tag> <key>");
        return;
    };

    let provider: AIProvider = match tag.parse() {
        Ok(provider) => provider,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };

    match controller.set_credential(provider, api_key).await {
        Ok(()) => println!("Using {}", provider.as_str().to_uppercase()),
        Err(e) => println!("{}", e.user_message()),
    }
}

async fn print_history(controller: &ConversationController) {
    for message in controller.transcript().await {
        let speaker = match message.role {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        println!("[{}] {}: {}", message.timestamp.format("%H:%M:%S"), speaker, message.content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai_providers::{CredentialStore, ProviderFactory};
    use crate::commands::stdin_lines;
    use crate::documents::{DocumentIngestor, PdfExtractor};
    use std::sync::Arc;

    /// Session with a saved Google key, which answers without the network
    fn google_session() -> ConversationController {
        let credentials = CredentialStore::in_memory();
        credentials.save(AIProvider::Google, "AIza-test").unwrap();

        ConversationController::new(
            ProviderFactory::default(),
            credentials,
            DocumentIngestor::new(Arc::new(PdfExtractor)),
        )
    }

    #[tokio::test]
    async fn test_ask_records_question_and_reply() {
        let controller = google_session();

        ask(&controller, None, "What is this?", &mut stdin_lines())
            .await
            .unwrap();

        assert_eq!(controller.transcript().await.len(), 2);
    }

    #[tokio::test]
    async fn test_ask_fails_when_question_is_rejected() {
        let controller = google_session();

        let err = ask(&controller, None, "", &mut stdin_lines())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Message cannot be empty");
    }

    #[tokio::test]
    async fn test_ask_fails_when_document_cannot_be_loaded() {
        let controller = google_session();
        let missing = PathBuf::from("/nonexistent/report.pdf");

        let result = ask(&controller, Some(missing), "Summary?", &mut stdin_lines()).await;

        assert!(result.is_err());
        assert!(controller.transcript().await.is_empty());
    }
}
