pub mod cli;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod render;
pub mod session;
pub mod view;

use cli::Args;
use client::HttpChatApi;
use config::ClientConfig;
use controller::ChatController;
use log::{ debug, info, warn };
use models::api::ConversationId;
use models::chat::{ format_transcript_for_display, ChatMessage };
use render::TranscriptRenderer;
use std::error::Error;
use std::fs;
use std::sync::Arc;
use tokio::io::{ AsyncBufReadExt, BufReader };
use tokio::sync::Mutex;
use view::html::HtmlDocumentView;
use view::terminal::TerminalView;
use view::ChatView;

const DOCUMENT_TITLE: &str = "Repository chat";

fn load_history(path: &str) -> Result<Vec<ChatMessage>, Box<dyn Error + Send + Sync>> {
    let content = fs
        ::read_to_string(path)
        .map_err(|e| format!("Failed to read history file '{}': {}", path, e))?;
    let messages: Vec<ChatMessage> = serde_json
        ::from_str(&content)
        .map_err(|e| format!("Failed to parse history file '{}': {}", path, e))?;
    Ok(messages)
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = ClientConfig::from_args(&args)?;

    info!("--- Core Configuration ---");
    info!("Server: {}", config.base_url);
    info!("Analyze Endpoint: {}", config.analyze_url);
    info!("Chat Endpoint: {}", config.chat_url);
    info!("Conversation Route: /{}", config.conversation_route);
    info!(
        "Request Timeout: {}",
        config.timeout.map(|t| format!("{}s", t.as_secs())).unwrap_or_else(|| "none".into())
    );
    info!("Highlight Theme: {}", args.highlight_theme);
    if let Some(path) = &args.transcript_html {
        info!("Transcript HTML: {}", path);
    }
    info!("-------------------------");

    let renderer = TranscriptRenderer::with_theme(&args.highlight_theme)?;
    let api = Arc::new(HttpChatApi::from_config(&config)?);

    let mut terminal = TerminalView::stdio();
    if let Some(path) = &args.transcript_html {
        terminal = terminal.with_mirror(
            HtmlDocumentView::new(DOCUMENT_TITLE, renderer.stylesheet()).with_output(path)
        );
    }
    let view: Arc<Mutex<dyn ChatView>> = Arc::new(Mutex::new(terminal));

    let controller = ChatController::new(api, renderer, view, config.conversation_route.clone());

    match args.conversation_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => {
            let history = match &args.history_file {
                Some(path) => load_history(path)?,
                None => Vec::new(),
            };
            controller.restore(ConversationId::new(id), history).await;
        }
        None => controller.init_view().await,
    }

    if let Some(url) = &args.url {
        if let Err(e) = controller.analyze(url).await {
            warn!("Initial analysis of {} failed: {}", url, e);
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "/quit" | "/exit" => break,
            "/transcript" => {
                print!("{}", format_transcript_for_display(&controller.transcript().await));
                continue;
            }
            _ => {}
        }

        let result = if controller.conversation_id().await.is_some() {
            controller.chat(&line).await.map(|_| ())
        } else if input.is_empty() {
            continue;
        } else {
            controller.analyze(input).await.map(|_| ())
        };

        match result {
            // already shown to the user as a notice
            Err(e) if e.is_precondition() => debug!("Input rejected: {}", e),
            Err(e) => warn!("{}", e),
            Ok(()) => {}
        }
    }

    info!("Session ended with {} messages", controller.transcript().await.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::chat::Role;

    #[test]
    fn load_history_reads_prior_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(
            &path,
            r#"[
                {"role": "user", "content": "What does main.go do?"},
                {"role": "assistant", "content": "It starts the server.", "timestamp": 1700000000}
            ]"#
        ).unwrap();

        let messages = load_history(path.to_str().unwrap()).unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].timestamp, 0);
        assert_eq!(messages[1].content, "It starts the server.");
        assert_eq!(messages[1].timestamp, 1700000000);
    }

    #[test]
    fn load_history_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, r#"[{"role": "system", "content": "x"}]"#).unwrap();

        let err = load_history(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse history file"));
    }

    #[test]
    fn load_history_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let err = load_history(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read history file"));
    }
}
