pub mod highlight;
pub mod markdown;

use crate::error::{ ConfigError, RenderError };
use crate::models::chat::{ ChatMessage, Role };
use self::highlight::{ Highlighter, SyntectHighlighter };
use self::markdown::{ CommonMarkEngine, MarkdownEngine };
use log::warn;
use std::panic::{ self, AssertUnwindSafe };
use std::sync::Arc;

/// What the view should append for one message. `html` is safe to insert
/// as markup; `source` is the untouched message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageNode {
    pub role: Role,
    pub class_name: &'static str,
    pub html: String,
    pub source: String,
    pub plain: bool,
}

pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Clone)]
pub struct TranscriptRenderer {
    markdown: Arc<dyn MarkdownEngine>,
    highlighter: Arc<dyn Highlighter>,
}

impl TranscriptRenderer {
    pub fn new(markdown: Arc<dyn MarkdownEngine>, highlighter: Arc<dyn Highlighter>) -> Self {
        Self { markdown, highlighter }
    }

    pub fn with_theme(theme: &str) -> Result<Self, ConfigError> {
        Ok(
            Self::new(
                Arc::new(CommonMarkEngine::default()),
                Arc::new(SyntectHighlighter::new(theme)?)
            )
        )
    }

    pub fn stylesheet(&self) -> String {
        self.highlighter.stylesheet()
    }

    /// Pure function of the message: the same input always yields the same node.
    pub fn render(&self, message: &ChatMessage) -> MessageNode {
        let (html, plain) = match message.role {
            Role::User => (html_escape(&message.content), true),
            Role::Assistant =>
                match self.render_markdown(&message.content) {
                    Ok(html) => (html, false),
                    Err(e) => {
                        warn!("Rendering assistant message as plain text: {}", e);
                        (html_escape(&message.content), true)
                    }
                }
        };

        MessageNode {
            role: message.role,
            class_name: match message.role {
                Role::User => "message user",
                Role::Assistant => "message assistant",
            },
            html,
            source: message.content.clone(),
            plain,
        }
    }

    fn render_markdown(&self, content: &str) -> Result<String, RenderError> {
        let markdown = &self.markdown;
        let highlighter = self.highlighter.as_ref();
        panic
            ::catch_unwind(AssertUnwindSafe(|| markdown.render(content, highlighter)))
            .unwrap_or(Err(RenderError::Panicked))
    }
}

impl Default for TranscriptRenderer {
    fn default() -> Self {
        Self::new(Arc::new(CommonMarkEngine::default()), Arc::new(SyntectHighlighter::default()))
    }
}
