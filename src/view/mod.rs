pub mod html;
pub mod terminal;

use crate::render::MessageNode;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{}] {}", tag, self.text)
    }
}

/// The page-side half of the controller: every concrete UI update goes
/// through here so rendering decisions stay testable without a document.
pub trait ChatView: Send {
    /// Add a node after every node already in the transcript container.
    fn append_message(&mut self, node: &MessageNode);

    fn scroll_to_bottom(&mut self);

    fn set_url_form_visible(&mut self, visible: bool);

    fn set_analyze_enabled(&mut self, enabled: bool);

    fn set_chat_enabled(&mut self, enabled: bool);

    fn clear_message_input(&mut self);

    fn notify(&mut self, notice: Notice);

    fn supports_location(&self) -> bool {
        false
    }

    /// Replace the visible location without reloading the view.
    fn replace_location(&mut self, _path: &str) {}
}
