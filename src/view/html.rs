use super::{ ChatView, Notice, NoticeLevel };
use crate::render::{ html_escape, MessageNode };
use log::{ debug, error };
use std::fs;
use std::path::PathBuf;

const BASE_CSS: &str = "\
body{font-family:system-ui,sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem}\
#messages{height:70vh;overflow-y:auto;border:1px solid #ddd;border-radius:.5rem;padding:1rem}\
.message{margin-bottom:1rem}\
.message.user .bubble{background:#dbeafe;padding:.75rem;border-radius:.5rem;white-space:pre-wrap}\
.message.assistant .bubble{background:#f3f4f6;padding:.75rem;border-radius:.5rem}\
.message .bubble.plain{white-space:pre-wrap}\
pre{overflow-x:auto;padding:.75rem;border-radius:.375rem}\
.notice{padding:.5rem;border-radius:.375rem;margin:.5rem 0}\
.notice.error{background:#fee2e2}.notice.warning{background:#fef3c7}.notice.info{background:#e0f2fe}\
";

/// Keeps the transcript container as markup and renders a standalone
/// document, optionally rewriting it on disk after every change.
#[derive(Debug, Default)]
pub struct HtmlDocumentView {
    title: String,
    stylesheet: String,
    nodes: Vec<String>,
    scroll_anchor: Option<usize>,
    url_form_visible: bool,
    analyze_enabled: bool,
    chat_enabled: bool,
    message_input: String,
    notices: Vec<Notice>,
    location: Option<String>,
    output: Option<PathBuf>,
}

impl HtmlDocumentView {
    pub fn new(title: impl Into<String>, stylesheet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            stylesheet: stylesheet.into(),
            url_form_visible: true,
            analyze_enabled: true,
            ..Default::default()
        }
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Text typed into the message input; only cleared by the controller.
    pub fn set_message_input(&mut self, text: impl Into<String>) {
        self.message_input = text.into();
    }

    pub fn render_document(&self) -> String {
        let mut doc = String::with_capacity(4096 + self.nodes.iter().map(String::len).sum::<usize>());
        doc.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        doc.push_str(&format!("<title>{}</title>\n", html_escape(&self.title)));
        doc.push_str("<style>\n");
        doc.push_str(BASE_CSS);
        doc.push('\n');
        doc.push_str(&self.stylesheet);
        doc.push_str("</style>\n</head>\n");

        match &self.location {
            Some(loc) => doc.push_str(&format!("<body data-location=\"{}\">\n", html_escape(loc))),
            None => doc.push_str("<body>\n"),
        }

        doc.push_str(
            &format!(
                "<section id=\"urlInput\"{}><form id=\"urlForm\"><input id=\"githubUrl\" type=\"url\"><button{}>Analyze</button></form></section>\n",
                if self.url_form_visible { "" } else { " hidden" },
                if self.analyze_enabled { "" } else { " disabled" }
            )
        );

        for notice in &self.notices {
            let class = match notice.level {
                NoticeLevel::Info => "info",
                NoticeLevel::Warning => "warning",
                NoticeLevel::Error => "error",
            };
            doc.push_str(
                &format!("<div class=\"notice {}\">{}</div>\n", class, html_escape(&notice.text))
            );
        }

        doc.push_str("<div id=\"messages\">\n");
        for node in &self.nodes {
            doc.push_str(node);
        }
        doc.push_str("</div>\n");

        let disabled = if self.chat_enabled { "" } else { " disabled" };
        doc.push_str(
            &format!(
                "<form id=\"chatForm\"><input id=\"userMessage\" value=\"{}\"{}><button{}>Send</button></form>\n",
                html_escape(&self.message_input),
                disabled,
                disabled
            )
        );

        if let Some(anchor) = self.scroll_anchor {
            doc.push_str(
                &format!(
                    "<script>(function(){{var m=document.getElementById('messages');var last=document.getElementById('msg-{}');if(m&&last){{m.scrollTop=m.scrollHeight;}}}})();</script>\n",
                    anchor
                )
            );
        }

        doc.push_str("</body>\n</html>\n");
        doc
    }

    fn flush(&self) {
        let Some(path) = &self.output else {
            return;
        };
        match fs::write(path, self.render_document()) {
            Ok(()) => debug!("Transcript written to {}", path.display()),
            Err(e) => error!("Failed to write transcript to {}: {}", path.display(), e),
        }
    }
}

impl ChatView for HtmlDocumentView {
    fn append_message(&mut self, node: &MessageNode) {
        let index = self.nodes.len();
        let bubble_class = if node.plain { "bubble plain" } else { "bubble" };
        self.nodes.push(
            format!(
                "<div class=\"{}\" id=\"msg-{}\"><div class=\"{}\">{}</div></div>\n",
                node.class_name,
                index,
                bubble_class,
                node.html
            )
        );
        self.flush();
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_anchor = self.nodes.len().checked_sub(1);
        self.flush();
    }

    fn set_url_form_visible(&mut self, visible: bool) {
        self.url_form_visible = visible;
        self.flush();
    }

    fn set_analyze_enabled(&mut self, enabled: bool) {
        self.analyze_enabled = enabled;
        self.flush();
    }

    fn set_chat_enabled(&mut self, enabled: bool) {
        self.chat_enabled = enabled;
        self.flush();
    }

    fn clear_message_input(&mut self) {
        self.message_input.clear();
        self.flush();
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
        self.flush();
    }

    fn supports_location(&self) -> bool {
        true
    }

    fn replace_location(&mut self, path: &str) {
        self.location = Some(path.to_string());
        self.flush();
    }
}
