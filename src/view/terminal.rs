use super::html::HtmlDocumentView;
use super::{ ChatView, Notice, NoticeLevel };
use crate::models::chat::Role;
use crate::render::MessageNode;
use log::info;
use std::io::{ self, Write };

/// Line-oriented view for the interactive binary. Messages print their
/// source text; an optional HTML document mirrors every update.
pub struct TerminalView {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
    mirror: Option<HtmlDocumentView>,
    chat_enabled: bool,
    url_form_visible: bool,
    // a request is in flight; its control comes back with the prompt
    pending: bool,
}

impl TerminalView {
    pub fn new(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            err,
            mirror: None,
            chat_enabled: false,
            url_form_visible: true,
            pending: false,
        }
    }

    pub fn stdio() -> Self {
        Self::new(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn with_mirror(mut self, mirror: HtmlDocumentView) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn prompt(&self) -> &'static str {
        if self.chat_enabled {
            "you> "
        } else if self.url_form_visible {
            "repository url> "
        } else {
            "... "
        }
    }

    fn print_prompt(&mut self) {
        let prompt = self.prompt();
        let _ = write!(self.out, "{}", prompt);
        let _ = self.out.flush();
    }
}

impl ChatView for TerminalView {
    fn append_message(&mut self, node: &MessageNode) {
        // the user's own line is already on screen
        if node.role == Role::Assistant {
            let _ = writeln!(self.out, "\nassistant>\n{}\n", node.source.trim_end());
        }
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.append_message(node);
        }
    }

    fn scroll_to_bottom(&mut self) {
        let _ = self.out.flush();
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.scroll_to_bottom();
        }
    }

    fn set_url_form_visible(&mut self, visible: bool) {
        self.url_form_visible = visible;
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.set_url_form_visible(visible);
        }
    }

    fn set_analyze_enabled(&mut self, enabled: bool) {
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.set_analyze_enabled(enabled);
        }
        // with the form hidden there is no analysis to announce
        if !self.url_form_visible {
            self.pending = false;
            return;
        }
        if enabled {
            self.pending = false;
            self.print_prompt();
        } else {
            self.pending = true;
            let _ = writeln!(self.out, "Analyzing, please wait...");
        }
    }

    fn set_chat_enabled(&mut self, enabled: bool) {
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.set_chat_enabled(enabled);
        }
        if enabled {
            self.chat_enabled = true;
            self.pending = false;
            self.print_prompt();
        } else {
            self.pending = self.chat_enabled;
            self.chat_enabled = false;
        }
    }

    fn clear_message_input(&mut self) {
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.clear_message_input();
        }
    }

    fn notify(&mut self, notice: Notice) {
        let _ = writeln!(self.err, "{}", notice);
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.notify(notice.clone());
        }
        if notice.level != NoticeLevel::Info && !self.pending {
            self.print_prompt();
        }
    }

    fn supports_location(&self) -> bool {
        true
    }

    fn replace_location(&mut self, path: &str) {
        info!("Conversation available at {}", path);
        let _ = writeln!(self.out, "(conversation: {})", path);
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.replace_location(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::ChatMessage;
    use crate::render::TranscriptRenderer;
    use std::sync::{ Arc, Mutex };

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn prints_assistant_source_and_notices() {
        let out = SharedBuf::default();
        let err = SharedBuf::default();
        let mut view = TerminalView::new(Box::new(out.clone()), Box::new(err.clone()));
        let renderer = TranscriptRenderer::default();

        view.append_message(&renderer.render(&ChatMessage::user("question")));
        view.append_message(&renderer.render(&ChatMessage::assistant("**answer**")));
        view.notify(Notice::error("Something went wrong"));

        let printed = out.contents();
        assert!(printed.contains("assistant>\n**answer**"));
        assert!(!printed.contains("question"));
        assert!(err.contents().contains("[error] Something went wrong"));
    }

    #[test]
    fn prompt_follows_affordances() {
        let mut view = TerminalView::new(Box::new(io::sink()), Box::new(io::sink()));
        assert_eq!(view.prompt(), "repository url> ");
        view.set_url_form_visible(false);
        assert_eq!(view.prompt(), "... ");
        view.set_chat_enabled(true);
        assert_eq!(view.prompt(), "you> ");
    }

    #[test]
    fn prompt_comes_once_after_each_answer() {
        let out = SharedBuf::default();
        let err = SharedBuf::default();
        let mut view = TerminalView::new(Box::new(out.clone()), Box::new(err.clone()));
        let renderer = TranscriptRenderer::default();

        // analyze that succeeds
        view.set_analyze_enabled(false);
        view.append_message(&renderer.render(&ChatMessage::assistant("Analysis done.")));
        view.scroll_to_bottom();
        view.set_url_form_visible(false);
        view.set_analyze_enabled(true);
        view.replace_location("/history/c1");
        view.set_chat_enabled(true);
        assert_eq!(
            out.contents(),
            "Analyzing, please wait...\n\nassistant>\nAnalysis done.\n\n(conversation: /history/c1)\nyou> "
        );

        // chat that fails
        view.append_message(&renderer.render(&ChatMessage::user("hi")));
        view.scroll_to_bottom();
        view.clear_message_input();
        view.set_chat_enabled(false);
        view.notify(Notice::error("Conversation not found"));
        view.set_chat_enabled(true);

        let printed = out.contents();
        assert!(printed.ends_with("(conversation: /history/c1)\nyou> you> "));
        assert!(!printed.contains("... "));
        assert_eq!(err.contents(), "[error] Conversation not found\n");
    }

    #[test]
    fn failed_analysis_and_rejected_input_prompt_again() {
        let out = SharedBuf::default();
        let mut view = TerminalView::new(Box::new(out.clone()), Box::new(io::sink()));

        view.set_analyze_enabled(false);
        view.notify(Notice::error("Something went wrong. Please try again."));
        view.set_analyze_enabled(true);
        assert_eq!(out.contents(), "Analyzing, please wait...\nrepository url> ");

        view.set_url_form_visible(false);
        view.set_analyze_enabled(false);
        view.set_chat_enabled(true);
        view.notify(Notice::warning("Please enter a message."));
        view.notify(Notice::info("Resumed conversation 3"));
        assert!(out.contents().ends_with("repository url> you> you> "));
    }

    #[test]
    fn mirror_receives_updates() {
        let renderer = TranscriptRenderer::default();
        let mut view = TerminalView::new(Box::new(io::sink()), Box::new(io::sink()))
            .with_mirror(HtmlDocumentView::new("Chat", String::new()));
        view.append_message(&renderer.render(&ChatMessage::assistant("hi")));
        view.replace_location("/history/7");

        let mirror = view.mirror.as_ref().unwrap();
        assert_eq!(mirror.node_count(), 1);
        assert_eq!(mirror.location(), Some("/history/7"));
    }
}
