use crate::client::ChatApi;
use crate::config::conversation_path;
use crate::error::ChatError;
use crate::models::api::{ ChatReply, ConversationId };
use crate::models::chat::{ ChatMessage, Role, Transcript };
use crate::render::TranscriptRenderer;
use crate::session::SessionState;
use crate::view::{ ChatView, Notice };
use log::{ error, info, warn };
use std::sync::Arc;
use tokio::sync::Mutex;

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
const EMPTY_MESSAGE: &str = "Please enter a message.";
const NO_CONVERSATION: &str = "Analyze a repository before asking questions.";
const ANALYZE_BUSY: &str = "An analysis is already running.";
const CHAT_BUSY: &str = "Please wait for the current answer.";

/// Lifecycle of the most recent call of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallState {
    #[default]
    Idle,
    Pending,
    Success,
    Failure,
}

#[derive(Debug, Default)]
struct ControllerState {
    session: SessionState,
    transcript: Transcript,
    analyze: CallState,
    chat: CallState,
}

/// Owns the session and transcript and drives the view from the two
/// server calls. State and view locks are never held across a request.
pub struct ChatController {
    api: Arc<dyn ChatApi>,
    renderer: TranscriptRenderer,
    view: Arc<Mutex<dyn ChatView>>,
    state: Mutex<ControllerState>,
    conversation_route: String,
}

impl ChatController {
    pub fn new(
        api: Arc<dyn ChatApi>,
        renderer: TranscriptRenderer,
        view: Arc<Mutex<dyn ChatView>>,
        conversation_route: impl Into<String>
    ) -> Self {
        Self {
            api,
            renderer,
            view,
            state: Mutex::new(ControllerState::default()),
            conversation_route: conversation_route.into(),
        }
    }

    /// Bring the view's affordances in line with the session.
    pub async fn init_view(&self) {
        let has_conversation = self.state.lock().await.session.has_conversation();
        let mut view = self.view.lock().await;
        view.set_url_form_visible(!has_conversation);
        view.set_analyze_enabled(!has_conversation);
        view.set_chat_enabled(has_conversation);
    }

    /// Resume an existing conversation: seed the id and replay `history`.
    pub async fn restore(&self, id: ConversationId, history: Vec<ChatMessage>) {
        info!("Resuming conversation {} with {} prior messages", id, history.len());
        self.state.lock().await.session = SessionState::seeded(id.clone());
        for message in history {
            self.push(message).await;
        }
        self.notify(Notice::info(format!("Resumed conversation {}", id))).await;
        self.init_view().await;
    }

    pub async fn conversation_id(&self) -> Option<ConversationId> {
        self.state.lock().await.session.get().cloned()
    }

    pub async fn transcript(&self) -> Transcript {
        self.state.lock().await.transcript.clone()
    }

    pub async fn analyze_state(&self) -> CallState {
        self.state.lock().await.analyze
    }

    pub async fn chat_state(&self) -> CallState {
        self.state.lock().await.chat
    }

    pub async fn append(&self, role: Role, content: impl Into<String>) {
        self.push(ChatMessage::new(role, content)).await;
    }

    async fn push(&self, message: ChatMessage) {
        let node = self.renderer.render(&message);
        let mut state = self.state.lock().await;
        state.transcript.push(message);
        let mut view = self.view.lock().await;
        view.append_message(&node);
        view.scroll_to_bottom();
    }

    async fn notify(&self, notice: Notice) {
        self.view.lock().await.notify(notice);
    }

    pub async fn analyze(&self, url: &str) -> Result<ConversationId, ChatError> {
        {
            let mut state = self.state.lock().await;
            if state.analyze == CallState::Pending {
                drop(state);
                self.notify(Notice::warning(ANALYZE_BUSY)).await;
                return Err(ChatError::Busy("analyze"));
            }
            state.analyze = CallState::Pending;
        }
        self.view.lock().await.set_analyze_enabled(false);

        info!("Analyzing {}", url);
        match self.api.analyze(url).await {
            Ok(resp) => {
                let id = resp.conversation_id;
                {
                    let mut state = self.state.lock().await;
                    state.session.set(id.clone());
                    state.analyze = CallState::Success;
                }
                self.append(Role::Assistant, resp.response).await;

                // chat is enabled last so the prompt follows the analysis text
                let mut view = self.view.lock().await;
                view.set_url_form_visible(false);
                view.set_analyze_enabled(true);
                if view.supports_location() {
                    view.replace_location(&conversation_path(&self.conversation_route, &id));
                }
                view.set_chat_enabled(true);
                Ok(id)
            }
            Err(e) => {
                error!("Analyze request for {} failed: {}", url, e);
                self.state.lock().await.analyze = CallState::Failure;
                let mut view = self.view.lock().await;
                view.notify(Notice::error(GENERIC_FAILURE));
                view.set_analyze_enabled(true);
                Err(e)
            }
        }
    }

    /// Returns the assistant's answer. The user's message stays in the
    /// transcript whatever happens to the request.
    pub async fn chat(&self, message: &str) -> Result<String, ChatError> {
        if message.trim().is_empty() {
            self.notify(Notice::warning(EMPTY_MESSAGE)).await;
            return Err(ChatError::EmptyMessage);
        }

        let conversation_id = {
            let mut state = self.state.lock().await;
            let Some(id) = state.session.get().cloned() else {
                drop(state);
                warn!("Chat submitted before any conversation exists");
                self.notify(Notice::warning(NO_CONVERSATION)).await;
                return Err(ChatError::NoConversation);
            };
            if state.chat == CallState::Pending {
                drop(state);
                self.notify(Notice::warning(CHAT_BUSY)).await;
                return Err(ChatError::Busy("chat"));
            }
            state.chat = CallState::Pending;
            id
        };

        self.append(Role::User, message).await;
        {
            let mut view = self.view.lock().await;
            view.clear_message_input();
            view.set_chat_enabled(false);
        }

        let outcome = match self.api.chat(message, &conversation_id).await {
            Ok(ChatReply::Response(text)) => {
                self.append(Role::Assistant, text.clone()).await;
                Ok(text)
            }
            Ok(ChatReply::Error(server_message)) => {
                warn!("Server rejected chat message: {}", server_message);
                let text = if server_message.trim().is_empty() {
                    GENERIC_FAILURE.to_string()
                } else {
                    server_message.clone()
                };
                self.notify(Notice::error(text)).await;
                Err(ChatError::Server(server_message))
            }
            Err(e) => {
                error!("Chat request failed: {}", e);
                self.notify(Notice::error(GENERIC_FAILURE)).await;
                Err(e)
            }
        };

        self.state.lock().await.chat = if outcome.is_ok() {
            CallState::Success
        } else {
            CallState::Failure
        };
        self.view.lock().await.set_chat_enabled(true);
        outcome
    }
}
