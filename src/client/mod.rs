pub mod http;

use async_trait::async_trait;
use crate::error::ChatError;
use crate::models::api::{ AnalyzeResponse, ChatReply, ConversationId };

pub use self::http::HttpChatApi;

/// The two server calls the controller depends on.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn analyze(&self, url: &str) -> Result<AnalyzeResponse, ChatError>;

    /// `Ok(ChatReply::Error)` when the server answered with an `error` field.
    async fn chat(
        &self,
        message: &str,
        conversation_id: &ConversationId
    ) -> Result<ChatReply, ChatError>;
}
