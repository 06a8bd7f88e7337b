use serde::{ Deserialize, Deserializer, Serialize };
use std::fmt;

/// Opaque conversation token. The analyze endpoint may send it as a JSON
/// string or as an integer row id; both are kept as the same string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ConversationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Unsigned(u64),
        }

        Ok(
            match Raw::deserialize(deserializer)? {
                Raw::Text(s) => ConversationId(s),
                Raw::Int(n) => ConversationId(n.to_string()),
                Raw::Unsigned(n) => ConversationId(n.to_string()),
            }
        )
    }
}

#[derive(Serialize, Debug)]
pub struct AnalyzeRequest<'a> {
    pub url: &'a str,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AnalyzeResponse {
    pub conversation_id: ConversationId,
    pub response: String,
}

#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub conversation_id: &'a ConversationId,
}

/// Raw `/chat` body. `error` wins over `response` when both are present.
#[derive(Deserialize, Debug, Default)]
pub struct ChatResponseBody {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    Response(String),
    Error(String),
}

impl ChatResponseBody {
    pub fn into_reply(self) -> Option<ChatReply> {
        match (self.error, self.response) {
            (Some(err), _) => Some(ChatReply::Error(err)),
            (None, Some(text)) => Some(ChatReply::Response(text)),
            (None, None) => None,
        }
    }
}
