use async_trait::async_trait;
use log::{ debug, warn };
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use url::Url;

use super::ChatApi;
use crate::config::ClientConfig;
use crate::error::{ ChatError, ConfigError };
use crate::models::api::{
    AnalyzeRequest,
    AnalyzeResponse,
    ChatReply,
    ChatRequest,
    ChatResponseBody,
    ConversationId,
};

#[derive(Debug, Clone)]
pub struct HttpChatApi {
    http: HttpClient,
    analyze_url: Url,
    chat_url: Url,
}

impl HttpChatApi {
    pub fn new(http: HttpClient, analyze_url: Url, chat_url: Url) -> Self {
        Self { http, analyze_url, chat_url }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let mut builder = HttpClient::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(builder.build()?, config.analyze_url.clone(), config.chat_url.clone()))
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ChatError> {
    serde_json::from_str(body).map_err(|e| ChatError::MalformedResponse(e.to_string()))
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn analyze(&self, url: &str) -> Result<AnalyzeResponse, ChatError> {
        debug!("POST {}", self.analyze_url);
        let resp = self.http
            .post(self.analyze_url.clone())
            .json(&AnalyzeRequest { url })
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ChatError::Status(status));
        }
        let body = resp.text().await?;
        parse_body::<AnalyzeResponse>(&body)
    }

    async fn chat(
        &self,
        message: &str,
        conversation_id: &ConversationId
    ) -> Result<ChatReply, ChatError> {
        debug!("POST {} (conversation {})", self.chat_url, conversation_id);
        let resp = self.http
            .post(self.chat_url.clone())
            .json(&ChatRequest { message, conversation_id })
            .send().await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            // surface the server's own explanation when it sent one
            let parsed = serde_json::from_str::<ChatResponseBody>(&body);
            if let Ok(ChatResponseBody { error: Some(err), .. }) = parsed {
                warn!("Chat request failed with HTTP {}: {}", status, err);
                return Ok(ChatReply::Error(err));
            }
            return Err(ChatError::Status(status));
        }

        parse_body::<ChatResponseBody>(&body)?
            .into_reply()
            .ok_or_else(|| {
                ChatError::MalformedResponse("expected 'response' or 'error' field".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{ extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router };
    use serde_json::{ json, Value };
    use std::sync::{ Arc, Mutex };

    #[derive(Clone, Default)]
    struct Recorded(Arc<Mutex<Vec<Value>>>);

    async fn analyze_ok(State(rec): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
        rec.0.lock().unwrap().push(body);
        Json(json!({ "conversation_id": 17, "response": "# Report\nAll good." }))
    }

    async fn chat_echo(State(rec): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
        let message = body["message"].as_str().unwrap_or_default().to_string();
        rec.0.lock().unwrap().push(body);
        if message == "fail" {
            Json(json!({ "error": "model unavailable" }))
        } else {
            Json(json!({ "response": format!("echo: {}", message) }))
        }
    }

    async fn not_json() -> &'static str {
        "<html>Internal error</html>"
    }

    async fn server_error() -> impl IntoResponse {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom")
    }

    async fn server_error_with_body() -> impl IntoResponse {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": "unknown conversation" })))
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn api_for(base: &str) -> HttpChatApi {
        let cfg = ClientConfig::new(base, "/analyze", "/chat", "history", 5).unwrap();
        HttpChatApi::from_config(&cfg).unwrap()
    }

    #[tokio::test]
    async fn analyze_posts_url_and_decodes_response() {
        let rec = Recorded::default();
        let base = spawn(
            Router::new().route("/analyze", post(analyze_ok)).with_state(rec.clone())
        ).await;

        let resp = api_for(&base).analyze("https://example.com/repo").await.unwrap();
        assert_eq!(resp.conversation_id, ConversationId::new("17"));
        assert_eq!(resp.response, "# Report\nAll good.");
        assert_eq!(rec.0.lock().unwrap()[0], json!({ "url": "https://example.com/repo" }));
    }

    #[tokio::test]
    async fn chat_sends_message_and_conversation_id() {
        let rec = Recorded::default();
        let base = spawn(Router::new().route("/chat", post(chat_echo)).with_state(rec.clone())).await;
        let api = api_for(&base);

        let reply = api.chat("hello", &ConversationId::new("c1")).await.unwrap();
        assert_eq!(reply, ChatReply::Response("echo: hello".into()));
        assert_eq!(
            rec.0.lock().unwrap()[0],
            json!({ "message": "hello", "conversation_id": "c1" })
        );

        let reply = api.chat("fail", &ConversationId::new("c1")).await.unwrap();
        assert_eq!(reply, ChatReply::Error("model unavailable".into()));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let base = spawn(Router::new().route("/analyze", post(not_json))).await;
        let err = api_for(&base).analyze("x").await.unwrap_err();
        assert!(matches!(err, ChatError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn http_failure_status_is_reported() {
        let base = spawn(
            Router::new()
                .route("/analyze", post(server_error))
                .route("/chat", post(server_error_with_body))
        ).await;
        let api = api_for(&base);

        let err = api.analyze("x").await.unwrap_err();
        assert!(matches!(err, ChatError::Status(s) if s == reqwest::StatusCode::INTERNAL_SERVER_ERROR));

        let reply = api.chat("hi", &ConversationId::new("c1")).await.unwrap();
        assert_eq!(reply, ChatReply::Error("unknown conversation".into()));
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = api_for(&format!("http://{}", addr)).analyze("x").await.unwrap_err();
        assert!(matches!(err, ChatError::Transport(_)));
    }
}
