use crate::cli::Args;
use crate::error::ConfigError;
use crate::models::api::ConversationId;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub analyze_url: Url,
    pub chat_url: Url,
    pub conversation_route: String,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(
        base_url: &str,
        analyze_path: &str,
        chat_path: &str,
        conversation_route: &str,
        timeout_secs: u64
    ) -> Result<Self, ConfigError> {
        let base = Url::parse(base_url).map_err(|source| ConfigError::BaseUrl {
            url: base_url.to_string(),
            source,
        })?;

        Ok(Self {
            analyze_url: join_endpoint(&base, analyze_path)?,
            chat_url: join_endpoint(&base, chat_path)?,
            base_url: base,
            conversation_route: conversation_route.trim_matches('/').to_string(),
            timeout: if timeout_secs == 0 { None } else { Some(Duration::from_secs(timeout_secs)) },
        })
    }

    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        Self::new(
            &args.base_url,
            &args.analyze_path,
            &args.chat_path,
            &args.conversation_route,
            args.request_timeout_secs
        )
    }
}

/// Location path a view shows for `id`, e.g. `/history/12`.
pub fn conversation_path(route: &str, id: &ConversationId) -> String {
    let route = route.trim_matches('/');
    if route.is_empty() {
        format!("/{}", id)
    } else {
        format!("/{}/{}", route, id)
    }
}

fn join_endpoint(base: &Url, path: &str) -> Result<Url, ConfigError> {
    // keep any base path prefix: "http://host/app" + "/analyze" -> "http://host/app/analyze"
    let mut prefixed = base.clone();
    if !prefixed.path().ends_with('/') {
        let with_slash = format!("{}/", prefixed.path());
        prefixed.set_path(&with_slash);
    }
    prefixed.join(path.trim_start_matches('/')).map_err(|source| ConfigError::Endpoint {
        path: path.to_string(),
        source,
    })
}
