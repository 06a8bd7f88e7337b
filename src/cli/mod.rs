use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Endpoint Args ---
    /// Base URL of the analysis server (e.g., http://127.0.0.1:5000)
    #[arg(long, env = "REPO_CHAT_BASE_URL", default_value = "http://127.0.0.1:5000")]
    pub base_url: String,

    /// Path of the analyze endpoint, resolved against the base URL.
    #[arg(long, env = "ANALYZE_PATH", default_value = "/analyze")]
    pub analyze_path: String,

    /// Path of the chat endpoint, resolved against the base URL.
    #[arg(long, env = "CHAT_PATH", default_value = "/chat")]
    pub chat_path: String,

    /// Route prefix under which the server exposes a conversation (/<route>/<id>).
    #[arg(long, env = "CONVERSATION_ROUTE", default_value = "history")]
    pub conversation_route: String,

    /// Request timeout in seconds. 0 means no timeout.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "120")]
    pub request_timeout_secs: u64,

    // --- Session Args ---
    /// Resume an existing conversation instead of starting with an analysis.
    #[arg(long, env = "CONVERSATION_ID")]
    pub conversation_id: Option<String>,

    /// JSON file with prior messages ([{"role": "user", "content": "..."}]) to replay on resume.
    #[arg(long, env = "HISTORY_FILE", requires = "conversation_id")]
    pub history_file: Option<String>,

    /// Repository URL to analyze right away.
    #[arg(long)]
    pub url: Option<String>,

    // --- Rendering Args ---
    /// Syntax highlighting theme for code blocks.
    #[arg(long, env = "HIGHLIGHT_THEME", default_value = "base16-ocean.dark")]
    pub highlight_theme: String,

    /// Write the rendered transcript as an HTML document to this path after every change.
    #[arg(long, env = "TRANSCRIPT_HTML")]
    pub transcript_html: Option<String>,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
