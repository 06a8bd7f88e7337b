use super::highlight::Highlighter;
use super::html_escape;
use crate::error::RenderError;
use log::warn;
use pulldown_cmark::{ html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd };

const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

/// Markdown to HTML conversion. Code blocks are handed to `highlighter`.
pub trait MarkdownEngine: Send + Sync {
    fn render(&self, source: &str, highlighter: &dyn Highlighter) -> Result<String, RenderError>;
}

/// pulldown-cmark engine. Raw HTML in the source comes out as literal text.
#[derive(Debug, Clone)]
pub struct CommonMarkEngine {
    options: Options,
}

impl Default for CommonMarkEngine {
    fn default() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { options }
    }
}

impl MarkdownEngine for CommonMarkEngine {
    fn render(&self, source: &str, highlighter: &dyn Highlighter) -> Result<String, RenderError> {
        let mut events: Vec<Event<'_>> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in Parser::new_ext(source, self.options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) =>
                            info
                                .split_whitespace()
                                .next()
                                .map(|s| s.to_string()),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, body)) = code_block.take() {
                        let block = render_code_block(&body, lang.as_deref(), highlighter);
                        events.push(Event::Html(block.into()));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, body)) = code_block.as_mut() {
                        body.push_str(&text);
                    }
                }
                Event::Html(raw) | Event::InlineHtml(raw) => events.push(Event::Text(raw)),
                Event::Start(Tag::Link { link_type, dest_url, title, id }) => {
                    events.push(
                        Event::Start(Tag::Link {
                            link_type,
                            dest_url: sanitize_url(dest_url),
                            title,
                            id,
                        })
                    );
                }
                Event::Start(Tag::Image { link_type, dest_url, title, id }) => {
                    events.push(
                        Event::Start(Tag::Image {
                            link_type,
                            dest_url: sanitize_url(dest_url),
                            title,
                            id,
                        })
                    );
                }
                other => events.push(other),
            }
        }

        let mut html_output = String::with_capacity(source.len() + source.len() / 2);
        html::push_html(&mut html_output, events.into_iter());
        Ok(html_output)
    }
}

fn render_code_block(body: &str, lang: Option<&str>, highlighter: &dyn Highlighter) -> String {
    let inner = match highlighter.highlight(body, lang) {
        Ok(html) => html,
        Err(e) => {
            warn!("Falling back to plain code block: {}", e);
            html_escape(body)
        }
    };
    match lang {
        Some(lang) => format!(
            "<pre><code class=\"language-{}\">{}</code></pre>\n",
            html_escape(lang),
            inner
        ),
        None => format!("<pre><code>{}</code></pre>\n", inner),
    }
}

fn sanitize_url(url: CowStr<'_>) -> CowStr<'_> {
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    if BLOCKED_SCHEMES.iter().any(|scheme| normalized.starts_with(scheme)) {
        CowStr::Borrowed("#")
    } else {
        url
    }
}
