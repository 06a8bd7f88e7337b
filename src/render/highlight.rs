use crate::error::{ ConfigError, RenderError };
use once_cell::sync::Lazy;
use syntect::highlighting::ThemeSet;
use syntect::html::{ css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator };
use syntect::parsing::{ SyntaxReference, SyntaxSet };
use syntect::util::LinesWithEndings;

pub const DEFAULT_THEME: &str = "base16-ocean.dark";

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// Turns the body of a code block into HTML. Implementations must escape
/// everything they do not wrap in markup.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, lang: Option<&str>) -> Result<String, RenderError>;

    /// CSS needed by the markup `highlight` produces.
    fn stylesheet(&self) -> String {
        String::new()
    }
}

fn class_style() -> ClassStyle {
    ClassStyle::SpacedPrefixed { prefix: "hl-" }
}

/// Class-based syntect highlighter; colours come from `stylesheet()`.
#[derive(Debug, Clone)]
pub struct SyntectHighlighter {
    theme: String,
}

impl SyntectHighlighter {
    pub fn new(theme: &str) -> Result<Self, ConfigError> {
        if !THEME_SET.themes.contains_key(theme) {
            return Err(ConfigError::UnknownTheme(theme.to_string()));
        }
        Ok(Self { theme: theme.to_string() })
    }

    fn find_syntax(lang: Option<&str>) -> &'static SyntaxReference {
        let ss: &'static SyntaxSet = &SYNTAX_SET;
        lang.map(str::trim)
            .filter(|l| !l.is_empty())
            .and_then(|l| {
                ss.find_syntax_by_token(l)
                    .or_else(|| ss.find_syntax_by_name(l))
                    .or_else(|| ss.find_syntax_by_extension(l))
            })
            .unwrap_or_else(|| ss.find_syntax_plain_text())
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self { theme: DEFAULT_THEME.to_string() }
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, lang: Option<&str>) -> Result<String, RenderError> {
        let syntax = Self::find_syntax(lang);
        let mut html_gen = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &SYNTAX_SET,
            class_style()
        );
        for line in LinesWithEndings::from(code) {
            html_gen.parse_html_for_line_which_includes_newline(line).map_err(|e| {
                RenderError::Highlight {
                    lang: lang.unwrap_or("").to_string(),
                    message: e.to_string(),
                }
            })?;
        }
        Ok(html_gen.finalize())
    }

    fn stylesheet(&self) -> String {
        match THEME_SET.themes.get(&self.theme) {
            Some(theme) => css_for_theme_with_class_style(theme, class_style()).unwrap_or_default(),
            None => String::new(),
        }
    }
}
