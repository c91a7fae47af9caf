//! Per-instance widget configuration.
//!
//! DESIGN
//! ======
//! Every option is a plain scalar with a documented default. Both sources
//! (embedding attributes and environment variables) funnel through one
//! `set_option` method keyed by the attribute name, so they cannot drift.
//! Unknown keys and unparseable values are ignored and the default stays in
//! place; configuration never fails.

use std::time::Duration;

use crate::i18n::Language;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_CHAT_API_URL: &str = "http://localhost:8000/chatbot/query";
pub const DEFAULT_SEARCH_API_URL: &str = "http://localhost:5000/api/search";
pub const DEFAULT_BUTTON_TEXT: &str = "Chat with MeriBot";
pub const DEFAULT_BUTTON_COLOR: &str = "#2c3e50";
pub const DEFAULT_TITLE: &str = "MeriBot Assistant";
pub const DEFAULT_SUBTITLE: &str = "How can I help you today?";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Option keys understood by [`WidgetConfig::set_option`].
pub const CHAT_OPTION_KEYS: &[&str] = &[
    "api-url",
    "position",
    "button-text",
    "button-color",
    "title",
    "subtitle",
    "auto-open",
    "debug",
    "language",
    "timeout",
    "send-history",
    "suggested-questions",
];

/// Option keys understood by [`SearchConfig::set_option`].
pub const SEARCH_OPTION_KEYS: &[&str] = &["api-url", "position", "language", "timeout", "debug"];

/// Screen corner the widget is anchored to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl Position {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bottom-right" => Some(Self::BottomRight),
            "bottom-left" => Some(Self::BottomLeft),
            "top-right" => Some(Self::TopRight),
            "top-left" => Some(Self::TopLeft),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BottomRight => "bottom-right",
            Self::BottomLeft => "bottom-left",
            Self::TopRight => "top-right",
            Self::TopLeft => "top-left",
        }
    }

    #[must_use]
    pub fn is_bottom(self) -> bool {
        matches!(self, Self::BottomRight | Self::BottomLeft)
    }

    #[must_use]
    pub fn is_right(self) -> bool {
        matches!(self, Self::BottomRight | Self::TopRight)
    }
}

// =============================================================================
// CHAT WIDGET
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetConfig {
    pub api_url: String,
    pub position: Position,
    pub button_text: String,
    pub button_color: String,
    pub title: String,
    pub subtitle: String,
    pub auto_open: bool,
    /// Emit per-request debug diagnostics.
    pub debug: bool,
    pub language: Language,
    pub request_timeout_secs: u64,
    /// Replay prior messages to the backend as `history`.
    pub send_history: bool,
    pub suggested_questions: Vec<String>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_CHAT_API_URL.to_owned(),
            position: Position::default(),
            button_text: DEFAULT_BUTTON_TEXT.to_owned(),
            button_color: DEFAULT_BUTTON_COLOR.to_owned(),
            title: DEFAULT_TITLE.to_owned(),
            subtitle: DEFAULT_SUBTITLE.to_owned(),
            auto_open: false,
            debug: false,
            language: Language::English,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            send_history: false,
            suggested_questions: Vec::new(),
        }
    }
}

impl WidgetConfig {
    /// Build config from embedding attributes such as `data-api-url`.
    ///
    /// The `data-` prefix is optional. Later duplicates win.
    pub fn from_attributes<'a, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();
        for (key, value) in attributes {
            config.set_option(key, value);
        }
        config
    }

    /// Build config from `WIDGET_*` environment variables.
    ///
    /// Each key in [`CHAT_OPTION_KEYS`] maps to `WIDGET_<KEY>` with dashes as
    /// underscores, e.g. `api-url` -> `WIDGET_API_URL`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        for key in CHAT_OPTION_KEYS {
            if let Some(value) = env_option("WIDGET", key) {
                config.set_option(key, &value);
            }
        }
        config
    }

    /// Apply a single option. Returns `false` when the key is unknown or the
    /// value is rejected, leaving the previous value in place.
    pub fn set_option(&mut self, key: &str, value: &str) -> bool {
        let value = value.trim();
        match normalize_key(key).as_str() {
            "api-url" => set_non_empty(&mut self.api_url, value),
            "position" => set_parsed(&mut self.position, Position::parse(value)),
            "button-text" => set_non_empty(&mut self.button_text, value),
            "button-color" => set_non_empty(&mut self.button_color, value),
            "title" => set_non_empty(&mut self.title, value),
            "subtitle" => set_non_empty(&mut self.subtitle, value),
            "auto-open" => {
                self.auto_open = parse_flag(value);
                true
            }
            "debug" => {
                self.debug = parse_flag(value);
                true
            }
            "send-history" => {
                self.send_history = parse_flag(value);
                true
            }
            "language" => set_parsed(&mut self.language, Language::parse(value)),
            "timeout" => set_parsed(&mut self.request_timeout_secs, parse_timeout(value)),
            "suggested-questions" => {
                self.suggested_questions = split_list(value);
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// =============================================================================
// SEARCH OVERLAY
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    pub api_url: String,
    pub position: Position,
    pub language: Language,
    pub request_timeout_secs: u64,
    pub debug: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_SEARCH_API_URL.to_owned(),
            position: Position::default(),
            language: Language::Spanish,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            debug: false,
        }
    }
}

impl SearchConfig {
    pub fn from_attributes<'a, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();
        for (key, value) in attributes {
            config.set_option(key, value);
        }
        config
    }

    /// Build config from `SEARCH_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        for key in SEARCH_OPTION_KEYS {
            if let Some(value) = env_option("SEARCH", key) {
                config.set_option(key, &value);
            }
        }
        config
    }

    pub fn set_option(&mut self, key: &str, value: &str) -> bool {
        let value = value.trim();
        match normalize_key(key).as_str() {
            "api-url" => set_non_empty(&mut self.api_url, value),
            "position" => set_parsed(&mut self.position, Position::parse(value)),
            "language" => set_parsed(&mut self.language, Language::parse(value)),
            "timeout" => set_parsed(&mut self.request_timeout_secs, parse_timeout(value)),
            "debug" => {
                self.debug = parse_flag(value);
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// =============================================================================
// PARSING HELPERS
// =============================================================================

fn normalize_key(key: &str) -> String {
    let key = key.trim().to_ascii_lowercase().replace('_', "-");
    key.strip_prefix("data-").map(str::to_owned).unwrap_or(key)
}

fn env_option(prefix: &str, key: &str) -> Option<String> {
    let var = format!("{prefix}_{}", key.to_ascii_uppercase().replace('-', "_"));
    std::env::var(var).ok()
}

/// Flags are set only by the exact value `true`; anything else clears them.
fn parse_flag(value: &str) -> bool {
    value == "true"
}

fn parse_timeout(value: &str) -> Option<u64> {
    value.parse::<u64>().ok().filter(|secs| *secs > 0)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split('|')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

fn set_non_empty(slot: &mut String, value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    value.clone_into(slot);
    true
}

fn set_parsed<T>(slot: &mut T, parsed: Option<T>) -> bool {
    match parsed {
        Some(value) => {
            *slot = value;
            true
        }
        None => false,
    }
}
