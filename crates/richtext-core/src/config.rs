//! Editor configuration.

use richtext_lang::DEFAULT_LANGUAGE;
use serde::Deserialize;

/// Default cap on normalization repairs per command.
pub const DEFAULT_MAX_NORMALIZE_ITERATIONS: usize = 10_000;

/// Default text inserted by Tab inside a code line.
pub const DEFAULT_TAB_TEXT: &str = "  ";

/// Editor settings.
///
/// All fields have defaults, so a partial config (e.g. `{ "tab_text": "\t" }`) deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Language assigned to newly inserted code blocks.
    pub default_language: String,
    /// Text inserted by [`EditCommand::InsertTab`](crate::EditCommand::InsertTab).
    pub tab_text: String,
    /// Upper bound on repairs in one normalization pass.
    pub max_normalize_iterations: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_language: DEFAULT_LANGUAGE.to_string(),
            tab_text: DEFAULT_TAB_TEXT.to_string(),
            max_normalize_iterations: DEFAULT_MAX_NORMALIZE_ITERATIONS,
        }
    }
}

impl EditorConfig {
    /// Set the language of new code blocks.
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    /// Set the Tab text.
    pub fn with_tab_text(mut self, tab_text: impl Into<String>) -> Self {
        self.tab_text = tab_text.into();
        self
    }

    /// Set the normalization repair cap (at least 1).
    pub fn with_max_normalize_iterations(mut self, max: usize) -> Self {
        self.max_normalize_iterations = max.max(1);
        self
    }
}
