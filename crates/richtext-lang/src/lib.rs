#![warn(missing_docs)]
//! `richtext-lang` - static language catalog for `richtext-core` code blocks.
//!
//! This crate intentionally stays lightweight and does **not** depend on any tokenizer. It
//! provides the list a language selector shows, the default language for new code blocks and the
//! sentinel that disables highlighting.

/// A selectable code-block language: a display label and the identifier stored in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageOption {
    /// Human-readable label (e.g. `"C++"`).
    pub label: &'static str,
    /// Identifier stored in a code block's `language` field (e.g. `"cpp"`).
    pub id: &'static str,
}

impl LanguageOption {
    const fn new(label: &'static str, id: &'static str) -> Self {
        Self { label, id }
    }
}

/// Language identifier meaning "no highlighting".
pub const PLAIN_TEXT_LANGUAGE: &str = "plaintext";

/// Language assigned to newly inserted code blocks.
pub const DEFAULT_LANGUAGE: &str = "javascript";

/// Languages offered by the code-block language selector, in display order.
pub const SUPPORTED_LANGUAGES: &[LanguageOption] = &[
    LanguageOption::new("Plain Text", PLAIN_TEXT_LANGUAGE),
    LanguageOption::new("JavaScript", "javascript"),
    LanguageOption::new("TypeScript", "typescript"),
    LanguageOption::new("JSX", "jsx"),
    LanguageOption::new("TSX", "tsx"),
    LanguageOption::new("HTML", "html"),
    LanguageOption::new("CSS", "css"),
    LanguageOption::new("JSON", "json"),
    LanguageOption::new("Markdown", "markdown"),
    LanguageOption::new("Python", "python"),
    LanguageOption::new("Rust", "rust"),
    LanguageOption::new("Go", "go"),
    LanguageOption::new("Java", "java"),
    LanguageOption::new("C", "c"),
    LanguageOption::new("C++", "cpp"),
    LanguageOption::new("C#", "csharp"),
    LanguageOption::new("Ruby", "ruby"),
    LanguageOption::new("PHP", "php"),
    LanguageOption::new("SQL", "sql"),
    LanguageOption::new("Bash", "bash"),
    LanguageOption::new("YAML", "yaml"),
    LanguageOption::new("TOML", "toml"),
];

/// Returns `true` if `id` appears in [`SUPPORTED_LANGUAGES`].
pub fn is_supported_language(id: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|lang| lang.id == id)
}

/// Look up the display label for a language identifier.
pub fn label_for(id: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|lang| lang.id == id)
        .map(|lang| lang.label)
}

/// Returns `true` if a code block with this language should not be highlighted.
///
/// Both the empty string and [`PLAIN_TEXT_LANGUAGE`] disable highlighting.
pub fn is_plain_text(id: &str) -> bool {
    id.is_empty() || id == PLAIN_TEXT_LANGUAGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lists_plain_text_first() {
        assert_eq!(SUPPORTED_LANGUAGES[0].id, PLAIN_TEXT_LANGUAGE);
        assert_eq!(SUPPORTED_LANGUAGES.len(), 22);
        assert!(is_supported_language(DEFAULT_LANGUAGE));
    }

    #[test]
    fn test_label_lookup() {
        assert_eq!(label_for("cpp"), Some("C++"));
        assert_eq!(label_for("csharp"), Some("C#"));
        assert_eq!(label_for("cobol"), None);
    }

    #[test]
    fn test_plain_text_sentinel() {
        assert!(is_plain_text(""));
        assert!(is_plain_text("plaintext"));
        assert!(!is_plain_text("rust"));
    }
}
