use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while loading, compiling or using grammars.
pub enum GrammarError {
    #[error("YAML parse error: {0}")]
    /// YAML parsing failed.
    Yaml(#[from] serde_yaml::Error),

    #[error("regex compile error for pattern '{pattern}': {message}")]
    /// A rule pattern failed to compile.
    RegexCompile {
        /// The pattern after variable expansion.
        pattern: String,
        /// The compiler error message.
        message: String,
    },

    #[error("unknown grammar '{0}'")]
    /// No grammar is registered under this name or alias.
    UnknownGrammar(String),

    #[error("rule '{0}' has an empty pattern")]
    /// A rule pattern was empty.
    EmptyPattern(String),

    #[error("unknown variable '{0}'")]
    /// A `{{name}}` reference in a pattern names no variable.
    UnknownVariable(String),

    #[error("rule '{kind}' captures group {group}, which its pattern does not have")]
    /// A rule's `capture` group does not exist in its pattern.
    MissingGroup {
        /// Rule classification.
        kind: String,
        /// Requested group index.
        group: usize,
    },
}
