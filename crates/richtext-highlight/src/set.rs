use crate::error::GrammarError;
use crate::grammar::Grammar;
use richtext_core::{Token, Tokenizer};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Grammars shipped with the crate, keyed by language identifier.
pub const BUILTIN_GRAMMARS: &[(&str, &str)] = &[
    ("javascript", include_str!("../grammars/javascript.yaml")),
    ("typescript", include_str!("../grammars/typescript.yaml")),
    ("jsx", include_str!("../grammars/jsx.yaml")),
    ("tsx", include_str!("../grammars/tsx.yaml")),
    ("json", include_str!("../grammars/json.yaml")),
    ("rust", include_str!("../grammars/rust.yaml")),
    ("python", include_str!("../grammars/python.yaml")),
    ("bash", include_str!("../grammars/bash.yaml")),
    ("css", include_str!("../grammars/css.yaml")),
    ("sql", include_str!("../grammars/sql.yaml")),
    ("toml", include_str!("../grammars/toml.yaml")),
    ("yaml", include_str!("../grammars/yaml.yaml")),
    ("go", include_str!("../grammars/go.yaml")),
    ("c", include_str!("../grammars/c.yaml")),
    ("cpp", include_str!("../grammars/cpp.yaml")),
    ("java", include_str!("../grammars/java.yaml")),
];

#[derive(Debug, Default)]
/// A collection of compiled grammars, addressable by name or alias (case-insensitive).
pub struct GrammarSet {
    grammars: Vec<Grammar>,
    by_name: HashMap<String, usize>,
}

impl GrammarSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding every built-in grammar.
    ///
    /// A built-in that fails to compile is logged and left out.
    pub fn with_builtins() -> Self {
        let mut set = Self::new();
        for (name, yaml) in BUILTIN_GRAMMARS {
            if let Err(err) = set.load_from_str(yaml) {
                warn!(grammar = name, %err, "built-in grammar failed to compile");
            }
        }
        set
    }

    /// Load a grammar from a YAML string and register it, replacing one with the same name.
    pub fn load_from_str(&mut self, yaml: &str) -> Result<&Grammar, GrammarError> {
        let grammar = Grammar::from_yaml(yaml)?;
        Ok(self.register(grammar))
    }

    /// Register a compiled grammar under its name and aliases.
    pub fn register(&mut self, grammar: Grammar) -> &Grammar {
        let key = grammar.name().to_ascii_lowercase();
        let index = match self.by_name.get(&key) {
            Some(&index) => {
                self.grammars[index] = grammar;
                index
            }
            None => {
                self.grammars.push(grammar);
                self.grammars.len() - 1
            }
        };
        let grammar = &self.grammars[index];
        debug!(grammar = grammar.name(), rules = grammar.rules().len(), "registered grammar");
        let keys = std::iter::once(grammar.name()).chain(grammar.aliases().iter().map(String::as_str));
        for key in keys {
            self.by_name.insert(key.to_ascii_lowercase(), index);
        }
        &self.grammars[index]
    }

    /// Look up a grammar by name or alias.
    pub fn get(&self, language: &str) -> Option<&Grammar> {
        self.by_name
            .get(&language.to_ascii_lowercase())
            .and_then(|&index| self.grammars.get(index))
    }

    /// Returns `true` if `language` resolves to a grammar.
    pub fn contains(&self, language: &str) -> bool {
        self.get(language).is_some()
    }

    /// Names of the registered grammars, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.grammars.iter().map(Grammar::name)
    }

    /// Number of registered grammars.
    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    /// Returns `true` if no grammar is registered.
    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }

    /// Tokenize `code` with the grammar for `language`.
    pub fn tokenize_as(&self, language: &str, code: &str) -> Result<Vec<Token>, GrammarError> {
        self.get(language)
            .map(|grammar| grammar.tokenize(code))
            .ok_or_else(|| GrammarError::UnknownGrammar(language.to_string()))
    }
}

impl Tokenizer for GrammarSet {
    type Grammar = Grammar;

    fn lookup_grammar(&self, language: &str) -> Option<&Grammar> {
        self.get(language)
    }

    fn tokenize(&self, code: &str, grammar: &Grammar) -> Vec<Token> {
        grammar.tokenize(code)
    }
}
