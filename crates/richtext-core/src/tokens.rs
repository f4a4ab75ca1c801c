//! Tokenizer output and its line-partitioned flattening.
//!
//! A tokenizer returns a stream of [`Token`]s that may nest (a string token inside a
//! template-literal token inside ...). Renderers need flat `(text, classification)` fragments per
//! source line, which is what [`tokens_for_lines`] produces.

/// Classification of text that no typed token covers.
pub const PLAIN_TOKEN: &str = "plain";

/// A token produced by a [`Tokenizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Unclassified text.
    Text(String),
    /// Classified content.
    Typed {
        /// Classification (e.g. `"keyword"`, `"string"`).
        kind: String,
        /// Token content.
        content: TokenContent,
    },
}

/// Content of a typed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenContent {
    /// Leaf text, classified by the token itself.
    Text(String),
    /// One nested token.
    Single(Box<Token>),
    /// Nested tokens.
    List(Vec<Token>),
}

impl Token {
    /// Plain text token.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Typed token with leaf text.
    pub fn typed(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Typed {
            kind: kind.into(),
            content: TokenContent::Text(text.into()),
        }
    }

    /// Typed token with nested tokens.
    pub fn nested(kind: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self::Typed {
            kind: kind.into(),
            content: TokenContent::List(tokens),
        }
    }

    /// The source text this token covers.
    pub fn source(&self) -> String {
        let mut out = String::new();
        self.push_source(&mut out);
        out
    }

    fn push_source(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Typed { content, .. } => match content {
                TokenContent::Text(text) => out.push_str(text),
                TokenContent::Single(token) => token.push_source(out),
                TokenContent::List(tokens) => {
                    for token in tokens {
                        token.push_source(out);
                    }
                }
            },
        }
    }
}

/// A classified fragment of one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatToken {
    /// Fragment text (never empty, never contains `'\n'` once split into lines).
    pub text: String,
    /// Classification.
    pub token: String,
}

impl FlatToken {
    /// Create a fragment.
    pub fn new(text: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            token: token.into(),
        }
    }

    /// Fragment length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns `true` for an empty fragment.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns `true` for unclassified text.
    pub fn is_plain(&self) -> bool {
        self.token == PLAIN_TOKEN
    }
}

/// Flatten one token into classified fragments, dropping empty ones.
///
/// Strings take the classification of their nearest enclosing typed token (`"plain"` at the top
/// level). A typed token with leaf text uses its own classification.
pub fn flatten_token(token: &Token) -> Vec<FlatToken> {
    let mut out = Vec::new();
    flatten_into(token, PLAIN_TOKEN, &mut out);
    out
}

fn flatten_into(token: &Token, inherited: &str, out: &mut Vec<FlatToken>) {
    match token {
        Token::Text(text) => {
            if !text.is_empty() {
                out.push(FlatToken::new(text.as_str(), inherited));
            }
        }
        Token::Typed { kind, content } => match content {
            TokenContent::Text(text) => {
                if !text.is_empty() {
                    out.push(FlatToken::new(text.as_str(), kind.as_str()));
                }
            }
            TokenContent::Single(child) => flatten_into(child, kind, out),
            TokenContent::List(children) => {
                for child in children {
                    flatten_into(child, kind, out);
                }
            }
        },
    }
}

/// Split a token stream into per-line fragment lists.
///
/// Always returns at least one line; a trailing `'\n'` yields a trailing empty line.
pub fn tokens_for_lines(tokens: &[Token]) -> Vec<Vec<FlatToken>> {
    let mut lines: Vec<Vec<FlatToken>> = vec![Vec::new()];
    for token in tokens {
        for fragment in flatten_token(token) {
            for (index, part) in fragment.text.split('\n').enumerate() {
                if index > 0 {
                    lines.push(Vec::new());
                }
                if !part.is_empty()
                    && let Some(line) = lines.last_mut()
                {
                    line.push(FlatToken::new(part, fragment.token.as_str()));
                }
            }
        }
    }
    lines
}

/// Syntax tokenizer used for code-block highlighting.
pub trait Tokenizer {
    /// Compiled grammar handle.
    type Grammar;

    /// Find the grammar for a language identifier. Unknown languages yield `None`.
    fn lookup_grammar(&self, language: &str) -> Option<&Self::Grammar>;

    /// Tokenize `code` with `grammar`.
    fn tokenize(&self, code: &str, grammar: &Self::Grammar) -> Vec<Token>;
}

/// Tokenizer with no grammars; every code block renders unhighlighted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHighlight;

impl Tokenizer for NoHighlight {
    type Grammar = ();

    fn lookup_grammar(&self, _language: &str) -> Option<&()> {
        None
    }

    fn tokenize(&self, code: &str, _grammar: &()) -> Vec<Token> {
        vec![Token::text(code)]
    }
}
