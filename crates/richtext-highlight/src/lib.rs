#![warn(missing_docs)]
//! `richtext-highlight` - YAML-defined regex tokenizer for `richtext-core` code blocks.
//!
//! Grammars are small YAML files: an ordered list of rules, each a regular expression tagged with
//! a token type. Tokenizing scans left to right and the rule whose token starts first wins, with
//! ties going to the earlier rule. Rules may classify a single capture group or carry nested
//! `inside` rules (escapes inside strings, for example).
//!
//! [`GrammarSet`] implements [`richtext_core::Tokenizer`], so it plugs straight into
//! [`richtext_core::decorate`] and [`richtext_core::DocumentSnapshot::build`].
//!
//! # Example
//!
//! ```rust
//! use richtext_core::{Document, Node, Path, decorate};
//! use richtext_highlight::GrammarSet;
//!
//! let grammars = GrammarSet::with_builtins();
//! let doc = Document::new(vec![Node::code_block("rust", &["let x = 1;"])]);
//!
//! let decorations = decorate(&doc, &Path::from([0, 0, 0]), &grammars);
//! assert_eq!(decorations[0].token, "keyword");
//! assert_eq!((decorations[0].range.start, decorations[0].range.end), (0, 3));
//! ```

mod definition;
mod error;
mod grammar;
mod set;

pub use definition::{GrammarDefinition, RuleDefinition};
pub use error::GrammarError;
pub use grammar::{Grammar, Rule};
pub use set::{BUILTIN_GRAMMARS, GrammarSet};
