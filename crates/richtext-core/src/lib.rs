#![warn(missing_docs)]
//! Richtext Core - Headless Rich-Text Document Engine
//!
//! # Overview
//!
//! `richtext-core` is a headless rich-text editor kernel: a tree-structured document of
//! paragraphs, headings, quotes and code blocks, an operation log that keeps the selection valid
//! across edits, and a code-block subsystem that keeps code blocks well-formed and highlighted.
//! It does not render anything; hosts pull a [`DocumentSnapshot`] and draw it however they like.
//!
//! # Core Features
//!
//! - **Slate-style tree model**: blocks with text-run leaves, addressed by [`Path`] and [`Point`]
//! - **Operation log**: every mutation is an [`Operation`] that transforms the selection
//! - **Fixed-point normalization**: structural invariants are restored after every command
//! - **Code blocks**: line-structured code with Enter/Backspace/Tab/Shift+Enter behaviors
//! - **Highlight decorations**: token ranges recomputed from `(code, language)`, never stored
//! - **State Tracking**: version numbers and change notifications carrying the settled value
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Command Interface & State Management       │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Snapshot API (DocumentSnapshot)            │  ← Rendering Data
//! ├─────────────────────────────────────────────┤
//! │  Decorations & Token Flattening             │  ← Visual Enhancement
//! ├─────────────────────────────────────────────┤
//! │  Edit Behaviors (EditorOps, WithCodeBlock)  │  ← Plugins
//! ├─────────────────────────────────────────────┤
//! │  Editor Core (operations, transforms)       │  ← Tree Mutation
//! ├─────────────────────────────────────────────┤
//! │  Document Tree (Node, Path, Point)          │  ← Data Model
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## Using Command Interface
//!
//! ```rust
//! use richtext_core::{Command, CommandExecutor, EditCommand, EditorConfig, Node, Point};
//!
//! let mut executor = CommandExecutor::new(
//!     vec![Node::code_block("javascript", &["function f() {", "  return 1;", "}"])],
//!     EditorConfig::default(),
//! );
//!
//! executor.select_point(Point::new([0, 1, 0], 11)).unwrap();
//! executor.execute(Command::Edit(EditCommand::InsertBreak)).unwrap();
//!
//! assert_eq!(executor.document().children[0].children().len(), 4);
//! assert_eq!(
//!     executor.editor().selection().map(|s| s.focus.clone()),
//!     Some(Point::new([0, 2, 0], 0))
//! );
//! ```
//!
//! ## Using State Management
//!
//! ```rust
//! use richtext_core::{EditorConfig, EditorStateManager, Node};
//!
//! let mut manager = EditorStateManager::new(vec![Node::paragraph("Hello")], EditorConfig::default());
//!
//! manager.subscribe(|change| {
//!     println!("State changed: {:?}", change.change_type);
//! });
//!
//! assert_eq!(manager.version(), 0);
//! assert!(!manager.is_modified());
//! ```
//!
//! # Module Description
//!
//! - [`node`] / [`path`] / [`document`] - Data model and queries
//! - [`operation`] - Primitive operations and point transforms
//! - [`core`](crate::core) - Editor core: selection, path refs, transforms
//! - [`ops`] - Overridable edit behaviors and default normalization
//! - [`code_block`] - Code-block plugin
//! - [`normalize`] - Fixed-point structural enforcer
//! - [`tokens`] / [`decorations`] - Tokenizer seam and highlight ranges
//! - [`snapshot`] - Headless render snapshot
//! - [`commands`] - Unified command interface
//! - [`state`] - State management and change notifications

pub mod code_block;
pub mod commands;
pub mod config;
pub mod core;
pub mod decorations;
pub mod document;
pub mod formatting;
pub mod hotkeys;
pub mod node;
pub mod normalize;
pub mod operation;
pub mod ops;
pub mod path;
pub mod snapshot;
pub mod state;
pub mod tokens;

pub use code_block::{WithCodeBlock, exit_code_block, insert_code_block, insert_tab, set_language};
pub use commands::{
    Command, CommandError, CommandExecutor, CommandResult, CursorCommand, EditCommand,
    FormatCommand,
};
pub use config::EditorConfig;
pub use crate::core::{EditorCore, PathRef};
pub use decorations::{Decoration, DecorationRange, decorate, decorate_document};
pub use document::Document;
pub use formatting::BlockFormat;
pub use hotkeys::{KeyStroke, MARK_HOTKEYS, is_hotkey};
pub use node::{BlockKind, Element, HeadingLevel, InvalidHeadingLevel, Mark, Marks, Node, TextRun};
pub use normalize::{NormalizeReport, normalize};
pub use operation::Operation;
pub use ops::{DefaultOps, EditorOps, TextUnit};
pub use path::{Path, Point, Selection};
pub use snapshot::{BlockSnapshot, DocumentSnapshot, Leaf, SnapshotKind};
pub use state::{EditorStateManager, StateChange, StateChangeCallback, StateChangeType};
pub use tokens::{
    FlatToken, NoHighlight, PLAIN_TOKEN, Token, TokenContent, Tokenizer, flatten_token,
    tokens_for_lines,
};

pub use richtext_lang::{DEFAULT_LANGUAGE, PLAIN_TEXT_LANGUAGE, SUPPORTED_LANGUAGES};
