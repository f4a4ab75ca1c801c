//! Command Interface Layer
//!
//! Hosts drive the editor through typed [`Command`]s executed by a [`CommandExecutor`]. Every
//! command runs against the [`EditorCore`] through the configured [`EditorOps`] (by default the
//! code-block plugin over the generic behaviors), then the document is normalized to a fixed point
//! before `execute` returns, so callers only ever observe a well-formed tree.
//!
//! # Example
//!
//! ```rust
//! use richtext_core::{Command, CommandExecutor, EditCommand, EditorConfig, Node, Point};
//!
//! let mut executor = CommandExecutor::new(
//!     vec![Node::code_block("rust", &["fn main() {}"])],
//!     EditorConfig::default(),
//! );
//! executor.select_point(Point::new([0, 0, 0], 11)).unwrap();
//! executor.execute(Command::Edit(EditCommand::InsertBreak)).unwrap();
//!
//! let block = &executor.document().children[0];
//! assert_eq!(block.children().len(), 2);
//! ```

use crate::code_block::{self, WithCodeBlock};
use crate::config::EditorConfig;
use crate::core::EditorCore;
use crate::document::Document;
use crate::formatting::{self, BlockFormat};
use crate::hotkeys::{self, KeyStroke};
use crate::node::{Mark, Marks, Node};
use crate::normalize::normalize;
use crate::operation::Operation;
use crate::ops::{DefaultOps, EditorOps, TextUnit};
use crate::path::{Path, Point, Selection};
use tracing::debug;

/// Document editing commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Insert text at the selection (replacing an expanded selection).
    InsertText {
        /// Text to insert.
        text: String,
    },
    /// Enter: split the current block (or code line).
    InsertBreak,
    /// Backspace.
    DeleteBackward {
        /// Deletion granularity.
        unit: TextUnit,
    },
    /// Delete the selected content.
    DeleteFragment,
    /// Shift+Enter inside a code block: continue with a paragraph after it.
    ExitCodeBlock,
    /// Turn the selection into a code block.
    InsertCodeBlock {
        /// Language of the new block (the configured default when `None`).
        language: Option<String>,
    },
    /// Tab inside a code line.
    InsertTab,
    /// Change a code block's language.
    SetLanguage {
        /// Code block path (the block holding the selection when `None`).
        path: Option<Path>,
        /// New language identifier.
        language: String,
    },
}

/// Selection commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorCommand {
    /// Set the selection.
    Select {
        /// New selection.
        selection: Selection,
    },
    /// Place a caret.
    SetCaret {
        /// Caret position.
        point: Point,
    },
    /// Collapse the selection to its start.
    Collapse,
    /// Remove the selection.
    Deselect,
}

/// Formatting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCommand {
    /// Toggle a mark on the selection.
    ToggleMark {
        /// Mark to toggle.
        mark: Mark,
    },
    /// Toggle the block format of the selected blocks.
    ToggleBlock {
        /// Target format.
        format: BlockFormat,
    },
}

/// Unified command enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Editing command
    Edit(EditCommand),
    /// Selection command
    Cursor(CursorCommand),
    /// Formatting command
    Format(FormatCommand),
}

/// Command execution result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    /// The command changed the document, the selection or the pending marks.
    Success,
    /// The command did not apply here (e.g. exit-code-block outside a code block).
    Noop,
}

/// Command error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// A path does not address a suitable node.
    #[error("invalid path: {0}")]
    InvalidPath(Path),
    /// A point does not address a text run offset.
    #[error("invalid point: {0}")]
    InvalidPoint(Point),
    /// An operation does not fit the current tree.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// The command needs a selection.
    #[error("the command requires a selection")]
    NoSelection,
    /// JSON (de)serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Executes commands against an [`EditorCore`].
///
/// Each command is transactional: if it fails, the document and selection are restored to their
/// state before the command.
#[derive(Debug, Clone)]
pub struct CommandExecutor<O = WithCodeBlock<DefaultOps>> {
    core: EditorCore,
    ops: O,
    config: EditorConfig,
    last_operations: Vec<Operation>,
}

impl CommandExecutor {
    /// Create an executor with the code-block plugin. The initial value is normalized.
    pub fn new(children: Vec<Node>, config: EditorConfig) -> Self {
        Self::with_ops(children, config, WithCodeBlock::new(DefaultOps))
    }

    /// Create an executor over an empty document (one empty paragraph).
    pub fn empty(config: EditorConfig) -> Self {
        Self::new(Vec::new(), config)
    }
}

impl<O: EditorOps> CommandExecutor<O> {
    /// Create an executor with custom edit behaviors. The initial value is normalized.
    pub fn with_ops(children: Vec<Node>, config: EditorConfig, ops: O) -> Self {
        let mut executor = Self {
            core: EditorCore::new(children),
            ops,
            config,
            last_operations: Vec::new(),
        };
        executor.settle();
        executor.core.take_operations();
        executor
    }

    /// The editor core.
    pub fn editor(&self) -> &EditorCore {
        &self.core
    }

    /// Mutable access to the editor core. Call [`normalize`](Self::normalize) after editing it
    /// directly.
    pub fn editor_mut(&mut self) -> &mut EditorCore {
        &mut self.core
    }

    /// The document tree.
    pub fn document(&self) -> &Document {
        self.core.document()
    }

    /// The edit behaviors.
    pub fn ops(&self) -> &O {
        &self.ops
    }

    /// The configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Operations applied by the last successful `execute` call (normalization included).
    pub fn last_operations(&self) -> &[Operation] {
        &self.last_operations
    }

    /// Shorthand for [`CursorCommand::SetCaret`].
    pub fn select_point(&mut self, point: Point) -> Result<CommandResult, CommandError> {
        self.execute(Command::Cursor(CursorCommand::SetCaret { point }))
    }

    /// Execute command
    pub fn execute(&mut self, command: Command) -> Result<CommandResult, CommandError> {
        debug!(?command, "executing command");
        self.last_operations.clear();
        self.core.take_operations();

        let checkpoint = self.core.clone();
        let selection_before = self.core.selection().cloned();
        let marks_before = self.core.pending_marks();

        let outcome = match command {
            Command::Edit(edit) => self.execute_edit(edit),
            Command::Cursor(cursor) => self.execute_cursor(cursor),
            Command::Format(format) => self.execute_format(format),
        }
        .and_then(|applied| self.normalize().map(|_| applied));

        let applied = match outcome {
            Ok(applied) => applied,
            Err(err) => {
                debug!(%err, "command failed; restoring checkpoint");
                self.core = checkpoint;
                return Err(err);
            }
        };

        self.last_operations = self.core.take_operations();
        let unchanged = self.last_operations.is_empty()
            && self.core.selection() == selection_before.as_ref()
            && self.core.pending_marks() == marks_before;
        if !applied || unchanged {
            return Ok(CommandResult::Noop);
        }
        Ok(CommandResult::Success)
    }

    /// Batch execute commands
    pub fn execute_batch(
        &mut self,
        commands: Vec<Command>,
    ) -> Result<Vec<CommandResult>, CommandError> {
        commands
            .into_iter()
            .map(|command| self.execute(command))
            .collect()
    }

    /// Execute the command bound to `stroke`; unbound keys are a no-op.
    pub fn execute_key(&mut self, stroke: &KeyStroke) -> Result<CommandResult, CommandError> {
        let in_code_line = code_block::focused_code_line(&self.core).is_some();
        match hotkeys::command_for_key(stroke, in_code_line) {
            Some(command) => self.execute(command),
            None => Ok(CommandResult::Noop),
        }
    }

    /// Normalize the document to a fixed point.
    pub fn normalize(&mut self) -> Result<(), CommandError> {
        normalize(
            &mut self.core,
            &self.ops,
            self.config.max_normalize_iterations,
        )
        .map(|_| ())
    }

    /// Marks that apply at the selection.
    pub fn marks(&self) -> Option<Marks> {
        formatting::current_marks(&self.core)
    }

    /// Returns `true` if `mark` is active at the selection.
    pub fn is_mark_active(&self, mark: Mark) -> bool {
        formatting::is_mark_active(&self.core, mark)
    }

    /// Returns `true` if a selected block has `format`.
    pub fn is_block_active(&self, format: BlockFormat) -> bool {
        formatting::is_block_active(&self.core, format)
    }

    fn settle(&mut self) {
        if let Err(err) = self.normalize() {
            tracing::warn!(%err, "initial value could not be fully normalized");
        }
    }

    fn execute_edit(&mut self, command: EditCommand) -> Result<bool, CommandError> {
        let core = &mut self.core;
        match command {
            EditCommand::InsertText { text } => self.ops.insert_text(core, &text).map(|_| true),
            EditCommand::InsertBreak => self.ops.insert_break(core).map(|_| true),
            EditCommand::DeleteBackward { unit } => {
                self.ops.delete_backward(core, unit).map(|_| true)
            }
            EditCommand::DeleteFragment => {
                if core.selection().is_none() {
                    return Err(CommandError::NoSelection);
                }
                self.ops.delete_fragment(core).map(|_| true)
            }
            EditCommand::ExitCodeBlock => code_block::exit_code_block(core),
            EditCommand::InsertCodeBlock { language } => {
                let language = language.unwrap_or_else(|| self.config.default_language.clone());
                code_block::insert_code_block(core, &self.ops, &language)
            }
            EditCommand::InsertTab => code_block::insert_tab(core, &self.ops, &self.config.tab_text),
            EditCommand::SetLanguage { path, language } => {
                code_block::set_language(core, path.as_ref(), &language)
            }
        }
    }

    fn execute_cursor(&mut self, command: CursorCommand) -> Result<bool, CommandError> {
        match command {
            CursorCommand::Select { selection } => self.core.select(selection)?,
            CursorCommand::SetCaret { point } => self.core.select_point(point)?,
            CursorCommand::Collapse => self.core.collapse_to_start(),
            CursorCommand::Deselect => self.core.deselect(),
        }
        Ok(true)
    }

    fn execute_format(&mut self, command: FormatCommand) -> Result<bool, CommandError> {
        match command {
            FormatCommand::ToggleMark { mark } => formatting::toggle_mark(&mut self.core, mark),
            FormatCommand::ToggleBlock { format } => formatting::toggle_block(
                &mut self.core,
                &self.ops,
                format,
                &self.config.default_language,
            ),
        }
    }
}
