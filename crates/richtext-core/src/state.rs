//! Editor State Interface
//!
//! Wraps a [`CommandExecutor`] with version tracking, a modified flag and change notifications.
//! Subscribers are the `onChange` hook: they run after a command has settled (normalization
//! included) and receive the full document for document changes.
//!
//! # Example
//!
//! ```rust
//! use richtext_core::{Command, EditCommand, EditorConfig, EditorStateManager, Node, Point};
//! use std::sync::{Arc, Mutex};
//!
//! let mut manager = EditorStateManager::new(vec![Node::paragraph("Hi")], EditorConfig::default());
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! manager.subscribe(move |change| {
//!     if let Some(value) = &change.value {
//!         sink.lock().unwrap().push(value.children.len());
//!     }
//! });
//!
//! manager.select_point(Point::new([0, 0], 2)).unwrap();
//! manager.execute(Command::Edit(EditCommand::InsertBreak)).unwrap();
//! assert_eq!(*seen.lock().unwrap(), vec![2]);
//! assert!(manager.is_modified());
//! ```

use crate::commands::{Command, CommandError, CommandExecutor, CommandResult, CursorCommand};
use crate::config::EditorConfig;
use crate::core::EditorCore;
use crate::document::Document;
use crate::hotkeys::KeyStroke;
use crate::node::Node;
use crate::path::Point;
use crate::snapshot::DocumentSnapshot;
use crate::tokens::Tokenizer;
use std::sync::Arc;
use tracing::warn;

/// State change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChangeType {
    /// Document content modified
    DocumentModified,
    /// Selection or pending marks changed
    SelectionChanged,
}

/// State change record
#[derive(Debug, Clone)]
pub struct StateChange {
    /// Change type
    pub change_type: StateChangeType,
    /// Old version number
    pub old_version: u64,
    /// New version number
    pub new_version: u64,
    /// The settled document, for document changes.
    pub value: Option<Arc<Document>>,
}

impl StateChange {
    /// Create a new state change record without a document value.
    pub fn new(change_type: StateChangeType, old_version: u64, new_version: u64) -> Self {
        Self {
            change_type,
            old_version,
            new_version,
            value: None,
        }
    }

    /// Attach the settled document to this change record.
    pub fn with_value(mut self, value: Arc<Document>) -> Self {
        self.value = Some(value);
        self
    }
}

/// State change callback function type
pub type StateChangeCallback = Box<dyn FnMut(&StateChange) + Send>;

/// Editor state manager
///
/// The manager follows a unidirectional flow:
///
/// 1. The host executes commands via [`execute()`](EditorStateManager::execute).
/// 2. Or edits the core directly via [`editor_mut()`](EditorStateManager::editor_mut) and then
///    calls [`mark_modified()`](EditorStateManager::mark_modified), which normalizes first.
/// 3. The manager bumps the version and notifies every subscriber.
pub struct EditorStateManager {
    /// Command executor (owns the editor core and normalizes after every command)
    executor: CommandExecutor,
    /// State version number
    state_version: u64,
    /// Whether the document changed since the last save
    is_modified: bool,
    /// State change callback list
    callbacks: Vec<StateChangeCallback>,
}

impl EditorStateManager {
    /// Create a state manager. The initial value is normalized.
    pub fn new(initial: Vec<Node>, config: EditorConfig) -> Self {
        Self {
            executor: CommandExecutor::new(initial, config),
            state_version: 0,
            is_modified: false,
            callbacks: Vec::new(),
        }
    }

    /// Create a state manager from a serialized value.
    pub fn from_json(json: &str, config: EditorConfig) -> Result<Self, CommandError> {
        let document = Document::from_json(json)?;
        Ok(Self::new(document.children, config))
    }

    /// The command executor.
    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    /// The editor core.
    pub fn editor(&self) -> &EditorCore {
        self.executor.editor()
    }

    /// Mutable access to the editor core. Call [`mark_modified`](Self::mark_modified) afterwards.
    pub fn editor_mut(&mut self) -> &mut EditorCore {
        self.executor.editor_mut()
    }

    /// The current document.
    pub fn document(&self) -> &Document {
        self.executor.document()
    }

    /// The current value serialized as JSON.
    pub fn to_json(&self) -> Result<String, CommandError> {
        self.document().to_json()
    }

    /// Render data for the current document.
    pub fn snapshot<T>(&self, tokenizer: &T) -> DocumentSnapshot
    where
        T: Tokenizer + ?Sized,
    {
        DocumentSnapshot::build(self.document(), tokenizer)
    }

    /// Execute a command and notify subscribers if it changed anything.
    pub fn execute(&mut self, command: Command) -> Result<CommandResult, CommandError> {
        let result = self.executor.execute(command)?;
        self.record(result);
        Ok(result)
    }

    /// Execute the command bound to a key press.
    pub fn execute_key(&mut self, stroke: &KeyStroke) -> Result<CommandResult, CommandError> {
        let result = self.executor.execute_key(stroke)?;
        self.record(result);
        Ok(result)
    }

    /// Place a caret.
    pub fn select_point(&mut self, point: Point) -> Result<CommandResult, CommandError> {
        self.execute(Command::Cursor(CursorCommand::SetCaret { point }))
    }

    /// Get current version number
    pub fn version(&self) -> u64 {
        self.state_version
    }

    /// Whether the document changed since creation or the last [`mark_saved`](Self::mark_saved).
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Subscribe to state change notifications
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Check if state has changed since a version
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.state_version > version
    }

    /// Record a change made through [`editor_mut`](Self::editor_mut).
    ///
    /// The document is normalized before subscribers run.
    pub fn mark_modified(&mut self, change_type: StateChangeType) {
        if let Err(err) = self.executor.normalize() {
            warn!(%err, "normalization failed after direct edit");
        }
        self.executor.editor_mut().take_operations();
        self.bump(change_type);
    }

    /// Mark document as unmodified (e.g., after saving)
    pub fn mark_saved(&mut self) {
        self.is_modified = false;
    }

    fn record(&mut self, result: CommandResult) {
        if result != CommandResult::Success {
            return;
        }
        let change_type = if self.executor.last_operations().is_empty() {
            StateChangeType::SelectionChanged
        } else {
            StateChangeType::DocumentModified
        };
        self.bump(change_type);
    }

    fn bump(&mut self, change_type: StateChangeType) {
        let old_version = self.state_version;
        self.state_version += 1;

        let mut change = StateChange::new(change_type, old_version, self.state_version);
        if change_type == StateChangeType::DocumentModified {
            self.is_modified = true;
            change = change.with_value(Arc::new(self.document().clone()));
        }
        self.notify_callbacks(&change);
    }

    /// Notify all callbacks
    fn notify_callbacks(&mut self, change: &StateChange) {
        for callback in &mut self.callbacks {
            callback(change);
        }
    }
}
