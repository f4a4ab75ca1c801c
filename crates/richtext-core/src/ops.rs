//! Overridable edit behaviors.
//!
//! [`EditorOps`] is the seam through which block plugins change how the editor reacts to typing,
//! line breaks, backspace and normalization. [`DefaultOps`] is the generic behavior; plugins wrap
//! another `EditorOps` (see [`WithCodeBlock`](crate::WithCodeBlock)) and delegate whatever they do
//! not handle.

use crate::commands::CommandError;
use crate::core::EditorCore;
use crate::node::{BlockKind, Node, TextRun};
use crate::path::{Path, Point};
use unicode_segmentation::UnicodeSegmentation;

/// Granularity of a backward deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextUnit {
    /// One grapheme cluster.
    #[default]
    Character,
    /// The previous word and any whitespace after it.
    Word,
}

/// Edit behaviors that plugins may override.
///
/// Every method receives the core explicitly; implementations hold no document state.
pub trait EditorOps {
    /// Insert `text` at the selection, replacing an expanded selection.
    fn insert_text(&self, core: &mut EditorCore, text: &str) -> Result<(), CommandError>;

    /// Split the block at the selection (Enter).
    fn insert_break(&self, core: &mut EditorCore) -> Result<(), CommandError>;

    /// Delete backward from the selection (Backspace).
    fn delete_backward(&self, core: &mut EditorCore, unit: TextUnit) -> Result<(), CommandError>;

    /// Delete the content of an expanded selection.
    fn delete_fragment(&self, core: &mut EditorCore) -> Result<(), CommandError>;

    /// Apply at most one structural repair to the element at `path` (the root for the empty
    /// path). Returns `true` if the tree changed.
    fn normalize_node(&self, core: &mut EditorCore, path: &Path) -> Result<bool, CommandError>;
}

/// Generic behaviors for paragraphs, headings and quotes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultOps;

impl EditorOps for DefaultOps {
    fn insert_text(&self, core: &mut EditorCore, text: &str) -> Result<(), CommandError> {
        let selection = core.selection().cloned().ok_or(CommandError::NoSelection)?;
        if selection.is_expanded() {
            self.delete_fragment(core)?;
        }
        if text.is_empty() {
            return Ok(());
        }
        let point = core
            .selection()
            .map(|selection| selection.focus.clone())
            .ok_or(CommandError::NoSelection)?;

        let Some(marks) = core.take_pending_marks() else {
            return core.insert_text_at(&point, text);
        };
        let run = core
            .document()
            .text(&point.path)
            .ok_or_else(|| CommandError::InvalidPoint(point.clone()))?;
        if run.marks == marks {
            return core.insert_text_at(&point, text);
        }

        // Pending marks start a new run at the caret.
        let len = run.len();
        let target = if point.offset == 0 {
            point.path.clone()
        } else {
            if point.offset < len {
                core.split_node(&point.path, point.offset)?;
            }
            point
                .path
                .next()
                .ok_or_else(|| CommandError::InvalidPath(point.path.clone()))?
        };
        core.insert_node(&target, Node::Text(TextRun::with_marks(text, marks)))?;
        core.select_point(Point::new(target, text.chars().count()))
    }

    fn insert_break(&self, core: &mut EditorCore) -> Result<(), CommandError> {
        let Some(selection) = core.selection().cloned() else {
            return Ok(());
        };
        if selection.is_expanded() {
            self.delete_fragment(core)?;
        }
        let point = core
            .selection()
            .map(|selection| selection.focus.clone())
            .ok_or(CommandError::NoSelection)?;
        let block = core
            .document()
            .leaf_block_above(&point.path)
            .ok_or_else(|| CommandError::InvalidPoint(point.clone()))?;

        let next = core
            .split_at(&point, block.len(), true)?
            .ok_or_else(|| CommandError::InvalidPath(block.clone()))?;
        let start = core
            .document()
            .start_point(&next)
            .ok_or_else(|| CommandError::InvalidPath(next.clone()))?;
        core.select_point(start)
    }

    fn delete_backward(&self, core: &mut EditorCore, unit: TextUnit) -> Result<(), CommandError> {
        let selection = core.selection().cloned().ok_or(CommandError::NoSelection)?;
        if selection.is_expanded() {
            return self.delete_fragment(core);
        }
        let point = selection.focus;
        let block = core
            .document()
            .leaf_block_above(&point.path)
            .ok_or_else(|| CommandError::InvalidPoint(point.clone()))?;

        // The nearest position with text before it inside this block.
        let mut cursor = point.clone();
        while cursor.offset == 0 {
            let Some(previous) = cursor.path.previous() else {
                break;
            };
            let len = core.document().text(&previous).map_or(0, TextRun::len);
            cursor = Point::new(previous, len);
        }

        if cursor.offset > 0 {
            let run = core
                .document()
                .text(&cursor.path)
                .ok_or_else(|| CommandError::InvalidPoint(cursor.clone()))?;
            let len = unit_before(&run.text, cursor.offset, unit);
            let start = Point::new(cursor.path.clone(), cursor.offset - len);
            core.remove_text(&start, len)?;
            return core.select_point(start);
        }

        let Some(previous) = core.document().previous_leaf_block(&block) else {
            return Ok(());
        };
        let previous_empty = core
            .document()
            .string(&previous)
            .is_some_and(|text| text.is_empty());
        if previous_empty {
            // Removing the empty block keeps the current block's kind.
            let block_ref = core.path_ref(&block);
            core.remove_with_empty_ancestors(&previous)?;
            let block = core
                .unref(block_ref)
                .ok_or_else(|| CommandError::InvalidPath(block.clone()))?;
            let start = core
                .document()
                .start_point(&block)
                .ok_or_else(|| CommandError::InvalidPath(block.clone()))?;
            return core.select_point(start);
        }

        let join = core.join_blocks(&previous, &block)?;
        core.select_point(join)
    }

    fn delete_fragment(&self, core: &mut EditorCore) -> Result<(), CommandError> {
        core.delete_fragment()
    }

    fn normalize_node(&self, core: &mut EditorCore, path: &Path) -> Result<bool, CommandError> {
        if path.is_root() {
            return normalize_root(core);
        }
        let Some(kind) = core.document().kind(path).cloned() else {
            return Ok(false);
        };
        if kind.is_container() {
            normalize_container(core, path)
        } else {
            normalize_leaf_block(core, path)
        }
    }
}

/// Number of characters the unit before `offset` spans.
fn unit_before(text: &str, offset: usize, unit: TextUnit) -> usize {
    let prefix: String = text.chars().take(offset).collect();
    match unit {
        TextUnit::Character => prefix
            .graphemes(true)
            .next_back()
            .map_or(0, |grapheme| grapheme.chars().count()),
        TextUnit::Word => {
            let mut count = 0;
            for segment in prefix.split_word_bounds().rev() {
                count += segment.chars().count();
                if !segment.trim().is_empty() {
                    break;
                }
            }
            count
        }
    }
}

fn normalize_root(core: &mut EditorCore) -> Result<bool, CommandError> {
    let children = core.children();
    if children.is_empty() {
        core.insert_node(&Path::from([0]), Node::paragraph(""))?;
        return Ok(true);
    }
    if let Some(index) = children.iter().position(Node::is_text) {
        core.wrap_node(&Path::from([index]), BlockKind::Paragraph)?;
        return Ok(true);
    }
    Ok(false)
}

/// Blocks of blocks without a plugin: text children become paragraphs, empty containers go.
fn normalize_container(core: &mut EditorCore, path: &Path) -> Result<bool, CommandError> {
    let Some(element) = core.document().element(path) else {
        return Ok(false);
    };
    if element.children.is_empty() {
        core.remove_node(path)?;
        return Ok(true);
    }
    if let Some(index) = element.children.iter().position(Node::is_text) {
        core.wrap_node(&path.child(index), BlockKind::Paragraph)?;
        return Ok(true);
    }
    Ok(false)
}

fn normalize_leaf_block(core: &mut EditorCore, path: &Path) -> Result<bool, CommandError> {
    let Some(element) = core.document().element(path) else {
        return Ok(false);
    };
    let children = &element.children;

    if children.is_empty() {
        core.insert_node(&path.child(0), Node::text(""))?;
        return Ok(true);
    }

    if let Some(index) = children.iter().position(|child| !child.is_text()) {
        core.unwrap_node(&path.child(index))?;
        return Ok(true);
    }

    let runs: Vec<&TextRun> = children.iter().filter_map(Node::as_text).collect();
    if let Some(index) = runs
        .windows(2)
        .position(|pair| pair[0].marks == pair[1].marks)
    {
        core.merge_node(&path.child(index + 1))?;
        return Ok(true);
    }

    if runs.len() > 1
        && let Some(index) = runs.iter().position(|run| run.is_empty())
    {
        core.remove_node(&path.child(index))?;
        return Ok(true);
    }

    Ok(false)
}
