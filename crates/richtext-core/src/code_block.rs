//! Code-block behavior.
//!
//! [`WithCodeBlock`] wraps another [`EditorOps`] and takes over Enter, Backspace and
//! normalization whenever they concern code lines:
//!
//! - Enter inside a code line splits the line, never the block.
//! - Backspace at the start of a code line merges it into the previous line, or removes the first
//!   line (and the whole block once it is the last empty line).
//! - Normalization keeps "code block contains only code lines, code lines live only in code
//!   blocks, a code block has at least one line".
//!
//! The free functions implement the code-block actions that are not keyboard interceptors:
//! inserting a block from the selection, exiting a block, Tab, and changing the language.

use crate::commands::CommandError;
use crate::core::EditorCore;
use crate::node::{BlockKind, Node};
use crate::ops::{DefaultOps, EditorOps, TextUnit};
use crate::path::{Path, Point, Selection};
use tracing::debug;

/// Code-block plugin over an inner set of edit behaviors.
#[derive(Debug, Clone, Default)]
pub struct WithCodeBlock<O = DefaultOps> {
    inner: O,
}

impl<O: EditorOps> WithCodeBlock<O> {
    /// Wrap `inner`.
    pub fn new(inner: O) -> Self {
        Self { inner }
    }

    /// The wrapped behaviors.
    pub fn inner(&self) -> &O {
        &self.inner
    }
}

/// Path of the code line holding the selection focus.
pub fn focused_code_line(core: &EditorCore) -> Option<Path> {
    let focus = &core.selection()?.focus;
    core.document()
        .above(&focus.path, BlockKind::is_code_line)
        .map(|(path, _)| path)
}

/// Path of the code block holding the selection focus.
pub fn focused_code_block(core: &EditorCore) -> Option<Path> {
    let focus = &core.selection()?.focus;
    core.document()
        .above(&focus.path, BlockKind::is_code_block)
        .map(|(path, _)| path)
}

/// Returns `true` if any code block intersects `selection`.
pub fn selection_touches_code_block(core: &EditorCore, selection: &Selection) -> bool {
    let (start, end) = selection.edges();
    core.document().element_paths().into_iter().any(|path| {
        core.document()
            .kind(&path)
            .is_some_and(BlockKind::is_code_block)
            && (path.contains(&start.path)
                || path.contains(&end.path)
                || (start.path < path && path < end.path))
    })
}

impl<O: EditorOps> EditorOps for WithCodeBlock<O> {
    fn insert_text(&self, core: &mut EditorCore, text: &str) -> Result<(), CommandError> {
        self.inner.insert_text(core, text)
    }

    fn insert_break(&self, core: &mut EditorCore) -> Result<(), CommandError> {
        if focused_code_line(core).is_none() {
            return self.inner.insert_break(core);
        }
        if core.selection().is_some_and(Selection::is_expanded) {
            self.delete_fragment(core)?;
        }
        let (Some(line), Some(point)) = (
            focused_code_line(core),
            core.selection().map(|selection| selection.focus.clone()),
        ) else {
            return self.inner.insert_break(core);
        };

        debug!(line = %line, offset = point.offset, "splitting code line");
        let next = core
            .split_at(&point, line.len(), true)?
            .ok_or_else(|| CommandError::InvalidPath(line.clone()))?;
        core.select_point(Point::new(next.child(0), 0))
    }

    fn delete_backward(&self, core: &mut EditorCore, unit: TextUnit) -> Result<(), CommandError> {
        let Some(selection) = core.selection().cloned() else {
            return self.inner.delete_backward(core, unit);
        };
        if selection.is_expanded() {
            return self.inner.delete_backward(core, unit);
        }
        let Some(line) = focused_code_line(core) else {
            return self.inner.delete_backward(core, unit);
        };
        if selection.focus != Point::new(line.child(0), 0) {
            return self.inner.delete_backward(core, unit);
        }
        let Some(block) = line
            .parent()
            .filter(|parent| core.document().kind(parent).is_some_and(BlockKind::is_code_block))
        else {
            return self.inner.delete_backward(core, unit);
        };

        let Some(previous) = line.previous() else {
            let empty = core
                .document()
                .string(&line)
                .is_some_and(|text| text.is_empty());
            if !empty {
                return self.inner.delete_backward(core, unit);
            }
            let lines = core
                .document()
                .element(&block)
                .map_or(0, |element| element.children.len());
            if lines == 1 {
                debug!(block = %block, "removing empty code block");
                core.remove_node(&block)?;
                core.insert_node(&block, Node::paragraph(""))?;
                return core.select_point(Point::new(block.child(0), 0));
            }
            debug!(line = %line, "removing empty first code line");
            core.remove_node(&line)?;
            return core.select_point(Point::new(line.child(0), 0));
        };

        // Join point measured before the merge changes the previous line.
        let join = core
            .document()
            .end_point(&previous)
            .ok_or_else(|| CommandError::InvalidPath(previous.clone()))?;
        debug!(line = %line, "merging code line into previous line");
        core.merge_node(&line)?;
        core.select_point(join)
    }

    fn delete_fragment(&self, core: &mut EditorCore) -> Result<(), CommandError> {
        self.inner.delete_fragment(core)
    }

    fn normalize_node(&self, core: &mut EditorCore, path: &Path) -> Result<bool, CommandError> {
        let Some(element) = core.document().element(path) else {
            return self.inner.normalize_node(core, path);
        };
        match &element.kind {
            BlockKind::CodeBlock { .. } => {
                for (index, child) in element.children.iter().enumerate() {
                    match child {
                        Node::Element(line) if line.kind.is_code_line() => {}
                        Node::Element(_) => {
                            core.set_kind(&path.child(index), BlockKind::CodeLine)?;
                            return Ok(true);
                        }
                        Node::Text(_) => {
                            core.wrap_node(&path.child(index), BlockKind::CodeLine)?;
                            return Ok(true);
                        }
                    }
                }
                if element.children.is_empty() {
                    core.insert_node(&path.child(0), Node::code_line(""))?;
                    return Ok(true);
                }
                self.inner.normalize_node(core, path)
            }
            BlockKind::CodeLine => {
                let in_code_block = path
                    .parent()
                    .and_then(|parent| core.document().kind(&parent))
                    .is_some_and(BlockKind::is_code_block);
                if in_code_block {
                    return self.inner.normalize_node(core, path);
                }
                core.set_kind(path, BlockKind::Paragraph)?;
                Ok(true)
            }
            _ => self.inner.normalize_node(core, path),
        }
    }
}

/// Insert an empty paragraph after the code block holding the selection and move the caret
/// there. Returns `false` outside a code block.
pub fn exit_code_block(core: &mut EditorCore) -> Result<bool, CommandError> {
    let Some(block) = focused_code_block(core) else {
        return Ok(false);
    };
    let after = block
        .next()
        .ok_or_else(|| CommandError::InvalidPath(block.clone()))?;
    debug!(block = %block, "exiting code block");
    core.insert_node(&after, Node::paragraph(""))?;
    core.select_point(Point::new(after.child(0), 0))?;
    Ok(true)
}

/// Turn the selection into a code block of `language`.
///
/// The selected text (blocks joined with `'\n'`) becomes one code line per line; an expanded
/// selection is deleted first. Returns `false` without a selection or when the selection already
/// touches a code block.
pub fn insert_code_block<O>(
    core: &mut EditorCore,
    ops: &O,
    language: &str,
) -> Result<bool, CommandError>
where
    O: EditorOps + ?Sized,
{
    let Some(selection) = core.selection().cloned() else {
        return Ok(false);
    };
    if selection_touches_code_block(core, &selection) {
        return Ok(false);
    }

    let (start, end) = selection.edges();
    let text = core.document().fragment_text(start, end);
    let lines: Vec<&str> = text.split('\n').collect();

    if selection.is_expanded() {
        ops.delete_fragment(core)?;
    }
    let point = core
        .selection()
        .map(|selection| selection.focus.clone())
        .ok_or(CommandError::NoSelection)?;

    debug!(lines = lines.len(), language, "inserting code block");
    let block = core.insert_block_at(&point, Node::code_block(language, &lines))?;
    core.select_point(Point::new(block.child(0).child(0), 0))?;
    Ok(true)
}

/// Insert `tab_text` at the caret when it is inside a code line. Returns `false` elsewhere.
pub fn insert_tab<O>(core: &mut EditorCore, ops: &O, tab_text: &str) -> Result<bool, CommandError>
where
    O: EditorOps + ?Sized,
{
    if focused_code_line(core).is_none() {
        return Ok(false);
    }
    ops.insert_text(core, tab_text)?;
    Ok(true)
}

/// Set the language of the code block at `path`, or of the one holding the selection.
///
/// Returns `false` when there is no such block or the language is unchanged.
pub fn set_language(
    core: &mut EditorCore,
    path: Option<&Path>,
    language: &str,
) -> Result<bool, CommandError> {
    let block = match path {
        Some(path) => {
            let is_code_block = core
                .document()
                .kind(path)
                .is_some_and(BlockKind::is_code_block);
            if !is_code_block {
                return Err(CommandError::InvalidPath(path.clone()));
            }
            path.clone()
        }
        None => match focused_code_block(core) {
            Some(block) => block,
            None => return Ok(false),
        },
    };
    if core.document().kind(&block).and_then(BlockKind::language) == Some(language) {
        return Ok(false);
    }
    core.set_kind(&block, BlockKind::code_block(language))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plugin() -> WithCodeBlock {
        WithCodeBlock::new(DefaultOps)
    }

    #[test]
    fn test_other_block_inside_code_block_is_retyped() {
        let mut core = EditorCore::new(vec![Node::element(
            BlockKind::code_block("rust"),
            vec![Node::code_line("a"), Node::paragraph("b")],
        )]);
        assert!(plugin().normalize_node(&mut core, &Path::from([0])).unwrap());
        assert_eq!(core.children(), &[Node::code_block("rust", &["a", "b"])]);
    }

    #[test]
    fn test_bare_text_inside_code_block_is_wrapped() {
        let mut core = EditorCore::new(vec![Node::element(
            BlockKind::code_block("rust"),
            vec![Node::text("loose")],
        )]);
        assert!(plugin().normalize_node(&mut core, &Path::from([0])).unwrap());
        assert_eq!(core.children(), &[Node::code_block("rust", &["loose"])]);
    }

    #[test]
    fn test_empty_code_block_gets_a_line() {
        let mut core = EditorCore::new(vec![Node::element(
            BlockKind::code_block("rust"),
            Vec::new(),
        )]);
        assert!(plugin().normalize_node(&mut core, &Path::from([0])).unwrap());
        assert_eq!(core.children(), &[Node::code_block("rust", &[""])]);
    }

    #[test]
    fn test_orphan_code_line_becomes_paragraph() {
        let mut core = EditorCore::new(vec![Node::code_line("x")]);
        assert!(plugin().normalize_node(&mut core, &Path::from([0])).unwrap());
        assert_eq!(core.children(), &[Node::paragraph("x")]);
    }

    #[test]
    fn test_well_formed_block_is_left_alone() {
        let mut core = EditorCore::new(vec![Node::code_block("rust", &["a", "b"])]);
        assert!(!plugin().normalize_node(&mut core, &Path::from([0])).unwrap());
        assert!(!plugin().normalize_node(&mut core, &Path::from([0, 1])).unwrap());
        assert!(core.operations().is_empty());
    }

    #[test]
    fn test_set_language_keeps_lines() {
        let mut core = EditorCore::new(vec![Node::code_block("rust", &["a", "b"])]);
        assert!(set_language(&mut core, Some(&Path::from([0])), "python").unwrap());
        assert_eq!(core.children(), &[Node::code_block("python", &["a", "b"])]);
        assert!(!set_language(&mut core, Some(&Path::from([0])), "python").unwrap());
        assert!(set_language(&mut core, Some(&Path::from([0, 0])), "go").is_err());
    }

    #[test]
    fn test_tab_only_inside_code_line() {
        let mut core = EditorCore::new(vec![
            Node::paragraph("p"),
            Node::code_block("rust", &["x"]),
        ]);
        core.select_point(Point::new([0, 0], 0)).unwrap();
        assert!(!insert_tab(&mut core, &plugin(), "  ").unwrap());

        core.select_point(Point::new([1, 0, 0], 0)).unwrap();
        assert!(insert_tab(&mut core, &plugin(), "  ").unwrap());
        assert_eq!(core.document().string(&Path::from([1, 0])).as_deref(), Some("  x"));
    }
}
