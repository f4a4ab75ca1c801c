//! Mark and block formatting.

use crate::code_block::insert_code_block;
use crate::commands::CommandError;
use crate::core::EditorCore;
use crate::node::{BlockKind, HeadingLevel, Mark, Marks};
use crate::ops::EditorOps;
use crate::path::{Path, Selection};

/// Block formats offered by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockFormat {
    /// Paragraph.
    Paragraph,
    /// Heading of the given level.
    Heading(HeadingLevel),
    /// Block quote.
    BlockQuote,
    /// Code block (inserted from the selection).
    CodeBlock,
}

impl BlockFormat {
    /// Returns `true` if `kind` has this format.
    pub fn matches(self, kind: &BlockKind) -> bool {
        match (self, kind) {
            (Self::Paragraph, BlockKind::Paragraph) | (Self::BlockQuote, BlockKind::BlockQuote) => {
                true
            }
            (Self::Heading(level), BlockKind::Heading { level: other }) => level == *other,
            (Self::CodeBlock, kind) => kind.is_code_block() || kind.is_code_line(),
            _ => false,
        }
    }

    fn kind(self) -> Option<BlockKind> {
        match self {
            Self::Paragraph => Some(BlockKind::Paragraph),
            Self::Heading(level) => Some(BlockKind::Heading { level }),
            Self::BlockQuote => Some(BlockKind::BlockQuote),
            Self::CodeBlock => None,
        }
    }
}

/// Marks at the selection: the pending marks, else those of the run at a caret (the run before
/// it at a run boundary), else those of the first selected run.
pub fn current_marks(core: &EditorCore) -> Option<Marks> {
    if let Some(marks) = core.pending_marks() {
        return Some(marks);
    }
    let selection = core.selection()?;
    let document = core.document();
    if selection.is_collapsed() {
        let point = &selection.focus;
        if point.offset == 0
            && let Some(previous) = point.path.previous()
            && let Some(run) = document.text(&previous)
        {
            return Some(run.marks);
        }
        return document.text(&point.path).map(|run| run.marks);
    }
    let start = selection.start();
    document
        .texts()
        .into_iter()
        .find(|(path, run)| {
            *path > start.path || (*path == start.path && start.offset < run.len())
        })
        .or_else(|| {
            document
                .texts()
                .into_iter()
                .find(|(path, _)| *path == start.path)
        })
        .map(|(_, run)| run.marks)
}

/// Returns `true` if `mark` is set at the selection.
pub fn is_mark_active(core: &EditorCore, mark: Mark) -> bool {
    current_marks(core).is_some_and(|marks| marks.get(mark))
}

/// Toggle `mark` at the selection.
///
/// On a caret the toggled marks become pending and apply to the next inserted text. On a range
/// the selected text is split out of its runs and re-marked. Returns `false` without a selection.
pub fn toggle_mark(core: &mut EditorCore, mark: Mark) -> Result<bool, CommandError> {
    let Some(selection) = core.selection().cloned() else {
        return Ok(false);
    };
    let value = !is_mark_active(core, mark);

    if selection.is_collapsed() {
        let marks = current_marks(core).unwrap_or_default().with(mark, value);
        core.set_pending_marks(Some(marks));
        return Ok(true);
    }

    let (start, end) = selection.edges();
    let (start, end) = (start.clone(), end.clone());
    let end_len = core.document().text(&end.path).map_or(0, |run| run.len());
    if end.offset > 0 && end.offset < end_len {
        core.split_node(&end.path, end.offset)?;
    }
    let start_len = core.document().text(&start.path).map_or(0, |run| run.len());
    if start.offset > 0 && start.offset < start_len {
        core.split_node(&start.path, start.offset)?;
    }

    // The splits moved both edges onto run boundaries.
    let Some(selection) = core.selection().cloned() else {
        return Ok(false);
    };
    let (start, end) = selection.edges();
    let targets: Vec<Path> = core
        .document()
        .texts()
        .into_iter()
        .filter(|(path, run)| {
            *path >= start.path
                && *path <= end.path
                && !(*path == start.path && start.offset >= run.len() && !run.is_empty())
                && !(*path == end.path && end.offset == 0 && start.path != end.path)
                && run.marks.get(mark) != value
        })
        .map(|(path, _)| path)
        .collect();

    for path in &targets {
        if let Some(run) = core.document().text(path) {
            let marks = run.marks.with(mark, value);
            core.set_marks(path, marks)?;
        }
    }
    Ok(!targets.is_empty())
}

/// Leaf-bearing blocks intersecting `selection`, in document order.
pub fn selected_leaf_blocks(core: &EditorCore, selection: &Selection) -> Vec<Path> {
    let (start, end) = selection.edges();
    core.document()
        .leaf_block_paths()
        .into_iter()
        .filter(|path| {
            path.contains(&start.path)
                || path.contains(&end.path)
                || (start.path < *path && *path < end.path)
        })
        .collect()
}

/// Returns `true` if a selected block has `format`.
pub fn is_block_active(core: &EditorCore, format: BlockFormat) -> bool {
    let Some(selection) = core.selection() else {
        return false;
    };
    selected_leaf_blocks(core, selection)
        .iter()
        .filter_map(|path| core.document().kind(path))
        .any(|kind| format.matches(kind))
}

/// Toggle the block format of the selected blocks.
///
/// Code blocks are inserted from the selection instead (see
/// [`insert_code_block`](crate::code_block::insert_code_block)). Other formats retype every
/// selected block outside code blocks, or turn them back into paragraphs when the format is
/// already active.
pub fn toggle_block<O>(
    core: &mut EditorCore,
    ops: &O,
    format: BlockFormat,
    code_language: &str,
) -> Result<bool, CommandError>
where
    O: EditorOps + ?Sized,
{
    let Some(target) = format.kind() else {
        return insert_code_block(core, ops, code_language);
    };
    let Some(selection) = core.selection().cloned() else {
        return Ok(false);
    };
    let kind = if is_block_active(core, format) {
        BlockKind::Paragraph
    } else {
        target
    };

    let mut changed = false;
    for path in selected_leaf_blocks(core, &selection) {
        let Some(current) = core.document().kind(&path) else {
            continue;
        };
        if current.is_code_line() || *current == kind {
            continue;
        }
        core.set_kind(&path, kind.clone())?;
        changed = true;
    }
    Ok(changed)
}

/// Plain text of the selected blocks, one line per block.
pub fn selected_text(core: &EditorCore) -> String {
    let Some(selection) = core.selection() else {
        return String::new();
    };
    let (start, end) = selection.edges();
    core.document().fragment_text(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, TextRun};
    use crate::ops::DefaultOps;
    use crate::path::Point;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_toggle_mark_on_caret_sets_pending_marks() {
        let mut core = EditorCore::new(vec![Node::paragraph("ab")]);
        core.select_point(Point::new([0, 0], 1)).unwrap();
        assert!(toggle_mark(&mut core, Mark::Bold).unwrap());
        assert!(is_mark_active(&core, Mark::Bold));
        assert!(core.operations().is_empty());

        assert!(toggle_mark(&mut core, Mark::Bold).unwrap());
        assert!(!is_mark_active(&core, Mark::Bold));
    }

    #[test]
    fn test_toggle_mark_on_range_splits_runs() {
        let mut core = EditorCore::new(vec![Node::paragraph("hello")]);
        core.select(Selection::new(Point::new([0, 0], 1), Point::new([0, 0], 3)))
            .unwrap();
        assert!(toggle_mark(&mut core, Mark::Italic).unwrap());
        let italic = Marks::default().with(Mark::Italic, true);
        assert_eq!(
            core.document().element(&Path::from([0])).unwrap().children,
            vec![
                Node::text("h"),
                Node::Text(TextRun::with_marks("el", italic)),
                Node::text("lo"),
            ]
        );
        assert!(is_mark_active(&core, Mark::Italic));
    }

    #[test]
    fn test_toggle_mark_across_blocks() {
        let mut core = EditorCore::new(vec![Node::paragraph("ab"), Node::paragraph("cd")]);
        core.select(Selection::new(Point::new([0, 0], 1), Point::new([1, 0], 1)))
            .unwrap();
        toggle_mark(&mut core, Mark::Code).unwrap();
        let code = Marks::default().with(Mark::Code, true);
        assert_eq!(
            core.document().text(&Path::from([0, 1])),
            Some(&TextRun::with_marks("b", code))
        );
        assert_eq!(
            core.document().text(&Path::from([1, 0])),
            Some(&TextRun::with_marks("c", code))
        );
        assert_eq!(core.document().text(&Path::from([1, 1])), Some(&TextRun::new("d")));
    }

    #[test]
    fn test_toggle_block_heading_and_back() {
        let mut core = EditorCore::new(vec![Node::paragraph("t")]);
        core.select_point(Point::new([0, 0], 0)).unwrap();
        let h1 = BlockFormat::Heading(HeadingLevel::H1);
        assert!(toggle_block(&mut core, &DefaultOps, h1, "javascript").unwrap());
        assert_eq!(core.children(), &[Node::heading(HeadingLevel::H1, "t")]);
        assert!(is_block_active(&core, h1));
        assert!(toggle_block(&mut core, &DefaultOps, h1, "javascript").unwrap());
        assert_eq!(core.children(), &[Node::paragraph("t")]);
    }

    #[test]
    fn test_toggle_block_skips_code_lines() {
        let mut core = EditorCore::new(vec![
            Node::paragraph("p"),
            Node::code_block("rust", &["c"]),
        ]);
        core.select(Selection::new(Point::new([0, 0], 0), Point::new([1, 0, 0], 1)))
            .unwrap();
        assert!(toggle_block(&mut core, &DefaultOps, BlockFormat::BlockQuote, "rust").unwrap());
        assert_eq!(
            core.children(),
            &[Node::block_quote("p"), Node::code_block("rust", &["c"])]
        );
    }

    #[test]
    fn test_selected_text_spans_blocks() {
        let mut core = EditorCore::new(vec![Node::paragraph(""), Node::paragraph("x")]);
        core.select_point(Point::new([0, 0], 0)).unwrap();
        assert_eq!(selected_text(&core), "");
        core.select(Selection::new(Point::new([0, 0], 0), Point::new([1, 0], 1)))
            .unwrap();
        assert_eq!(selected_text(&core), "\nx");
    }
}
