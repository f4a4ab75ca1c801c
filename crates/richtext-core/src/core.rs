//! Editor core: the mutable document, its selection and the generic transforms.
//!
//! All mutations go through [`EditorCore::apply`], which records the operation and maps the
//! selection, the pending marks' anchor and every live path ref through it. Higher-level
//! transforms (split, merge, wrap, delete-fragment, ...) are built from operations only.

use crate::commands::CommandError;
use crate::document::Document;
use crate::node::{BlockKind, Marks, Node, TextRun};
use crate::operation::{Operation, transform_path, transform_point};
use crate::path::{Path, Point, Selection};
use tracing::trace;

/// Handle to a path that is kept up to date across operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRef(usize);

/// Mutable editor state: document tree, selection and pending marks.
#[derive(Debug, Clone, Default)]
pub struct EditorCore {
    document: Document,
    selection: Option<Selection>,
    marks: Option<Marks>,
    path_refs: Vec<Option<Path>>,
    operations: Vec<Operation>,
}

impl EditorCore {
    /// Create a core holding `children`, without selection.
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            document: Document::new(children),
            ..Self::default()
        }
    }

    /// The document tree.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Top-level nodes.
    pub fn children(&self) -> &[Node] {
        &self.document.children
    }

    /// Current selection.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Marks that the next inserted text will carry (set by toggling a mark on a caret).
    pub fn pending_marks(&self) -> Option<Marks> {
        self.marks
    }

    pub(crate) fn set_pending_marks(&mut self, marks: Option<Marks>) {
        self.marks = marks;
    }

    pub(crate) fn take_pending_marks(&mut self) -> Option<Marks> {
        self.marks.take()
    }

    /// Operations applied since the last [`take_operations`](Self::take_operations).
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Drain the recorded operations.
    pub fn take_operations(&mut self) -> Vec<Operation> {
        std::mem::take(&mut self.operations)
    }

    /// Set the selection. Both points must address existing text runs.
    pub fn select(&mut self, selection: Selection) -> Result<(), CommandError> {
        for point in [&selection.anchor, &selection.focus] {
            if !self.document.is_valid_point(point) {
                return Err(CommandError::InvalidPoint(point.clone()));
            }
        }
        if self.selection.as_ref() != Some(&selection) {
            self.marks = None;
        }
        self.selection = Some(selection);
        Ok(())
    }

    /// Place a caret at `point`.
    pub fn select_point(&mut self, point: Point) -> Result<(), CommandError> {
        self.select(Selection::collapsed(point))
    }

    /// Drop the selection.
    pub fn deselect(&mut self) {
        self.selection = None;
        self.marks = None;
    }

    /// Collapse the selection to its start.
    pub fn collapse_to_start(&mut self) {
        if let Some(selection) = &self.selection {
            self.selection = Some(Selection::collapsed(selection.start().clone()));
        }
    }

    /// Start tracking `path` across operations.
    pub fn path_ref(&mut self, path: &Path) -> PathRef {
        self.path_refs.push(Some(path.clone()));
        PathRef(self.path_refs.len() - 1)
    }

    /// Current value of a path ref (`None` once the node was removed).
    pub fn path_ref_current(&self, path_ref: PathRef) -> Option<Path> {
        self.path_refs.get(path_ref.0).cloned().flatten()
    }

    /// Stop tracking a path ref and return its final value.
    pub fn unref(&mut self, path_ref: PathRef) -> Option<Path> {
        let current = self.path_refs.get_mut(path_ref.0).and_then(Option::take);
        while matches!(self.path_refs.last(), Some(None)) {
            self.path_refs.pop();
        }
        current
    }

    /// Apply an operation and transform the selection and path refs through it.
    pub fn apply(&mut self, op: Operation) -> Result<(), CommandError> {
        let relocated = match &op {
            Operation::RemoveNode { path, .. } => self.relocation_for_removal(path),
            _ => None,
        };

        self.document.apply(&op)?;
        trace!(op = op.name(), path = %op.path(), "applied operation");

        if let Some(selection) = self.selection.take() {
            let map = |point: &Point| {
                transform_point(point, &op).or_else(|| {
                    relocated
                        .as_ref()
                        .and_then(|fallback| transform_point(fallback, &op))
                })
            };
            self.selection = match (map(&selection.anchor), map(&selection.focus)) {
                (Some(anchor), Some(focus)) => Some(Selection::new(anchor, focus)),
                _ => None,
            };
        }
        for slot in &mut self.path_refs {
            if let Some(path) = slot.take() {
                *slot = transform_path(&path, &op);
            }
        }

        self.operations.push(op);
        Ok(())
    }

    /// Where a point inside a removed subtree should go: the end of the previous text run, or the
    /// start of the next one.
    fn relocation_for_removal(&self, removed: &Path) -> Option<Point> {
        let selection = self.selection.as_ref()?;
        if !removed.contains(&selection.anchor.path) && !removed.contains(&selection.focus.path) {
            return None;
        }
        if let Some((path, run)) = self.document.previous_text(removed) {
            return Some(Point::new(path, run.len()));
        }
        self.document
            .next_text(removed)
            .map(|(path, _)| Point::new(path, 0))
    }

    /// Insert `node` at `path`.
    pub fn insert_node(&mut self, path: &Path, node: Node) -> Result<(), CommandError> {
        self.apply(Operation::InsertNode {
            path: path.clone(),
            node,
        })
    }

    /// Remove the node at `path`.
    pub fn remove_node(&mut self, path: &Path) -> Result<(), CommandError> {
        let node = self
            .document
            .node(path)
            .cloned()
            .ok_or_else(|| CommandError::InvalidPath(path.clone()))?;
        self.apply(Operation::RemoveNode {
            path: path.clone(),
            node,
        })
    }

    /// Merge the node at `path` into its previous sibling.
    pub fn merge_node(&mut self, path: &Path) -> Result<(), CommandError> {
        let previous = path
            .previous()
            .and_then(|prev| self.document.node(&prev))
            .ok_or_else(|| CommandError::InvalidPath(path.clone()))?;
        let position = previous.merge_len();
        self.apply(Operation::MergeNode {
            path: path.clone(),
            position,
        })
    }

    /// Split the node at `path` at `position`.
    pub fn split_node(&mut self, path: &Path, position: usize) -> Result<(), CommandError> {
        self.apply(Operation::SplitNode {
            path: path.clone(),
            position,
        })
    }

    /// Change the kind of the element at `path`.
    pub fn set_kind(&mut self, path: &Path, kind: BlockKind) -> Result<(), CommandError> {
        self.apply(Operation::SetKind {
            path: path.clone(),
            kind,
        })
    }

    /// Replace the marks of the text run at `path`.
    pub fn set_marks(&mut self, path: &Path, marks: Marks) -> Result<(), CommandError> {
        self.apply(Operation::SetMarks {
            path: path.clone(),
            marks,
        })
    }

    /// Wrap the node at `path` in a new element of `kind`.
    pub fn wrap_node(&mut self, path: &Path, kind: BlockKind) -> Result<(), CommandError> {
        self.apply(Operation::WrapNode {
            path: path.clone(),
            kind,
        })
    }

    /// Replace the element at `path` with its children.
    pub fn unwrap_node(&mut self, path: &Path) -> Result<(), CommandError> {
        let children = self
            .document
            .element(path)
            .map(|element| element.children.len())
            .ok_or_else(|| CommandError::InvalidPath(path.clone()))?;
        self.apply(Operation::UnwrapNode {
            path: path.clone(),
            children,
        })
    }

    /// Insert `text` at `point`.
    pub fn insert_text_at(&mut self, point: &Point, text: &str) -> Result<(), CommandError> {
        if text.is_empty() {
            return Ok(());
        }
        if !self.document.is_valid_point(point) {
            return Err(CommandError::InvalidPoint(point.clone()));
        }
        self.apply(Operation::InsertText {
            path: point.path.clone(),
            offset: point.offset,
            text: text.to_string(),
        })
    }

    /// Remove `len` characters starting at `point`.
    pub fn remove_text(&mut self, point: &Point, len: usize) -> Result<(), CommandError> {
        if len == 0 {
            return Ok(());
        }
        let run = self
            .document
            .text(&point.path)
            .ok_or_else(|| CommandError::InvalidPoint(point.clone()))?;
        let text: String = run.text.chars().skip(point.offset).take(len).collect();
        if text.chars().count() != len {
            return Err(CommandError::InvalidPoint(point.clone()));
        }
        self.apply(Operation::RemoveText {
            path: point.path.clone(),
            offset: point.offset,
            text,
        })
    }

    /// Split every node from the text run at `point` up to the ancestor at depth `depth`.
    ///
    /// With `always == false` a level is only split when the point is strictly inside it, so
    /// splitting at a block edge is a no-op for that level. Returns the path of the new right half
    /// of the ancestor, if it was split.
    pub fn split_at(
        &mut self,
        point: &Point,
        depth: usize,
        always: bool,
    ) -> Result<Option<Path>, CommandError> {
        if depth == 0 || depth > point.path.len() || !self.document.is_valid_point(point) {
            return Err(CommandError::InvalidPoint(point.clone()));
        }

        let mut position = point.offset;
        let mut split_top = None;
        let mut level = point.path.clone();
        while level.len() >= depth {
            let at_start = self.document.start_point(&level).as_ref() == Some(point);
            let at_end = self.document.end_point(&level).as_ref() == Some(point);
            let split = always || !(at_start || at_end);
            if split {
                self.split_node(&level, position)?;
                if level.len() == depth {
                    split_top = level.next();
                }
            }
            let index = level.last().unwrap_or(0);
            position = index + usize::from(split || at_end);
            match level.parent() {
                Some(parent) if !parent.is_root() => level = parent,
                _ => break,
            }
        }
        Ok(split_top)
    }

    /// Insert a block node at `point`, splitting the enclosing leaf block when `point` is
    /// strictly inside it. Returns the path of the inserted node.
    ///
    /// An empty leaf block counts as "at its end" whatever runs it holds, so the node always goes
    /// after it.
    pub fn insert_block_at(&mut self, point: &Point, node: Node) -> Result<Path, CommandError> {
        let block = self
            .document
            .leaf_block_above(&point.path)
            .ok_or_else(|| CommandError::InvalidPoint(point.clone()))?;
        let empty = self
            .document
            .string(&block)
            .is_some_and(|text| text.is_empty());
        let at_end = empty || self.document.end_point(&block).as_ref() == Some(point);

        let block = if empty {
            block
        } else {
            let block_ref = self.path_ref(&block);
            self.split_at(point, block.len(), false)?;
            self.unref(block_ref)
                .ok_or_else(|| CommandError::InvalidPath(block.clone()))?
        };

        let target = if at_end {
            block
                .next()
                .ok_or_else(|| CommandError::InvalidPath(block.clone()))?
        } else {
            block
        };
        self.insert_node(&target, node)?;
        Ok(target)
    }

    /// Join the leaf block at `block` onto the end of the leaf block `previous`.
    ///
    /// Siblings are merged directly; otherwise the runs are moved across containers and the
    /// emptied block (and any container it leaves empty) is removed. Returns the join point.
    pub fn join_blocks(&mut self, previous: &Path, block: &Path) -> Result<Point, CommandError> {
        let join = self
            .document
            .end_point(previous)
            .ok_or_else(|| CommandError::InvalidPath(previous.clone()))?;

        if previous.next().as_ref() == Some(block) {
            self.merge_node(block)?;
            return Ok(join);
        }

        let runs = self
            .document
            .element(block)
            .map(|element| element.children.clone())
            .ok_or_else(|| CommandError::InvalidPath(block.clone()))?;
        let base = self
            .document
            .element(previous)
            .map(|element| element.children.len())
            .ok_or_else(|| CommandError::InvalidPath(previous.clone()))?;
        let block_ref = self.path_ref(block);
        for (index, run) in runs.into_iter().enumerate() {
            self.insert_node(&previous.child(base + index), run)?;
        }
        if let Some(block) = self.unref(block_ref) {
            self.remove_with_empty_ancestors(&block)?;
        }
        Ok(join)
    }

    /// Remove the node at `path`, then every ancestor left without children.
    pub fn remove_with_empty_ancestors(&mut self, path: &Path) -> Result<(), CommandError> {
        self.remove_node(path)?;
        let mut parent = path.parent();
        while let Some(current) = parent {
            if current.is_root() {
                break;
            }
            let empty = self
                .document
                .element(&current)
                .is_some_and(|element| element.children.is_empty());
            if !empty {
                break;
            }
            self.remove_node(&current)?;
            parent = current.parent();
        }
        Ok(())
    }

    /// Delete the content of an expanded selection and collapse it to its start.
    ///
    /// The end block keeps what follows the end point, the start block keeps what precedes the
    /// start point, every node fully between them is removed and the two remainders are joined.
    pub fn delete_fragment(&mut self) -> Result<(), CommandError> {
        let Some(selection) = self.selection.clone() else {
            return Err(CommandError::NoSelection);
        };
        if selection.is_collapsed() {
            return Ok(());
        }
        let (start, end) = selection.edges();
        let (start, end) = (start.clone(), end.clone());

        if start.path == end.path {
            self.remove_text(&start, end.offset - start.offset)?;
            return self.select_point(start);
        }

        let start_block = self
            .document
            .leaf_block_above(&start.path)
            .ok_or_else(|| CommandError::InvalidPoint(start.clone()))?;
        let end_block = self
            .document
            .leaf_block_above(&end.path)
            .ok_or_else(|| CommandError::InvalidPoint(end.clone()))?;
        let start_index = start.path.last().unwrap_or(0);
        let end_index = end.path.last().unwrap_or(0);

        // End side first so the start side's paths stay put.
        self.remove_text(&Point::new(end.path.clone(), 0), end.offset)?;
        if start_block == end_block {
            for index in (start_index + 1..end_index).rev() {
                self.remove_node(&start_block.child(index))?;
            }
        } else {
            for index in (0..end_index).rev() {
                self.remove_node(&end_block.child(index))?;
            }
            let runs = self
                .document
                .element(&start_block)
                .map_or(0, |element| element.children.len());
            for index in (start_index + 1..runs).rev() {
                self.remove_node(&start_block.child(index))?;
            }
        }
        let start_len = self
            .document
            .text(&start.path)
            .map_or(start.offset, TextRun::len);
        self.remove_text(&start, start_len.saturating_sub(start.offset))?;

        if start_block != end_block {
            let end_ref = self.path_ref(&end_block);
            for path in self
                .fully_covered_between(&start_block, &end_block)
                .into_iter()
                .rev()
            {
                self.remove_node(&path)?;
            }
            if let Some(end_block) = self.unref(end_ref) {
                self.join_blocks(&start_block, &end_block)?;
            }
        }

        self.select_point(start)
    }

    /// Highest nodes lying strictly between two leaf blocks, in document order.
    fn fully_covered_between(&self, start_block: &Path, end_block: &Path) -> Vec<Path> {
        let mut out: Vec<Path> = Vec::new();
        for path in self.document.element_paths() {
            if path <= *start_block || path >= *end_block {
                continue;
            }
            if path.contains(start_block) || path.contains(end_block) {
                continue;
            }
            if out.last().is_some_and(|last| last.is_ancestor_of(&path)) {
                continue;
            }
            out.push(path);
        }
        out
    }
}
