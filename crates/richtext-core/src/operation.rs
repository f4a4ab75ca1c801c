//! Low-level tree operations.
//!
//! Every mutation of the document goes through an [`Operation`]. Applying one changes the tree;
//! [`transform_path`] and [`transform_point`] describe how an address that was valid before the
//! operation maps onto the tree after it. The editor uses them to keep its selection (and any
//! outstanding path refs) valid across mutations.

use crate::commands::CommandError;
use crate::document::Document;
use crate::node::{BlockKind, Element, Marks, Node, TextRun};
use crate::path::{Path, Point};

/// A primitive document mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Insert `node` so that it ends up at `path`.
    InsertNode {
        /// Target path.
        path: Path,
        /// Inserted node.
        node: Node,
    },
    /// Remove the node at `path`.
    RemoveNode {
        /// Removed path.
        path: Path,
        /// The removed node (filled in when the operation is recorded).
        node: Node,
    },
    /// Merge the node at `path` into its previous sibling.
    ///
    /// `position` is the previous sibling's length before the merge (characters for text runs,
    /// child count for elements).
    MergeNode {
        /// Path of the node being merged away.
        path: Path,
        /// Join position inside the previous sibling.
        position: usize,
    },
    /// Split the node at `path`; everything from `position` on moves into a new next sibling.
    SplitNode {
        /// Split node.
        path: Path,
        /// Characters (text) or child index (element) where the split happens.
        position: usize,
    },
    /// Insert `text` into the run at `path`.
    InsertText {
        /// Text run path.
        path: Path,
        /// Character offset.
        offset: usize,
        /// Inserted text.
        text: String,
    },
    /// Remove `text` from the run at `path`, starting at `offset`.
    RemoveText {
        /// Text run path.
        path: Path,
        /// Character offset.
        offset: usize,
        /// Removed text.
        text: String,
    },
    /// Change the block kind of the element at `path`.
    SetKind {
        /// Element path.
        path: Path,
        /// New kind.
        kind: BlockKind,
    },
    /// Replace the marks of the run at `path`.
    SetMarks {
        /// Text run path.
        path: Path,
        /// New marks.
        marks: Marks,
    },
    /// Replace the node at `path` with a new element of `kind` whose only child is that node.
    WrapNode {
        /// Wrapped node.
        path: Path,
        /// Kind of the new parent.
        kind: BlockKind,
    },
    /// Replace the element at `path` with its children.
    UnwrapNode {
        /// Unwrapped element.
        path: Path,
        /// Number of children spliced into the parent.
        children: usize,
    },
}

impl Operation {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InsertNode { .. } => "insert_node",
            Self::RemoveNode { .. } => "remove_node",
            Self::MergeNode { .. } => "merge_node",
            Self::SplitNode { .. } => "split_node",
            Self::InsertText { .. } => "insert_text",
            Self::RemoveText { .. } => "remove_text",
            Self::SetKind { .. } => "set_kind",
            Self::SetMarks { .. } => "set_marks",
            Self::WrapNode { .. } => "wrap_node",
            Self::UnwrapNode { .. } => "unwrap_node",
        }
    }

    /// The path the operation targets.
    pub fn path(&self) -> &Path {
        match self {
            Self::InsertNode { path, .. }
            | Self::RemoveNode { path, .. }
            | Self::MergeNode { path, .. }
            | Self::SplitNode { path, .. }
            | Self::InsertText { path, .. }
            | Self::RemoveText { path, .. }
            | Self::SetKind { path, .. }
            | Self::SetMarks { path, .. }
            | Self::WrapNode { path, .. }
            | Self::UnwrapNode { path, .. } => path,
        }
    }
}

fn byte_offset(text: &str, char_offset: usize) -> Option<usize> {
    if char_offset == 0 {
        return Some(0);
    }
    match text.char_indices().nth(char_offset) {
        Some((byte, _)) => Some(byte),
        None if text.chars().count() == char_offset => Some(text.len()),
        None => None,
    }
}

fn split_parent(path: &Path) -> Result<(Path, usize), CommandError> {
    match (path.parent(), path.last()) {
        (Some(parent), Some(index)) => Ok((parent, index)),
        _ => Err(CommandError::InvalidPath(path.clone())),
    }
}

impl Document {
    /// Apply an operation to the tree.
    ///
    /// Fails without modifying the tree if the operation does not fit the current shape.
    pub fn apply(&mut self, op: &Operation) -> Result<(), CommandError> {
        let invalid = || CommandError::InvalidPath(op.path().clone());
        match op {
            Operation::InsertNode { path, node } => {
                let (parent, index) = split_parent(path)?;
                let siblings = self.children_at_mut(&parent).ok_or_else(invalid)?;
                if index > siblings.len() {
                    return Err(invalid());
                }
                siblings.insert(index, node.clone());
            }
            Operation::RemoveNode { path, .. } => {
                let (parent, index) = split_parent(path)?;
                let siblings = self.children_at_mut(&parent).ok_or_else(invalid)?;
                if index >= siblings.len() {
                    return Err(invalid());
                }
                siblings.remove(index);
            }
            Operation::MergeNode { path, .. } => {
                let (parent, index) = split_parent(path)?;
                let siblings = self.children_at_mut(&parent).ok_or_else(invalid)?;
                if index == 0 || index >= siblings.len() {
                    return Err(invalid());
                }
                match (&siblings[index - 1], &siblings[index]) {
                    (Node::Text(_), Node::Text(_)) | (Node::Element(_), Node::Element(_)) => {}
                    _ => {
                        return Err(CommandError::InvalidOperation(format!(
                            "cannot merge mismatched nodes at {path}"
                        )));
                    }
                }
                let merged = siblings.remove(index);
                match (&mut siblings[index - 1], merged) {
                    (Node::Text(prev), Node::Text(run)) => prev.text.push_str(&run.text),
                    (Node::Element(prev), Node::Element(element)) => {
                        prev.children.extend(element.children)
                    }
                    // Mismatched kinds were rejected above.
                    _ => {}
                }
            }
            Operation::SplitNode { path, position } => {
                let (parent, index) = split_parent(path)?;
                let siblings = self.children_at_mut(&parent).ok_or_else(invalid)?;
                let node = siblings.get_mut(index).ok_or_else(invalid)?;
                let right = match node {
                    Node::Text(run) => {
                        let byte = byte_offset(&run.text, *position).ok_or_else(invalid)?;
                        let tail = run.text.split_off(byte);
                        Node::Text(TextRun::with_marks(tail, run.marks))
                    }
                    Node::Element(element) => {
                        if *position > element.children.len() {
                            return Err(invalid());
                        }
                        let tail = element.children.split_off(*position);
                        Node::Element(Element::new(element.kind.clone(), tail))
                    }
                };
                siblings.insert(index + 1, right);
            }
            Operation::InsertText { path, offset, text } => {
                let run = self
                    .node_mut(path)
                    .and_then(Node::as_text_mut)
                    .ok_or_else(invalid)?;
                let byte = byte_offset(&run.text, *offset).ok_or_else(invalid)?;
                run.text.insert_str(byte, text);
            }
            Operation::RemoveText { path, offset, text } => {
                let run = self
                    .node_mut(path)
                    .and_then(Node::as_text_mut)
                    .ok_or_else(invalid)?;
                let start = byte_offset(&run.text, *offset).ok_or_else(invalid)?;
                let end = start + text.len();
                if run.text.get(start..end) != Some(text.as_str()) {
                    return Err(CommandError::InvalidOperation(format!(
                        "removed text does not match document at {path}"
                    )));
                }
                run.text.replace_range(start..end, "");
            }
            Operation::SetKind { path, kind } => {
                let element = self
                    .node_mut(path)
                    .and_then(Node::as_element_mut)
                    .ok_or_else(invalid)?;
                element.kind = kind.clone();
            }
            Operation::SetMarks { path, marks } => {
                let run = self
                    .node_mut(path)
                    .and_then(Node::as_text_mut)
                    .ok_or_else(invalid)?;
                run.marks = *marks;
            }
            Operation::WrapNode { path, kind } => {
                let slot = self.node_mut(path).ok_or_else(invalid)?;
                let inner = std::mem::replace(slot, Node::text(""));
                *slot = Node::element(kind.clone(), vec![inner]);
            }
            Operation::UnwrapNode { path, .. } => {
                let (parent, index) = split_parent(path)?;
                let siblings = self.children_at_mut(&parent).ok_or_else(invalid)?;
                let children = match siblings.get_mut(index) {
                    Some(Node::Element(element)) => std::mem::take(&mut element.children),
                    _ => return Err(invalid()),
                };
                siblings.splice(index..=index, children);
            }
        }
        Ok(())
    }
}

/// Map a path through an operation. Returns `None` if the addressed node was removed.
///
/// Splits use forward affinity: a path equal to the split node moves to the new right half.
pub fn transform_path(path: &Path, op: &Operation) -> Option<Path> {
    let mut out = path.clone();
    match op {
        Operation::InsertNode { path: at, .. } => {
            if at == path || at.ends_before(path) || at.is_ancestor_of(path) {
                *out.index_mut(at.len() - 1)? += 1;
            }
        }
        Operation::RemoveNode { path: at, .. } => {
            if at.contains(path) {
                return None;
            }
            if at.ends_before(path) {
                *out.index_mut(at.len() - 1)? -= 1;
            }
        }
        Operation::MergeNode { path: at, position } => {
            if at == path || at.ends_before(path) {
                *out.index_mut(at.len() - 1)? -= 1;
            } else if at.is_ancestor_of(path) {
                *out.index_mut(at.len() - 1)? -= 1;
                *out.index_mut(at.len())? += position;
            }
        }
        Operation::SplitNode { path: at, position } => {
            if at == path || at.ends_before(path) {
                *out.index_mut(at.len() - 1)? += 1;
            } else if at.is_ancestor_of(path) && path.as_slice()[at.len()] >= *position {
                *out.index_mut(at.len() - 1)? += 1;
                *out.index_mut(at.len())? -= position;
            }
        }
        Operation::WrapNode { path: at, .. } => {
            if at.contains(path) {
                out.indices_mut().insert(at.len(), 0);
            }
        }
        Operation::UnwrapNode { path: at, children } => {
            if at == path {
                return None;
            }
            if at.is_ancestor_of(path) {
                let depth = at.len();
                let inner = path.as_slice()[depth];
                let indices = out.indices_mut();
                indices.remove(depth);
                indices[depth - 1] += inner;
            } else if at.ends_before(path) {
                let slot = out.index_mut(at.len() - 1)?;
                *slot = (*slot + children).checked_sub(1)?;
            }
        }
        Operation::InsertText { .. }
        | Operation::RemoveText { .. }
        | Operation::SetKind { .. }
        | Operation::SetMarks { .. } => {}
    }
    Some(out)
}

/// Map a point through an operation. Returns `None` if its text run was removed.
///
/// Insertions at the point push it forward; a split exactly at the point moves it to the start of
/// the new right half.
pub fn transform_point(point: &Point, op: &Operation) -> Option<Point> {
    let mut out = point.clone();
    match op {
        Operation::InsertText { path, offset, text } => {
            if *path == point.path && *offset <= point.offset {
                out.offset += text.chars().count();
            }
        }
        Operation::RemoveText { path, offset, text } => {
            if *path == point.path && *offset <= point.offset {
                let len = text.chars().count();
                out.offset -= len.min(point.offset - offset);
            }
        }
        Operation::MergeNode { path, position } => {
            if *path == point.path {
                out.offset += position;
            }
            out.path = transform_path(&point.path, op)?;
        }
        Operation::SplitNode { path, position } => {
            if *path == point.path {
                if *position <= point.offset {
                    out.offset -= position;
                    out.path = transform_path(&point.path, op)?;
                }
            } else {
                out.path = transform_path(&point.path, op)?;
            }
        }
        _ => {
            out.path = transform_path(&point.path, op)?;
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TextRun;
    use pretty_assertions::assert_eq;

    fn doc() -> Document {
        Document::new(vec![
            Node::paragraph("hello"),
            Node::code_block("rust", &["ab", "cd"]),
        ])
    }

    #[test]
    fn test_split_then_merge_restores_text() {
        let mut doc = doc();
        let split = Operation::SplitNode {
            path: Path::from([0, 0]),
            position: 2,
        };
        doc.apply(&split).unwrap();
        assert_eq!(doc.text(&Path::from([0, 1])), Some(&TextRun::new("llo")));

        let merge = Operation::MergeNode {
            path: Path::from([0, 1]),
            position: 2,
        };
        doc.apply(&merge).unwrap();
        assert_eq!(doc.string(&Path::from([0])).as_deref(), Some("hello"));
    }

    #[test]
    fn test_remove_text_must_match() {
        let mut doc = doc();
        let op = Operation::RemoveText {
            path: Path::from([0, 0]),
            offset: 1,
            text: "xyz".into(),
        };
        assert!(doc.apply(&op).is_err());
        assert_eq!(doc.string(&Path::from([0])).as_deref(), Some("hello"));
    }

    #[test]
    fn test_multibyte_offsets_are_chars() {
        let mut doc = Document::new(vec![Node::paragraph("a👋b")]);
        let op = Operation::InsertText {
            path: Path::from([0, 0]),
            offset: 2,
            text: "!".into(),
        };
        doc.apply(&op).unwrap();
        assert_eq!(doc.string(&Path::from([0])).as_deref(), Some("a👋!b"));
    }

    #[test]
    fn test_point_follows_text_split_with_forward_affinity() {
        let op = Operation::SplitNode {
            path: Path::from([1, 0, 0]),
            position: 1,
        };
        let point = Point::new([1, 0, 0], 1);
        assert_eq!(transform_point(&point, &op), Some(Point::new([1, 0, 1], 0)));
        let after = Point::new([1, 0, 0], 3);
        assert_eq!(transform_point(&after, &op), Some(Point::new([1, 0, 1], 2)));
        let before = Point::new([1, 0, 0], 0);
        assert_eq!(transform_point(&before, &op), Some(before.clone()));
    }

    #[test]
    fn test_element_split_moves_children_at_or_after_position() {
        let op = Operation::SplitNode {
            path: Path::from([1, 0]),
            position: 1,
        };
        let moved = Point::new([1, 0, 1], 2);
        assert_eq!(transform_point(&moved, &op), Some(Point::new([1, 1, 0], 2)));
        let kept = Point::new([1, 0, 0], 1);
        assert_eq!(transform_point(&kept, &op), Some(kept.clone()));
        let later_line = Point::new([1, 1, 0], 0);
        assert_eq!(transform_point(&later_line, &op), Some(Point::new([1, 2, 0], 0)));
    }

    #[test]
    fn test_point_follows_merge() {
        let op = Operation::MergeNode {
            path: Path::from([1, 1]),
            position: 1,
        };
        let point = Point::new([1, 1, 0], 2);
        assert_eq!(transform_point(&point, &op), Some(Point::new([1, 0, 1], 2)));
    }

    #[test]
    fn test_wrap_and_unwrap_paths() {
        let wrap = Operation::WrapNode {
            path: Path::from([1, 0]),
            kind: BlockKind::CodeLine,
        };
        assert_eq!(
            transform_path(&Path::from([1, 0, 0]), &wrap),
            Some(Path::from([1, 0, 0, 0]))
        );

        let unwrap = Operation::UnwrapNode {
            path: Path::from([0, 1]),
            children: 3,
        };
        assert_eq!(
            transform_path(&Path::from([0, 1, 2]), &unwrap),
            Some(Path::from([0, 3]))
        );
        assert_eq!(
            transform_path(&Path::from([0, 2]), &unwrap),
            Some(Path::from([0, 4]))
        );
    }

    #[test]
    fn test_removed_point_is_dropped() {
        let op = Operation::RemoveNode {
            path: Path::from([1]),
            node: Node::paragraph(""),
        };
        assert_eq!(transform_point(&Point::new([1, 0, 0], 0), &op), None);
        assert_eq!(
            transform_point(&Point::new([2, 0], 1), &op),
            Some(Point::new([1, 0], 1))
        );
    }
}
