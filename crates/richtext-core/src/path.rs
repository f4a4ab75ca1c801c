//! Path, point and selection addressing.
//!
//! A [`Path`] is a list of child indices from the document root. A [`Point`] is a character
//! offset inside the text run addressed by its path. Offsets count Unicode scalar values
//! (`char`s), never bytes.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A sequence of child indices locating a node from the document root.
///
/// The empty path addresses the root itself. Paths order lexicographically, which is document
/// order (an ancestor sorts before its descendants).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create a path from child indices.
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// Child indices of this path.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Number of indices (the depth of the addressed node).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Alias of [`Path::is_root`].
    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// Index of the addressed node among its siblings.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Path of the parent node (`None` for the root).
    pub fn parent(&self) -> Option<Path> {
        if self.is_root() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Path of the `index`-th child of this node.
    pub fn child(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Path of the next sibling.
    pub fn next(&self) -> Option<Path> {
        let last = self.last()?;
        let mut indices = self.0.clone();
        *indices.last_mut()? = last + 1;
        Some(Self(indices))
    }

    /// Path of the previous sibling (`None` for a first child).
    pub fn previous(&self) -> Option<Path> {
        let last = self.last()?;
        if last == 0 {
            return None;
        }
        let mut indices = self.0.clone();
        *indices.last_mut()? = last - 1;
        Some(Self(indices))
    }

    /// Returns `true` if `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// Returns `true` if `self` equals `other` or is one of its ancestors.
    pub fn contains(&self, other: &Path) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Returns `true` if both paths share a parent.
    pub fn is_sibling_of(&self, other: &Path) -> bool {
        !self.is_root() && !other.is_root() && self.parent() == other.parent() && self != other
    }

    /// Returns `true` if `self` ends before `other` at the depth of `self`.
    ///
    /// That is, `other` lives under a later sibling of `self` (or is that sibling). Used to decide
    /// whether an insertion or removal at `self` shifts `other`.
    pub fn ends_before(&self, other: &Path) -> bool {
        let Some(last) = self.last() else {
            return false;
        };
        let depth = self.0.len() - 1;
        if other.0.len() <= depth {
            return false;
        }
        self.0[..depth] == other.0[..depth] && last < other.0[depth]
    }

    pub(crate) fn index_mut(&mut self, depth: usize) -> Option<&mut usize> {
        self.0.get_mut(depth)
    }

    pub(crate) fn indices_mut(&mut self) -> &mut Vec<usize> {
        &mut self.0
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl From<&[usize]> for Path {
    fn from(indices: &[usize]) -> Self {
        Self(indices.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    fn from(indices: [usize; N]) -> Self {
        Self(indices.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// A location inside a text run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Path of the text run.
    pub path: Path,
    /// Offset in characters from the start of the text run.
    pub offset: usize,
}

impl Point {
    /// Create a new point.
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path
            .cmp(&other.path)
            .then_with(|| self.offset.cmp(&other.offset))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.offset)
    }
}

/// Selection range: the anchor is where selecting started, the focus is where the caret is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    /// Fixed end.
    pub anchor: Point,
    /// Moving end (the caret).
    pub focus: Point,
}

impl Selection {
    /// Create a selection from anchor and focus.
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    /// A collapsed selection (caret) at `point`.
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    /// Returns `true` if anchor and focus coincide.
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Returns `true` if the selection covers at least one position.
    pub fn is_expanded(&self) -> bool {
        !self.is_collapsed()
    }

    /// Start and end points in document order.
    pub fn edges(&self) -> (&Point, &Point) {
        if self.anchor <= self.focus {
            (&self.anchor, &self.focus)
        } else {
            (&self.focus, &self.anchor)
        }
    }

    /// The earlier edge.
    pub fn start(&self) -> &Point {
        self.edges().0
    }

    /// The later edge.
    pub fn end(&self) -> &Point {
        self.edges().1
    }
}
