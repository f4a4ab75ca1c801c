//! The document root and read-only tree queries.

use crate::commands::CommandError;
use crate::node::{BlockKind, Element, Node, TextRun};
use crate::path::{Path, Point};
use serde::{Deserialize, Serialize};

/// The document root: an ordered list of top-level blocks.
///
/// Serializes transparently as the list of blocks (the `onChange` value).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    /// Top-level nodes.
    pub children: Vec<Node>,
}

impl Document {
    /// Create a document from top-level nodes.
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Parse a document from its JSON value form.
    pub fn from_json(json: &str) -> Result<Self, CommandError> {
        serde_json::from_str(json).map_err(|e| CommandError::Serialization(e.to_string()))
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, CommandError> {
        serde_json::to_string(self).map_err(|e| CommandError::Serialization(e.to_string()))
    }

    /// Get the node at `path` (`None` for the root path or a dangling path).
    pub fn node(&self, path: &Path) -> Option<&Node> {
        let (first, rest) = path.as_slice().split_first()?;
        let mut node = self.children.get(*first)?;
        for index in rest {
            node = node.children().get(*index)?;
        }
        Some(node)
    }

    /// Mutable access to the node at `path`.
    pub fn node_mut(&mut self, path: &Path) -> Option<&mut Node> {
        let (first, rest) = path.as_slice().split_first()?;
        let mut node = self.children.get_mut(*first)?;
        for index in rest {
            node = node.as_element_mut()?.children.get_mut(*index)?;
        }
        Some(node)
    }

    /// Children of the node at `path`; the root path yields the top-level blocks.
    pub fn children_at(&self, path: &Path) -> Option<&[Node]> {
        if path.is_root() {
            return Some(&self.children);
        }
        Some(self.node(path)?.as_element()?.children.as_slice())
    }

    pub(crate) fn children_at_mut(&mut self, path: &Path) -> Option<&mut Vec<Node>> {
        if path.is_root() {
            return Some(&mut self.children);
        }
        Some(&mut self.node_mut(path)?.as_element_mut()?.children)
    }

    /// The element at `path`.
    pub fn element(&self, path: &Path) -> Option<&Element> {
        self.node(path)?.as_element()
    }

    /// The text run at `path`.
    pub fn text(&self, path: &Path) -> Option<&TextRun> {
        self.node(path)?.as_text()
    }

    /// Block kind of the element at `path`.
    pub fn kind(&self, path: &Path) -> Option<&BlockKind> {
        self.node(path)?.kind()
    }

    /// Concatenated text of the subtree at `path` (the whole document for the root).
    pub fn string(&self, path: &Path) -> Option<String> {
        if path.is_root() {
            return Some(self.children.iter().map(Node::string).collect());
        }
        self.node(path).map(Node::string)
    }

    /// All text runs with their paths, in document order.
    pub fn texts(&self) -> Vec<(Path, &TextRun)> {
        let mut out = Vec::new();
        for (index, child) in self.children.iter().enumerate() {
            collect_texts(child, Path::root().child(index), &mut out);
        }
        out
    }

    /// All element paths in pre-order (parents before children).
    pub fn element_paths(&self) -> Vec<Path> {
        let mut out = Vec::new();
        for (index, child) in self.children.iter().enumerate() {
            collect_elements(child, Path::root().child(index), &mut out);
        }
        out
    }

    /// All leaf-bearing block paths in document order.
    pub fn leaf_block_paths(&self) -> Vec<Path> {
        self.element_paths()
            .into_iter()
            .filter(|path| self.kind(path).is_some_and(BlockKind::is_leaf_block))
            .collect()
    }

    /// The nearest ancestor element of `path` (including `path` itself) matching `predicate`.
    pub fn above<F>(&self, path: &Path, predicate: F) -> Option<(Path, &Element)>
    where
        F: Fn(&BlockKind) -> bool,
    {
        let mut current = Some(path.clone());
        while let Some(candidate) = current {
            if candidate.is_root() {
                return None;
            }
            if let Some(element) = self.element(&candidate)
                && predicate(&element.kind)
            {
                return Some((candidate, element));
            }
            current = candidate.parent();
        }
        None
    }

    /// The nearest leaf-bearing block containing `path`.
    pub fn leaf_block_above(&self, path: &Path) -> Option<Path> {
        self.above(path, BlockKind::is_leaf_block)
            .map(|(path, _)| path)
    }

    /// First point inside the node at `path`.
    pub fn start_point(&self, path: &Path) -> Option<Point> {
        if path.is_root() {
            return self
                .texts()
                .into_iter()
                .next()
                .map(|(path, _)| Point::new(path, 0));
        }
        let mut current = path.clone();
        let mut node = self.node(path)?;
        while let Node::Element(element) = node {
            node = element.children.first()?;
            current = current.child(0);
        }
        Some(Point::new(current, 0))
    }

    /// Last point inside the node at `path`.
    pub fn end_point(&self, path: &Path) -> Option<Point> {
        if path.is_root() {
            return self
                .texts()
                .into_iter()
                .last()
                .map(|(path, run)| Point::new(path, run.len()));
        }
        let mut current = path.clone();
        let mut node = self.node(path)?;
        loop {
            match node {
                Node::Text(run) => return Some(Point::new(current, run.len())),
                Node::Element(element) => {
                    let last = element.children.len().checked_sub(1)?;
                    node = &element.children[last];
                    current = current.child(last);
                }
            }
        }
    }

    /// The last text run that ends before `path` (outside its subtree).
    pub fn previous_text(&self, path: &Path) -> Option<(Path, &TextRun)> {
        self.texts()
            .into_iter()
            .take_while(|(candidate, _)| candidate < path)
            .last()
    }

    /// The first text run that starts after the subtree at `path`.
    pub fn next_text(&self, path: &Path) -> Option<(Path, &TextRun)> {
        self.texts()
            .into_iter()
            .find(|(candidate, _)| candidate > path && !path.contains(candidate))
    }

    /// The leaf-bearing block preceding the one at `path`, in document order.
    pub fn previous_leaf_block(&self, path: &Path) -> Option<Path> {
        self.leaf_block_paths()
            .into_iter()
            .take_while(|candidate| candidate < path)
            .last()
    }

    /// Text between two points; the text of each touched leaf block becomes one line.
    pub fn fragment_text(&self, start: &Point, end: &Point) -> String {
        let mut lines = Vec::new();
        for block in self.leaf_block_paths() {
            let Some(element) = self.element(&block) else {
                continue;
            };
            let mut line = String::new();
            let mut touched = false;
            for (index, child) in element.children.iter().enumerate() {
                let Node::Text(run) = child else {
                    continue;
                };
                let path = block.child(index);
                if path < start.path || path > end.path {
                    continue;
                }
                let from = if path == start.path { start.offset } else { 0 };
                let to = if path == end.path { end.offset } else { run.len() };
                line.extend(run.text.chars().skip(from).take(to.saturating_sub(from)));
                touched = true;
            }
            if touched {
                lines.push(line);
            }
        }
        lines.join("\n")
    }

    /// Returns `true` if `point` addresses an existing text run with an in-range offset.
    pub fn is_valid_point(&self, point: &Point) -> bool {
        self.text(&point.path)
            .is_some_and(|run| point.offset <= run.len())
    }
}

fn collect_texts<'a>(node: &'a Node, path: Path, out: &mut Vec<(Path, &'a TextRun)>) {
    match node {
        Node::Text(run) => out.push((path, run)),
        Node::Element(element) => {
            for (index, child) in element.children.iter().enumerate() {
                collect_texts(child, path.child(index), out);
            }
        }
    }
}

fn collect_elements(node: &Node, path: Path, out: &mut Vec<Path>) {
    if let Node::Element(element) = node {
        out.push(path.clone());
        for (index, child) in element.children.iter().enumerate() {
            collect_elements(child, path.child(index), out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::new(vec![
            Node::paragraph("intro"),
            Node::code_block("rust", &["fn a() {", "}"]),
            Node::paragraph("outro"),
        ])
    }

    #[test]
    fn test_node_lookup_and_string() {
        let doc = sample();
        assert_eq!(doc.string(&Path::from([1, 0])).as_deref(), Some("fn a() {"));
        assert!(doc.node(&Path::from([1, 5])).is_none());
        assert!(doc.node(&Path::root()).is_none());
        assert_eq!(doc.string(&Path::root()).as_deref(), Some("introfn a() {}outro"));
    }

    #[test]
    fn test_above_finds_enclosing_code_block() {
        let doc = sample();
        let (path, element) = doc
            .above(&Path::from([1, 1, 0]), BlockKind::is_code_block)
            .unwrap();
        assert_eq!(path, Path::from([1]));
        assert_eq!(element.kind.language(), Some("rust"));
        assert_eq!(doc.leaf_block_above(&Path::from([1, 1, 0])), Some(Path::from([1, 1])));
    }

    #[test]
    fn test_previous_and_next_text() {
        let doc = sample();
        let (prev, _) = doc.previous_text(&Path::from([1])).unwrap();
        assert_eq!(prev, Path::from([0, 0]));
        let (next, _) = doc.next_text(&Path::from([1])).unwrap();
        assert_eq!(next, Path::from([2, 0]));
        assert_eq!(doc.previous_leaf_block(&Path::from([2])), Some(Path::from([1, 1])));
    }

    #[test]
    fn test_edge_points() {
        let doc = sample();
        assert_eq!(doc.start_point(&Path::from([1])), Some(Point::new([1, 0, 0], 0)));
        assert_eq!(doc.end_point(&Path::from([1])), Some(Point::new([1, 1, 0], 1)));
        assert_eq!(doc.end_point(&Path::root()), Some(Point::new([2, 0], 5)));
    }

    #[test]
    fn test_fragment_text_joins_blocks_with_newlines() {
        let doc = sample();
        let text = doc.fragment_text(&Point::new([0, 0], 3), &Point::new([1, 1, 0], 1));
        assert_eq!(text, "ro\nfn a() {\n}");
        assert_eq!(
            doc.fragment_text(&Point::new([2, 0], 1), &Point::new([2, 0], 3)),
            "ut"
        );
    }
}
