//! Document tree data model.
//!
//! The tree is a list of top-level blocks. Blocks are [`Element`]s tagged with a [`BlockKind`];
//! leaves are [`TextRun`]s. The serialized form matches the editor's `onChange` value:
//!
//! ```json
//! [
//!   { "type": "heading", "level": 1, "children": [{ "text": "Title", "bold": true }] },
//!   { "type": "code-block", "language": "rust", "children": [
//!       { "type": "code-line", "children": [{ "text": "fn main() {}" }] }
//!   ] }
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Heading level, restricted to 1..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    /// Level 1.
    pub const H1: Self = Self(1);
    /// Level 2.
    pub const H2: Self = Self(2);
    /// Level 3.
    pub const H3: Self = Self(3);

    /// Create a level, returning `None` outside 1..=3.
    pub fn new(level: u8) -> Option<Self> {
        (1..=3).contains(&level).then_some(Self(level))
    }

    /// Numeric value.
    pub fn get(self) -> u8 {
        self.0
    }
}

/// Error for heading levels outside 1..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("heading level must be 1, 2 or 3 (got {0})")]
pub struct InvalidHeadingLevel(pub u8);

impl TryFrom<u8> for HeadingLevel {
    type Error = InvalidHeadingLevel;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level).ok_or(InvalidHeadingLevel(level))
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> u8 {
        level.0
    }
}

/// Block variant with its variant-specific fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BlockKind {
    /// Plain paragraph.
    Paragraph,
    /// Heading.
    Heading {
        /// Heading level.
        level: HeadingLevel,
    },
    /// Block quote.
    BlockQuote,
    /// Code block; its children are code lines.
    CodeBlock {
        /// Language identifier used for highlighting.
        language: String,
    },
    /// One line of a code block.
    CodeLine,
}

impl BlockKind {
    /// A code block with the given language.
    pub fn code_block(language: impl Into<String>) -> Self {
        Self::CodeBlock {
            language: language.into(),
        }
    }

    /// The serialized `type` tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Heading { .. } => "heading",
            Self::BlockQuote => "block-quote",
            Self::CodeBlock { .. } => "code-block",
            Self::CodeLine => "code-line",
        }
    }

    /// Returns `true` for blocks whose children are text runs.
    pub fn is_leaf_block(&self) -> bool {
        !self.is_container()
    }

    /// Returns `true` for blocks whose children are other blocks.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::CodeBlock { .. })
    }

    /// Returns `true` for [`BlockKind::CodeBlock`].
    pub fn is_code_block(&self) -> bool {
        matches!(self, Self::CodeBlock { .. })
    }

    /// Returns `true` for [`BlockKind::CodeLine`].
    pub fn is_code_line(&self) -> bool {
        matches!(self, Self::CodeLine)
    }

    /// The code block language, if this is a code block.
    pub fn language(&self) -> Option<&str> {
        match self {
            Self::CodeBlock { language } => Some(language),
            _ => None,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A formatting mark on a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    /// Bold.
    Bold,
    /// Italic.
    Italic,
    /// Underline.
    Underline,
    /// Strikethrough.
    Strikethrough,
    /// Inline code.
    Code,
}

impl Mark {
    /// All marks, in toolbar order.
    pub const ALL: [Mark; 5] = [
        Mark::Bold,
        Mark::Italic,
        Mark::Underline,
        Mark::Strikethrough,
        Mark::Code,
    ];

    /// Field name used in the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::Strikethrough => "strikethrough",
            Self::Code => "code",
        }
    }

    /// Parse a mark from its field name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mark| mark.as_str() == name)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// The set of marks carried by a text run. Unset marks are omitted when serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marks {
    /// Bold.
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    /// Italic.
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    /// Underline.
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    /// Strikethrough.
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    /// Inline code.
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
}

impl Marks {
    /// Whether `mark` is set.
    pub fn get(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Strikethrough => self.strikethrough,
            Mark::Code => self.code,
        }
    }

    /// Set or clear `mark`.
    pub fn set(&mut self, mark: Mark, value: bool) {
        let slot = match mark {
            Mark::Bold => &mut self.bold,
            Mark::Italic => &mut self.italic,
            Mark::Underline => &mut self.underline,
            Mark::Strikethrough => &mut self.strikethrough,
            Mark::Code => &mut self.code,
        };
        *slot = value;
    }

    /// Copy of these marks with `mark` set to `value`.
    pub fn with(mut self, mark: Mark, value: bool) -> Self {
        self.set(mark, value);
        self
    }

    /// Returns `true` if no mark is set.
    pub fn is_empty(&self) -> bool {
        Mark::ALL.into_iter().all(|mark| !self.get(mark))
    }
}

/// A leaf node: a string with formatting marks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRun {
    /// Text content.
    pub text: String,
    /// Formatting marks.
    #[serde(flatten)]
    pub marks: Marks,
}

impl TextRun {
    /// An unformatted run.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    /// A run with marks.
    pub fn with_marks(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns `true` if the run holds no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A structural node with a block kind and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Element {
    /// Block variant.
    #[serde(flatten)]
    pub kind: BlockKind,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element.
    pub fn new(kind: BlockKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// A block.
    Element(Element),
    /// A text run.
    Text(TextRun),
}

impl Node {
    /// An unformatted text run.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextRun::new(text))
    }

    /// An element.
    pub fn element(kind: BlockKind, children: Vec<Node>) -> Self {
        Self::Element(Element::new(kind, children))
    }

    /// A paragraph holding one unformatted run.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::element(BlockKind::Paragraph, vec![Self::text(text)])
    }

    /// A heading holding one unformatted run.
    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        Self::element(BlockKind::Heading { level }, vec![Self::text(text)])
    }

    /// A block quote holding one unformatted run.
    pub fn block_quote(text: impl Into<String>) -> Self {
        Self::element(BlockKind::BlockQuote, vec![Self::text(text)])
    }

    /// A code line holding one unformatted run.
    pub fn code_line(text: impl Into<String>) -> Self {
        Self::element(BlockKind::CodeLine, vec![Self::text(text)])
    }

    /// A code block with one code line per entry of `lines`.
    pub fn code_block<S: AsRef<str>>(language: impl Into<String>, lines: &[S]) -> Self {
        Self::element(
            BlockKind::code_block(language),
            lines.iter().map(|line| Self::code_line(line.as_ref())).collect(),
        )
    }

    /// Returns `true` for text runs.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// The element, if this is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }

    /// Mutable access to the element, if this is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }

    /// The text run, if this is one.
    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            Self::Text(run) => Some(run),
            Self::Element(_) => None,
        }
    }

    /// Mutable access to the text run, if this is one.
    pub fn as_text_mut(&mut self) -> Option<&mut TextRun> {
        match self {
            Self::Text(run) => Some(run),
            Self::Element(_) => None,
        }
    }

    /// Block kind of an element.
    pub fn kind(&self) -> Option<&BlockKind> {
        self.as_element().map(|element| &element.kind)
    }

    /// Children of an element (empty for text runs).
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Element(element) => &element.children,
            Self::Text(_) => &[],
        }
    }

    /// Concatenated text content of this subtree.
    pub fn string(&self) -> String {
        let mut out = String::new();
        self.push_string(&mut out);
        out
    }

    fn push_string(&self, out: &mut String) {
        match self {
            Self::Text(run) => out.push_str(&run.text),
            Self::Element(element) => {
                for child in &element.children {
                    child.push_string(out);
                }
            }
        }
    }

    /// "Length" used by merge/split operations: characters for text, child count for elements.
    pub fn merge_len(&self) -> usize {
        match self {
            Self::Text(run) => run.len(),
            Self::Element(element) => element.children.len(),
        }
    }
}

impl From<TextRun> for Node {
    fn from(run: TextRun) -> Self {
        Self::Text(run)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialized_field_names() {
        let node = Node::element(
            BlockKind::Heading {
                level: HeadingLevel::H2,
            },
            vec![Node::Text(TextRun::with_marks(
                "Title",
                Marks::default().with(Mark::Bold, true),
            ))],
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "heading",
                "level": 2,
                "children": [{ "text": "Title", "bold": true }]
            })
        );
    }

    #[test]
    fn test_code_block_json_shape() {
        let node = Node::code_block("rust", &["fn main() {}"]);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "code-block",
                "language": "rust",
                "children": [{ "type": "code-line", "children": [{ "text": "fn main() {}" }] }]
            })
        );
        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_heading_level_is_validated() {
        let bad = serde_json::json!({ "type": "heading", "level": 7, "children": [] });
        assert!(serde_json::from_value::<Node>(bad).is_err());
        assert_eq!(HeadingLevel::new(3), Some(HeadingLevel::H3));
        assert_eq!(HeadingLevel::new(0), None);
    }

    #[test]
    fn test_string_concatenates_runs() {
        let node = Node::element(
            BlockKind::Paragraph,
            vec![Node::text("ab"), Node::text("cd")],
        );
        assert_eq!(node.string(), "abcd");
        assert_eq!(node.merge_len(), 2);
    }
}
