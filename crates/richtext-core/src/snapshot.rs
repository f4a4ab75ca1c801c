//! Headless render snapshot.
//!
//! Flattens the document into what a renderer draws: one entry per leaf-bearing block, each a
//! list of leaves that carry the run's marks and, inside highlighted code lines, the token
//! classification of that slice.

use crate::decorations::{Decoration, decorate};
use crate::document::Document;
use crate::node::{BlockKind, HeadingLevel, Marks, Node};
use crate::path::Path;
use crate::tokens::Tokenizer;
use richtext_lang::PLAIN_TEXT_LANGUAGE;

/// How a block renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotKind {
    /// `<p>`
    Paragraph,
    /// `<h1>`..`<h3>`
    Heading(HeadingLevel),
    /// `<blockquote>`
    BlockQuote,
    /// One line of a code block.
    CodeLine {
        /// Zero-based line index inside the code block.
        line: usize,
        /// Language of the enclosing code block.
        language: String,
    },
}

/// A slice of one text run with uniform styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Leaf text.
    pub text: String,
    /// Marks of the run.
    pub marks: Marks,
    /// Token classification, for highlighted code.
    pub token: Option<String>,
}

/// Render data for one leaf-bearing block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSnapshot {
    /// Block path.
    pub path: Path,
    /// Block kind.
    pub kind: SnapshotKind,
    /// Leaves in order.
    pub leaves: Vec<Leaf>,
}

impl BlockSnapshot {
    /// The block text (concatenated leaves).
    pub fn text(&self) -> String {
        self.leaves.iter().map(|leaf| leaf.text.as_str()).collect()
    }
}

/// Render data for a whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSnapshot {
    /// Leaf-bearing blocks in document order.
    pub blocks: Vec<BlockSnapshot>,
}

impl DocumentSnapshot {
    /// Build the snapshot, highlighting code lines with `tokenizer`.
    pub fn build<T>(document: &Document, tokenizer: &T) -> Self
    where
        T: Tokenizer + ?Sized,
    {
        let blocks = document
            .leaf_block_paths()
            .into_iter()
            .filter_map(|path| {
                let element = document.element(&path)?;
                let kind = snapshot_kind(document, &path, &element.kind);
                let mut leaves = Vec::new();
                for (index, child) in element.children.iter().enumerate() {
                    let Node::Text(run) = child else {
                        continue;
                    };
                    let decorations = decorate(document, &path.child(index), tokenizer);
                    split_run(&run.text, run.marks, &decorations, &mut leaves);
                }
                Some(BlockSnapshot { path, kind, leaves })
            })
            .collect();
        Self { blocks }
    }

    /// The whole document as plain text, one line per block.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(BlockSnapshot::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn snapshot_kind(document: &Document, path: &Path, kind: &BlockKind) -> SnapshotKind {
    match kind {
        BlockKind::Heading { level } => SnapshotKind::Heading(*level),
        BlockKind::BlockQuote => SnapshotKind::BlockQuote,
        BlockKind::CodeLine => {
            let language = path
                .parent()
                .and_then(|parent| document.kind(&parent))
                .and_then(BlockKind::language)
                .unwrap_or(PLAIN_TEXT_LANGUAGE);
            SnapshotKind::CodeLine {
                line: path.last().unwrap_or(0),
                language: language.to_string(),
            }
        }
        BlockKind::Paragraph | BlockKind::CodeBlock { .. } => SnapshotKind::Paragraph,
    }
}

/// Cut `text` at decoration boundaries. Decorations are sorted and disjoint.
fn split_run(text: &str, marks: Marks, decorations: &[Decoration], out: &mut Vec<Leaf>) {
    let chars: Vec<char> = text.chars().collect();
    let mut push = |from: usize, to: usize, token: Option<&str>| {
        if from < to {
            out.push(Leaf {
                text: chars[from..to].iter().collect(),
                marks,
                token: token.map(str::to_string),
            });
        }
    };

    let mut offset = 0;
    for decoration in decorations {
        let (start, end) = (decoration.range.start, decoration.range.end.min(chars.len()));
        if start < offset || start >= end {
            continue;
        }
        push(offset, start, None);
        push(start, end, Some(decoration.token.as_str()));
        offset = end;
    }
    push(offset, chars.len(), None);

    // An empty run still renders as one empty leaf.
    if chars.is_empty() {
        out.push(Leaf {
            text: String::new(),
            marks,
            token: None,
        });
    }
}
