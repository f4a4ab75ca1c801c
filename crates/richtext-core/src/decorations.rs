//! Syntax-highlight decorations for code lines.
//!
//! Decorations are derived render state: they are recomputed from `(code text, language)` on
//! every call and never written into the document. A decoration is anchored to one text run and
//! expressed in that run's character offsets.

use crate::document::Document;
use crate::node::{BlockKind, Node};
use crate::path::Path;
use crate::tokens::{Tokenizer, tokens_for_lines};
use richtext_lang::is_plain_text;

/// A half-open character range (`start..end`) inside one text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecorationRange {
    /// Start offset (inclusive), in `char`s from the start of the run.
    pub start: usize,
    /// End offset (exclusive), in `char`s from the start of the run.
    pub end: usize,
}

impl DecorationRange {
    /// Create a range.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` for an empty range.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A classified range on a text run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decoration {
    /// Path of the decorated text run.
    pub path: Path,
    /// Range inside the run.
    pub range: DecorationRange,
    /// Token classification (e.g. `"keyword"`).
    pub token: String,
}

/// Highlight ranges for the text run at `path`.
///
/// Yields nothing unless the run sits in a code line directly inside a code block whose language
/// has a grammar. The whole block is re-tokenized on every call.
pub fn decorate<T>(document: &Document, path: &Path, tokenizer: &T) -> Vec<Decoration>
where
    T: Tokenizer + ?Sized,
{
    let Some(Node::Text(run)) = document.node(path) else {
        return Vec::new();
    };
    let Some(line_path) = path.parent() else {
        return Vec::new();
    };
    let Some(line) = document
        .element(&line_path)
        .filter(|line| line.kind.is_code_line())
    else {
        return Vec::new();
    };
    let Some(block) = line_path.parent().and_then(|block| document.element(&block)) else {
        return Vec::new();
    };
    let BlockKind::CodeBlock { language } = &block.kind else {
        return Vec::new();
    };
    if is_plain_text(language) {
        return Vec::new();
    }
    let Some(grammar) = tokenizer.lookup_grammar(language) else {
        return Vec::new();
    };

    let source = block
        .children
        .iter()
        .map(Node::string)
        .collect::<Vec<_>>()
        .join("\n");
    let lines = tokens_for_lines(&tokenizer.tokenize(&source, grammar));
    let Some(fragments) = line_path.last().and_then(|index| lines.get(index)) else {
        return Vec::new();
    };

    // Span of this run inside its line.
    let run_index = path.last().unwrap_or(0);
    let run_start: usize = line.children[..run_index].iter().map(Node::merge_len).sum();
    let run_end = run_start + run.len();

    let mut out = Vec::new();
    let mut offset = 0;
    for fragment in fragments {
        let start = offset;
        offset += fragment.len();
        if fragment.is_plain() {
            continue;
        }
        let (from, to) = (start.max(run_start), offset.min(run_end));
        if from < to {
            out.push(Decoration {
                path: path.clone(),
                range: DecorationRange::new(from - run_start, to - run_start),
                token: fragment.token.clone(),
            });
        }
    }
    out
}

/// Decorations for every text run of the document, in document order.
pub fn decorate_document<T>(document: &Document, tokenizer: &T) -> Vec<Decoration>
where
    T: Tokenizer + ?Sized,
{
    document
        .texts()
        .into_iter()
        .flat_map(|(path, _)| decorate(document, &path, tokenizer))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Marks, TextRun};
    use crate::tokens::Token;
    use pretty_assertions::assert_eq;

    /// Classifies `let` as a keyword and digits as numbers; knows only "toy".
    struct Toy;

    impl Tokenizer for Toy {
        type Grammar = ();

        fn lookup_grammar(&self, language: &str) -> Option<&()> {
            (language == "toy").then_some(&())
        }

        fn tokenize(&self, code: &str, _grammar: &()) -> Vec<Token> {
            let mut out = Vec::new();
            let mut plain = String::new();
            let mut rest = code;
            while let Some(ch) = rest.chars().next() {
                if rest.starts_with("let") {
                    out.push(Token::text(std::mem::take(&mut plain)));
                    out.push(Token::typed("keyword", "let"));
                    rest = &rest[3..];
                } else if ch.is_ascii_digit() {
                    out.push(Token::text(std::mem::take(&mut plain)));
                    out.push(Token::typed("number", ch.to_string()));
                    rest = &rest[1..];
                } else {
                    plain.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
            }
            out.push(Token::text(plain));
            out
        }
    }

    fn ranges(decorations: &[Decoration]) -> Vec<(usize, usize, &str)> {
        decorations
            .iter()
            .map(|d| (d.range.start, d.range.end, d.token.as_str()))
            .collect()
    }

    #[test]
    fn test_line_index_selects_fragments() {
        let doc = Document::new(vec![Node::code_block("toy", &["x", "let y = 2"])]);
        let first = decorate(&doc, &Path::from([0, 0, 0]), &Toy);
        assert!(first.is_empty());
        let second = decorate(&doc, &Path::from([0, 1, 0]), &Toy);
        assert_eq!(ranges(&second), vec![(0, 3, "keyword"), (8, 9, "number")]);
    }

    #[test]
    fn test_plaintext_and_unknown_languages_are_skipped() {
        for language in ["plaintext", "", "cobol"] {
            let doc = Document::new(vec![Node::code_block(language, &["let 1"])]);
            assert!(decorate(&doc, &Path::from([0, 0, 0]), &Toy).is_empty());
        }
    }

    #[test]
    fn test_runs_outside_code_lines_are_skipped() {
        let doc = Document::new(vec![
            Node::paragraph("let 1"),
            Node::code_line("let 1"),
        ]);
        assert!(decorate(&doc, &Path::from([0, 0]), &Toy).is_empty());
        assert!(decorate(&doc, &Path::from([1, 0]), &Toy).is_empty());
        assert!(decorate(&doc, &Path::from([5, 0]), &Toy).is_empty());
        assert!(decorate(&doc, &Path::from([0]), &Toy).is_empty());
    }

    #[test]
    fn test_ranges_are_clipped_to_each_run() {
        let bold = Marks {
            bold: true,
            ..Marks::default()
        };
        let line = Node::element(
            BlockKind::CodeLine,
            vec![
                Node::Text(TextRun::new("le")),
                Node::Text(TextRun::with_marks("t 12", bold)),
            ],
        );
        let doc = Document::new(vec![Node::element(BlockKind::code_block("toy"), vec![line])]);
        let left = decorate(&doc, &Path::from([0, 0, 0]), &Toy);
        assert_eq!(ranges(&left), vec![(0, 2, "keyword")]);
        let right = decorate(&doc, &Path::from([0, 0, 1]), &Toy);
        assert_eq!(
            ranges(&right),
            vec![(0, 1, "keyword"), (2, 3, "number"), (3, 4, "number")]
        );
    }

    #[test]
    fn test_decorate_is_idempotent() {
        let doc = Document::new(vec![Node::code_block("toy", &["let a = 1", "let b = 2"])]);
        let once = decorate_document(&doc, &Toy);
        let twice = decorate_document(&doc, &Toy);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 4);
    }
}
