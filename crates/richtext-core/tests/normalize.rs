use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use richtext_core::{
    BlockFormat, BlockKind, Command, CommandExecutor, CursorCommand, DefaultOps, Document,
    EditCommand, EditorConfig, EditorCore, FormatCommand, HeadingLevel, Mark, Node, Path, Point,
    Selection, TextRun, TextUnit, WithCodeBlock, normalize,
};

/// Panics with the offending path if the tree breaks a structural rule.
fn assert_well_formed(document: &Document) {
    assert!(!document.children.is_empty(), "root is empty");
    for (index, node) in document.children.iter().enumerate() {
        let path = Path::from([index]);
        let element = node
            .as_element()
            .unwrap_or_else(|| panic!("text run at root {path}"));
        match &element.kind {
            BlockKind::CodeBlock { .. } => {
                assert!(!element.children.is_empty(), "empty code block at {path}");
                for (line, child) in element.children.iter().enumerate() {
                    let line_path = path.child(line);
                    let kind = child.kind();
                    assert_eq!(kind, Some(&BlockKind::CodeLine), "non-line at {line_path}");
                    assert_leaf_block(child, &line_path);
                }
            }
            BlockKind::CodeLine => panic!("code line outside a code block at {path}"),
            _ => assert_leaf_block(node, &path),
        }
    }
}

fn assert_leaf_block(node: &Node, path: &Path) {
    let children = node.children();
    assert!(!children.is_empty(), "leaf block without runs at {path}");
    let runs: Vec<&TextRun> = children
        .iter()
        .map(|child| {
            child
                .as_text()
                .unwrap_or_else(|| panic!("element inside leaf block at {path}"))
        })
        .collect();
    for pair in runs.windows(2) {
        assert_ne!(pair[0].marks, pair[1].marks, "unmerged runs at {path}");
    }
    if runs.len() > 1 {
        assert!(runs.iter().all(|run| !run.is_empty()), "stray empty run at {path}");
    }
}

fn random_point(document: &Document, rng: &mut StdRng) -> Point {
    let texts = document.texts();
    let (path, run) = &texts[rng.gen_range(0..texts.len())];
    Point::new(path.clone(), rng.gen_range(0..=run.len()))
}

fn random_command(document: &Document, rng: &mut StdRng) -> Command {
    match rng.gen_range(0..12) {
        0 | 1 => Command::Cursor(CursorCommand::SetCaret {
            point: random_point(document, rng),
        }),
        2 => Command::Cursor(CursorCommand::Select {
            selection: Selection::new(random_point(document, rng), random_point(document, rng)),
        }),
        3 | 4 => Command::Edit(EditCommand::InsertText {
            text: ["a", "bc", " ", "é", "{"][rng.gen_range(0..5)].to_string(),
        }),
        5 => Command::Edit(EditCommand::InsertBreak),
        6 | 7 => Command::Edit(EditCommand::DeleteBackward {
            unit: if rng.gen_bool(0.8) {
                TextUnit::Character
            } else {
                TextUnit::Word
            },
        }),
        8 => Command::Edit(EditCommand::InsertCodeBlock {
            language: Some("rust".into()),
        }),
        9 => Command::Edit(EditCommand::ExitCodeBlock),
        10 => Command::Format(FormatCommand::ToggleMark {
            mark: [Mark::Bold, Mark::Italic, Mark::Code][rng.gen_range(0..3)],
        }),
        _ => Command::Format(FormatCommand::ToggleBlock {
            format: [
                BlockFormat::Paragraph,
                BlockFormat::Heading(HeadingLevel::H1),
                BlockFormat::BlockQuote,
            ][rng.gen_range(0..3)],
        }),
    }
}

#[test]
fn test_random_command_sequences_leave_tree_well_formed() {
    for seed in 0..8u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut executor = CommandExecutor::new(
            vec![
                Node::paragraph("hello world"),
                Node::code_block("rust", &["fn main() {", "    let x = 1;", "}"]),
                Node::heading(HeadingLevel::H2, "tail"),
            ],
            EditorConfig::default(),
        );
        for _ in 0..200 {
            let command = random_command(executor.document(), &mut rng);
            // Rejected commands leave the previous state in place.
            let _ = executor.execute(command);
            assert_well_formed(executor.document());
            if let Some(selection) = executor.editor().selection() {
                assert!(executor.document().is_valid_point(&selection.anchor));
                assert!(executor.document().is_valid_point(&selection.focus));
            }
        }
    }
}

#[test]
fn test_malformed_value_is_repaired() {
    let mut core = EditorCore::new(vec![
        Node::text("stray"),
        Node::element(BlockKind::code_block("js"), vec![]),
        Node::element(
            BlockKind::code_block("js"),
            vec![Node::paragraph("a"), Node::text("b")],
        ),
        Node::element(
            BlockKind::Paragraph,
            vec![Node::text("x"), Node::text(""), Node::text("y")],
        ),
        Node::code_line("loose"),
    ]);
    let report = normalize(&mut core, &WithCodeBlock::new(DefaultOps), 1_000).unwrap();
    assert!(!report.capped);
    assert!(report.repairs > 0);
    assert_well_formed(core.document());
    assert_eq!(
        core.children(),
        &[
            Node::paragraph("stray"),
            Node::code_block("js", &[""]),
            Node::code_block("js", &["a", "b"]),
            Node::paragraph("xy"),
            Node::paragraph("loose"),
        ]
    );
}

#[test]
fn test_normalizing_a_valid_tree_changes_nothing() {
    let mut core = EditorCore::new(vec![
        Node::paragraph("p"),
        Node::code_block("rust", &["a", ""]),
    ]);
    let report = normalize(&mut core, &WithCodeBlock::new(DefaultOps), 1_000).unwrap();
    assert_eq!(report.repairs, 0);
    assert!(core.operations().is_empty());
}
