use pretty_assertions::assert_eq;
use richtext_core::{
    Command, CommandExecutor, CommandResult, CursorCommand, EditCommand, EditorConfig, KeyStroke,
    Node, Point, Selection, TextUnit,
};

fn executor(children: Vec<Node>) -> CommandExecutor {
    CommandExecutor::new(children, EditorConfig::default())
}

fn caret(executor: &CommandExecutor) -> Option<Point> {
    executor
        .editor()
        .selection()
        .filter(|selection| selection.is_collapsed())
        .map(|selection| selection.focus.clone())
}

fn backspace(executor: &mut CommandExecutor) -> CommandResult {
    executor
        .execute(Command::Edit(EditCommand::DeleteBackward {
            unit: TextUnit::Character,
        }))
        .unwrap()
}

#[test]
fn test_break_at_end_of_line_inserts_empty_line() {
    let mut executor = executor(vec![Node::code_block(
        "javascript",
        &["function f() {", "  return 1;", "}"],
    )]);
    executor.select_point(Point::new([0, 1, 0], 11)).unwrap();
    executor
        .execute(Command::Edit(EditCommand::InsertBreak))
        .unwrap();

    assert_eq!(
        executor.document().children,
        vec![Node::code_block(
            "javascript",
            &["function f() {", "  return 1;", "", "}"]
        )]
    );
    assert_eq!(caret(&executor), Some(Point::new([0, 2, 0], 0)));
}

#[test]
fn test_break_mid_line_splits_line() {
    let mut executor = executor(vec![Node::code_block("rust", &["let a = b;"])]);
    executor.select_point(Point::new([0, 0, 0], 7)).unwrap();
    executor
        .execute(Command::Edit(EditCommand::InsertBreak))
        .unwrap();

    assert_eq!(
        executor.document().children,
        vec![Node::code_block("rust", &["let a =", " b;"])]
    );
    assert_eq!(caret(&executor), Some(Point::new([0, 1, 0], 0)));
}

#[test]
fn test_backspace_in_only_empty_line_removes_block() {
    let mut executor = executor(vec![Node::code_block("javascript", &[""])]);
    executor.select_point(Point::new([0, 0, 0], 0)).unwrap();
    assert_eq!(backspace(&mut executor), CommandResult::Success);

    assert_eq!(executor.document().children, vec![Node::paragraph("")]);
    assert_eq!(caret(&executor), Some(Point::new([0, 0], 0)));
}

#[test]
fn test_backspace_between_blocks_keeps_neighbours() {
    let mut executor = executor(vec![
        Node::paragraph("before"),
        Node::code_block("javascript", &[""]),
        Node::paragraph("after"),
    ]);
    executor.select_point(Point::new([1, 0, 0], 0)).unwrap();
    backspace(&mut executor);

    assert_eq!(
        executor.document().children,
        vec![
            Node::paragraph("before"),
            Node::paragraph(""),
            Node::paragraph("after"),
        ]
    );
    assert_eq!(caret(&executor), Some(Point::new([1, 0], 0)));
}

#[test]
fn test_backspace_at_line_start_joins_previous_line() {
    let mut executor = executor(vec![Node::code_block("python", &["abc", "def"])]);
    executor.select_point(Point::new([0, 1, 0], 0)).unwrap();
    backspace(&mut executor);

    assert_eq!(
        executor.document().children,
        vec![Node::code_block("python", &["abcdef"])]
    );
    assert_eq!(caret(&executor), Some(Point::new([0, 0, 0], 3)));
}

#[test]
fn test_backspace_in_empty_first_line_removes_only_that_line() {
    let mut executor = executor(vec![Node::code_block("go", &["", "x := 1"])]);
    executor.select_point(Point::new([0, 0, 0], 0)).unwrap();
    backspace(&mut executor);

    assert_eq!(
        executor.document().children,
        vec![Node::code_block("go", &["x := 1"])]
    );
    assert_eq!(caret(&executor), Some(Point::new([0, 0, 0], 0)));
}

#[test]
fn test_backspace_inside_line_removes_one_character() {
    let mut executor = executor(vec![Node::code_block("rust", &["ab"])]);
    executor.select_point(Point::new([0, 0, 0], 2)).unwrap();
    backspace(&mut executor);

    assert_eq!(
        executor.document().children,
        vec![Node::code_block("rust", &["a"])]
    );
    assert_eq!(caret(&executor), Some(Point::new([0, 0, 0], 1)));
}

#[test]
fn test_backspace_at_start_of_first_block_is_noop() {
    let mut executor = executor(vec![Node::code_block("rust", &["fn"])]);
    executor.select_point(Point::new([0, 0, 0], 0)).unwrap();
    assert_eq!(backspace(&mut executor), CommandResult::Noop);
    assert_eq!(
        executor.document().children,
        vec![Node::code_block("rust", &["fn"])]
    );
}

#[test]
fn test_insert_code_block_from_selection() {
    let mut executor = executor(vec![Node::paragraph("x"), Node::paragraph("y")]);
    executor
        .execute(Command::Cursor(CursorCommand::Select {
            selection: Selection::new(Point::new([0, 0], 0), Point::new([1, 0], 1)),
        }))
        .unwrap();
    executor
        .execute(Command::Edit(EditCommand::InsertCodeBlock { language: None }))
        .unwrap();

    assert_eq!(
        executor.document().children,
        vec![
            Node::paragraph(""),
            Node::code_block("javascript", &["x", "y"]),
        ]
    );
    assert_eq!(caret(&executor), Some(Point::new([1, 0, 0], 0)));
}

#[test]
fn test_insert_code_block_from_whole_paragraph() {
    let mut executor = executor(vec![Node::paragraph("x")]);
    executor
        .execute(Command::Cursor(CursorCommand::Select {
            selection: Selection::new(Point::new([0, 0], 0), Point::new([0, 0], 1)),
        }))
        .unwrap();
    executor
        .execute(Command::Edit(EditCommand::InsertCodeBlock { language: None }))
        .unwrap();

    assert_eq!(
        executor.document().children,
        vec![Node::paragraph(""), Node::code_block("javascript", &["x"])]
    );
    assert_eq!(caret(&executor), Some(Point::new([1, 0, 0], 0)));
}

#[test]
fn test_insert_code_block_in_empty_paragraph_goes_after_it() {
    let mut executor = executor(vec![Node::paragraph("")]);
    executor.select_point(Point::new([0, 0], 0)).unwrap();
    executor
        .execute(Command::Edit(EditCommand::InsertCodeBlock {
            language: Some("rust".into()),
        }))
        .unwrap();

    assert_eq!(
        executor.document().children,
        vec![Node::paragraph(""), Node::code_block("rust", &[""])]
    );
    assert_eq!(caret(&executor), Some(Point::new([1, 0, 0], 0)));
}

#[test]
fn test_insert_break_without_selection_is_noop() {
    let mut executor = executor(vec![Node::paragraph("x")]);
    let result = executor
        .execute(Command::Edit(EditCommand::InsertBreak))
        .unwrap();
    assert_eq!(result, CommandResult::Noop);
    assert_eq!(executor.document().children, vec![Node::paragraph("x")]);
}

#[test]
fn test_insert_code_block_at_caret_splits_paragraph() {
    let mut executor = executor(vec![Node::paragraph("headtail")]);
    executor.select_point(Point::new([0, 0], 4)).unwrap();
    executor
        .execute(Command::Edit(EditCommand::InsertCodeBlock {
            language: Some("bash".into()),
        }))
        .unwrap();

    assert_eq!(
        executor.document().children,
        vec![
            Node::paragraph("head"),
            Node::code_block("bash", &[""]),
            Node::paragraph("tail"),
        ]
    );
    assert_eq!(caret(&executor), Some(Point::new([1, 0, 0], 0)));
}

#[test]
fn test_insert_code_block_inside_code_block_is_noop() {
    let mut executor = executor(vec![Node::code_block("rust", &["a"])]);
    executor.select_point(Point::new([0, 0, 0], 1)).unwrap();
    let result = executor
        .execute(Command::Edit(EditCommand::InsertCodeBlock { language: None }))
        .unwrap();
    assert_eq!(result, CommandResult::Noop);
}

#[test]
fn test_shift_enter_exits_code_block() {
    let mut executor = executor(vec![Node::code_block("rust", &["a"]), Node::paragraph("z")]);
    executor.select_point(Point::new([0, 0, 0], 1)).unwrap();
    let result = executor
        .execute_key(&KeyStroke::new("Enter").shift())
        .unwrap();
    assert_eq!(result, CommandResult::Success);

    assert_eq!(
        executor.document().children,
        vec![
            Node::code_block("rust", &["a"]),
            Node::paragraph(""),
            Node::paragraph("z"),
        ]
    );
    assert_eq!(caret(&executor), Some(Point::new([1, 0], 0)));
}

#[test]
fn test_tab_inserts_configured_text() {
    let mut executor = CommandExecutor::new(
        vec![Node::code_block("python", &["pass"])],
        EditorConfig::default().with_tab_text("    "),
    );
    executor.select_point(Point::new([0, 0, 0], 0)).unwrap();
    executor.execute_key(&KeyStroke::new("Tab")).unwrap();

    assert_eq!(
        executor.document().children,
        vec![Node::code_block("python", &["    pass"])]
    );
    assert_eq!(caret(&executor), Some(Point::new([0, 0, 0], 4)));
}

#[test]
fn test_set_language_on_focused_block() {
    let mut executor = executor(vec![Node::code_block("javascript", &["1"])]);
    executor.select_point(Point::new([0, 0, 0], 0)).unwrap();
    let result = executor
        .execute(Command::Edit(EditCommand::SetLanguage {
            path: None,
            language: "typescript".into(),
        }))
        .unwrap();
    assert_eq!(result, CommandResult::Success);
    assert_eq!(
        executor.document().children,
        vec![Node::code_block("typescript", &["1"])]
    );
}

#[test]
fn test_typing_in_code_line_keeps_single_run() {
    let mut executor = executor(vec![Node::code_block("rust", &[""])]);
    executor.select_point(Point::new([0, 0, 0], 0)).unwrap();
    for text in ["f", "n", " ", "m"] {
        executor
            .execute(Command::Edit(EditCommand::InsertText { text: text.into() }))
            .unwrap();
    }
    assert_eq!(
        executor.document().children,
        vec![Node::code_block("rust", &["fn m"])]
    );
}
