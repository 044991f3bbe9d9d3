use std::time::Duration;

use editable_engine::{
    Editor, HistoryOptions, NodeData, NodeId, NodeKind, Outline, TextStyle, Tree,
};
use insta::assert_snapshot;
use pretty_assertions::assert_eq;

fn editor(data: NodeData) -> Editor {
    let tree = Tree::load(&data).unwrap();
    let options = HistoryOptions {
        debounce: Duration::ZERO,
        limit: 256,
    };
    Editor::with_history(tree, options)
}

fn texts(editor: &Editor) -> Vec<NodeId> {
    let tree = editor.tree();
    tree.descendants(tree.root())
        .filter(|&n| tree.is_text(n))
        .collect()
}

fn plain_text(editor: &Editor) -> String {
    editor.tree().plain_text(editor.tree().root())
}

/// Every leaf is inline and no two neighbours in an editing unit could be merged
fn assert_well_formed(editor: &Editor) {
    let tree = editor.tree();
    for node in tree.descendants(tree.root()) {
        let kind = tree.kind(node);
        if tree.children(node).is_empty() {
            assert!(
                kind.is_inline() || node == tree.root(),
                "{node} is a childless {kind}\n{}",
                Outline(tree)
            );
        }
        if kind.is_container() {
            for pair in tree.children(node).windows(2) {
                assert!(
                    !tree.element(pair[0]).same_format(tree.element(pair[1])),
                    "{} and {} should have been merged\n{}",
                    pair[0],
                    pair[1],
                    Outline(tree)
                );
            }
        }
    }
}

fn sample() -> NodeData {
    NodeData::document([
        NodeData::item([
            NodeData::text("The "),
            NodeData::text("quick").with_style([TextStyle::Bold]),
            NodeData::text(" brown "),
            NodeData::link("fox", "https://example.com/fox"),
            NodeData::text(" jumps"),
        ]),
        NodeData::bulleted([
            NodeData::item([NodeData::text("over the")]),
            NodeData::item([NodeData::text("lazy dog")]),
        ]),
        NodeData::item([NodeData::text("The end")]),
    ])
}

#[test]
fn bold_prefix_of_single_text() {
    let mut editor = editor(NodeData::document([NodeData::item([NodeData::text(
        "hello world",
    )])]));
    editor.select_offsets(0, 5).format(&[TextStyle::Bold], false);

    let saved = editor.tree().save();
    assert_eq!(
        saved.content.unwrap()[0].content,
        Some(vec![
            NodeData::text("hello").with_style([TextStyle::Bold]),
            NodeData::text(" world"),
        ])
    );
}

#[test]
fn insert_at_end_of_text() {
    let mut editor = editor(NodeData::document([NodeData::item([NodeData::text(
        "hello",
    )])]));
    let t = texts(&editor);
    editor.set_cursor(t[0], 5).insert("!");

    assert_eq!(editor.tree().value(t[0]), "hello!");
    let range = editor.selection().range().unwrap();
    assert!(editor.is_collapsed());
    assert_eq!((range.start.node, range.start.offset), (t[0], 6));
}

#[test]
fn outdent_single_level_list_item() {
    let mut editor = editor(NodeData::document([NodeData::bulleted([NodeData::item([
        NodeData::text("only item"),
    ])])]));
    let t = texts(&editor);
    editor.set(t[0], 0, t[0], -1).outdent();

    assert_snapshot!(Outline(editor.tree()), @r#"
    document
      item
        text "only item"
    "#);
}

#[test]
fn new_table_has_requested_grid() {
    let mut editor = editor(sample());
    let t = texts(&editor);
    editor.set_cursor(t[2], 3).table_new(2, 3);

    let table = editor.pick(&[NodeKind::Table]).unwrap();
    let tree = editor.tree();
    let rows = tree.children(table);
    assert_eq!(rows.len(), 2);
    for &row in rows {
        let cells = tree.children(row);
        assert_eq!(cells.len(), 3);
        for &cell in cells {
            let content = tree.children(cell);
            assert_eq!(content.len(), 1);
            assert!(tree.is_empty_text(content[0]));
        }
    }
    // The table lands right after the paragraph holding the cursor
    assert_eq!(tree.index(table), Some(1));
}

#[test]
fn copy_then_paste_in_place_keeps_text() {
    let mut editor = editor(sample());
    let before = plain_text(&editor);
    let t = texts(&editor);

    editor.set(t[1], 2, t[6], 4);
    let copied = editor.copy().unwrap();
    assert_eq!(copied.text_content(), "ick brown fox jumpsover thelazy");

    editor.delete();
    editor.paste(&copied);
    assert_eq!(plain_text(&editor), before);
    assert_well_formed(&editor);
}

#[test]
fn copy_whole_node_keeps_its_format() {
    let mut editor = editor(sample());
    let t = texts(&editor);
    editor.set(t[3], 0, t[3], -1);

    let copied = editor.copy().unwrap();
    assert_eq!(
        copied,
        NodeData::document([NodeData::item([NodeData::link(
            "fox",
            "https://example.com/fox"
        )])])
    );
}

#[test]
fn save_restore_reproduces_selection() {
    let mut editor = editor(sample());
    let t = texts(&editor);
    for (start, start_ofs, end, end_ofs) in [(0, 1, 0, 3), (1, 2, 4, 1), (5, 1, 7, 7), (2, 7, 2, 7)]
    {
        editor.set(t[start], start_ofs, t[end], end_ofs).save();
        let expected = editor.selection().range();
        editor.reset().restore();
        assert_eq!(editor.selection().range(), expected);
    }
}

#[test]
fn sort_establishes_forward_selection() {
    let mut editor = editor(sample());
    let t = texts(&editor);
    editor.set(t[6], 2, t[1], 1).sort();
    assert!(!editor.is_reversed());
    let once = editor.selection().range();
    editor.sort();
    assert_eq!(editor.selection().range(), once);
}

#[test]
fn undo_redo_across_forced_edits() {
    let mut editor = editor(sample());
    editor.enable_history(HistoryOptions {
        debounce: Duration::from_secs(3600),
        limit: 64,
    });
    let original = editor.tree().save();
    let t = texts(&editor);

    editor.set_cursor(t[0], 0).store(true).insert("Well, ");
    editor.store(true).break_line(false);
    editor.select_offsets(10, 15).store(true).format(&[TextStyle::Italic], false);
    editor.store(true).toggle_list(NodeKind::Numbered);
    let edited = editor.tree().save();

    for _ in 0..4 {
        editor.undo();
    }
    assert_eq!(editor.tree().save().content, original.content);
    assert!(!editor.undoable());

    for _ in 0..4 {
        editor.redo();
    }
    assert_eq!(editor.tree().save().content, edited.content);
    assert!(!editor.redoable());
}

#[test]
fn editing_sequence_keeps_tree_well_formed() {
    let mut editor = editor(sample());
    let t = texts(&editor);

    editor.set(t[0], 2, t[3], 1).format(&[TextStyle::Underline], false);
    assert_well_formed(&editor);

    editor.collapse(true).insert("xx");
    assert_well_formed(&editor);

    editor.select_offsets(3, 12).link(Some("https://example.com"));
    assert_well_formed(&editor);

    editor.select_offsets(5, 30).delete();
    assert_well_formed(&editor);

    editor.break_line(false).insert("new paragraph");
    assert_well_formed(&editor);

    editor.select_offsets(0, 8).format(&[TextStyle::Underline], true);
    assert_well_formed(&editor);

    let fragment = NodeData::document([
        NodeData::item([NodeData::text("pasted").with_style([TextStyle::Bold])]),
        NodeData::bulleted([NodeData::item([NodeData::text("list")])]),
    ]);
    editor.select_offsets(2, 2).paste(&fragment);
    assert_well_formed(&editor);

    editor.select_offsets(0, 4).clear();
    assert_well_formed(&editor);
}

#[test]
fn json_round_trip_of_edited_document() {
    let mut editor = editor(sample());
    editor.select_offsets(4, 9).toggle_format(TextStyle::Italic);
    let json = editor.document().to_json().unwrap();

    let reloaded = Tree::from_bytes(json.as_bytes()).unwrap();
    assert_eq!(reloaded.save(), editor.tree().save());
    assert_eq!(reloaded.saved_range(), Some([4, 9]));
}
