use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use editable_engine::{Editor, HistoryOptions, NodeData, NodeKind, TextStyle, Tree};

fn generate_document(paragraphs: usize) -> NodeData {
    let blocks = (0..paragraphs).map(|i| {
        let item = NodeData::item([
            NodeData::text(format!("Paragraph {i} with ")),
            NodeData::text("some bold").with_style([TextStyle::Bold]),
            NodeData::text(" and a "),
            NodeData::link("link", "https://example.com"),
        ]);
        if i % 4 == 3 {
            NodeData::bulleted([item])
        } else {
            item
        }
    });
    NodeData::document(blocks)
}

fn editor(data: &NodeData) -> Editor {
    let tree = Tree::load(data).unwrap();
    Editor::with_history(
        tree,
        HistoryOptions {
            debounce: Duration::ZERO,
            limit: 128,
        },
    )
}

fn bench_editing(c: &mut Criterion) {
    let mut group = c.benchmark_group("editing");
    group.sample_size(10);

    let doc = generate_document(200);

    group.bench_function("load_document", |b| {
        b.iter(|| std::hint::black_box(Tree::load(&doc).unwrap()));
    });

    group.bench_function("typing", |b| {
        b.iter(|| {
            let mut editor = editor(&doc);
            editor.select_offsets(std::hint::black_box(500), 500);
            for ch in "the quick brown fox".split_inclusive(' ') {
                editor.insert(ch);
            }
            std::hint::black_box(editor.into_tree());
        });
    });

    group.bench_function("format_and_list", |b| {
        b.iter(|| {
            let mut editor = editor(&doc);
            editor
                .select_offsets(std::hint::black_box(100), 2000)
                .toggle_format(TextStyle::Italic)
                .toggle_list(NodeKind::Numbered);
            std::hint::black_box(editor.into_tree());
        });
    });

    group.bench_function("undo_redo", |b| {
        let mut editor = editor(&doc);
        editor.select_offsets(300, 300);
        for _ in 0..16 {
            editor.insert("x");
        }
        b.iter(|| {
            while editor.undoable() {
                editor.undo();
            }
            while editor.redoable() {
                editor.redo();
            }
        });
    });

    group.bench_function("copy_paste", |b| {
        b.iter(|| {
            let mut editor = editor(&doc);
            editor.select_offsets(std::hint::black_box(40), 400);
            let fragment = editor.copy().unwrap_or_else(|| NodeData::document([]));
            editor.collapse(true).paste(&fragment);
            std::hint::black_box(editor.into_tree());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_editing);
criterion_main!(benches);
