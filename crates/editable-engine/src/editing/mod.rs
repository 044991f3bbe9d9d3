/*!
 * # Editing Layer
 *
 * Maps an offset-based selection onto the document tree and performs
 * structural edits through it.
 *
 * ## Architecture Overview
 *
 * ### 1. One Explicit Context
 * - An [`Editor`] owns the [`Tree`], the live [`Selection`] and the undo
 *   [`History`]; there is no shared or global state
 * - Every verb runs to completion synchronously before returning
 *
 * ### 2. Selection as (node, offset) Pairs
 * - A selection is a start and an end [`Point`], each a node id plus a
 *   UTF-16 offset into that node's value
 * - Range algebra (`sort`, `trim`, `split`, `defrag`, `word_wrap`) keeps the
 *   endpoints meaningful while verbs rewrite the tree underneath them
 *
 * ### 3. Verbs Never Fail
 * - Editing verbs return `&mut Self` so they chain; on an invalid selection
 *   they are silent no-ops
 * - Failures reported by a rendering surface stay at the [`host`] boundary
 *
 * ### 4. Debounced Snapshots
 * - Verbs record a whole-tree snapshot (plus the absolute selection) before
 *   mutating, throttled by [`HistoryOptions::debounce`]
 *
 * ## Usage Pattern
 *
 * ```rust
 * use editable_engine::editing::Editor;
 * use editable_engine::model::{NodeData, TextStyle, Tree};
 *
 * let tree = Tree::load(&NodeData::document([NodeData::item([NodeData::text(
 *     "hello world",
 * )])]))
 * .unwrap();
 * let mut editor = Editor::new(tree);
 *
 * editor.select_offsets(0, 5).format(&[TextStyle::Bold], false);
 * editor.collapse(true).insert("!");
 *
 * assert_eq!(editor.tree().plain_text(editor.tree().root()), "hello! world");
 * ```
 */

pub mod history;
pub mod host;
mod range;
pub mod selection;
mod table;
mod verbs;

pub use history::{History, HistoryOptions};
pub use host::{HostPoint, HostRange, SelectionHost};
pub use selection::{Point, Range, Selection};
pub use table::TableTarget;

use crate::model::{NodeData, Tree};

/// Editing context: the document, the selection over it and its history
#[derive(Debug)]
pub struct Editor {
    pub(crate) tree: Tree,
    pub(crate) selection: Selection,
    pub(crate) history: History,
}

impl Editor {
    /// Editor over `tree` with default history settings and no selection
    pub fn new(tree: Tree) -> Self {
        Self::with_history(tree, HistoryOptions::default())
    }

    pub fn with_history(tree: Tree, options: HistoryOptions) -> Self {
        Self {
            tree,
            selection: Selection::default(),
            history: History::new(options),
        }
    }

    /// Attaches a different document. The selection is dropped and the
    /// history cleared since neither refers to the new tree.
    pub fn attach(&mut self, tree: Tree) -> &mut Self {
        self.tree = tree;
        self.selection = Selection::default();
        self.history.clear();
        self
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// Shape of the document with the current selection persisted in it
    pub fn document(&mut self) -> NodeData {
        self.save();
        self.tree.save()
    }
}
