//! Editing verbs.
//!
//! Every verb is a silent no-op on an invalid selection and records a history
//! snapshot before touching the tree.

use log::{debug, warn};

use crate::editing::Editor;
use crate::editing::selection::{Point, Range};
use crate::model::text::utf16_len;
use crate::model::{Align, NodeData, NodeKind, StyleSet, TextStyle};

const LISTS: [NodeKind; 2] = [NodeKind::Bulleted, NodeKind::Numbered];

impl Editor {
    /// Inserts text at the cursor, replacing the selected content if any
    pub fn insert(&mut self, text: &str) -> &mut Self {
        if !self.is_valid() || text.is_empty() {
            return self;
        }
        if !self.is_collapsed() {
            self.delete();
        }
        self.store(false);
        let Some(Range { start, .. }) = self.selection.range() else {
            return self;
        };
        let mut at = start;
        let kind = self.tree.kind(at.node);
        if !kind.is_inline() {
            return self;
        }
        // Typing at the trailing edge of a link or image goes to the text after it
        if kind != NodeKind::Text && at.offset == self.tree.len(at.node) {
            let next = match self.tree.next_text(at.node, false) {
                Some(next) => next,
                None => {
                    let next = self.tree.create_text("");
                    self.tree.insert_after(at.node, next);
                    next
                }
            };
            at = Point::new(next, 0);
        }
        self.tree.insert_text(at.node, at.offset, text);
        self.set_range(at, at).move_by(utf16_len(text) as isize, None)
    }

    /// Deletes the selected content, leaving a collapsed cursor where it was
    pub fn delete(&mut self) -> &mut Self {
        if !self.is_valid() {
            return self;
        }
        self.store(false);
        self.sort();
        let Some(Range { start, end }) = self.selection.range() else {
            return self;
        };
        if start.node == end.node {
            self.tree.extract(start.node, start.offset, end.offset);
            if self.tree.len(start.node) > 0 {
                return self.collapse(false);
            }
            return self.settle(start.node, 0);
        }
        self.tree.cut(start.node, 0, Some(start.offset));
        self.tree.cut(end.node, end.offset, None);
        let (node, ofs) = self.tree.merge(start.node, end.node);
        self.settle(node, ofs)
    }

    /// Breaks the content at the cursor into a new editing unit, or inserts a
    /// newline character when `newline` is requested or the cursor sits in a
    /// link or a table cell
    pub fn break_line(&mut self, newline: bool) -> &mut Self {
        if !self.is_valid() {
            return self;
        }
        if !self.is_collapsed() {
            self.delete();
        }
        self.store(false);
        if newline || self.belongs_to(NodeKind::Link) || self.belongs_to(NodeKind::Cell) {
            let Some(Range { start, .. }) = self.selection.range() else {
                return self;
            };
            self.tree.insert_text(start.node, start.offset, "\n");
            return self.move_by(1, None);
        }
        let Some(Range { start, .. }) = self.selection.range() else {
            return self;
        };
        let (mut node, mut ofs) = (start.node, start.offset);
        if !self.tree.kind(node).is_inline() {
            return self;
        }
        let len = self.tree.len(node);
        // Keep a text node on both sides of the break
        if ofs == 0 && self.tree.is_first(node) {
            let empty = self.tree.empty_like(node);
            self.tree.insert_before(node, empty);
        } else if ofs == len && self.tree.is_last(node) {
            let empty = self.tree.empty_like(node);
            self.tree.insert_after(node, empty);
        }
        if ofs == len
            && len > 0
            && let Some(next) = self.tree.next_sibling(node)
        {
            (node, ofs) = (next, 0);
        }
        let right = self.tree.split(node, ofs, None);
        self.tree.break_container(right);
        self.set_cursor(right, 0).mark(true)
    }

    /// Applies (or with `remove`, removes) styles across the selection.
    /// A collapsed cursor formats the word around it.
    pub fn format(&mut self, styles: &[TextStyle], remove: bool) -> &mut Self {
        if !self.prepare_inline_edit() {
            return self;
        }
        for node in self.nodes() {
            if remove {
                self.tree.unformat(node, styles);
            } else {
                self.tree.format(node, styles);
            }
        }
        self.defrag()
    }

    /// Switches a style on or off depending on the style at the selection start
    pub fn toggle_format(&mut self, style: TextStyle) -> &mut Self {
        let remove = self.style().contains(&style);
        self.format(&[style], remove)
    }

    /// Style of the selection, taken from its start node
    pub fn style(&self) -> StyleSet {
        self.selection
            .start()
            .map(|start| self.tree.style(start.node))
            .unwrap_or_default()
    }

    /// Replaces the whole style set across the selection
    pub fn set_style(&mut self, style: &StyleSet) -> &mut Self {
        if !self.prepare_inline_edit() {
            return self;
        }
        for node in self.nodes() {
            self.tree.set_style(node, style.clone());
        }
        self.defrag()
    }

    /// Removes every style from the selection
    pub fn clear(&mut self) -> &mut Self {
        self.set_style(&StyleSet::new())
    }

    /// Common preamble of the inline verbs: record history, widen a cursor
    /// to its word and cut the selection down to whole nodes. Returns false
    /// when there is nothing to act on.
    fn prepare_inline_edit(&mut self) -> bool {
        if !self.is_valid() {
            return false;
        }
        self.store(false);
        if self.is_collapsed() {
            self.word_wrap();
        }
        if self.is_collapsed() {
            debug!("no word around the cursor, nothing to format");
            return false;
        }
        self.sort().trim().split();
        true
    }

    /// Turns the selection into a single link node; `None` unlinks instead
    pub fn link(&mut self, url: Option<&str>) -> &mut Self {
        let Some(url) = url else {
            return self.unlink();
        };
        if !self.prepare_inline_edit() {
            return self;
        }
        let nodes = self.nodes();
        let Some((&first, rest)) = nodes.split_first() else {
            return self;
        };
        for &node in rest {
            self.tree.join(first, node);
        }
        self.tree.link(first, Some(url));
        self.set(first, 0, first, -1).defrag()
    }

    /// Turns the links within the selection back into plain text
    pub fn unlink(&mut self) -> &mut Self {
        if !self.is_valid() {
            return self;
        }
        self.store(false);
        for node in self.nodes() {
            self.tree.link(node, None);
        }
        self.defrag()
    }

    /// Alignment of the editing unit holding the selection start
    pub fn align(&self) -> Align {
        self.selection
            .start()
            .and_then(|start| self.tree.container(start.node))
            .and_then(|container| self.tree.align(container))
            .unwrap_or_default()
    }

    pub fn set_align(&mut self, align: Align) -> &mut Self {
        if !self.is_valid() {
            return self;
        }
        self.store(false);
        for container in self.containers() {
            self.tree.set_align(container, Some(align));
        }
        self.mark(true)
    }

    /// Level of the editing unit holding the selection start
    pub fn level(&self) -> u32 {
        self.selection
            .start()
            .and_then(|start| self.tree.container(start.node))
            .and_then(|container| self.tree.level(container))
            .unwrap_or(0)
    }

    pub fn set_level(&mut self, level: u32) -> &mut Self {
        if !self.is_valid() {
            return self;
        }
        self.store(false);
        for container in self.containers() {
            self.tree.set_level(container, Some(level));
        }
        self.mark(true)
    }

    /// Nests the selected items one level deeper in the list they belong to
    pub fn indent(&mut self) -> &mut Self {
        let Some(list) = self.pick(&LISTS) else {
            return self;
        };
        let kind = self.tree.kind(list);
        self.store(false);
        for container in self.containers() {
            self.tree.indent(container, kind);
        }
        self.mark(true)
    }

    /// Removes one level of list or quote indentation from the selection
    pub fn outdent(&mut self) -> &mut Self {
        let Some(block) = self.pick(&[NodeKind::Blockquote, NodeKind::Bulleted, NodeKind::Numbered])
        else {
            return self;
        };
        let kind = self.tree.kind(block);
        self.store(false);
        for container in self.containers() {
            self.tree.unindent(container, kind);
        }
        self.mark(true)
    }

    /// Moves the selection in or out of a list. Toggling the list type the
    /// selection already belongs to removes it; another type replaces it.
    pub fn toggle_list(&mut self, kind: NodeKind) -> &mut Self {
        if !self.is_valid() || !kind.is_list() {
            return self;
        }
        self.store(false);
        if let Some(list) = self.pick(&LISTS) {
            let current = self.tree.kind(list);
            for container in self.containers() {
                self.tree.unindent(container, current);
            }
            if current == kind {
                return self.mark(true);
            }
        }
        for container in self.containers() {
            if self.tree.kind(container) != NodeKind::Cell {
                self.tree.indent(container, kind);
            }
        }
        self.mark(true)
    }

    /// Moves the selection in or out of a blockquote. Quoting works on the
    /// top-level blocks spanned by the selection, one by one.
    pub fn toggle_quote(&mut self) -> &mut Self {
        let Some(Range { start, end }) = self.selection.range() else {
            return self;
        };
        self.store(false);
        if self.pick(&[NodeKind::Blockquote]).is_some() {
            for container in self.containers() {
                self.tree.unindent(container, NodeKind::Blockquote);
            }
            return self.mark(true);
        }
        let mut blocks = Vec::new();
        let mut block = self.tree.ancestor(start.node, 1);
        while let Some(b) = block {
            if !self.tree.compare(b, end.node).is_lt() {
                break;
            }
            blocks.push(b);
            block = self.tree.next_sibling(b);
        }
        for block in blocks {
            self.tree.indent(block, NodeKind::Blockquote);
        }
        self.mark(true)
    }

    /// Copies the selection into a standalone document shape. A collapsed
    /// cursor copies the word around it; `None` when there is nothing to copy.
    pub fn copy(&mut self) -> Option<NodeData> {
        if !self.is_valid() {
            return None;
        }
        if self.is_collapsed() {
            self.word_wrap();
        }
        if self.is_collapsed() {
            return None;
        }
        self.sort().trim();
        let Range { start, end } = self.selection.range()?;
        let fragment = self.tree.fragment(start.node, end.node);
        if !self.is_whole()
            && let Some((first, last)) = self.tree.inline_bounds(fragment)
        {
            if start.node == end.node {
                self.tree.cut(first, start.offset, Some(end.offset));
            } else {
                self.tree.cut(first, start.offset, None);
                self.tree.cut(last, 0, Some(end.offset));
            }
        }
        let data = self.tree.save_node(fragment);
        self.tree.discard(fragment);
        Some(data)
    }

    /// Pastes a document shape at the selection. Inside links and table
    /// cells only its plain text is inserted.
    pub fn paste(&mut self, source: &NodeData) -> &mut Self {
        if !self.is_valid() {
            return self;
        }
        if source.kind != NodeKind::Document {
            warn!("cannot paste a {} node, expected a document", source.kind);
            return self;
        }
        let fragment = match self.tree.load_fragment(source) {
            Ok(fragment) => fragment,
            Err(err) => {
                warn!("cannot paste: {err}");
                return self;
            }
        };
        if !self.is_collapsed() {
            self.delete();
        }
        if self.belongs_to(NodeKind::Link) || self.belongs_to(NodeKind::Cell) {
            let text = self.tree.plain_text(fragment);
            self.tree.discard(fragment);
            return self.insert(&text);
        }

        self.break_line(false);
        let Some(Range { start: head, .. }) = self.selection.range() else {
            self.tree.discard(fragment);
            return self;
        };
        let Some(left) = self.tree.previous_inline(head.node) else {
            self.tree.discard(fragment);
            return self;
        };
        let Some(top) = self.tree.cleave(left) else {
            self.tree.discard(fragment);
            return self;
        };
        let bounds = self.tree.inline_bounds(fragment);
        self.tree.insert_after(top, fragment);
        self.tree.unwrap(fragment);
        let Some((first, last)) = bounds else {
            return self.settle(head.node, 0);
        };

        let (joined, _) = self.tree.merge(left, first);
        let tail = if self.tree.contains(last) { last } else { joined };
        let (node, ofs) = self.tree.merge(tail, head.node);
        self.settle(node, ofs).mark(true)
    }
}
