//! Text-level primitives: values, styles, offsets, splitting and merging.
//!
//! Offsets are UTF-16 code units throughout. Callers pass node ids of text or
//! link nodes; on any other node kind the value accessors read as empty and
//! the mutators leave the node untouched.

use crate::model::element::{Element, NodeKind, StyleSet, TextRun, TextStyle};
use crate::model::text::{byte_index, slice, word_edges};
use crate::model::tree::{NodeId, Tree};

impl Tree {
    /// Text value of a text/link node, empty for everything else
    pub fn value(&self, id: NodeId) -> &str {
        self.element(id).run().map_or("", |run| run.value.as_str())
    }

    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        if let Some(run) = self.element_mut(id).run_mut() {
            run.value = value.into();
        }
    }

    /// Style set of a text/link node
    pub fn style(&self, id: NodeId) -> StyleSet {
        self.element(id)
            .run()
            .map(|run| run.style.clone())
            .unwrap_or_default()
    }

    pub fn set_style(&mut self, id: NodeId, style: StyleSet) {
        if let Some(run) = self.element_mut(id).run_mut() {
            run.style = style;
        }
    }

    pub fn format(&mut self, id: NodeId, styles: &[TextStyle]) {
        if let Some(run) = self.element_mut(id).run_mut() {
            run.style.extend(styles.iter().copied());
        }
    }

    pub fn unformat(&mut self, id: NodeId, styles: &[TextStyle]) {
        if let Some(run) = self.element_mut(id).run_mut() {
            run.style.retain(|s| !styles.contains(s));
        }
    }

    /// Turns a text node into a link (`Some`) or a link back into plain text
    /// (`None`). On images the URL property is updated instead.
    pub fn link(&mut self, id: NodeId, url: Option<&str>) {
        let element = self.element_mut(id);
        let updated = match (std::mem::replace(element, Element::Item), url) {
            (Element::Text(run) | Element::Link { run, .. }, Some(url)) => Element::Link {
                run,
                url: url.to_string(),
            },
            (Element::Text(run) | Element::Link { run, .. }, None) => Element::Text(run),
            (Element::Image(mut props), url) => {
                props.url = url.map(str::to_string);
                Element::Image(props)
            }
            (other, _) => other,
        };
        *element = updated;
    }

    /// Inserts `text` at the given offset
    pub fn insert_text(&mut self, id: NodeId, at: usize, text: &str) {
        if let Some(run) = self.element_mut(id).run_mut() {
            let byte = byte_index(&run.value, at);
            run.value.insert_str(byte, text);
        }
    }

    /// Removes `[from, to)` from the value and returns the removed text
    pub fn extract(&mut self, id: NodeId, from: usize, to: usize) -> String {
        let Some(run) = self.element_mut(id).run_mut() else {
            return String::new();
        };
        let start = byte_index(&run.value, from);
        let end = byte_index(&run.value, to).max(start);
        run.value.drain(start..end).collect()
    }

    /// Keeps only `[from, to)` of the value, `to` defaulting to the end
    pub fn cut(&mut self, id: NodeId, from: usize, to: Option<usize>) {
        if let Some(run) = self.element_mut(id).run_mut() {
            let to = to.unwrap_or(usize::MAX);
            run.value = slice(&run.value, from, to).to_string();
        }
    }

    /// Word boundaries around an offset within the node's value
    pub fn edges(&self, id: NodeId, ofs: usize) -> (usize, usize) {
        word_edges(self.value(id), ofs)
    }

    /// Detached empty text node carrying the same style as `id`
    pub fn empty_like(&mut self, id: NodeId) -> NodeId {
        let style = self.style(id);
        self.create(Element::Text(TextRun {
            value: String::new(),
            style,
        }))
    }

    /// Detached copy of a text/link node holding `[from, to)` of its value
    fn clone_piece(&mut self, id: NodeId, from: usize, to: usize) -> NodeId {
        let piece = self.clone_shallow(id);
        let value = slice(self.value(id), from, to).to_string();
        self.set_value(piece, value);
        piece
    }

    /// Splits a text node so that `[at, at2)` lives in a node of its own and
    /// returns that node. `at2` defaults to the end of the value. Pieces that
    /// would come out empty on either side are not created, so splitting at
    /// `0..len` returns the node itself untouched.
    pub fn split(&mut self, id: NodeId, at: usize, at2: Option<usize>) -> NodeId {
        let len = self.len(id);
        let at = at.min(len);
        let end = at2.unwrap_or(len).clamp(at, len);
        if end < len {
            let tail = self.clone_piece(id, end, len);
            self.insert_after(id, tail);
            self.cut(id, 0, Some(end));
        }
        if at == 0 {
            return id;
        }
        let middle = self.clone_piece(id, at, end);
        self.insert_after(id, middle);
        self.cut(id, 0, Some(at));
        middle
    }

    /// Appends `b`'s value to `a` and removes `b`
    pub fn join(&mut self, a: NodeId, b: NodeId) {
        let tail = self.value(b).to_string();
        if let Some(run) = self.element_mut(a).run_mut() {
            run.value.push_str(&tail);
        }
        self.remove_pruning(b);
    }

    /// Merges the content from `a` to `b` into a single run of content.
    ///
    /// Every leaf strictly between the two is removed (with the structures it
    /// leaves empty), as is every table or row lying wholly between them. When both sit in different items, `b` and its following
    /// siblings move to the end of `a`'s item, which drops `b`'s emptied item.
    /// Empty edge nodes are then dropped and `a`/`b` are joined when they share
    /// the same format. Returns the junction: the position where `a`'s content
    /// ends and `b`'s begins.
    pub fn merge(&mut self, a: NodeId, b: NodeId) -> (NodeId, usize) {
        if a == b {
            return (a, self.len(a));
        }
        let mut between = Vec::new();
        let mut node = self.next(a, true);
        while let Some(n) = node {
            if n == b {
                break;
            }
            let kind = self.kind(n);
            // Rows and tables lying wholly inside the range go at once
            if matches!(kind, NodeKind::Table | NodeKind::Row)
                && !self.ancestors(b).any(|up| up == n)
            {
                between.push(n);
                node = self.next(n, false);
                continue;
            }
            if kind.is_inline() {
                between.push(n);
            }
            node = self.next(n, true);
        }
        for gone in between {
            if self.contains(gone) {
                self.remove_pruning(gone);
            }
        }

        let (target, source) = (self.container(a), self.container(b));
        if let (Some(target), Some(source)) = (target, source)
            && target != source
            && self.kind(target) == NodeKind::Item
            && self.kind(source) == NodeKind::Item
        {
            let from = self.index(b).unwrap_or(0);
            self.move_children(source, from, target);
            if self.children(source).is_empty() {
                self.remove_pruning(source);
            }
        }

        if self.kind(a) == NodeKind::Image {
            return (b, 0);
        }
        let len = self.len(a);
        if len == 0 {
            self.remove_pruning(a);
            return (b, 0);
        }
        if self.is_empty_text(b) {
            self.remove_pruning(b);
        } else if self.parent(a) == self.parent(b)
            && self.element(a).same_format(self.element(b))
        {
            self.join(a, b);
        }
        (a, len)
    }

    /// Resolves a signed offset relative to `id` into a `(node, offset)` pair.
    ///
    /// Offsets within `0..=len` stay on the node. Larger offsets overflow onto
    /// the following text/link leaves, negative ones underflow onto the
    /// preceding leaves, and both clamp at the document edges. A position
    /// landing exactly on the seam between two leaves resolves to the end of
    /// the earlier leaf.
    pub fn move_offset(&self, id: NodeId, ofs: isize) -> (NodeId, usize) {
        let mut node = id;
        let mut ofs = ofs;
        loop {
            let len = self.len(node) as isize;
            if ofs < 0 {
                match self.previous_text(node, true) {
                    Some(prev) => {
                        ofs += self.len(prev) as isize;
                        node = prev;
                    }
                    None => return (node, 0),
                }
            } else if ofs > len {
                match self.next_text(node, true) {
                    Some(next) => {
                        ofs -= len;
                        node = next;
                    }
                    None => return (node, len as usize),
                }
            } else {
                return (node, ofs as usize);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::shape::NodeData;
    use pretty_assertions::assert_eq;

    fn texts(tree: &Tree) -> Vec<NodeId> {
        tree.descendants(tree.root())
            .filter(|&n| tree.is_text(n))
            .collect()
    }

    fn values(tree: &Tree) -> Vec<String> {
        texts(tree)
            .into_iter()
            .map(|n| tree.value(n).to_string())
            .collect()
    }

    fn paragraph(values: &[&str]) -> Tree {
        Tree::load(&NodeData::document([NodeData::item(
            values.iter().map(|v| NodeData::text(*v)),
        )]))
        .unwrap()
    }

    #[test]
    fn test_split_middle_returns_selected_piece() {
        let mut tree = paragraph(&["hello world"]);
        let text = texts(&tree)[0];
        let middle = tree.split(text, 2, Some(7));
        assert_eq!(tree.value(middle), "llo w");
        assert_eq!(values(&tree), vec!["he", "llo w", "orld"]);
    }

    #[test]
    fn test_split_never_creates_empty_pieces() {
        let mut tree = paragraph(&["abc"]);
        let text = texts(&tree)[0];
        assert_eq!(tree.split(text, 0, None), text);
        assert_eq!(values(&tree), vec!["abc"]);

        let tail = tree.split(text, 1, None);
        assert_eq!(values(&tree), vec!["a", "bc"]);
        assert_eq!(tree.value(tail), "bc");
    }

    #[test]
    fn test_split_keeps_link_url_and_style() {
        let mut tree = Tree::load(&NodeData::document([NodeData::item([NodeData::link(
            "click here",
            "https://example.com",
        )
        .with_style([TextStyle::Bold])])]))
        .unwrap();
        let link = texts(&tree)[0];
        let right = tree.split(link, 5, None);
        assert_eq!(tree.element(right).url(), Some("https://example.com"));
        assert_eq!(tree.style(right), tree.style(link));
    }

    #[test]
    fn test_extract_and_cut() {
        let mut tree = paragraph(&["hello world"]);
        let text = texts(&tree)[0];
        assert_eq!(tree.extract(text, 5, 11), " world");
        assert_eq!(tree.value(text), "hello");
        tree.cut(text, 1, Some(3));
        assert_eq!(tree.value(text), "el");
        tree.cut(text, 1, None);
        assert_eq!(tree.value(text), "l");
    }

    #[test]
    fn test_insert_text_at_utf16_offset() {
        let mut tree = paragraph(&["🦀rust"]);
        let text = texts(&tree)[0];
        tree.insert_text(text, 2, "!");
        assert_eq!(tree.value(text), "🦀!rust");
    }

    #[test]
    fn test_move_offset_overflows_onto_neighbours() {
        let tree = Tree::load(&NodeData::document([
            NodeData::item([NodeData::text("abc")]),
            NodeData::item([NodeData::text("de")]),
        ]))
        .unwrap();
        let ts = texts(&tree);
        let (a, d) = (ts[0], ts[1]);
        assert_eq!(tree.move_offset(a, 2), (a, 2));
        // Seam stays at the end of the earlier node
        assert_eq!(tree.move_offset(a, 3), (a, 3));
        assert_eq!(tree.move_offset(a, 4), (d, 1));
        assert_eq!(tree.move_offset(a, 99), (d, 2));
        assert_eq!(tree.move_offset(d, -1), (a, 2));
        assert_eq!(tree.move_offset(d, -9), (a, 0));
    }

    #[test]
    fn test_move_offset_skips_images() {
        let tree = Tree::load(&NodeData::document([NodeData::item([
            NodeData::text("ab"),
            NodeData::image("pic.png"),
            NodeData::text("cd"),
        ])]))
        .unwrap();
        let ts = texts(&tree);
        assert_eq!(tree.move_offset(ts[0], 3), (ts[1], 1));
    }

    #[test]
    fn test_merge_across_items_joins_matching_runs() {
        let mut tree = Tree::load(&NodeData::document([
            NodeData::item([NodeData::text("hello ")]),
            NodeData::item([NodeData::text("middle")]),
            NodeData::item([
                NodeData::text("world"),
                NodeData::text("!").with_style([TextStyle::Bold]),
            ]),
        ]))
        .unwrap();
        let ts = texts(&tree);
        let junction = tree.merge(ts[0], ts[2]);
        assert_eq!(junction, (ts[0], 6));
        assert_eq!(values(&tree), vec!["hello world", "!"]);
        assert_eq!(tree.children(tree.root()).len(), 1);
    }

    #[test]
    fn test_merge_removes_tables_in_between() {
        let mut tree = Tree::load(&NodeData::document([
            NodeData::item([NodeData::text("bef")]),
            NodeData::table([NodeData::row([
                NodeData::cell([NodeData::text("x")]),
                NodeData::cell([NodeData::text("y")]),
            ])]),
            NodeData::item([NodeData::text("ter")]),
        ]))
        .unwrap();
        let ts = texts(&tree);
        assert_eq!(tree.merge(ts[0], ts[3]), (ts[0], 3));
        assert_eq!(values(&tree), vec!["befter"]);
        assert_eq!(tree.children(tree.root()).len(), 1);
    }

    #[test]
    fn test_merge_removes_rows_in_between() {
        let row = |text: &str| NodeData::row([NodeData::cell([NodeData::text(text)])]);
        let mut tree =
            Tree::load(&NodeData::document([NodeData::table([row("a"), row("b"), row("c")])]))
                .unwrap();
        let ts = texts(&tree);
        tree.merge(ts[0], ts[2]);
        assert_eq!(values(&tree), vec!["a", "c"]);
        let table = tree.children(tree.root())[0];
        assert_eq!(tree.children(table).len(), 2);
    }

    #[test]
    fn test_merge_drops_empty_edges() {
        let mut tree = Tree::load(&NodeData::document([
            NodeData::item([NodeData::text("")]),
            NodeData::item([NodeData::text("next")]),
        ]))
        .unwrap();
        let ts = texts(&tree);
        assert_eq!(tree.merge(ts[0], ts[1]), (ts[1], 0));
        assert_eq!(values(&tree), vec!["next"]);
        assert_eq!(tree.children(tree.root()).len(), 1);
    }

    #[test]
    fn test_link_and_unlink() {
        let mut tree = paragraph(&["word"]);
        let text = texts(&tree)[0];
        tree.link(text, Some("https://example.com"));
        assert_eq!(tree.kind(text), NodeKind::Link);
        tree.link(text, None);
        assert_eq!(tree.kind(text), NodeKind::Text);
        assert_eq!(tree.value(text), "word");
    }

    #[test]
    fn test_format_and_unformat() {
        let mut tree = paragraph(&["word"]);
        let text = texts(&tree)[0];
        tree.format(text, &[TextStyle::Bold, TextStyle::Italic]);
        tree.unformat(text, &[TextStyle::Bold]);
        assert_eq!(tree.style(text), StyleSet::from([TextStyle::Italic]));
    }
}
