//! Range algebra: setting, moving and normalizing the selection.

use log::{trace, warn};

use crate::editing::Editor;
use crate::editing::selection::{Point, Range};
use crate::model::NodeId;

impl Editor {
    /// Offset as given, or the node's length for the negative "end of node" sentinel
    fn resolve(&self, node: NodeId, ofs: isize) -> usize {
        usize::try_from(ofs).unwrap_or_else(|_| self.tree.len(node))
    }

    pub(crate) fn set_range(&mut self, start: Point, end: Point) -> &mut Self {
        trace!(
            "selection: {}:{} .. {}:{}",
            start.node, start.offset, end.node, end.offset
        );
        self.selection.set(Some(Range { start, end }));
        self
    }

    /// Sets the selection. A negative offset stands for the end of its node.
    /// Ids that are not part of the tree drop the selection instead.
    pub fn set(&mut self, start: NodeId, start_ofs: isize, end: NodeId, end_ofs: isize) -> &mut Self {
        if let Some(unknown) = [start, end].into_iter().find(|&id| !self.tree.contains(id)) {
            warn!("selection: unknown node {unknown}");
            return self.clear_selection();
        }
        let start = Point::new(start, self.resolve(start, start_ofs));
        let end = Point::new(end, self.resolve(end, end_ofs));
        self.set_range(start, end)
    }

    /// Collapses the selection to a cursor at the given position
    pub fn set_cursor(&mut self, node: NodeId, ofs: isize) -> &mut Self {
        self.set(node, ofs, node, ofs)
    }

    /// Drops the selection altogether
    pub fn clear_selection(&mut self) -> &mut Self {
        self.selection.set(None);
        self
    }

    /// Cursor at the very beginning of the document
    pub fn reset(&mut self) -> &mut Self {
        let first = self.tree.first_descendant(self.tree.root());
        self.set_cursor(first, 0)
    }

    /// Collapses to the start edge, or to the end edge when `to_end` is set
    pub fn collapse(&mut self, to_end: bool) -> &mut Self {
        let Some(range) = self.selection.range() else {
            return self;
        };
        let at = if to_end { range.end } else { range.start };
        self.set_range(at, at)
    }

    /// Shifts the start offset by `delta_start` and the end offset by
    /// `delta_end`, hopping across nodes as needed. Without `delta_end` the
    /// selection collapses onto the moved start.
    pub fn move_by(&mut self, delta_start: isize, delta_end: Option<isize>) -> &mut Self {
        let Some(Range { start, end }) = self.selection.range() else {
            return self;
        };
        let (node, ofs) = self
            .tree
            .move_offset(start.node, start.offset as isize + delta_start);
        let start = Point::new(node, ofs);
        let end = match delta_end {
            Some(delta) => {
                let (node, ofs) = self.tree.move_offset(end.node, end.offset as isize + delta);
                Point::new(node, ofs)
            }
            None => start,
        };
        self.set_range(start, end)
    }

    /// Selects between two absolute offsets of the document
    pub fn select_offsets(&mut self, start: usize, end: usize) -> &mut Self {
        let delta_end = (start != end).then_some(end as isize);
        self.reset().move_by(start as isize, delta_end)
    }

    /// Absolute `[start, end]` offsets of the selection in the document
    pub fn absolute_range(&self) -> Option<[usize; 2]> {
        let Range { start, end } = self.selection.range()?;
        let base = self.tree.offset(start.node);
        let end_base = if start.node == end.node {
            base
        } else {
            self.tree.offset(end.node)
        };
        Some([base + start.offset, end_base + end.offset])
    }

    /// Persists the selection into the document as its absolute range
    pub fn save(&mut self) -> &mut Self {
        if let Some(range) = self.absolute_range() {
            self.tree.set_saved_range(Some(range));
        }
        self
    }

    /// Restores the selection persisted by [`Editor::save`]
    pub fn restore(&mut self) -> &mut Self {
        match self.tree.saved_range() {
            Some([start, end]) => self.select_offsets(start, end),
            None => self,
        }
    }

    /// Swaps the edges when the end precedes the start
    pub fn sort(&mut self) -> &mut Self {
        if self.is_reversed()
            && let Some(Range { start, end }) = self.selection.range()
        {
            self.set_range(end, start);
        }
        self
    }

    /// Keeps the edges off node seams: an end at offset 0 moves back to the
    /// end of the previous text, a start at the end of its node moves forward
    /// to the start of the next one.
    pub fn trim(&mut self) -> &mut Self {
        if !self.is_valid() || self.is_collapsed() {
            return self;
        }
        if let Some(Range { start, end }) = self.selection.range()
            && end.offset == 0
            && let Some(previous) = self.tree.previous_text(end.node, true)
        {
            let end = Point::new(previous, self.tree.len(previous));
            self.set_range(start, end);
        }
        if self.is_collapsed() {
            return self;
        }
        if let Some(Range { start, end }) = self.selection.range()
            && start.offset == self.tree.len(start.node)
            && let Some(next) = self.tree.next_text(start.node, true)
        {
            self.set_range(Point::new(next, 0), end);
        }
        self
    }

    /// Splits the edge nodes so the selection covers whole nodes only
    pub fn split(&mut self) -> &mut Self {
        let Some(Range { start, end }) = self.selection.range() else {
            return self;
        };
        if start.node == end.node {
            let node = self
                .tree
                .split(start.node, start.offset, Some(end.offset));
            return self.set(node, 0, node, -1);
        }
        let first = self.tree.split(start.node, start.offset, None);
        let last = self.tree.split(end.node, 0, Some(end.offset));
        self.set(first, 0, last, -1)
    }

    /// Merges same-format neighbours in every container the selection
    /// touches, keeping the selection on the same text
    pub fn defrag(&mut self) -> &mut Self {
        let Some(Range { start, end }) = self.selection.range() else {
            return self;
        };
        let start_anchor = self.anchor(start);
        let end_anchor = self.anchor(end);
        for container in self.containers() {
            self.tree.defrag(container);
        }
        let start = start_anchor.map_or(start, |a| self.locate(a));
        let end = end_anchor.map_or(end, |a| self.locate(a));
        self.set_range(start, end).trim()
    }

    /// Expands the selection to the word boundaries around its edges
    pub fn word_wrap(&mut self) -> &mut Self {
        let Some(Range { start, end }) = self.selection.range() else {
            return self;
        };
        let (from, to) = self.tree.edges(start.node, start.offset);
        if self.is_collapsed() {
            return self.set_range(Point::new(start.node, from), Point::new(start.node, to));
        }
        let (_, end_to) = self.tree.edges(end.node, end.offset);
        self.set_range(Point::new(start.node, from), Point::new(end.node, end_to))
    }

    /// Every text/link node from the start to the end of the selection
    pub(crate) fn nodes(&self) -> Vec<NodeId> {
        let Some(Range { start, end }) = self.selection.range() else {
            return Vec::new();
        };
        let mut nodes = Vec::new();
        let mut node = Some(start.node);
        while let Some(n) = node {
            if self.tree.compare(n, end.node).is_gt() {
                break;
            }
            nodes.push(n);
            node = self.tree.next_text(n, true);
        }
        nodes
    }

    /// Every editing unit intersecting the selection, in document order
    pub(crate) fn containers(&self) -> Vec<NodeId> {
        let Some(Range { start, end }) = self.selection.range() else {
            return Vec::new();
        };
        let mut containers: Vec<NodeId> = Vec::new();
        let mut container = self.tree.container(start.node);
        while let Some(c) = container {
            if !self.tree.compare(c, end.node).is_lt() || containers.contains(&c) {
                break;
            }
            containers.push(c);
            container = self
                .tree
                .next_leaf_after(c)
                .and_then(|leaf| self.tree.container(leaf));
        }
        containers
    }

    /// Position of a point relative to its container: the container and
    /// the text length preceding the point within it
    pub(crate) fn anchor(&self, point: Point) -> Option<(NodeId, usize)> {
        let container = self.tree.container(point.node)?;
        let before: usize = self
            .tree
            .children(container)
            .iter()
            .take_while(|&&c| c != point.node)
            .map(|&c| self.tree.len(c))
            .sum();
        Some((container, before + point.offset))
    }

    /// Inverse of [`Editor::anchor`]. A position on a seam lands at the end
    /// of the earlier node.
    pub(crate) fn locate(&self, (container, mut ofs): (NodeId, usize)) -> Point {
        let children = self.tree.children(container);
        for &child in children.iter().filter(|&&c| self.tree.is_text(c)) {
            let len = self.tree.len(child);
            if ofs <= len {
                return Point::new(child, ofs);
            }
            ofs -= len;
        }
        match children.last() {
            Some(&last) => Point::new(last, self.tree.len(last)),
            None => Point::new(container, 0),
        }
    }

    /// Places the cursor at `(node, ofs)` after tidying up its container:
    /// empty leftovers are dropped and equal runs merged
    pub(crate) fn settle(&mut self, node: NodeId, ofs: usize) -> &mut Self {
        let point = Point::new(node, ofs);
        let Some(anchor) = self.anchor(point) else {
            return self.set_range(point, point);
        };
        self.tree.defrag(anchor.0);
        let point = self.locate(anchor);
        self.set_range(point, point)
    }
}
