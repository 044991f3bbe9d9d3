use crate::editing::Editor;
use crate::model::{NodeId, NodeKind};

/// A position in the tree: a node and a UTF-16 offset into its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub node: NodeId,
    pub offset: usize,
}

impl Point {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Point,
    pub end: Point,
}

/// The live selection of an [`Editor`].
///
/// Empty (invalid) until a range is set. The `modified` flag tracks whether
/// the selection changed since it was last read from or applied to a host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    range: Option<Range>,
    modified: bool,
}

impl Selection {
    pub fn range(&self) -> Option<Range> {
        self.range
    }

    pub fn start(&self) -> Option<Point> {
        self.range.map(|r| r.start)
    }

    pub fn end(&self) -> Option<Point> {
        self.range.map(|r| r.end)
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub(crate) fn set(&mut self, range: Option<Range>) {
        self.range = range;
        self.modified = true;
    }

    pub(crate) fn mark(&mut self, modified: bool) {
        self.modified = self.range.is_some() && modified;
    }
}

impl Editor {
    /// Both endpoints are set
    pub fn is_valid(&self) -> bool {
        self.selection.range.is_some()
    }

    /// Both endpoints sit in the same node
    pub fn is_single(&self) -> bool {
        self.selection
            .range
            .is_some_and(|r| r.start.node == r.end.node)
    }

    pub fn is_multi(&self) -> bool {
        !self.is_single()
    }

    /// The selection starts at offset 0 and ends at the end of its end node
    pub fn is_whole(&self) -> bool {
        self.selection
            .range
            .is_some_and(|r| r.start.offset == 0 && r.end.offset == self.tree.len(r.end.node))
    }

    pub fn is_partial(&self) -> bool {
        !self.is_whole()
    }

    pub fn is_collapsed(&self) -> bool {
        self.is_single()
            && self
                .selection
                .range
                .is_some_and(|r| r.start.offset == r.end.offset)
    }

    /// Both endpoints belong to the same editing unit
    pub fn is_contained(&self) -> bool {
        self.is_single()
            || self.selection.range.is_some_and(|r| {
                self.tree.container(r.start.node) == self.tree.container(r.end.node)
            })
    }

    /// The end comes before the start in document order
    pub fn is_reversed(&self) -> bool {
        self.selection.range.is_some_and(|r| {
            if r.start.node == r.end.node {
                r.start.offset > r.end.offset
            } else {
                self.tree.compare(r.start.node, r.end.node).is_gt()
            }
        })
    }

    /// Modified since it was last queried from or applied to a host
    pub fn marked(&self) -> bool {
        self.selection.modified
    }

    pub fn mark(&mut self, modified: bool) -> &mut Self {
        self.selection.mark(modified);
        self
    }

    /// Nearest ancestor-or-self of the start node whose type is in `kinds`
    pub fn pick(&self, kinds: &[NodeKind]) -> Option<NodeId> {
        let start = self.selection.start()?;
        self.tree.climb(start.node, kinds)
    }

    /// True when the selection lies entirely within a single node or branch
    /// of the given type
    pub fn belongs_to(&self, kind: NodeKind) -> bool {
        let Some(Range { start, end }) = self.selection.range else {
            return false;
        };
        match kind {
            NodeKind::Document => true,
            NodeKind::Text | NodeKind::Link => {
                self.is_single()
                    && self.tree.kind(start.node) == kind
                    && start.offset < self.tree.len(start.node)
            }
            NodeKind::Item | NodeKind::Cell => {
                self.is_contained()
                    && self
                        .tree
                        .container(start.node)
                        .is_some_and(|c| self.tree.kind(c) == kind)
            }
            NodeKind::Blockquote
            | NodeKind::Bulleted
            | NodeKind::Numbered
            | NodeKind::Row
            | NodeKind::Table
            | NodeKind::Image => match self.tree.climb(start.node, &[kind]) {
                Some(block) => {
                    self.is_single() || self.tree.climb(end.node, &[kind]) == Some(block)
                }
                None => false,
            },
        }
    }

    /// True when `node` is the start node, the start's ancestor of the
    /// node's own type, or falls within the selected range
    pub fn selected(&self, node: NodeId) -> bool {
        let Some(Range { start, end }) = self.selection.range else {
            return false;
        };
        if !self.tree.contains(node) {
            return false;
        }
        node == start.node
            || self.tree.climb(start.node, &[self.tree.kind(node)]) == Some(node)
            || (self.tree.compare(start.node, node).is_le()
                && self.tree.compare(end.node, node).is_ge())
    }
}
