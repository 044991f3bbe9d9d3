//! Structural primitives acting on editing units and the blocks around them.

use std::cmp::Ordering;

use crate::model::element::{Element, NodeKind};
use crate::model::tree::{NodeId, Tree};

impl Tree {
    /// Wraps `id` in a block of the given kind.
    ///
    /// The node joins its previous sibling when that one already has the
    /// requested kind, otherwise a new wrapper takes its place. A following
    /// sibling of the same kind is then merged into the wrapper so that
    /// consecutive indentations collapse into a single block. Returns `None`
    /// (leaving the tree untouched) when the containment rules forbid it.
    pub fn indent(&mut self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        let parent = self.parent(id)?;
        if !kind.accepts(self.kind(id)) || !self.kind(parent).accepts(kind) {
            return None;
        }
        let wrapper = match self.previous_sibling(id) {
            Some(previous) if self.kind(previous) == kind => previous,
            _ => {
                let wrapper = self.create(Element::empty(kind));
                self.insert_before(id, wrapper);
                wrapper
            }
        };
        self.append_child(wrapper, id);
        if let Some(next) = self.next_sibling(wrapper)
            && self.kind(next) == kind
        {
            self.move_children(next, 0, wrapper);
            self.remove(next);
        }
        Some(wrapper)
    }

    /// Lifts `id` out of its nearest ancestor of the given kind.
    ///
    /// The ancestor is split around the branch holding `id`: siblings before
    /// it stay in place, siblings after it move to a copy of the ancestor and
    /// the branch itself lands between the two. Halves left empty are
    /// removed.
    pub fn unindent(&mut self, id: NodeId, kind: NodeKind) -> bool {
        let Some(start) = self.parent(id) else {
            return false;
        };
        let Some(wrapper) = self.climb(start, &[kind]) else {
            return false;
        };
        let Some(branch) = self
            .ancestors(id)
            .find(|&a| self.parent(a) == Some(wrapper))
        else {
            return false;
        };
        let Some(outer) = self.parent(wrapper) else {
            return false;
        };
        if !self.kind(outer).accepts(self.kind(branch)) {
            return false;
        }

        let index = self.index(branch).unwrap_or(0);
        let after = (index + 1 < self.children(wrapper).len()).then(|| {
            let after = self.clone_shallow(wrapper);
            self.move_children(wrapper, index + 1, after);
            after
        });
        self.insert_after(wrapper, branch);
        if let Some(after) = after {
            self.insert_after(branch, after);
        }
        if self.children(wrapper).is_empty() {
            self.remove(wrapper);
        }
        true
    }

    /// Merges adjacent children sharing the same format and drops empty
    /// text/link children, keeping one when it is the sole child.
    pub fn defrag(&mut self, container: NodeId) {
        let mut index = 0;
        while let Some(&child) = self.children(container).get(index) {
            if self.is_empty_text(child) && self.children(container).len() > 1 {
                self.remove(child);
                continue;
            }
            if index > 0 {
                let previous = self.children(container)[index - 1];
                if self.element(previous).same_format(self.element(child)) {
                    self.join(previous, child);
                    continue;
                }
            }
            index += 1;
        }
    }

    /// Moves `id` and its following siblings into a copy of their container
    /// inserted right after it. Returns the new container.
    pub fn break_container(&mut self, id: NodeId) -> Option<NodeId> {
        let container = self.parent(id)?;
        let index = self.index(id)?;
        let copy = self.clone_shallow(container);
        self.move_children(container, index, copy);
        self.insert_after(container, copy);
        Some(copy)
    }

    /// Splits every ancestor of `id` (or of its table, inside cells) up to the
    /// document, so that the returned top-level block ends right after it and
    /// new blocks can be inserted in between the two halves.
    pub fn cleave(&mut self, id: NodeId) -> Option<NodeId> {
        let mut node = self.climb(id, &[NodeKind::Table]).unwrap_or(id);
        while let Some(parent) = self.parent(node) {
            if parent == self.root {
                return Some(node);
            }
            if !self.is_last(node) {
                let index = self.index(node).unwrap_or(0);
                let after = self.clone_shallow(parent);
                self.move_children(parent, index + 1, after);
                self.insert_after(parent, after);
            }
            node = parent;
        }
        None
    }

    /// Detached document holding a copy of every node intersecting the
    /// `[start, end]` range.
    pub fn fragment(&mut self, start: NodeId, end: NodeId) -> NodeId {
        let fragment = self.create(Element::empty(NodeKind::Document));
        let root = self.root;
        for child in self.children(root).to_vec() {
            if self.intersects(child, start, end) {
                let copy = self.clone_range(child, start, end);
                self.append_child(fragment, copy);
            }
        }
        fragment
    }

    fn intersects(&self, id: NodeId, start: NodeId, end: NodeId) -> bool {
        self.compare(id, end) != Ordering::Greater
            && self.compare(self.last_descendant(id), start) != Ordering::Less
    }

    fn clone_range(&mut self, id: NodeId, start: NodeId, end: NodeId) -> NodeId {
        let copy = self.clone_shallow(id);
        for child in self.children(id).to_vec() {
            if self.intersects(child, start, end) {
                let child_copy = self.clone_range(child, start, end);
                self.append_child(copy, child_copy);
            }
        }
        copy
    }
}
