use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::model::element::{Align, Element, NodeKind, TextRun};

/// Stable node identifier.
///
/// Assigned when the node is created and never reused within a tree, so a
/// rendering surface can tag its elements with it and hand it back later to
/// locate the node again.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid node id: {0:?}")]
pub struct ParseNodeIdError(String);

impl FromStr for NodeId {
    type Err = ParseNodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('n')
            .and_then(|digits| digits.parse().ok())
            .map(NodeId)
            .ok_or_else(|| ParseNodeIdError(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) element: Element,
    pub(crate) align: Option<Align>,
    pub(crate) level: Option<u32>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// Arena-backed document tree.
///
/// ## Ownership
///
/// - Every node lives in one map keyed by [`NodeId`]; the map doubles as the
///   id → node lookup table used to correlate nodes with their rendered
///   counterparts
/// - A node is reachable when it can be found by walking `children` from the
///   root; detached nodes (clones, fragments) simply have no parent
/// - Removing a node frees its whole subtree, so nothing outlives the content
///   sequence that held it
///
/// ## Ordering
///
/// Nodes are totally ordered by document pre-order ([`Tree::compare`]):
/// ancestors precede their descendants and siblings follow their index.
#[derive(Debug, Clone)]
pub struct Tree {
    pub(crate) slots: HashMap<NodeId, Slot>,
    pub(crate) root: NodeId,
    next_id: u64,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// A document holding a single empty paragraph
    pub fn new() -> Self {
        let mut tree = Self::bare();
        tree.ensure_content();
        tree
    }

    /// A document with no content at all
    pub(crate) fn bare() -> Self {
        let mut tree = Self {
            slots: HashMap::new(),
            root: NodeId(0),
            next_id: 0,
        };
        tree.root = tree.create(Element::empty(NodeKind::Document));
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Number of live nodes, detached ones included
    pub fn node_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slot(&self, id: NodeId) -> &Slot {
        &self.slots[&id]
    }

    pub(crate) fn slot_mut(&mut self, id: NodeId) -> &mut Slot {
        self.slots
            .get_mut(&id)
            .unwrap_or_else(|| panic!("node {id} is not part of this tree"))
    }

    pub fn element(&self, id: NodeId) -> &Element {
        &self.slot(id).element
    }

    pub fn element_mut(&mut self, id: NodeId) -> &mut Element {
        &mut self.slot_mut(id).element
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.element(id).kind()
    }

    pub fn align(&self, id: NodeId) -> Option<Align> {
        self.slot(id).align
    }

    pub fn set_align(&mut self, id: NodeId, align: Option<Align>) {
        self.slot_mut(id).align = align;
    }

    pub fn level(&self, id: NodeId) -> Option<u32> {
        self.slot(id).level
    }

    pub fn set_level(&mut self, id: NodeId, level: Option<u32>) {
        self.slot_mut(id).level = level;
    }

    /// Value length in UTF-16 code units (zero for non-text nodes)
    pub fn len(&self, id: NodeId) -> usize {
        self.element(id).len()
    }

    /// True for text/link nodes holding no characters
    pub fn is_empty_text(&self, id: NodeId) -> bool {
        self.element(id).run().is_some_and(TextRun::is_empty)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.kind(id).is_text()
    }

    // ============ Factory ============

    /// Create a detached node
    pub fn create(&mut self, element: Element) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.slots.insert(
            id,
            Slot {
                element,
                align: None,
                level: None,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    pub fn create_text(&mut self, value: impl Into<String>) -> NodeId {
        self.create(Element::Text(TextRun::new(value)))
    }

    /// Detached editing unit of the given kind holding one empty text node
    pub(crate) fn create_container(&mut self, kind: NodeKind) -> NodeId {
        let container = self.create(Element::empty(kind));
        let text = self.create_text("");
        self.append_child(container, text);
        container
    }

    /// Childless copy of a node: same element and attributes, fresh id
    pub(crate) fn clone_shallow(&mut self, id: NodeId) -> NodeId {
        let slot = self.slot(id);
        let (element, align, level) = (slot.element.clone(), slot.align, slot.level);
        let copy = self.create(element);
        let slot = self.slot_mut(copy);
        slot.align = align;
        slot.level = level;
        copy
    }

    /// Detached deep copy of a subtree with fresh ids
    pub fn clone_node(&mut self, id: NodeId) -> NodeId {
        let copy = self.clone_shallow(id);
        for child in self.children(id).to_vec() {
            let child_copy = self.clone_node(child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Makes sure the document holds at least one editing unit
    pub fn ensure_content(&mut self) {
        let has_container = self
            .descendants(self.root)
            .any(|id| self.kind(id).is_container());
        if !has_container {
            let item = self.create_container(NodeKind::Item);
            self.append_child(self.root, item);
        }
    }

    // ============ Structure ============

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slot(id).children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Position within the parent's content
    pub fn index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn is_first(&self, id: NodeId) -> bool {
        self.index(id).is_none_or(|i| i == 0)
    }

    pub fn is_last(&self, id: NodeId) -> bool {
        match self.parent(id) {
            Some(parent) => self.last_child(parent) == Some(id),
            None => true,
        }
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let children = &mut self.slot_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.slot_mut(child).parent = Some(parent);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child);
    }

    /// Places `node` right after `anchor` in the same parent
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) {
        self.detach(node);
        if let (Some(parent), Some(index)) = (self.parent(anchor), self.index(anchor)) {
            self.insert_child(parent, index + 1, node);
        }
    }

    /// Places `node` right before `anchor` in the same parent
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) {
        self.detach(node);
        if let (Some(parent), Some(index)) = (self.parent(anchor), self.index(anchor)) {
            self.insert_child(parent, index, node);
        }
    }

    /// Unlinks a node from its parent, keeping the subtree alive
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.slot_mut(id).parent.take() {
            self.slot_mut(parent).children.retain(|&c| c != id);
        }
    }

    /// Unlinks a node and frees its whole subtree
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
        self.discard(id);
    }

    /// Frees a detached subtree
    pub fn discard(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.remove(&id) {
            for child in slot.children {
                self.discard(child);
            }
        }
    }

    /// Removes a node together with every ancestor it leaves empty.
    ///
    /// Cells never collapse (that would break the table grid): an emptied
    /// cell gets a fresh empty text node instead. The root is never removed.
    pub fn remove_pruning(&mut self, id: NodeId) {
        let mut parent = self.parent(id);
        self.remove(id);
        while let Some(p) = parent {
            if !self.children(p).is_empty() || p == self.root {
                break;
            }
            if self.kind(p) == NodeKind::Cell {
                let text = self.create_text("");
                self.append_child(p, text);
                break;
            }
            parent = self.parent(p);
            self.remove(p);
        }
    }

    /// Replaces a node with its own children
    pub fn unwrap(&mut self, id: NodeId) {
        let (Some(parent), Some(index)) = (self.parent(id), self.index(id)) else {
            return;
        };
        for (offset, child) in self.children(id).to_vec().into_iter().enumerate() {
            self.insert_child(parent, index + offset, child);
        }
        self.remove(id);
    }

    /// Moves `from`'s children, starting at `from_index`, to the end of `to`
    pub(crate) fn move_children(&mut self, from: NodeId, from_index: usize, to: NodeId) {
        let moving: Vec<NodeId> = self.children(from).iter().skip(from_index).copied().collect();
        for child in moving {
            self.append_child(to, child);
        }
    }

    // ============ Navigation ============

    /// Nearest editing unit (item or cell) holding the node, the node itself included
    pub fn container(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|&a| self.kind(a).is_container())
    }

    /// Nearest node, starting from `id` itself, whose type is one of `kinds`
    pub fn climb(&self, id: NodeId, kinds: &[NodeKind]) -> Option<NodeId> {
        self.ancestors(id).find(|&a| kinds.contains(&self.kind(a)))
    }

    /// Ancestor at the given depth below the root (depth 1 = top-level block)
    pub fn ancestor(&self, id: NodeId, depth: usize) -> Option<NodeId> {
        let chain: Vec<NodeId> = self.ancestors(id).collect();
        chain.len().checked_sub(depth + 1).map(|i| chain[i])
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count() - 1
    }

    /// `id` followed by each of its ancestors up to the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Pre-order walk over `id` and everything below it
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    pub fn first_descendant(&self, id: NodeId) -> NodeId {
        let mut node = id;
        while let Some(child) = self.first_child(node) {
            node = child;
        }
        node
    }

    pub fn last_descendant(&self, id: NodeId) -> NodeId {
        let mut node = id;
        while let Some(child) = self.last_child(node) {
            node = child;
        }
        node
    }

    /// Following node.
    ///
    /// Without `traverse` this is the next sibling or, failing that, the
    /// nearest ancestor's next sibling. With `traverse` it is the pre-order
    /// successor: the walk descends into the node's own children first.
    pub fn next(&self, id: NodeId, traverse: bool) -> Option<NodeId> {
        if traverse && let Some(child) = self.first_child(id) {
            return Some(child);
        }
        let mut node = id;
        loop {
            if let Some(sibling) = self.next_sibling(node) {
                return Some(sibling);
            }
            node = self.parent(node)?;
        }
    }

    /// Preceding node, mirroring [`Tree::next`]: with `traverse` this is the
    /// pre-order predecessor (the previous sibling's last descendant, or the parent)
    pub fn previous(&self, id: NodeId, traverse: bool) -> Option<NodeId> {
        if let Some(sibling) = self.previous_sibling(id) {
            return Some(if traverse {
                self.last_descendant(sibling)
            } else {
                sibling
            });
        }
        if traverse {
            return self.parent(id);
        }
        let mut node = self.parent(id)?;
        loop {
            if let Some(sibling) = self.previous_sibling(node) {
                return Some(sibling);
            }
            node = self.parent(node)?;
        }
    }

    /// Next text/link node. With `traverse` the whole document is walked,
    /// otherwise only the following siblings are considered.
    pub fn next_text(&self, id: NodeId, traverse: bool) -> Option<NodeId> {
        if traverse {
            let mut node = id;
            loop {
                node = self.next(node, true)?;
                if self.is_text(node) {
                    return Some(node);
                }
            }
        }
        let parent = self.parent(id)?;
        let index = self.index(id)?;
        self.children(parent)[index + 1..]
            .iter()
            .copied()
            .find(|&c| self.is_text(c))
    }

    /// Previous text/link node, see [`Tree::next_text`]
    pub fn previous_text(&self, id: NodeId, traverse: bool) -> Option<NodeId> {
        if traverse {
            let mut node = id;
            loop {
                node = self.previous(node, true)?;
                if self.is_text(node) {
                    return Some(node);
                }
            }
        }
        let parent = self.parent(id)?;
        let index = self.index(id)?;
        self.children(parent)[..index]
            .iter()
            .rev()
            .copied()
            .find(|&c| self.is_text(c))
    }

    /// Next childless node in pre-order after the subtree rooted at `id`
    pub(crate) fn next_leaf_after(&self, id: NodeId) -> Option<NodeId> {
        let mut node = self.next(self.last_descendant(id), false)?;
        while let Some(child) = self.first_child(node) {
            node = child;
        }
        Some(node)
    }

    /// Closest inline leaf preceding `id` in document order
    pub(crate) fn previous_inline(&self, id: NodeId) -> Option<NodeId> {
        let mut node = id;
        loop {
            node = self.previous(node, true)?;
            if self.kind(node).is_inline() {
                return Some(node);
            }
        }
    }

    /// First text/link node at or below `id`
    pub fn first_text(&self, id: NodeId) -> Option<NodeId> {
        self.descendants(id).find(|&n| self.is_text(n))
    }

    /// First and last inline leaves at or below `id`
    pub(crate) fn inline_bounds(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        let mut leaves = self.descendants(id).filter(|&n| self.kind(n).is_inline());
        let first = leaves.next()?;
        Some((first, leaves.last().unwrap_or(first)))
    }

    /// Child-index path from the topmost ancestor down to `id`
    fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path: Vec<usize> = self.ancestors(id).filter_map(|a| self.index(a)).collect();
        path.reverse();
        path
    }

    /// Document pre-order comparison
    pub fn compare(&self, a: NodeId, b: NodeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        self.path(a).cmp(&self.path(b))
    }

    /// Absolute offset of the node: total length of the text/link nodes
    /// preceding it in document order
    pub fn offset(&self, id: NodeId) -> usize {
        self.descendants(self.root)
            .take_while(|&n| n != id)
            .filter(|&n| self.is_text(n))
            .map(|n| self.len(n))
            .sum()
    }

    /// Plain text of a subtree, editing units separated by newlines
    pub fn plain_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut current = None;
        for node in self.descendants(id) {
            let Some(run) = self.element(node).run() else {
                continue;
            };
            let container = self.container(node);
            if current.is_some() && container != current {
                out.push('\n');
            }
            current = container;
            out.push_str(&run.value);
        }
        out
    }
}

pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(current).iter().rev().copied());
        Some(current)
    }
}
