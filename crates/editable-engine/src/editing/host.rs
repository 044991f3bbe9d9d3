//! Boundary with the rendering surface that displays the document.
//!
//! The surface tags every displayed node with its [`NodeId`] and reports
//! its native selection in terms of those ids. Failures on this side never
//! reach the editing verbs: they are logged and the selection falls back to
//! a safe state.

use std::fmt::Display;

use log::warn;

use crate::editing::Editor;
use crate::editing::selection::Point;
use crate::model::NodeId;

/// An endpoint of the host's native selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostPoint {
    pub node: NodeId,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostRange {
    pub start: HostPoint,
    pub end: HostPoint,
    pub collapsed: bool,
}

/// A rendering surface holding a native selection
pub trait SelectionHost {
    type Error: Display;

    /// Current native selection, `None` when the surface has none
    fn selection(&self) -> Result<Option<HostRange>, Self::Error>;

    fn set_selection(&mut self, range: HostRange) -> Result<(), Self::Error>;
}

impl Editor {
    /// Reads the host's selection into the editor.
    ///
    /// No host selection leaves the editor without one. A host error or a
    /// node the tree does not know puts the cursor at the document start.
    pub fn query<H: SelectionHost>(&mut self, host: &H) -> &mut Self {
        let range = match host.selection() {
            Ok(Some(range)) => range,
            Ok(None) => return self.clear_selection(),
            Err(err) => {
                warn!("host: cannot read selection: {err}");
                return self.reset().mark(false);
            }
        };
        let (Some(start), Some(end)) = (self.locate_host(range.start), self.locate_host(range.end))
        else {
            warn!(
                "host: selection refers to unknown nodes {} .. {}",
                range.start.node, range.end.node
            );
            return self.reset().mark(false);
        };
        if range.collapsed {
            self.set_range(start, start);
        } else {
            self.set_range(start, end).sort();
        }
        self.mark(false)
    }

    /// Pushes the editor's selection to the host. The selection stays marked
    /// as modified when the host rejects it.
    pub fn apply<H: SelectionHost>(&mut self, host: &mut H) -> &mut Self {
        let Some(range) = self.selection.range() else {
            return self;
        };
        let host_range = HostRange {
            start: HostPoint {
                node: range.start.node,
                offset: range.start.offset,
            },
            end: HostPoint {
                node: range.end.node,
                offset: range.end.offset,
            },
            collapsed: self.is_collapsed(),
        };
        match host.set_selection(host_range) {
            Ok(()) => self.mark(false),
            Err(err) => {
                warn!("host: cannot apply selection: {err}");
                self
            }
        }
    }

    fn locate_host(&self, point: HostPoint) -> Option<Point> {
        if !self.tree.contains(point.node) {
            return None;
        }
        let offset = if self.tree.is_empty_text(point.node) {
            0
        } else {
            point.offset.min(self.tree.len(point.node))
        };
        Some(Point::new(point.node, offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeData, Tree};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct FakeHost {
        range: Option<HostRange>,
        broken: bool,
    }

    impl SelectionHost for FakeHost {
        type Error = String;

        fn selection(&self) -> Result<Option<HostRange>, String> {
            if self.broken {
                return Err("surface detached".to_string());
            }
            Ok(self.range)
        }

        fn set_selection(&mut self, range: HostRange) -> Result<(), String> {
            if self.broken {
                return Err("surface detached".to_string());
            }
            self.range = Some(range);
            Ok(())
        }
    }

    fn point(node: NodeId, offset: usize) -> HostPoint {
        HostPoint { node, offset }
    }

    fn editor() -> (Editor, Vec<NodeId>) {
        let tree = Tree::load(&NodeData::document([
            NodeData::item([NodeData::text("hello")]),
            NodeData::item([NodeData::text("")]),
            NodeData::item([NodeData::text("world")]),
        ]))
        .unwrap();
        let texts = tree
            .descendants(tree.root())
            .filter(|&n| tree.is_text(n))
            .collect();
        (Editor::new(tree), texts)
    }

    #[test]
    fn test_query_maps_and_sorts_host_range() {
        let (mut editor, t) = editor();
        let host = FakeHost {
            range: Some(HostRange {
                start: point(t[2], 3),
                end: point(t[0], 99),
                collapsed: false,
            }),
            ..FakeHost::default()
        };
        editor.query(&host);
        let range = editor.selection().range().unwrap();
        assert_eq!(range.start, Point::new(t[0], 5));
        assert_eq!(range.end, Point::new(t[2], 3));
        assert!(!editor.marked());
    }

    #[test]
    fn test_query_forces_zero_offset_in_empty_text() {
        let (mut editor, t) = editor();
        let host = FakeHost {
            range: Some(HostRange {
                start: point(t[1], 4),
                end: point(t[1], 4),
                collapsed: true,
            }),
            ..FakeHost::default()
        };
        editor.query(&host);
        assert_eq!(editor.selection().start(), Some(Point::new(t[1], 0)));
        assert!(editor.is_collapsed());
    }

    #[test]
    fn test_query_without_host_selection_clears() {
        let (mut editor, t) = editor();
        editor.set_cursor(t[0], 1).query(&FakeHost::default());
        assert!(!editor.is_valid());
    }

    #[test]
    fn test_query_failures_reset_to_document_start() {
        let (mut editor, t) = editor();
        let unknown = FakeHost {
            range: Some(HostRange {
                start: point(NodeId(999), 0),
                end: point(t[0], 1),
                collapsed: false,
            }),
            ..FakeHost::default()
        };
        editor.query(&unknown);
        assert_eq!(editor.selection().start(), Some(Point::new(t[0], 0)));
        assert!(editor.is_collapsed());

        let broken = FakeHost {
            broken: true,
            ..FakeHost::default()
        };
        editor.set_cursor(t[2], 2).query(&broken);
        assert_eq!(editor.selection().start(), Some(Point::new(t[0], 0)));
    }

    #[test]
    fn test_apply_pushes_selection_and_clears_mark() {
        let (mut editor, t) = editor();
        let mut host = FakeHost::default();
        editor.apply(&mut host);
        assert_eq!(host.range, None);

        editor.set(t[0], 1, t[2], 2).apply(&mut host);
        assert_eq!(
            host.range,
            Some(HostRange {
                start: point(t[0], 1),
                end: point(t[2], 2),
                collapsed: false,
            })
        );
        assert!(!editor.marked());
    }

    #[test]
    fn test_apply_failure_keeps_selection_marked() {
        let (mut editor, t) = editor();
        let mut host = FakeHost {
            broken: true,
            ..FakeHost::default()
        };
        editor.set_cursor(t[0], 1).apply(&mut host);
        assert!(editor.marked());
        assert!(editor.is_valid());
    }
}
