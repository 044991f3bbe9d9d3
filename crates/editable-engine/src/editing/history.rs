//! Undo/redo history.
//!
//! Snapshots are whole-document shapes with the selection persisted on the
//! root, newest first. `time_index` counts how many steps back from the
//! present the user currently is.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::editing::Editor;
use crate::model::{Element, NodeData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryOptions {
    /// Minimum delay between two accepted snapshots
    pub debounce: Duration,
    /// Maximum number of snapshots kept
    pub limit: usize,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(2000),
            limit: 128,
        }
    }
}

#[derive(Debug)]
pub struct History {
    snapshots: VecDeque<NodeData>,
    time_index: usize,
    options: HistoryOptions,
    last_accepted: Option<Instant>,
}

impl History {
    pub fn new(options: HistoryOptions) -> Self {
        Self {
            snapshots: VecDeque::new(),
            time_index: 0,
            options,
            last_accepted: None,
        }
    }

    pub fn options(&self) -> HistoryOptions {
        self.options
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn time_index(&self) -> usize {
        self.time_index
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.time_index = 0;
        self.last_accepted = None;
    }

    /// Whether a debounced snapshot taken now would be kept
    fn accepts(&self, now: Instant) -> bool {
        self.snapshots.is_empty()
            || self
                .last_accepted
                .is_none_or(|last| now.duration_since(last) >= self.options.debounce)
    }

    /// Makes `snapshot` the present, dropping every undone entry. Only
    /// `bounded` commits enforce the size limit.
    fn commit(&mut self, snapshot: NodeData, now: Instant, bounded: bool) {
        if self.time_index > 0 {
            let undone = self.time_index + 1;
            self.snapshots.drain(..undone.min(self.snapshots.len()));
            self.time_index = 0;
        }
        self.snapshots.push_front(snapshot);
        if bounded {
            self.snapshots.truncate(self.options.limit.max(1));
        }
        self.last_accepted = Some(now);
    }
}

impl Editor {
    /// Replaces the history settings, dropping every recorded snapshot
    pub fn enable_history(&mut self, options: HistoryOptions) -> &mut Self {
        self.history = History::new(options);
        self
    }

    pub fn clear_history(&mut self) -> &mut Self {
        self.history.clear();
        self
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Records the current document and selection.
    ///
    /// Unless `force`d, the snapshot is dropped when it arrives within the
    /// debounce interval of the previous accepted one.
    ///
    /// # Panics
    ///
    /// When the tree root is not a document.
    pub fn store(&mut self, force: bool) -> &mut Self {
        self.record(force, true)
    }

    fn record(&mut self, force: bool, bounded: bool) -> &mut Self {
        assert!(
            matches!(self.tree.element(self.tree.root()), Element::Document(_)),
            "history snapshots need a document root"
        );
        let now = Instant::now();
        if !force && !self.history.accepts(now) {
            debug!("history: snapshot dropped by debounce");
            return self;
        }
        let mut snapshot = self.tree.save();
        snapshot.range = self.absolute_range();
        self.history.commit(snapshot, now, bounded);
        debug!(
            "history: snapshot accepted (forced: {force}, {} kept)",
            self.history.len()
        );
        self
    }

    pub fn undoable(&self) -> bool {
        let len = self.history.len();
        let present = usize::from(self.history.time_index > 0);
        len > 0 && self.history.time_index < len - present
    }

    pub fn redoable(&self) -> bool {
        self.history.time_index > 0
    }

    /// Steps one snapshot back. At the present, the current state is stored
    /// first so that [`Editor::redo`] can return to it; that entry is not
    /// counted against the limit.
    pub fn undo(&mut self) -> &mut Self {
        if !self.undoable() {
            return self;
        }
        if self.history.time_index == 0 {
            self.record(true, false);
        }
        let index = self.history.time_index + 1;
        let Some(snapshot) = self.history.snapshots.get(index).cloned() else {
            return self;
        };
        self.history.time_index = index;
        debug!("history: undo to {index}");
        self.load_snapshot(&snapshot)
    }

    /// Steps one snapshot forward, dropping the present snapshot recorded by
    /// [`Editor::undo`] once it is reached again
    pub fn redo(&mut self) -> &mut Self {
        if !self.redoable() {
            return self;
        }
        let index = self.history.time_index - 1;
        let Some(snapshot) = self.history.snapshots.get(index).cloned() else {
            return self;
        };
        self.history.time_index = index;
        if index == 0 {
            self.history.snapshots.pop_front();
        }
        debug!("history: redo to {index}");
        self.load_snapshot(&snapshot)
    }

    fn load_snapshot(&mut self, snapshot: &NodeData) -> &mut Self {
        if let Err(err) = self.tree.reload(snapshot) {
            warn!("history: cannot reload snapshot: {err}");
            return self;
        }
        self.clear_selection().restore().mark(true)
    }
}
