//! Table verbs.

use std::str::FromStr;

use log::debug;

use crate::editing::Editor;
use crate::model::{ColumnPosition, NodeId, NodeKind, ParseAttributeError, RowPosition};

/// What [`Editor::table_delete`] removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableTarget {
    Row,
    Column,
    Table,
}

impl FromStr for TableTarget {
    type Err = ParseAttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "row" => Ok(TableTarget::Row),
            "column" => Ok(TableTarget::Column),
            "table" => Ok(TableTarget::Table),
            other => Err(ParseAttributeError::new("table target", other)),
        }
    }
}

impl Editor {
    /// Inserts an empty `rows` x `cols` table right after the node holding the
    /// selection start, splitting the blocks around it, and moves the cursor
    /// into the first cell
    pub fn table_new(&mut self, rows: usize, cols: usize) -> &mut Self {
        let Some(start) = self.selection.start() else {
            return self;
        };
        self.store(false);
        let Some(table) = self.tree.init_table(rows, cols) else {
            return self;
        };
        let Some(top) = self.tree.cleave(start.node) else {
            self.tree.discard(table);
            return self;
        };
        self.tree.insert_after(top, table);
        match self.tree.first_text(table) {
            Some(text) => self.set_cursor(text, 0),
            None => self,
        }
        .mark(true)
    }

    pub fn table_row(&mut self, position: RowPosition) -> &mut Self {
        let Some(row) = self.pick(&[NodeKind::Row]) else {
            return self;
        };
        self.store(false);
        self.tree.insert_row(row, position);
        self.mark(true)
    }

    pub fn table_column(&mut self, position: ColumnPosition) -> &mut Self {
        let Some(cell) = self.pick(&[NodeKind::Cell]) else {
            return self;
        };
        self.store(false);
        self.tree.insert_column(cell, position);
        self.mark(true)
    }

    /// Removes the row, column or whole table holding the selection start.
    ///
    /// The cursor moves to the start of the neighbouring row or column when
    /// there is one, otherwise to the text following the table, otherwise to
    /// the text preceding it.
    pub fn table_delete(&mut self, target: TableTarget) -> &mut Self {
        let kind = match target {
            TableTarget::Row => NodeKind::Row,
            TableTarget::Column => NodeKind::Cell,
            TableTarget::Table => NodeKind::Table,
        };
        let (Some(node), Some(table)) = (self.pick(&[kind]), self.pick(&[NodeKind::Table])) else {
            return self;
        };
        self.store(false);

        let sibling = match target {
            TableTarget::Table => None,
            _ => self
                .tree
                .next_sibling(node)
                .or_else(|| self.tree.previous_sibling(node)),
        };
        let fallback = sibling
            .and_then(|s| self.tree.first_text(s))
            .or_else(|| self.outside(table));
        debug!("table: removing {target:?} {node}, cursor goes to {fallback:?}");

        match target {
            TableTarget::Row => self.tree.remove_row(node),
            TableTarget::Column => self.tree.remove_column(node),
            TableTarget::Table => self.tree.remove_pruning(table),
        }
        self.tree.ensure_content();
        match fallback.filter(|&f| self.tree.contains(f)) {
            Some(text) => self.set_cursor(text, 0),
            None => self.reset(),
        }
        .mark(true)
    }

    /// Nearest text outside the table, following it or else preceding it
    fn outside(&self, table: NodeId) -> Option<NodeId> {
        let last = self.tree.last_descendant(table);
        self.tree
            .next_text(last, true)
            .or_else(|| self.tree.previous_text(table, true))
    }
}
