use std::str::FromStr;

use crate::model::element::{Element, NodeKind, ParseAttributeError};
use crate::model::tree::{NodeId, Tree};

/// Where a new row goes relative to the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPosition {
    Above,
    Below,
}

/// Where a new column goes relative to the current cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPosition {
    Left,
    Right,
}

impl FromStr for RowPosition {
    type Err = ParseAttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "above" => Ok(RowPosition::Above),
            "below" => Ok(RowPosition::Below),
            other => Err(ParseAttributeError::new("row position", other)),
        }
    }
}

impl FromStr for ColumnPosition {
    type Err = ParseAttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(ColumnPosition::Left),
            "right" => Ok(ColumnPosition::Right),
            other => Err(ParseAttributeError::new("column position", other)),
        }
    }
}

impl Tree {
    /// Detached `rows` x `cols` table, every cell holding one empty text node.
    /// Returns `None` for an empty grid.
    pub fn init_table(&mut self, rows: usize, cols: usize) -> Option<NodeId> {
        if rows == 0 || cols == 0 {
            return None;
        }
        let table = self.create(Element::Table);
        for _ in 0..rows {
            let row = self.create_row(cols);
            self.append_child(table, row);
        }
        Some(table)
    }

    fn create_row(&mut self, cols: usize) -> NodeId {
        let row = self.create(Element::Row);
        for _ in 0..cols {
            let cell = self.create_container(NodeKind::Cell);
            self.append_child(row, cell);
        }
        row
    }

    /// Inserts an empty row next to `row`, with as many cells as `row` has
    pub fn insert_row(&mut self, row: NodeId, position: RowPosition) -> Option<NodeId> {
        self.parent(row)?;
        let cols = self.children(row).len().max(1);
        let new_row = self.create_row(cols);
        match position {
            RowPosition::Above => self.insert_before(row, new_row),
            RowPosition::Below => self.insert_after(row, new_row),
        }
        Some(new_row)
    }

    /// Inserts an empty cell into every row of the table, next to the column
    /// `cell` belongs to
    pub fn insert_column(&mut self, cell: NodeId, position: ColumnPosition) {
        let (Some(table), Some(column)) = (self.climb(cell, &[NodeKind::Table]), self.index(cell))
        else {
            return;
        };
        let at = match position {
            ColumnPosition::Left => column,
            ColumnPosition::Right => column + 1,
        };
        for row in self.children(table).to_vec() {
            let new_cell = self.create_container(NodeKind::Cell);
            self.insert_child(row, at, new_cell);
        }
    }

    /// Removes a row, and the whole table along with its last row
    pub fn remove_row(&mut self, row: NodeId) {
        let Some(table) = self.parent(row) else {
            return;
        };
        self.remove(row);
        if self.children(table).is_empty() {
            self.remove_pruning(table);
        }
    }

    /// Removes the column `cell` belongs to from every row. Rows left without
    /// cells are removed, and so is the table once it has no rows left.
    pub fn remove_column(&mut self, cell: NodeId) {
        let (Some(table), Some(column)) = (self.climb(cell, &[NodeKind::Table]), self.index(cell))
        else {
            return;
        };
        for row in self.children(table).to_vec() {
            if let Some(&target) = self.children(row).get(column) {
                self.remove(target);
            }
            if self.children(row).is_empty() {
                self.remove(row);
            }
        }
        if self.children(table).is_empty() {
            self.remove_pruning(table);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::outline::Outline;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    fn table_in_document(rows: usize, cols: usize) -> (Tree, NodeId) {
        let mut tree = Tree::new();
        let table = tree.init_table(rows, cols).unwrap();
        let root = tree.root();
        tree.append_child(root, table);
        (tree, table)
    }

    fn shape(tree: &Tree, table: NodeId) -> Vec<usize> {
        tree.children(table)
            .iter()
            .map(|&row| tree.children(row).len())
            .collect()
    }

    #[test]
    fn test_init_table_fills_cells_with_empty_text() {
        let (tree, table) = table_in_document(2, 3);
        assert_eq!(shape(&tree, table), vec![3, 3]);
        for cell in tree
            .descendants(table)
            .filter(|&n| tree.kind(n) == NodeKind::Cell)
        {
            let children = tree.children(cell);
            assert_eq!(children.len(), 1);
            assert!(tree.is_empty_text(children[0]));
        }
    }

    #[test]
    fn test_init_table_rejects_empty_grid() {
        let mut tree = Tree::new();
        assert_eq!(tree.init_table(0, 3), None);
        assert_eq!(tree.init_table(2, 0), None);
    }

    #[test]
    fn test_insert_row_and_column() {
        let (mut tree, table) = table_in_document(1, 2);
        let row = tree.children(table)[0];
        let first_cell = tree.children(row)[0];
        let new_row = tree.insert_row(row, RowPosition::Above).unwrap();
        assert_eq!(tree.children(table)[0], new_row);

        tree.insert_column(first_cell, ColumnPosition::Right);
        assert_eq!(shape(&tree, table), vec![3, 3]);
        assert_eq!(tree.children(row)[0], first_cell);
    }

    #[test]
    fn test_remove_column_drops_table_when_empty() {
        let (mut tree, table) = table_in_document(2, 1);
        let cell = tree.children(tree.children(table)[0])[0];
        tree.remove_column(cell);
        assert!(!tree.contains(table));
        assert_snapshot!(Outline(&tree), @r#"
        document
          item
            text ""
        "#);
    }

    #[test]
    fn test_remove_row_keeps_other_rows() {
        let (mut tree, table) = table_in_document(2, 2);
        let row = tree.children(table)[1];
        tree.remove_row(row);
        assert_eq!(shape(&tree, table), vec![2]);
        let last = tree.children(table)[0];
        tree.remove_row(last);
        assert!(!tree.contains(table));
    }
}
