pub mod editing;
pub mod model;

// Re-export key types for easier usage
pub use editing::{
    Editor, History, HistoryOptions, HostPoint, HostRange, Point, Range, Selection, SelectionHost,
    TableTarget,
};
pub use model::{
    Align, ColumnPosition, Element, ModelError, NodeData, NodeId, NodeKind, Outline, RowPosition,
    StyleSet, TextStyle, Tree,
};
