//! The document tree: typed nodes, navigation, mutation primitives and the
//! persistence shape.

mod container;
pub mod element;
mod mutate;
mod outline;
pub mod shape;
mod table;
pub(crate) mod text;
pub mod tree;

pub use element::{
    Align, CellProps, DocumentMeta, Element, ImageProps, ImageSize, NodeKind,
    ParseAttributeError, StyleSet, TextRun, TextStyle, VerticalAlign,
};
pub use outline::{NodeOutline, Outline};
pub use shape::{ModelError, NodeData};
pub use table::{ColumnPosition, RowPosition};
pub use tree::{NodeId, ParseNodeIdError, Tree};
