//! Persistence shape of the document tree.
//!
//! [`NodeData`] is the flat, JSON-friendly form of a node: its `type`, the
//! common `align`/`level`/`content` fields and the type-specific properties,
//! all optional and omitted when unset. It is what documents are loaded from
//! and saved to, what history snapshots hold and what copy/paste exchange.

use serde::{Deserialize, Serialize};

use crate::model::element::{
    Align, CellProps, DocumentMeta, Element, ImageProps, ImageSize, NodeKind, StyleSet, TextRun,
    TextStyle, VerticalAlign,
};
use crate::model::tree::{NodeId, Tree};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("a {parent} node cannot contain a {child} node")]
    InvalidChild { parent: NodeKind, child: NodeKind },
    #[error("a document must have a document root, found {0}")]
    InvalidRoot(NodeKind),
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<NodeData>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valign: Option<VerticalAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rowspan: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colspan: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ImageSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<[usize; 2]>,
}

impl NodeData {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            align: None,
            level: None,
            content: None,
            style: None,
            value: None,
            url: None,
            valign: None,
            rowspan: None,
            colspan: None,
            size: None,
            alt: None,
            title: None,
            start: None,
            name: None,
            author: None,
            version: None,
            range: None,
        }
    }

    fn branch(kind: NodeKind, content: impl IntoIterator<Item = NodeData>) -> Self {
        Self {
            content: Some(content.into_iter().collect()),
            ..Self::new(kind)
        }
    }

    pub fn document(content: impl IntoIterator<Item = NodeData>) -> Self {
        Self::branch(NodeKind::Document, content)
    }

    pub fn blockquote(content: impl IntoIterator<Item = NodeData>) -> Self {
        Self::branch(NodeKind::Blockquote, content)
    }

    pub fn bulleted(content: impl IntoIterator<Item = NodeData>) -> Self {
        Self::branch(NodeKind::Bulleted, content)
    }

    pub fn numbered(content: impl IntoIterator<Item = NodeData>) -> Self {
        Self::branch(NodeKind::Numbered, content)
    }

    pub fn item(content: impl IntoIterator<Item = NodeData>) -> Self {
        Self::branch(NodeKind::Item, content)
    }

    pub fn table(content: impl IntoIterator<Item = NodeData>) -> Self {
        Self::branch(NodeKind::Table, content)
    }

    pub fn row(content: impl IntoIterator<Item = NodeData>) -> Self {
        Self::branch(NodeKind::Row, content)
    }

    pub fn cell(content: impl IntoIterator<Item = NodeData>) -> Self {
        Self::branch(NodeKind::Cell, content)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::new(NodeKind::Text)
        }
    }

    pub fn link(value: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            url: Some(url.into()),
            ..Self::new(NodeKind::Link)
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::new(NodeKind::Image)
        }
    }

    pub fn with_style(mut self, style: impl IntoIterator<Item = TextStyle>) -> Self {
        self.style = Some(style.into_iter().collect());
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Concatenated text of every text/link node in the shape
    pub fn text_content(&self) -> String {
        let mut out = self.value.clone().unwrap_or_default();
        for child in self.content.iter().flatten() {
            out.push_str(&child.text_content());
        }
        out
    }

    fn element(&self) -> Element {
        let run = || TextRun {
            value: self.value.clone().unwrap_or_default(),
            style: self.style.clone().unwrap_or_default(),
        };
        match self.kind {
            NodeKind::Document => Element::Document(DocumentMeta {
                name: self.name.clone(),
                author: self.author.clone(),
                version: self.version.clone(),
                range: self.range,
            }),
            NodeKind::Blockquote => Element::Blockquote,
            NodeKind::Bulleted => Element::Bulleted,
            NodeKind::Numbered => Element::Numbered { start: self.start },
            NodeKind::Item => Element::Item,
            NodeKind::Table => Element::Table,
            NodeKind::Row => Element::Row,
            NodeKind::Cell => Element::Cell(CellProps {
                valign: self.valign,
                rowspan: self.rowspan,
                colspan: self.colspan,
            }),
            NodeKind::Text => Element::Text(run()),
            NodeKind::Link => Element::Link {
                run: run(),
                url: self.url.clone().unwrap_or_default(),
            },
            NodeKind::Image => Element::Image(ImageProps {
                size: self.size,
                url: self.url.clone(),
                alt: self.alt.clone(),
                title: self.title.clone(),
            }),
        }
    }

    fn from_element(element: &Element) -> Self {
        let mut data = Self::new(element.kind());
        match element {
            Element::Document(meta) => {
                data.name = meta.name.clone();
                data.author = meta.author.clone();
                data.version = meta.version.clone();
                data.range = meta.range;
            }
            Element::Numbered { start } => data.start = *start,
            Element::Cell(props) => {
                data.valign = props.valign;
                data.rowspan = props.rowspan;
                data.colspan = props.colspan;
            }
            Element::Text(run) => data.set_run(run),
            Element::Link { run, url } => {
                data.set_run(run);
                data.url = Some(url.clone());
            }
            Element::Image(props) => {
                data.size = props.size;
                data.url = props.url.clone();
                data.alt = props.alt.clone();
                data.title = props.title.clone();
            }
            Element::Blockquote | Element::Bulleted | Element::Item | Element::Table | Element::Row => {}
        }
        data
    }

    fn set_run(&mut self, run: &TextRun) {
        self.value = Some(run.value.clone());
        self.style = (!run.style.is_empty()).then(|| run.style.clone());
    }
}

impl Tree {
    /// Builds a tree out of a document shape
    pub fn load(data: &NodeData) -> Result<Self, ModelError> {
        let mut tree = Tree::bare();
        tree.reload(data)?;
        Ok(tree)
    }

    /// Parses a JSON document shape
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let data: NodeData = serde_json::from_slice(bytes)?;
        Ok(Self::load(&data)?)
    }

    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.save())?)
    }

    /// Replaces the whole content with the given document shape. New nodes get
    /// fresh ids; on error the tree is left untouched.
    pub fn reload(&mut self, data: &NodeData) -> Result<(), ModelError> {
        if data.kind != NodeKind::Document {
            return Err(ModelError::InvalidRoot(data.kind));
        }
        let root = self.load_fragment(data)?;
        let old = std::mem::replace(&mut self.root, root);
        self.discard(old);
        Ok(())
    }

    /// Builds a detached subtree out of a shape, validating containment
    pub fn load_fragment(&mut self, data: &NodeData) -> Result<NodeId, ModelError> {
        let id = self.create(data.element());
        let slot = self.slot_mut(id);
        slot.align = data.align;
        slot.level = data.level;
        for child in data.content.iter().flatten() {
            if !data.kind.accepts(child.kind) {
                self.discard(id);
                return Err(ModelError::InvalidChild {
                    parent: data.kind,
                    child: child.kind,
                });
            }
            let child_id = match self.load_fragment(child) {
                Ok(child_id) => child_id,
                Err(err) => {
                    self.discard(id);
                    return Err(err);
                }
            };
            self.append_child(id, child_id);
        }
        Ok(id)
    }

    pub fn save(&self) -> NodeData {
        self.save_node(self.root)
    }

    /// Shape of the subtree rooted at `id`
    pub fn save_node(&self, id: NodeId) -> NodeData {
        let slot = self.slot(id);
        let mut data = NodeData::from_element(&slot.element);
        data.align = slot.align;
        data.level = slot.level;
        if !slot.children.is_empty() {
            data.content = Some(slot.children.iter().map(|&c| self.save_node(c)).collect());
        }
        data
    }

    /// Persisted absolute selection of the document
    pub fn saved_range(&self) -> Option<[usize; 2]> {
        match self.element(self.root) {
            Element::Document(meta) => meta.range,
            _ => None,
        }
    }

    pub fn set_saved_range(&mut self, range: Option<[usize; 2]>) {
        let root = self.root;
        if let Element::Document(meta) = self.element_mut(root) {
            meta.range = range;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> NodeData {
        let mut doc = NodeData::document([
            NodeData::item([
                NodeData::text("Hello ").with_style([TextStyle::Bold]),
                NodeData::link("world", "https://example.com"),
            ])
            .with_align(Align::Center),
            NodeData::numbered([NodeData::item([NodeData::text("one")])]),
            NodeData::table([NodeData::row([NodeData::cell([NodeData::image("pic.png")])])]),
        ]);
        doc.name = Some("notes".to_string());
        doc.range = Some([2, 4]);
        doc
    }

    #[test]
    fn test_save_reproduces_loaded_shape() {
        let data = sample();
        let tree = Tree::load(&data).unwrap();
        assert_eq!(tree.save(), data);
        assert_eq!(tree.saved_range(), Some([2, 4]));
    }

    #[test]
    fn test_json_omits_unset_fields() {
        let json = serde_json::to_value(NodeData::text("hi")).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "text", "value": "hi" }));

        let data = NodeData::from_json(
            r#"{ "type": "document", "content": [
                { "type": "item", "align": "right", "content": [
                    { "type": "text", "value": "x", "style": ["italic", "bold"] }
                ] }
            ] }"#,
        )
        .unwrap();
        let tree = Tree::load(&data).unwrap();
        let text = tree.first_text(tree.root()).unwrap();
        assert_eq!(tree.style(text), StyleSet::from([TextStyle::Bold, TextStyle::Italic]));
        assert_eq!(tree.align(tree.container(text).unwrap()), Some(Align::Right));
    }

    #[test]
    fn test_load_rejects_invalid_nesting() {
        let data = NodeData::document([NodeData::text("loose")]);
        assert!(matches!(
            Tree::load(&data),
            Err(ModelError::InvalidChild {
                parent: NodeKind::Document,
                child: NodeKind::Text
            })
        ));
        assert!(matches!(
            Tree::load(&NodeData::item([])),
            Err(ModelError::InvalidRoot(NodeKind::Item))
        ));
    }

    #[test]
    fn test_reload_assigns_fresh_ids() {
        let mut tree = Tree::load(&sample()).unwrap();
        let before = tree.first_text(tree.root()).unwrap();
        let count = tree.node_count();
        tree.reload(&sample()).unwrap();
        assert!(!tree.contains(before));
        assert_eq!(tree.node_count(), count);
    }

    #[test]
    fn test_from_bytes_reports_malformed_json() {
        assert!(Tree::from_bytes(b"{ not json").is_err());
        let tree = Tree::from_bytes(&Tree::load(&sample()).unwrap().to_bytes().unwrap()).unwrap();
        assert_eq!(tree.plain_text(tree.root()), "Hello world\none");
    }
}
