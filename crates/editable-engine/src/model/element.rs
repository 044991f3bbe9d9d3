use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::text::utf16_len;

/// Type tag of a node, the field-less discriminant of [`Element`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Document,
    Blockquote,
    Bulleted,
    Numbered,
    Item,
    Table,
    Row,
    Cell,
    Text,
    Link,
    Image,
}

impl NodeKind {
    /// Leaf types living inside editing units
    pub fn is_inline(self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::Link | NodeKind::Image)
    }

    /// Leaf types carrying an editable value
    pub fn is_text(self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::Link)
    }

    pub fn is_list(self) -> bool {
        matches!(self, NodeKind::Bulleted | NodeKind::Numbered)
    }

    /// Editing units: the nearest ancestors directly holding inline leaves
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Item | NodeKind::Cell)
    }

    /// Parent/child type constraints of the document tree
    pub fn accepts(self, child: NodeKind) -> bool {
        match self {
            NodeKind::Document | NodeKind::Blockquote => matches!(
                child,
                NodeKind::Blockquote
                    | NodeKind::Bulleted
                    | NodeKind::Numbered
                    | NodeKind::Item
                    | NodeKind::Table
            ),
            NodeKind::Bulleted | NodeKind::Numbered => {
                matches!(child, NodeKind::Item | NodeKind::Bulleted | NodeKind::Numbered)
            }
            NodeKind::Item | NodeKind::Cell => child.is_inline(),
            NodeKind::Table => child == NodeKind::Row,
            NodeKind::Row => child == NodeKind::Cell,
            NodeKind::Text | NodeKind::Link | NodeKind::Image => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Blockquote => "blockquote",
            NodeKind::Bulleted => "bulleted",
            NodeKind::Numbered => "numbered",
            NodeKind::Item => "item",
            NodeKind::Table => "table",
            NodeKind::Row => "row",
            NodeKind::Cell => "cell",
            NodeKind::Text => "text",
            NodeKind::Link => "link",
            NodeKind::Image => "image",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Character styles applicable to text and link runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    Bold,
    Italic,
    Underline,
    Overline,
    Strikethrough,
    Super,
    Sub,
}

impl FromStr for TextStyle {
    type Err = ParseAttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bold" => Ok(TextStyle::Bold),
            "italic" => Ok(TextStyle::Italic),
            "underline" => Ok(TextStyle::Underline),
            "overline" => Ok(TextStyle::Overline),
            "strikethrough" => Ok(TextStyle::Strikethrough),
            "super" => Ok(TextStyle::Super),
            "sub" => Ok(TextStyle::Sub),
            other => Err(ParseAttributeError::new("style", other)),
        }
    }
}

/// Ordered style set; ordering makes equal sets compare and serialize identically
pub type StyleSet = BTreeSet<TextStyle>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl FromStr for Align {
    type Err = ParseAttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Align::Left),
            "center" => Ok(Align::Center),
            "right" => Ok(Align::Right),
            "justify" => Ok(Align::Justify),
            other => Err(ParseAttributeError::new("align", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    #[serde(rename = "25")]
    Quarter,
    #[serde(rename = "33")]
    Third,
    #[serde(rename = "50")]
    Half,
    #[serde(rename = "66")]
    TwoThirds,
    #[serde(rename = "75")]
    ThreeQuarters,
    #[serde(rename = "icon")]
    Icon,
    #[serde(rename = "thumb")]
    Thumb,
    #[serde(rename = "small")]
    Small,
    #[serde(rename = "regular")]
    Regular,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {attribute} value: {value}")]
pub struct ParseAttributeError {
    attribute: &'static str,
    value: String,
}

impl ParseAttributeError {
    pub(crate) fn new(attribute: &'static str, value: &str) -> Self {
        Self {
            attribute,
            value: value.to_string(),
        }
    }
}

/// Styled character run shared by text and link nodes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextRun {
    pub value: String,
    pub style: StyleSet,
}

impl TextRun {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            style: StyleSet::new(),
        }
    }

    pub fn styled(value: impl Into<String>, style: impl IntoIterator<Item = TextStyle>) -> Self {
        Self {
            value: value.into(),
            style: style.into_iter().collect(),
        }
    }

    /// Length in UTF-16 code units
    pub fn len(&self) -> usize {
        utf16_len(&self.value)
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Document-level metadata, including the persisted absolute selection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentMeta {
    pub name: Option<String>,
    pub author: Option<String>,
    pub version: Option<String>,
    pub range: Option<[usize; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellProps {
    pub valign: Option<VerticalAlign>,
    pub rowspan: Option<u32>,
    pub colspan: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageProps {
    pub size: Option<ImageSize>,
    pub url: Option<String>,
    pub alt: Option<String>,
    pub title: Option<String>,
}

/// The typed payload of a tree node.
///
/// Every structural operation matches on this enum exhaustively, so adding a
/// node type forces the factory, the serializer and the containment rules to
/// handle it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Document(DocumentMeta),
    Blockquote,
    Bulleted,
    Numbered { start: Option<u32> },
    Item,
    Table,
    Row,
    Cell(CellProps),
    Text(TextRun),
    Link { run: TextRun, url: String },
    Image(ImageProps),
}

impl Element {
    pub fn kind(&self) -> NodeKind {
        match self {
            Element::Document(_) => NodeKind::Document,
            Element::Blockquote => NodeKind::Blockquote,
            Element::Bulleted => NodeKind::Bulleted,
            Element::Numbered { .. } => NodeKind::Numbered,
            Element::Item => NodeKind::Item,
            Element::Table => NodeKind::Table,
            Element::Row => NodeKind::Row,
            Element::Cell(_) => NodeKind::Cell,
            Element::Text(_) => NodeKind::Text,
            Element::Link { .. } => NodeKind::Link,
            Element::Image(_) => NodeKind::Image,
        }
    }

    /// A fresh element of the given kind with default properties
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Document => Element::Document(DocumentMeta::default()),
            NodeKind::Blockquote => Element::Blockquote,
            NodeKind::Bulleted => Element::Bulleted,
            NodeKind::Numbered => Element::Numbered { start: None },
            NodeKind::Item => Element::Item,
            NodeKind::Table => Element::Table,
            NodeKind::Row => Element::Row,
            NodeKind::Cell => Element::Cell(CellProps::default()),
            NodeKind::Text => Element::Text(TextRun::default()),
            NodeKind::Link => Element::Link {
                run: TextRun::default(),
                url: String::new(),
            },
            NodeKind::Image => Element::Image(ImageProps::default()),
        }
    }

    pub fn run(&self) -> Option<&TextRun> {
        match self {
            Element::Text(run) | Element::Link { run, .. } => Some(run),
            _ => None,
        }
    }

    pub fn run_mut(&mut self) -> Option<&mut TextRun> {
        match self {
            Element::Text(run) | Element::Link { run, .. } => Some(run),
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Element::Link { url, .. } => Some(url),
            Element::Image(props) => props.url.as_deref(),
            _ => None,
        }
    }

    /// Length in UTF-16 code units; zero for everything but text and links
    pub fn len(&self) -> usize {
        self.run().map_or(0, TextRun::len)
    }

    /// True when both are text runs that may live in a single node: same
    /// type, same style set and, for links, same URL.
    pub fn same_format(&self, other: &Element) -> bool {
        match (self, other) {
            (Element::Text(a), Element::Text(b)) => a.style == b.style,
            (Element::Link { run: a, url: ua }, Element::Link { run: b, url: ub }) => {
                a.style == b.style && ua == ub
            }
            _ => false,
        }
    }
}
