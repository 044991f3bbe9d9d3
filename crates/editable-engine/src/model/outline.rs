use std::fmt;

use crate::model::element::Element;
use crate::model::tree::{NodeId, Tree};

/// Indented plain-text rendering of a tree, one node per line.
///
/// Used for debugging output and for snapshot assertions in tests:
///
/// ```text
/// document
///   item align=center
///     text "Hello " [bold]
///     link "world" <https://example.com>
/// ```
pub struct Outline<'a>(pub &'a Tree);

/// Outline of a single subtree, detached fragments included
pub struct NodeOutline<'a>(pub &'a Tree, pub NodeId);

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        NodeOutline(self.0, self.0.root()).fmt(f)
    }
}

impl fmt::Display for NodeOutline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.0;
        write_node(tree, self.1, 0, f)
    }
}

fn write_node(tree: &Tree, id: NodeId, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if depth > 0 {
        writeln!(f)?;
    }
    write!(f, "{:indent$}{}", "", tree.kind(id), indent = depth * 2)?;
    match tree.element(id) {
        Element::Text(run) | Element::Link { run, .. } => {
            write!(f, " {:?}", run.value)?;
            if !run.style.is_empty() {
                let styles: Vec<String> = run
                    .style
                    .iter()
                    .map(|s| format!("{s:?}").to_lowercase())
                    .collect();
                write!(f, " [{}]", styles.join(", "))?;
            }
        }
        Element::Numbered { start: Some(start) } => write!(f, " start={start}")?,
        _ => {}
    }
    if let Some(url) = tree.element(id).url() {
        write!(f, " <{url}>")?;
    }
    if let Some(align) = tree.align(id) {
        write!(f, " align={}", format!("{align:?}").to_lowercase())?;
    }
    if let Some(level) = tree.level(id) {
        write!(f, " level={level}")?;
    }
    for &child in tree.children(id) {
        write_node(tree, child, depth + 1, f)?;
    }
    Ok(())
}
