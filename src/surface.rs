//! Display surfaces.
//!
//! The effect player never touches a concrete document. It mutates whatever
//! implements [`Surface`]: append an overlay node, append a style sheet,
//! remove a node, set or clear the root container's animation, and write
//! informational console text.
//!
//! - [`MemorySurface`] is an in-memory document tree. Tests inspect it.
//! - [`ConsoleSurface`] keeps a `MemorySurface` and renders every mutation
//!   as one line on a writer. The CLI points it at stdout.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

/// Identifier of a node appended to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A visual overlay: text content plus inline positioning/animation style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayNode {
    /// Text shown to the user
    pub content: String,
    /// Inline style declarations
    pub style: String,
}

/// A style definition, typically `@keyframes` rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleSheet {
    /// Raw CSS text
    pub css: String,
}

/// Anything a surface can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    /// An overlay node
    Overlay(OverlayNode),
    /// A style definition
    Style(StyleSheet),
}

/// Mutable display surface the effect player draws on.
///
/// Mutations are infallible. A surface that cannot display something simply
/// shows nothing.
pub trait Surface: Send {
    /// Appends an overlay node and returns its id.
    fn append_overlay(&mut self, node: OverlayNode) -> NodeId;

    /// Appends a style sheet and returns its id.
    fn append_style(&mut self, sheet: StyleSheet) -> NodeId;

    /// Removes a node. Returns `false` if it was already gone.
    fn remove(&mut self, id: NodeId) -> bool;

    /// Sets (`Some`) or clears (`None`) the root container's animation.
    fn set_root_animation(&mut self, animation: Option<&str>);

    /// Writes one line of informational console text.
    fn console(&mut self, _line: &str) {}
}

// ============================================================================
// MemorySurface
// ============================================================================

/// In-memory document: an ordered node map plus the root animation.
#[derive(Debug, Default, Clone)]
pub struct MemorySurface {
    nodes: BTreeMap<NodeId, Element>,
    root_animation: Option<String>,
    console: Vec<String>,
    next_id: u64,
}

impl MemorySurface {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the node is present.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns the node, if present.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(&id)
    }

    /// Number of nodes currently in the document.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Overlay nodes currently in the document, in insertion order.
    pub fn overlays(&self) -> impl Iterator<Item = (NodeId, &OverlayNode)> {
        self.nodes.iter().filter_map(|(id, el)| match el {
            Element::Overlay(node) => Some((*id, node)),
            Element::Style(_) => None,
        })
    }

    /// Current root animation, if any.
    #[must_use]
    pub fn root_animation(&self) -> Option<&str> {
        self.root_animation.as_deref()
    }

    /// Console lines written so far.
    #[must_use]
    pub fn console_lines(&self) -> &[String] {
        &self.console
    }

    fn insert(&mut self, element: Element) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(id, element);
        id
    }
}

impl Surface for MemorySurface {
    fn append_overlay(&mut self, node: OverlayNode) -> NodeId {
        self.insert(Element::Overlay(node))
    }

    fn append_style(&mut self, sheet: StyleSheet) -> NodeId {
        self.insert(Element::Style(sheet))
    }

    fn remove(&mut self, id: NodeId) -> bool {
        self.nodes.remove(&id).is_some()
    }

    fn set_root_animation(&mut self, animation: Option<&str>) {
        self.root_animation = animation.map(str::to_string);
    }

    fn console(&mut self, line: &str) {
        self.console.push(line.to_string());
    }
}

// ============================================================================
// ConsoleSurface
// ============================================================================

/// Renders surface mutations as text lines.
///
/// Write failures are dropped; the document state is kept regardless.
pub struct ConsoleSurface {
    document: MemorySurface,
    out: Box<dyn Write + Send>,
}

// Box<dyn Write> is not Debug
impl std::fmt::Debug for ConsoleSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSurface")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl ConsoleSurface {
    /// Creates a surface that renders to the given writer.
    #[must_use]
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            document: MemorySurface::new(),
            out,
        }
    }

    /// Creates a surface that renders to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// The underlying document.
    #[must_use]
    pub const fn document(&self) -> &MemorySurface {
        &self.document
    }

    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

impl Surface for ConsoleSurface {
    fn append_overlay(&mut self, node: OverlayNode) -> NodeId {
        let content = node.content.clone();
        let id = self.document.append_overlay(node);
        self.line(&format!("+ overlay {id}: {content}"));
        id
    }

    fn append_style(&mut self, sheet: StyleSheet) -> NodeId {
        let bytes = sheet.css.len();
        let id = self.document.append_style(sheet);
        self.line(&format!("+ style {id} ({bytes} bytes)"));
        id
    }

    fn remove(&mut self, id: NodeId) -> bool {
        let removed = self.document.remove(id);
        if removed {
            self.line(&format!("- removed {id}"));
        }
        removed
    }

    fn set_root_animation(&mut self, animation: Option<&str>) {
        self.document.set_root_animation(animation);
        match animation {
            Some(a) => self.line(&format!("~ root animation: {a}")),
            None => self.line("~ root animation cleared"),
        }
    }

    fn console(&mut self, line: &str) {
        self.document.console(line);
        self.line(line);
    }
}
