//! Drawing surfaces the engine populates.
//!
//! The engine never talks to a windowing or DOM API directly. It writes its
//! retained vector graph through [`VectorSurface`] and paints immediate-mode
//! snapshots through [`RasterContext`]. [`SvgScene`] is the in-crate vector
//! surface: an arena DOM that can serialize itself to SVG text.
//!
//! ## Module Structure
//!
//! - [`svg`] - `SvgScene` arena and SVG writer
//! - [`parse`] - Minimal XML reader used to load serialized markups
//! - [`canvas`] - Raster context trait and the recording implementation

mod canvas;
mod parse;
mod svg;


pub use canvas::{CanvasOp, RasterContext, RecordingCanvas};
pub use parse::{ParseError, XmlElement, XmlNode, parse_document};
pub use svg::{SvgNode, SvgScene};

/// Handle to a node owned by a [`VectorSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A retained, SVG-like scene graph.
///
/// Operations on a handle that no longer exists are ignored.
pub trait VectorSurface: Send + Sync {
    /// The top-level `<svg>` node.
    fn root(&self) -> NodeId;
    /// Create a detached element with the given tag.
    fn create_node(&mut self, tag: &str) -> NodeId;
    /// Attach `child` as the last child of `parent`, detaching it from any previous parent.
    fn append_child(&mut self, parent: NodeId, child: NodeId);
    /// Detach and drop a node together with its subtree.
    fn remove_node(&mut self, node: NodeId);
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&mut self, node: NodeId, name: &str);
    /// Replace the text content of a node.
    fn set_text(&mut self, node: NodeId, text: &str);
    /// Serialize a node and its subtree to markup text.
    fn serialize(&self, node: NodeId) -> String;
}

/// Escape text for use in attribute values and character data.
pub fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
