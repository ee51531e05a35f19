//! Core selection types: region identity, substrate kind, endpoints and geometry.
//!
//! These types are host-agnostic. They carry no references into a live
//! document, so they can be stored in snapshots and passed across the
//! presentation boundary freely.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::tree::NodeId;

/// Opaque identifier of a host region.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(SmolStr);

impl RegionId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Whether a region exposes a flat text buffer or a node tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubstrateKind {
    Buffer,
    Tree,
}

/// The container half of a selection endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerRef {
    /// The region itself. Buffer regions only report this.
    Region,
    /// A node in a tree region.
    Node(NodeId),
}

/// One end of a host selection.
///
/// For a text node `offset` counts chars inside that node. For an element it
/// is a child index, the same convention the DOM Range API uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub container: ContainerRef,
    pub offset: usize,
}

impl Endpoint {
    /// Endpoint inside a flat buffer.
    pub fn buffer(offset: usize) -> Self {
        Self {
            container: ContainerRef::Region,
            offset,
        }
    }

    /// Endpoint inside a tree node.
    pub fn node(node: NodeId, offset: usize) -> Self {
        Self {
            container: ContainerRef::Node(node),
            offset,
        }
    }
}

/// Selection endpoints as the host reports them.
///
/// The anchor is where the selection started, the focus is where it ends
/// now. They may be in any order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionEndpoints {
    pub anchor: Endpoint,
    pub focus: Endpoint,
}

impl SelectionEndpoints {
    pub fn new(anchor: Endpoint, focus: Endpoint) -> Self {
        Self { anchor, focus }
    }

    /// Collapsed selection (caret) at a single endpoint.
    pub fn caret(at: Endpoint) -> Self {
        Self {
            anchor: at,
            focus: at,
        }
    }
}

/// Ordered tree endpoints recorded in a snapshot so the host can rebuild
/// its own range object over the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeAnchor {
    pub start: Endpoint,
    pub end: Endpoint,
}

/// Axis-aligned box in document coordinates (already scroll adjusted).
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }
}

/// Visible window onto the document.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub inner_width: f64,
    pub inner_height: f64,
}

impl Viewport {
    pub fn new(scroll_x: f64, scroll_y: f64, inner_width: f64, inner_height: f64) -> Self {
        Self {
            scroll_x,
            scroll_y,
            inner_width,
            inner_height,
        }
    }
}

/// Intrinsic size of the floating overlay, as laid out by the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct OverlaySize {
    pub width: f64,
    pub height: f64,
}

impl OverlaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_edges() {
        let bbox = BoundingBox::new(100.0, 40.0, 20.0, 18.0);
        assert_eq!(bbox.bottom(), 118.0);
        assert_eq!(bbox.right(), 60.0);
        assert_eq!(bbox.center_x(), 50.0);
    }

    #[test]
    fn test_region_id_display() {
        let id = RegionId::from("notes");
        assert_eq!(id.to_string(), "notes");
        assert_eq!(id.as_str(), "notes");
    }

    #[test]
    fn test_caret_endpoints() {
        let sel = SelectionEndpoints::caret(Endpoint::buffer(4));
        assert_eq!(sel.anchor, sel.focus);
        assert_eq!(sel.anchor.container, ContainerRef::Region);
    }
}
