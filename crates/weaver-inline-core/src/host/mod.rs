//! Host abstraction traits.
//!
//! These traits define the interface between the core and whatever owns the
//! live document (browser DOM, native text widget, test double). The core
//! never touches host objects directly; it reads a [`Substrate`] view,
//! queries geometry, and hands back a [`Replacement`] to commit.

use std::ops::Range;

use smol_str::SmolStr;

use crate::error::Result;
use crate::text::TextBuffer;
use crate::tree::{Fragment, NodeId, Tree};
use crate::types::{BoundingBox, OverlaySize, RegionId, SelectionEndpoints, SubstrateKind, Viewport};

pub mod memory;

pub use memory::{MemoryBufferRegion, MemoryTreeRegion, MonospaceLayout, StaticHost};

/// Read-only view of a region's content.
///
/// A region is exactly one of these, fixed for its lifetime.
#[derive(Clone, Copy)]
pub enum Substrate<'a> {
    Buffer(&'a dyn TextBuffer),
    Tree(&'a Tree),
}

impl Substrate<'_> {
    pub fn kind(&self) -> SubstrateKind {
        match self {
            Substrate::Buffer(_) => SubstrateKind::Buffer,
            Substrate::Tree(_) => SubstrateKind::Tree,
        }
    }

    /// Length of the flattened text content in chars.
    pub fn flattened_length(&self) -> usize {
        match self {
            Substrate::Buffer(buf) => buf.len_chars(),
            Substrate::Tree(tree) => tree.text_len(tree.root()),
        }
    }

    /// Flattened text for a char range. None if the range is invalid.
    pub fn flattened_text(&self, range: Range<usize>) -> Option<SmolStr> {
        match self {
            Substrate::Buffer(buf) => buf.slice(range),
            Substrate::Tree(tree) => {
                if range.start > range.end || range.end > tree.text_len(tree.root()) {
                    return None;
                }
                let text = tree.text_content(tree.root());
                Some(
                    text.chars()
                        .skip(range.start)
                        .take(range.len())
                        .collect::<String>()
                        .into(),
                )
            }
        }
    }
}

/// Replacement of a run of children in a tree region.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeSplice {
    /// Element whose children are replaced.
    pub parent: NodeId,
    /// Child index range being replaced.
    pub children: Range<usize>,
    /// New content for that range.
    pub fragment: Fragment,
}

/// Content handed to [`HostRegion::replace_range`].
#[derive(Clone, Debug, PartialEq)]
pub enum Replacement {
    /// New text for a buffer range.
    Text(SmolStr),
    /// New children for a tree region. The flattened range passed alongside
    /// covers exactly the replaced children.
    Children(TreeSplice),
}

/// An editable surface registered with the core.
pub trait HostRegion {
    /// Opaque identifier of this region.
    fn id(&self) -> &RegionId;

    /// Read-only view of the content.
    fn substrate(&self) -> Substrate<'_>;

    /// The host's current selection, if there is one in this region.
    fn current_selection_endpoints(&self) -> Option<SelectionEndpoints>;

    /// Document-space box covering the given flattened range.
    ///
    /// This is the one query that needs the live host layout.
    fn bounding_box_for(&self, range: Range<usize>) -> Result<BoundingBox>;

    /// Replace a flattened range. Either the whole replacement is applied or
    /// the host returns `HostMutationRejected` and nothing changes.
    fn replace_range(&mut self, range: Range<usize>, content: Replacement) -> Result<()>;

    /// Set the host's active selection to a flattened range.
    fn select(&mut self, range: Range<usize>) -> Result<()>;

    fn kind(&self) -> SubstrateKind {
        self.substrate().kind()
    }

    fn flattened_length(&self) -> usize {
        self.substrate().flattened_length()
    }
}

/// Page-level queries that are not tied to a region.
pub trait Host {
    /// Scroll position and inner size of the viewport.
    fn viewport_frame(&self) -> Viewport;

    /// Current laid-out size of the overlay element.
    fn overlay_size(&self) -> OverlaySize;
}
