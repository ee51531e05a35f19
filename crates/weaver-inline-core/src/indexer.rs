//! Mapping between host selection endpoints and flattened char offsets.
//!
//! Buffer regions are already linear, so their endpoints map to themselves.
//! Tree regions are flattened by concatenating text leaves in document
//! order; element boundaries contribute nothing, whether the element is
//! inline or block.

use std::ops::Range;

use crate::error::{InlineError, Result};
use crate::host::{HostRegion, Substrate};
use crate::tree::{NodeId, NodeKind, Tree};
use crate::types::{BoundingBox, ContainerRef, Endpoint};

/// Flattened offset of a selection endpoint within a region.
pub fn offset_of<R: HostRegion + ?Sized>(region: &R, endpoint: Endpoint) -> Result<usize> {
    let offset = match region.substrate() {
        Substrate::Buffer(buf) => buffer_offset(buf.len_chars(), endpoint)?,
        Substrate::Tree(tree) => tree_offset(tree, endpoint)?,
    };
    tracing::trace!(
        target: "weaver::inline::indexer",
        region = %region.id(),
        ?endpoint,
        offset,
        "mapped endpoint"
    );
    Ok(offset)
}

/// Offset of an endpoint in a buffer of `len` chars.
pub fn buffer_offset(len: usize, endpoint: Endpoint) -> Result<usize> {
    if let ContainerRef::Node(node) = endpoint.container {
        return Err(InlineError::DetachedNode(node));
    }
    if endpoint.offset > len {
        return Err(InlineError::out_of_range(endpoint.offset, len));
    }
    Ok(endpoint.offset)
}

/// Offset of an endpoint in a tree.
///
/// A text container adds its inner char offset. An element container treats
/// the inner offset as a child index and adds the text of the preceding
/// children.
pub fn tree_offset(tree: &Tree, endpoint: Endpoint) -> Result<usize> {
    let node = match endpoint.container {
        ContainerRef::Region => tree.root(),
        ContainerRef::Node(node) => node,
    };
    if !tree.is_attached(node) {
        return Err(InlineError::DetachedNode(node));
    }

    let inner = match tree.kind(node) {
        Some(NodeKind::Text(text)) => {
            let len = text.chars().count();
            if endpoint.offset > len {
                return Err(InlineError::out_of_range(endpoint.offset, len));
            }
            endpoint.offset
        }
        Some(NodeKind::Element { children, .. }) => {
            if endpoint.offset > children.len() {
                return Err(InlineError::out_of_range(endpoint.offset, children.len()));
            }
            children[..endpoint.offset]
                .iter()
                .map(|c| tree.text_len(*c))
                .sum()
        }
        None => return Err(InlineError::DetachedNode(node)),
    };

    Ok(text_before(tree, node) + inner)
}

/// Text length of everything that precedes `node` in document order.
fn text_before(tree: &Tree, node: NodeId) -> usize {
    let mut total = 0;
    let mut current = node;
    while current != tree.root() {
        let Some(parent) = tree.parent(current) else {
            break;
        };
        let siblings = tree.children(parent);
        let index = siblings.iter().position(|c| *c == current).unwrap_or(0);
        total += siblings[..index]
            .iter()
            .map(|c| tree.text_len(*c))
            .sum::<usize>();
        current = parent;
    }
    total
}

/// Reverse mapping: the text leaf and inner offset for a flattened offset.
///
/// An offset on the boundary between two leaves resolves to the end of the
/// earlier one. When the tree holds no text at that point the endpoint is
/// an element with a child index.
pub fn locate(tree: &Tree, offset: usize) -> Result<Endpoint> {
    let len = tree.text_len(tree.root());
    if offset > len {
        return Err(InlineError::out_of_range(offset, len));
    }

    let mut node = tree.root();
    let mut remaining = offset;
    loop {
        match tree.kind(node) {
            Some(NodeKind::Element { children, .. }) => {
                let mut next = None;
                for child in children {
                    let child_len = tree.text_len(*child);
                    if child_len > 0 && remaining <= child_len {
                        next = Some(*child);
                        break;
                    }
                    remaining -= child_len;
                }
                match next {
                    Some(child) => node = child,
                    None => return Ok(Endpoint::node(node, children.len())),
                }
            }
            Some(NodeKind::Text(_)) => return Ok(Endpoint::node(node, remaining)),
            None => return Err(InlineError::DetachedNode(node)),
        }
    }
}

/// Bounding box of a flattened range, via the host's layout.
pub fn bounding_box_of<R: HostRegion + ?Sized>(
    region: &R,
    range: Range<usize>,
) -> Result<BoundingBox> {
    let len = region.flattened_length();
    if range.end > len {
        return Err(InlineError::out_of_range(range.end, len));
    }
    if range.start > range.end {
        return Err(InlineError::out_of_range(range.start, range.end));
    }
    region.bounding_box_for(range)
}
