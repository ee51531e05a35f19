//! Normalized, immutable selection records.

use std::ops::Range;

use smol_str::SmolStr;

use crate::error::{InlineError, Result};
use crate::host::{HostRegion, Substrate};
use crate::indexer;
use crate::tree::Tree;
use crate::types::{BoundingBox, RegionId, SubstrateKind, TreeAnchor};

/// What is selected, where, and in which region.
///
/// Built once per selection event and never mutated; a changed selection
/// produces a new snapshot. `text` always holds exactly
/// `end_offset - start_offset` chars.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionSnapshot {
    pub owner_id: RegionId,
    pub substrate_kind: SubstrateKind,
    pub start_offset: usize,
    pub end_offset: usize,
    pub text: SmolStr,
    pub bounding_box: BoundingBox,
    pub tree_anchor: Option<TreeAnchor>,
}

impl SelectionSnapshot {
    /// Read the host's current selection in `region`.
    ///
    /// Returns `None` when the host reports no selection. Backwards
    /// selections are normalized so `start_offset <= end_offset`.
    pub fn capture<R: HostRegion + ?Sized>(region: &R) -> Result<Option<Self>> {
        let Some(endpoints) = region.current_selection_endpoints() else {
            return Ok(None);
        };

        let anchor = indexer::offset_of(region, endpoints.anchor)?;
        let focus = indexer::offset_of(region, endpoints.focus)?;
        let (start, end, start_ep, end_ep) = if anchor <= focus {
            (anchor, focus, endpoints.anchor, endpoints.focus)
        } else {
            (focus, anchor, endpoints.focus, endpoints.anchor)
        };

        let tree_anchor = match region.kind() {
            SubstrateKind::Tree => Some(TreeAnchor {
                start: start_ep,
                end: end_ep,
            }),
            SubstrateKind::Buffer => None,
        };

        Self::build(region, start..end, tree_anchor).map(Some)
    }

    /// Snapshot of a known flattened range, e.g. the span a toggle just wrote.
    pub fn from_offsets<R: HostRegion + ?Sized>(region: &R, range: Range<usize>) -> Result<Self> {
        let tree_anchor = match region.substrate() {
            Substrate::Tree(tree) => Some(anchor_for(tree, range.clone())?),
            Substrate::Buffer(_) => None,
        };
        Self::build(region, range, tree_anchor)
    }

    fn build<R: HostRegion + ?Sized>(
        region: &R,
        range: Range<usize>,
        tree_anchor: Option<TreeAnchor>,
    ) -> Result<Self> {
        let substrate = region.substrate();
        let text = substrate
            .flattened_text(range.clone())
            .ok_or_else(|| InlineError::out_of_range(range.end, substrate.flattened_length()))?;
        let bounding_box = indexer::bounding_box_of(region, range.clone())?;

        let snapshot = Self {
            owner_id: region.id().clone(),
            substrate_kind: substrate.kind(),
            start_offset: range.start,
            end_offset: range.end,
            text,
            bounding_box,
            tree_anchor,
        };
        tracing::trace!(
            target: "weaver::inline::snapshot",
            region = %snapshot.owner_id,
            start = snapshot.start_offset,
            end = snapshot.end_offset,
            "captured selection"
        );
        Ok(snapshot)
    }

    /// A caret with nothing selected.
    pub fn is_collapsed(&self) -> bool {
        self.start_offset == self.end_offset
    }

    pub fn range(&self) -> Range<usize> {
        self.start_offset..self.end_offset
    }

    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }
}

fn anchor_for(tree: &Tree, range: Range<usize>) -> Result<TreeAnchor> {
    let start = indexer::locate(tree, range.start)?;
    let end = indexer::locate(tree, range.end)?;
    Ok(TreeAnchor { start, end })
}
