//! Structural toggling for tree regions.
//!
//! The root children touched by the range are linearized into a
//! [`MarkRegion`], rewritten there, and handed back to the host as one
//! child splice. Flattened text never changes, only the wrappers around it.

use std::ops::Range;

use crate::error::{InlineError, Result};
use crate::host::{HostRegion, Replacement, Substrate, TreeSplice};
use crate::toggle::segments::MarkRegion;
use crate::toggle::{ToggleAction, ToggleOutcome, ToggleRequest, ToggleStrategy};
use crate::tree::{Fragment, NodeId, Tree};
use crate::types::SubstrateKind;

/// Strategy for [`SubstrateKind::Tree`] regions.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeToggle;

impl ToggleStrategy for TreeToggle {
    fn apply(
        &self,
        request: &ToggleRequest<'_>,
        region: &mut dyn HostRegion,
    ) -> Result<ToggleOutcome> {
        let Substrate::Tree(tree) = region.substrate() else {
            return Err(InlineError::SubstrateMismatch {
                id: region.id().clone(),
                registered: SubstrateKind::Tree,
                actual: region.kind(),
            });
        };
        let range = request.range.clone();
        let (splice, action) = plan(tree, request)?;

        tracing::debug!(
            target: "weaver::inline::toggle",
            region = %region.id(),
            mark = %request.spec.mark(),
            ?action,
            start = range.start,
            end = range.end,
            children = ?splice.children,
            "tree toggle"
        );

        let span = splice_span(tree, &splice.children);
        region.replace_range(span, Replacement::Children(splice))?;
        Ok(ToggleOutcome { action, range })
    }
}

/// Compute the splice for a toggle without touching the tree.
pub fn plan(tree: &Tree, request: &ToggleRequest<'_>) -> Result<(TreeSplice, ToggleAction)> {
    let root = tree.root();
    let range = request.range.clone();
    let (children, base) = touched_children(tree, root, &range);

    let mut marks = MarkRegion::collect(tree, &tree.children(root)[children.clone()], base);
    marks.select(range.clone());
    marks.check_atomic_coverage()?;

    let action = if marks.any_marked(request.spec) {
        marks.strip_mark(request.spec)?;
        ToggleAction::Unwrapped
    } else {
        marks.wrap(request.spec, request.wrapper.to_element())?;
        ToggleAction::Wrapped
    };

    let fragment: Fragment = marks.to_fragment();
    debug_assert_eq!(
        fragment.text_len(),
        children_text_len(tree, root, &children)
    );
    Ok((
        TreeSplice {
            parent: root,
            children,
            fragment,
        },
        action,
    ))
}

/// Root children whose text overlaps `range`, and the flattened offset of
/// the first one.
fn touched_children(tree: &Tree, root: NodeId, range: &Range<usize>) -> (Range<usize>, usize) {
    let mut first = None;
    let mut last = 0;
    let mut base = 0;
    let mut offset = 0;
    for (index, child) in tree.children(root).iter().enumerate() {
        let len = tree.text_len(*child);
        let end = offset + len;
        if end > range.start && offset < range.end {
            if first.is_none() {
                first = Some(index);
                base = offset;
            }
            last = index + 1;
        }
        offset = end;
    }
    match first {
        Some(first) => (first..last, base),
        None => (0..0, 0),
    }
}

fn children_text_len(tree: &Tree, root: NodeId, children: &Range<usize>) -> usize {
    tree.children(root)[children.clone()]
        .iter()
        .map(|c| tree.text_len(*c))
        .sum()
}

/// Flattened range covered by a run of root children.
fn splice_span(tree: &Tree, children: &Range<usize>) -> Range<usize> {
    let root = tree.root();
    let before: usize = tree.children(root)[..children.start]
        .iter()
        .map(|c| tree.text_len(*c))
        .sum();
    before..before + children_text_len(tree, root, children)
}
