//! Applying or removing a mark over a selection.
//!
//! Toggling is the same decision for both substrates: if the selection is
//! already inside the mark, remove it, otherwise wrap the selection in the
//! mark's canonical element. How "inside" is detected and how the result is
//! committed depends on the substrate, so each kind has a [`ToggleStrategy`].
//!
//! The host is only mutated once validation has passed, and the mutation is
//! a single `replace_range` call, so a failed toggle leaves the region as it
//! was.

use std::ops::Range;

use crate::error::{InlineError, Result};
use crate::host::HostRegion;
use crate::marks::{Mark, MarkParams, MarkRegistry, MarkSpec, WrapperDescriptor};
use crate::snapshot::SelectionSnapshot;
use crate::types::SubstrateKind;

pub mod buffer;
pub mod segments;
pub mod tree;

pub use buffer::BufferToggle;
pub use segments::{Leaf, MarkRegion, Segment};
pub use tree::TreeToggle;

/// Whether a toggle added or removed the mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleAction {
    Wrapped,
    Unwrapped,
}

/// A validated toggle, ready for a strategy.
#[derive(Clone, Debug)]
pub struct ToggleRequest<'a> {
    pub spec: &'a MarkSpec,
    /// Wrapper to insert when the range is not already marked.
    pub wrapper: WrapperDescriptor,
    /// Non-empty flattened range.
    pub range: Range<usize>,
}

/// What a strategy did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub action: ToggleAction,
    /// Flattened range to select afterwards.
    pub range: Range<usize>,
}

/// Substrate-specific toggle implementation.
pub trait ToggleStrategy {
    /// Rewrite the region. Must call `replace_range` at most once and only
    /// after every check that can fail.
    fn apply(
        &self,
        request: &ToggleRequest<'_>,
        region: &mut dyn HostRegion,
    ) -> Result<ToggleOutcome>;
}

/// Strategy for a substrate kind.
pub fn strategy_for(kind: SubstrateKind) -> &'static dyn ToggleStrategy {
    match kind {
        SubstrateKind::Buffer => &BufferToggle,
        SubstrateKind::Tree => &TreeToggle,
    }
}

/// Result of a successful toggle.
#[derive(Clone, Debug, PartialEq)]
pub struct Toggled {
    pub action: ToggleAction,
    /// The post-mutation selection, also set as the host selection.
    pub selection: SelectionSnapshot,
}

/// Toggle `mark` over `range` of `region`.
///
/// On success the host's selection is set to the affected span and a fresh
/// snapshot of it is returned. For buffers the span covers the whole
/// replacement, tags included; for trees it covers the same text as before.
pub fn toggle(
    registry: &MarkRegistry,
    mark: Mark,
    region: &mut dyn HostRegion,
    range: Range<usize>,
    params: Option<&MarkParams>,
) -> Result<Toggled> {
    let spec = registry.spec(mark)?;
    if range.start >= range.end {
        return Err(InlineError::EmptySelection);
    }
    let len = region.flattened_length();
    if range.end > len {
        return Err(InlineError::out_of_range(range.end, len));
    }
    let wrapper = spec.wrap(params)?;

    let request = ToggleRequest {
        spec,
        wrapper,
        range,
    };
    let outcome = strategy_for(region.kind()).apply(&request, region)?;

    region.select(outcome.range.clone())?;
    let selection = SelectionSnapshot::from_offsets(&*region, outcome.range)?;
    tracing::debug!(
        target: "weaver::inline::toggle",
        region = %selection.owner_id,
        %mark,
        action = ?outcome.action,
        start = selection.start_offset,
        end = selection.end_offset,
        "toggled mark"
    );
    Ok(Toggled {
        action: outcome.action,
        selection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryBufferRegion, MemoryTreeRegion};
    use crate::tree::{ElementData, Fragment, FragmentNode, Tree};
    use crate::types::Endpoint;

    fn region(nodes: Vec<FragmentNode>) -> MemoryTreeRegion {
        MemoryTreeRegion::new(
            "tree",
            Tree::from_fragment(ElementData::new("div"), Fragment::new(nodes)),
        )
    }

    fn text(t: &str) -> FragmentNode {
        FragmentNode::text(t)
    }

    fn tag(t: &str, children: Vec<FragmentNode>) -> FragmentNode {
        FragmentNode::tag(t, children)
    }

    fn bold(region: &mut dyn HostRegion, range: Range<usize>) -> Result<Toggled> {
        toggle(&MarkRegistry::default(), Mark::Bold, region, range, None)
    }

    #[test]
    fn test_buffer_wrap_then_unwrap() {
        let mut region = MemoryBufferRegion::new("buf", "Hello world");
        let toggled = bold(&mut region, 0..5).unwrap();
        assert_eq!(region.content(), "<b>Hello</b> world");
        assert_eq!(toggled.action, ToggleAction::Wrapped);
        // Selection spans the replacement, tags included.
        assert_eq!(toggled.selection.range(), 0..12);
        assert_eq!(toggled.selection.text, "<b>Hello</b>");

        let toggled = bold(&mut region, toggled.selection.range()).unwrap();
        assert_eq!(region.content(), "Hello world");
        assert_eq!(toggled.action, ToggleAction::Unwrapped);
        assert_eq!(toggled.selection.range(), 0..5);
        assert_eq!(toggled.selection.text, "Hello");
    }

    #[test]
    fn test_buffer_link_needs_url() {
        let mut region = MemoryBufferRegion::new("buf", "site");
        let registry = MarkRegistry::default();
        assert_eq!(
            toggle(&registry, Mark::Link, &mut region, 0..4, None).unwrap_err(),
            InlineError::MissingParameter {
                mark: Mark::Link,
                param: "url"
            }
        );
        assert_eq!(region.content(), "site");

        toggle(
            &registry,
            Mark::Link,
            &mut region,
            0..4,
            Some(&MarkParams::url("https://a.test")),
        )
        .unwrap();
        assert_eq!(region.content(), "<a href=\"https://a.test\">site</a>");
    }

    #[test]
    fn test_empty_selection() {
        let mut region = MemoryBufferRegion::new("buf", "abc");
        assert_eq!(bold(&mut region, 1..1).unwrap_err(), InlineError::EmptySelection);
    }

    #[test]
    fn test_disabled_mark() {
        let mut region = MemoryBufferRegion::new("buf", "abc");
        let registry = MarkRegistry::new([Mark::Italic]);
        assert_eq!(
            toggle(&registry, Mark::Bold, &mut region, 0..1, None).unwrap_err(),
            InlineError::MarkDisabled(Mark::Bold)
        );
    }

    #[test]
    fn test_read_only_host_is_untouched() {
        let mut region = MemoryBufferRegion::new("buf", "abc");
        region.set_read_only(true);
        region.set_user_selection(0, 3);
        let err = bold(&mut region, 0..3).unwrap_err();
        assert!(matches!(err, InlineError::HostMutationRejected(_)));
        assert_eq!(region.content(), "abc");
        assert_eq!(
            region.current_selection_endpoints().map(|s| s.focus),
            Some(Endpoint::buffer(3))
        );
    }

    #[test]
    fn test_tree_wrap_plain_text() {
        let mut region = region(vec![tag("p", vec![text("Hello world")])]);
        let toggled = bold(&mut region, 0..5).unwrap();
        insta::assert_snapshot!(region.inner_html(), @"<p><b>Hello</b> world</p>");
        assert_eq!(toggled.selection.range(), 0..5);
        assert_eq!(toggled.selection.text, "Hello");
        assert!(toggled.selection.tree_anchor.is_some());
    }

    #[test]
    fn test_tree_toggle_twice_restores_content() {
        let mut region = region(vec![tag("p", vec![text("Hello world")])]);
        let before = region.inner_html();
        bold(&mut region, 6..11).unwrap();
        assert_eq!(region.inner_html(), "<p>Hello <b>world</b></p>");
        let toggled = bold(&mut region, 6..11).unwrap();
        assert_eq!(toggled.action, ToggleAction::Unwrapped);
        assert_eq!(region.inner_html(), before);
    }

    #[test]
    fn test_tree_partial_unwrap_splits_wrapper() {
        let mut region = region(vec![tag("p", vec![tag("b", vec![text("Hello")])])]);
        bold(&mut region, 1..4).unwrap();
        insta::assert_snapshot!(region.inner_html(), @"<p><b>H</b>ell<b>o</b></p>");
    }

    #[test]
    fn test_tree_mark_detected_from_inner_text() {
        // Selection inside an <strong>: the alias counts as bold.
        let mut region = region(vec![text("a"), tag("strong", vec![text("bcd")]), text("e")]);
        let toggled = bold(&mut region, 1..4).unwrap();
        assert_eq!(toggled.action, ToggleAction::Unwrapped);
        assert_eq!(region.inner_html(), "abcde");
    }

    #[test]
    fn test_tree_other_marks_survive() {
        let mut region = region(vec![tag("p", vec![tag("code", vec![text("let x")])])]);
        bold(&mut region, 0..3).unwrap();
        insta::assert_snapshot!(
            region.inner_html(),
            @"<p><code><b>let</b> x</code></p>"
        );
        let toggled = bold(&mut region, 0..3).unwrap();
        assert_eq!(toggled.action, ToggleAction::Unwrapped);
        assert_eq!(region.inner_html(), "<p><code>let x</code></p>");
    }

    #[test]
    fn test_tree_wrap_across_paragraphs_stays_inside_blocks() {
        let mut region = region(vec![
            tag("p", vec![text("one")]),
            tag("p", vec![text("two")]),
        ]);
        let toggled = bold(&mut region, 1..5).unwrap();
        insta::assert_snapshot!(
            region.inner_html(),
            @"<p>o<b>ne</b></p><p><b>tw</b>o</p>"
        );
        assert_eq!(toggled.selection.text, "netw");
    }

    #[test]
    fn test_tree_wrap_across_inline_siblings_is_one_element() {
        let mut region = region(vec![tag(
            "p",
            vec![text("a "), tag("i", vec![text("b")]), text(" c")],
        )]);
        bold(&mut region, 0..5).unwrap();
        insta::assert_snapshot!(region.inner_html(), @"<p><b>a <i>b</i> c</b></p>");
    }

    #[test]
    fn test_tree_mixed_selection_unwraps() {
        let mut region = region(vec![tag(
            "p",
            vec![text("ab"), tag("b", vec![text("cd")])],
        )]);
        let toggled = bold(&mut region, 1..3).unwrap();
        assert_eq!(toggled.action, ToggleAction::Unwrapped);
        assert_eq!(region.inner_html(), "<p>abc<b>d</b></p>");
    }

    #[test]
    fn test_tree_empty_paragraph_between_runs_survives() {
        let mut region = region(vec![
            tag("p", vec![text("ab")]),
            tag("p", vec![text("")]),
            tag("p", vec![text("cd")]),
        ]);
        let before = region.inner_html();
        assert_eq!(before, "<p>ab</p><p></p><p>cd</p>");

        bold(&mut region, 1..3).unwrap();
        insta::assert_snapshot!(
            region.inner_html(),
            @"<p>a<b>b</b></p><p></p><p><b>c</b>d</p>"
        );
        let toggled = bold(&mut region, 1..3).unwrap();
        assert_eq!(toggled.action, ToggleAction::Unwrapped);
        assert_eq!(region.inner_html(), before);
    }

    #[test]
    fn test_tree_line_break_at_range_edge() {
        let mut region = region(vec![tag("p", vec![text("ab"), tag("br", vec![]), text("cd")])]);
        let before = region.inner_html();

        bold(&mut region, 0..2).unwrap();
        insta::assert_snapshot!(region.inner_html(), @"<p><b>ab</b><br>cd</p>");
        bold(&mut region, 0..2).unwrap();
        assert_eq!(region.inner_html(), before);

        bold(&mut region, 2..4).unwrap();
        insta::assert_snapshot!(region.inner_html(), @"<p>ab<br><b>cd</b></p>");
        bold(&mut region, 2..4).unwrap();
        assert_eq!(region.inner_html(), before);
    }

    #[test]
    fn test_tree_empty_span_inside_selection() {
        let marker = ElementData::new("span").with_class("marker");
        let mut region = region(vec![tag(
            "p",
            vec![text("a"), FragmentNode::element(marker, vec![text("")]), text("b")],
        )]);
        let before = region.inner_html();

        let toggled = bold(&mut region, 0..2).unwrap();
        assert_eq!(toggled.action, ToggleAction::Wrapped);
        insta::assert_snapshot!(
            region.inner_html(),
            @r#"<p><b>a<span class="marker"></span>b</b></p>"#
        );
        let toggled = bold(&mut region, 0..2).unwrap();
        assert_eq!(toggled.action, ToggleAction::Unwrapped);
        assert_eq!(region.inner_html(), before);
    }

    #[test]
    fn test_tree_empty_mark_element_does_not_count_as_marked() {
        let mut region = region(vec![tag(
            "p",
            vec![text("a"), tag("b", vec![]), text("c")],
        )]);
        let toggled = bold(&mut region, 0..2).unwrap();
        assert_eq!(toggled.action, ToggleAction::Wrapped);
        assert_eq!(region.text_content(), "ac");
    }

    #[test]
    fn test_tree_link_and_heading() {
        let registry = MarkRegistry::default();
        let mut region = region(vec![tag("p", vec![text("Title")])]);
        toggle(
            &registry,
            Mark::Link,
            &mut region,
            0..5,
            Some(&MarkParams::url("https://a.test")),
        )
        .unwrap();
        assert_eq!(
            region.inner_html(),
            "<p><a href=\"https://a.test\">Title</a></p>"
        );

        let mut region = self::region(vec![text("Title")]);
        toggle(
            &registry,
            Mark::Heading,
            &mut region,
            0..5,
            Some(&MarkParams::level(2)),
        )
        .unwrap();
        assert_eq!(region.inner_html(), "<h2>Title</h2>");
        let toggled = toggle(
            &registry,
            Mark::Heading,
            &mut region,
            0..5,
            Some(&MarkParams::level(4)),
        )
        .unwrap();
        assert_eq!(toggled.action, ToggleAction::Unwrapped);
        assert_eq!(region.inner_html(), "Title");
    }

    #[test]
    fn test_tree_partial_atomic_is_rejected() {
        let atomic = ElementData::new("span").with_attr("contenteditable", "false");
        let mut region = region(vec![
            text("ab"),
            FragmentNode::element(atomic, vec![text("cd")]),
        ]);
        let before = region.inner_html();
        assert!(matches!(
            bold(&mut region, 1..3).unwrap_err(),
            InlineError::UnsupportedNesting(_)
        ));
        assert_eq!(region.inner_html(), before);

        // Covering the whole atomic element is fine.
        bold(&mut region, 1..4).unwrap();
        assert_eq!(
            region.inner_html(),
            "a<b>b<span contenteditable=\"false\">cd</span></b>"
        );
    }

    #[test]
    fn test_tree_wrap_inside_atomic_is_rejected() {
        let atomic = ElementData::new("span").with_attr("contenteditable", "false");
        let mut region = region(vec![FragmentNode::element(atomic, vec![text("abc")])]);
        assert!(matches!(
            bold(&mut region, 0..3).unwrap_err(),
            InlineError::UnsupportedNesting(_)
        ));
    }

    #[test]
    fn test_tree_selection_is_set_on_host() {
        let mut region = region(vec![tag("p", vec![text("Hello world")])]);
        bold(&mut region, 6..11).unwrap();
        let snapshot = SelectionSnapshot::capture(&region).unwrap().unwrap();
        assert_eq!(snapshot.range(), 6..11);
        assert_eq!(snapshot.text, "world");
    }

    #[test]
    fn test_tree_read_only_is_untouched() {
        let mut region = region(vec![text("abc")]);
        region.set_read_only(true);
        assert!(matches!(
            bold(&mut region, 0..2).unwrap_err(),
            InlineError::HostMutationRejected(_)
        ));
        assert_eq!(region.inner_html(), "abc");
    }

    #[test]
    fn test_out_of_range() {
        let mut region = region(vec![text("abc")]);
        assert_eq!(
            bold(&mut region, 1..9).unwrap_err(),
            InlineError::OffsetOutOfRange { offset: 9, len: 3 }
        );
    }
}
