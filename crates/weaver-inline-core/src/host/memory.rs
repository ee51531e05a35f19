//! In-memory hosts.
//!
//! `MemoryBufferRegion` and `MemoryTreeRegion` implement [`HostRegion`] over
//! an [`EditorRope`] and a [`Tree`] respectively, with a fixed-pitch layout
//! standing in for real text measurement. Embedders that mirror a live
//! document into these models can use them directly; tests use them as the
//! host side of every contract.

use std::ops::Range;

use crate::error::{InlineError, Result};
use crate::host::{Host, HostRegion, Replacement, Substrate};
use crate::indexer;
use crate::text::{EditorRope, TextBuffer};
use crate::tree::Tree;
use crate::types::{
    BoundingBox, Endpoint, OverlaySize, RegionId, SelectionEndpoints, Viewport,
};

/// Fixed-pitch text layout: every char is `char_width` wide and every line
/// `line_height` tall, starting at (`left`, `top`) in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceLayout {
    pub top: f64,
    pub left: f64,
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for MonospaceLayout {
    fn default() -> Self {
        Self {
            top: 0.0,
            left: 0.0,
            char_width: 8.0,
            line_height: 20.0,
        }
    }
}

impl MonospaceLayout {
    /// Box covering `range` of `text`. Multi-line ranges span the full width
    /// of the widest line they touch.
    pub fn bounding_box<B>(&self, text: &B, range: Range<usize>) -> BoundingBox
    where
        B: TextBuffer + ?Sized,
    {
        let start_line = text.char_to_line(range.start);
        let end_line = text.char_to_line(range.end);
        let top = self.top + start_line as f64 * self.line_height;
        let height = (end_line - start_line + 1) as f64 * self.line_height;

        if start_line == end_line {
            let line_start = text.line_to_char(start_line);
            return BoundingBox::new(
                top,
                self.left + (range.start - line_start) as f64 * self.char_width,
                (range.end - range.start) as f64 * self.char_width,
                height,
            );
        }

        let widest = (start_line..=end_line)
            .map(|line| line_width(text, line))
            .max()
            .unwrap_or(0);
        BoundingBox::new(top, self.left, widest as f64 * self.char_width, height)
    }
}

/// Chars on a line, not counting its break.
fn line_width<B: TextBuffer + ?Sized>(text: &B, line: usize) -> usize {
    let start = text.line_to_char(line);
    let end = text.line_to_char(line + 1);
    text.slice(start..end)
        .map_or(0, |s| s.trim_end_matches(['\n', '\r']).chars().count())
}

/// Flat text region backed by a rope.
#[derive(Debug, Clone)]
pub struct MemoryBufferRegion {
    id: RegionId,
    buffer: EditorRope,
    selection: Option<(usize, usize)>,
    layout: MonospaceLayout,
    read_only: bool,
}

impl MemoryBufferRegion {
    pub fn new(id: impl Into<RegionId>, text: &str) -> Self {
        Self {
            id: id.into(),
            buffer: EditorRope::from_str(text),
            selection: None,
            layout: MonospaceLayout::default(),
            read_only: false,
        }
    }

    pub fn with_layout(mut self, layout: MonospaceLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Make the region refuse every replacement.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Simulate a user selection. `focus` may come before `anchor`.
    pub fn set_user_selection(&mut self, anchor: usize, focus: usize) {
        self.selection = Some((anchor, focus));
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn content(&self) -> String {
        self.buffer.to_string()
    }
}

impl HostRegion for MemoryBufferRegion {
    fn id(&self) -> &RegionId {
        &self.id
    }

    fn substrate(&self) -> Substrate<'_> {
        Substrate::Buffer(&self.buffer)
    }

    fn current_selection_endpoints(&self) -> Option<SelectionEndpoints> {
        self.selection.map(|(anchor, focus)| {
            SelectionEndpoints::new(Endpoint::buffer(anchor), Endpoint::buffer(focus))
        })
    }

    fn bounding_box_for(&self, range: Range<usize>) -> Result<BoundingBox> {
        Ok(self.layout.bounding_box(&self.buffer, range))
    }

    fn replace_range(&mut self, range: Range<usize>, content: Replacement) -> Result<()> {
        if self.read_only {
            return Err(InlineError::rejected("region is read-only"));
        }
        let Replacement::Text(text) = content else {
            return Err(InlineError::rejected("buffer region only accepts text"));
        };
        let len = self.buffer.len_chars();
        if range.start > range.end || range.end > len {
            return Err(InlineError::out_of_range(range.end, len));
        }
        self.buffer.replace(range, &text);
        Ok(())
    }

    fn select(&mut self, range: Range<usize>) -> Result<()> {
        let len = self.buffer.len_chars();
        if range.start > range.end || range.end > len {
            return Err(InlineError::out_of_range(range.end, len));
        }
        self.selection = Some((range.start, range.end));
        Ok(())
    }
}

/// Structured region backed by an arena tree.
#[derive(Debug, Clone)]
pub struct MemoryTreeRegion {
    id: RegionId,
    tree: Tree,
    selection: Option<SelectionEndpoints>,
    layout: MonospaceLayout,
    read_only: bool,
}

impl MemoryTreeRegion {
    pub fn new(id: impl Into<RegionId>, tree: Tree) -> Self {
        Self {
            id: id.into(),
            tree,
            selection: None,
            layout: MonospaceLayout::default(),
            read_only: false,
        }
    }

    pub fn with_layout(mut self, layout: MonospaceLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Simulate a user selection over tree endpoints.
    pub fn set_user_selection(&mut self, selection: SelectionEndpoints) {
        self.selection = Some(selection);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn inner_html(&self) -> String {
        self.tree.inner_html()
    }

    pub fn text_content(&self) -> String {
        self.tree.text_content(self.tree.root())
    }
}

impl HostRegion for MemoryTreeRegion {
    fn id(&self) -> &RegionId {
        &self.id
    }

    fn substrate(&self) -> Substrate<'_> {
        Substrate::Tree(&self.tree)
    }

    fn current_selection_endpoints(&self) -> Option<SelectionEndpoints> {
        self.selection
    }

    fn bounding_box_for(&self, range: Range<usize>) -> Result<BoundingBox> {
        let text = EditorRope::from_str(&self.tree.text_content(self.tree.root()));
        Ok(self.layout.bounding_box(&text, range))
    }

    fn replace_range(&mut self, _range: Range<usize>, content: Replacement) -> Result<()> {
        if self.read_only {
            return Err(InlineError::rejected("region is read-only"));
        }
        let Replacement::Children(splice) = content else {
            return Err(InlineError::rejected("tree region only accepts child splices"));
        };
        if !self.tree.is_attached(splice.parent) || self.tree.element(splice.parent).is_none() {
            return Err(InlineError::DetachedNode(splice.parent));
        }
        let child_count = self.tree.children(splice.parent).len();
        if splice.children.start > splice.children.end || splice.children.end > child_count {
            return Err(InlineError::out_of_range(splice.children.end, child_count));
        }

        self.tree
            .splice_children(splice.parent, splice.children, splice.fragment);
        // Endpoints may now point at detached nodes.
        self.selection = None;
        Ok(())
    }

    fn select(&mut self, range: Range<usize>) -> Result<()> {
        let start = indexer::locate(&self.tree, range.start)?;
        let end = indexer::locate(&self.tree, range.end)?;
        self.selection = Some(SelectionEndpoints::new(start, end));
        Ok(())
    }
}

/// Host with a fixed viewport and overlay size.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct StaticHost {
    pub viewport: Viewport,
    pub overlay: OverlaySize,
}

impl StaticHost {
    pub fn new(viewport: Viewport, overlay: OverlaySize) -> Self {
        Self { viewport, overlay }
    }
}

impl Host for StaticHost {
    fn viewport_frame(&self) -> Viewport {
        self.viewport
    }

    fn overlay_size(&self) -> OverlaySize {
        self.overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_box() {
        let layout = MonospaceLayout {
            top: 100.0,
            left: 50.0,
            char_width: 10.0,
            line_height: 20.0,
        };
        let bbox = layout.bounding_box(&EditorRope::from_str("Hello world"), 6..11);
        assert_eq!(bbox, BoundingBox::new(100.0, 110.0, 50.0, 20.0));
    }

    #[test]
    fn test_multi_line_box() {
        let layout = MonospaceLayout::default();
        let bbox = layout.bounding_box(&EditorRope::from_str("ab\nlonger\nc"), 1..9);
        assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 48.0, 40.0));
    }

    #[test]
    fn test_box_on_later_line() {
        let layout = MonospaceLayout::default();
        let bbox = layout.bounding_box(&EditorRope::from_str("one\ntwo"), 5..7);
        assert_eq!(bbox, BoundingBox::new(20.0, 8.0, 16.0, 20.0));
    }

    #[test]
    fn test_read_only_buffer_rejects() {
        let mut region = MemoryBufferRegion::new("r", "text");
        region.set_read_only(true);
        let err = region
            .replace_range(0..1, Replacement::Text("T".into()))
            .unwrap_err();
        assert!(matches!(err, InlineError::HostMutationRejected(_)));
        assert_eq!(region.content(), "text");
    }

    #[test]
    fn test_buffer_select_sets_endpoints() {
        let mut region = MemoryBufferRegion::new("r", "text");
        region.select(1..3).unwrap();
        let sel = region.current_selection_endpoints().unwrap();
        assert_eq!(sel.anchor, Endpoint::buffer(1));
        assert_eq!(sel.focus, Endpoint::buffer(3));
        assert!(region.select(2..9).is_err());
    }
}
