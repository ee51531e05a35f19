//! Linearized view of a run of tree content.
//!
//! A [`MarkRegion`] flattens some subtrees into leaf segments. Each segment
//! remembers the stack of wrapper elements it sits in, outermost first, as
//! indices into a shared frame arena. Splitting a text segment keeps the
//! stack, so both halves still belong to the same source wrappers, and
//! rebuilding groups consecutive segments that share a frame back into one
//! element.

use std::ops::Range;

use crate::error::{InlineError, Result};
use crate::marks::MarkSpec;
use crate::tree::{ElementData, Fragment, FragmentNode, NodeId, NodeKind, Tree};

type FrameIdx = usize;

/// A leaf in document order.
#[derive(Clone, Debug, PartialEq)]
pub enum Leaf {
    Text(String),
    /// Void element such as `<br>`.
    Void(ElementData),
    /// Stands in for an element with no text beneath it. The element itself
    /// is the innermost frame on the segment's stack.
    Empty,
}

/// One leaf with its enclosing wrappers.
#[derive(Clone, Debug)]
pub struct Segment {
    leaf: Leaf,
    stack: Vec<FrameIdx>,
    start: usize,
    selected: bool,
}

impl Segment {
    /// Flattened offset of the first char.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn text(&self) -> &str {
        match &self.leaf {
            Leaf::Text(t) => t,
            Leaf::Void(_) | Leaf::Empty => "",
        }
    }

    pub fn leaf(&self) -> &Leaf {
        &self.leaf
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    fn len(&self) -> usize {
        self.text().chars().count()
    }
}

/// Flattened run of content with its wrapper arena.
#[derive(Clone, Debug, Default)]
pub struct MarkRegion {
    frames: Vec<ElementData>,
    segments: Vec<Segment>,
}

impl MarkRegion {
    /// Linearize `nodes`, whose first char sits at flattened offset `base`.
    pub fn collect(tree: &Tree, nodes: &[NodeId], base: usize) -> Self {
        let mut region = Self::default();
        let mut stack = Vec::new();
        let mut offset = base;
        for node in nodes {
            region.walk(tree, *node, &mut stack, &mut offset);
        }
        region
    }

    fn walk(&mut self, tree: &Tree, node: NodeId, stack: &mut Vec<FrameIdx>, offset: &mut usize) {
        match tree.kind(node) {
            Some(NodeKind::Text(text)) => {
                if text.is_empty() {
                    return;
                }
                self.segments.push(Segment {
                    leaf: Leaf::Text(text.clone()),
                    stack: stack.clone(),
                    start: *offset,
                    selected: false,
                });
                *offset += text.chars().count();
            }
            Some(NodeKind::Element { data, children }) if data.is_void() && children.is_empty() => {
                self.segments.push(Segment {
                    leaf: Leaf::Void(data.clone()),
                    stack: stack.clone(),
                    start: *offset,
                    selected: false,
                });
            }
            Some(NodeKind::Element { data, children }) => {
                self.frames.push(data.clone());
                stack.push(self.frames.len() - 1);
                let emitted = self.segments.len();
                for child in children {
                    self.walk(tree, *child, stack, offset);
                }
                if self.segments.len() == emitted {
                    self.segments.push(Segment {
                        leaf: Leaf::Empty,
                        stack: stack.clone(),
                        start: *offset,
                        selected: false,
                    });
                }
                stack.pop();
            }
            None => {}
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Tags of the wrappers around a segment, outermost first.
    pub fn wrap_tags<'a>(&'a self, segment: &'a Segment) -> impl Iterator<Item = &'a str> + 'a {
        segment.stack.iter().map(|f| self.frames[*f].tag.as_str())
    }

    /// Whether a segment sits inside the mark.
    pub fn is_marked(&self, segment: &Segment, spec: &MarkSpec) -> bool {
        spec.matches(self.wrap_tags(segment))
    }

    /// Split text segments so `range` starts and ends on segment boundaries,
    /// then flag the segments inside it.
    ///
    /// Childless elements count as selected only when strictly inside.
    pub fn select(&mut self, range: Range<usize>) {
        self.split_at(range.start);
        self.split_at(range.end);
        for segment in &mut self.segments {
            let len = segment.len();
            segment.selected = if len == 0 {
                segment.start > range.start && segment.start < range.end
            } else {
                segment.start >= range.start && segment.start + len <= range.end
            };
        }
    }

    fn split_at(&mut self, offset: usize) {
        let Some(index) = self
            .segments
            .iter()
            .position(|s| s.start < offset && offset < s.start + s.len())
        else {
            return;
        };
        let segment = &mut self.segments[index];
        let Leaf::Text(text) = &mut segment.leaf else {
            return;
        };
        let at = text
            .char_indices()
            .nth(offset - segment.start)
            .map_or(text.len(), |(i, _)| i);
        let tail = text.split_off(at);
        let second = Segment {
            leaf: Leaf::Text(tail),
            stack: segment.stack.clone(),
            start: offset,
            selected: false,
        };
        self.segments.insert(index + 1, second);
    }

    fn selected(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.selected)
    }

    pub fn selected_text(&self) -> String {
        self.selected().map(Segment::text).collect()
    }

    /// True if any selected text carries the mark.
    pub fn any_marked(&self, spec: &MarkSpec) -> bool {
        self.selected()
            .any(|s| s.len() > 0 && self.is_marked(s, spec))
    }

    /// Fail if the selection covers only part of a non-editable element.
    pub fn check_atomic_coverage(&self) -> Result<()> {
        for (frame, data) in self.frames.iter().enumerate() {
            if !data.is_atomic() {
                continue;
            }
            let mut inside = self
                .segments
                .iter()
                .filter(|s| s.len() > 0 && s.stack.contains(&frame));
            let Some(first) = inside.next() else {
                continue;
            };
            if inside.any(|s| s.selected != first.selected) {
                return Err(InlineError::nesting(format!(
                    "selection splits non-editable <{}>",
                    data.tag
                )));
            }
        }
        Ok(())
    }

    fn atomic_within(&self, stack: &[FrameIdx]) -> Option<&ElementData> {
        stack
            .iter()
            .map(|f| &self.frames[*f])
            .find(|data| data.is_atomic())
    }

    /// Remove every wrapper matching the mark from the selected segments.
    ///
    /// Unselected segments keep their wrappers, so a partially covered
    /// element is split around the selection.
    pub fn strip_mark(&mut self, spec: &MarkSpec) -> Result<()> {
        for segment in self.segments.iter().filter(|s| s.selected) {
            for (depth, frame) in segment.stack.iter().enumerate() {
                if !spec.matches_tag(&self.frames[*frame].tag) {
                    continue;
                }
                if let Some(atomic) = self.atomic_within(&segment.stack[..=depth]) {
                    return Err(InlineError::nesting(format!(
                        "cannot unwrap inside non-editable <{}>",
                        atomic.tag
                    )));
                }
            }
        }

        let frames = &self.frames;
        for segment in self.segments.iter_mut().filter(|s| s.selected) {
            segment
                .stack
                .retain(|f| !spec.matches_tag(&frames[*f].tag));
        }
        Ok(())
    }

    /// Insert `wrapper` around the selected segments.
    ///
    /// The wrapper goes in at the deepest level all selected segments share.
    /// Inline wrappers are pushed below any block element on a segment's own
    /// stack, so a selection crossing paragraphs gets one wrapper per
    /// paragraph rather than one around both. Empty elements are wrapped
    /// whole or left alone, never filled.
    pub fn wrap(&mut self, spec: &MarkSpec, wrapper: ElementData) -> Result<()> {
        let common = self.common_depth();
        let mut inserts = Vec::new();
        for (index, segment) in self.segments.iter().enumerate() {
            if !segment.selected {
                continue;
            }
            let depth = if spec.is_block() {
                common
            } else {
                let below_blocks = segment
                    .stack
                    .iter()
                    .rposition(|f| self.frames[*f].is_block())
                    .map_or(0, |d| d + 1);
                common.max(below_blocks)
            };
            if segment.leaf == Leaf::Empty && depth >= segment.stack.len() {
                continue;
            }
            if let Some(atomic) = self.atomic_within(&segment.stack[..depth]) {
                return Err(InlineError::nesting(format!(
                    "cannot wrap inside non-editable <{}>",
                    atomic.tag
                )));
            }
            inserts.push((index, depth));
        }

        self.frames.push(wrapper);
        let frame = self.frames.len() - 1;
        for (index, depth) in inserts {
            self.segments[index].stack.insert(depth, frame);
        }
        Ok(())
    }

    /// Length of the wrapper prefix shared by every selected segment.
    fn common_depth(&self) -> usize {
        let mut selected = self.selected();
        let Some(first) = selected.next() else {
            return 0;
        };
        selected.fold(first.stack.len(), |depth, s| {
            first.stack[..depth]
                .iter()
                .zip(&s.stack)
                .take_while(|(a, b)| a == b)
                .count()
        })
    }

    /// Rebuild owned nodes from the segments.
    pub fn to_fragment(&self) -> Fragment {
        Fragment::new(self.build(&self.segments, 0))
    }

    fn build(&self, segments: &[Segment], depth: usize) -> Vec<FragmentNode> {
        let mut out: Vec<FragmentNode> = Vec::new();
        let mut i = 0;
        while i < segments.len() {
            let segment = &segments[i];
            if let Some(frame) = segment.stack.get(depth).copied() {
                let run = segments[i..]
                    .iter()
                    .take_while(|s| s.stack.get(depth) == Some(&frame))
                    .count();
                let children = self.build(&segments[i..i + run], depth + 1);
                out.push(FragmentNode::element(self.frames[frame].clone(), children));
                i += run;
                continue;
            }

            match &segment.leaf {
                Leaf::Text(text) => match out.last_mut() {
                    Some(FragmentNode::Text(prev)) => prev.push_str(text),
                    _ => out.push(FragmentNode::Text(text.clone())),
                },
                Leaf::Void(data) => out.push(FragmentNode::element(data.clone(), Vec::new())),
                Leaf::Empty => {}
            }
            i += 1;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marks::Mark;

    fn tree(nodes: Vec<FragmentNode>) -> Tree {
        Tree::from_fragment(ElementData::new("div"), Fragment::new(nodes))
    }

    fn collect_all(tree: &Tree) -> MarkRegion {
        MarkRegion::collect(tree, tree.children(tree.root()), 0)
    }

    #[test]
    fn test_collect_records_wrapper_stacks() {
        let tree = tree(vec![
            FragmentNode::text("a"),
            FragmentNode::tag(
                "b",
                vec![FragmentNode::tag("i", vec![FragmentNode::text("bc")])],
            ),
        ]);
        let region = collect_all(&tree);
        let segments = region.segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(region.wrap_tags(&segments[0]).count(), 0);
        assert_eq!(
            region.wrap_tags(&segments[1]).collect::<Vec<_>>(),
            vec!["b", "i"]
        );
        assert_eq!(segments[1].start(), 1);
        assert!(region.is_marked(&segments[1], Mark::Bold.spec()));
        assert!(!region.is_marked(&segments[0], Mark::Bold.spec()));
    }

    #[test]
    fn test_select_splits_text() {
        let tree = tree(vec![FragmentNode::text("Hello world")]);
        let mut region = collect_all(&tree);
        region.select(2..7);
        let texts: Vec<&str> = region.segments().iter().map(Segment::text).collect();
        assert_eq!(texts, vec!["He", "llo w", "orld"]);
        assert_eq!(region.selected_text(), "llo w");
    }

    #[test]
    fn test_untouched_region_rebuilds_identically() {
        let nodes = vec![
            FragmentNode::tag(
                "p",
                vec![
                    FragmentNode::text("x "),
                    FragmentNode::tag("em", vec![FragmentNode::text("y")]),
                    FragmentNode::tag("br", vec![]),
                ],
            ),
            FragmentNode::text("z"),
        ];
        let tree = tree(nodes.clone());
        let mut region = collect_all(&tree);
        region.select(1..2);
        assert_eq!(region.to_fragment(), Fragment::new(nodes));
    }

    #[test]
    fn test_textless_element_keeps_a_segment() {
        let tree = tree(vec![
            FragmentNode::tag("p", vec![FragmentNode::text("ab")]),
            FragmentNode::tag("p", vec![FragmentNode::text("")]),
            FragmentNode::tag("p", vec![FragmentNode::text("cd")]),
        ]);
        let mut region = collect_all(&tree);
        assert_eq!(region.segments()[1].leaf(), &Leaf::Empty);
        assert_eq!(region.wrap_tags(&region.segments()[1]).collect::<Vec<_>>(), vec!["p"]);

        region.select(1..3);
        assert!(region.segments()[2].is_selected());
        region.wrap(Mark::Bold.spec(), ElementData::new("b")).unwrap();
        assert_eq!(
            region.to_fragment().to_html(),
            "<p>a<b>b</b></p><p></p><p><b>c</b>d</p>"
        );
    }

    #[test]
    fn test_common_depth_across_paragraphs() {
        let tree = tree(vec![
            FragmentNode::tag("p", vec![FragmentNode::text("ab")]),
            FragmentNode::tag("p", vec![FragmentNode::text("cd")]),
        ]);
        let mut region = collect_all(&tree);
        region.select(1..3);
        assert_eq!(region.common_depth(), 0);
        region.select(0..1);
        assert_eq!(region.selected_text(), "a");
    }
}
