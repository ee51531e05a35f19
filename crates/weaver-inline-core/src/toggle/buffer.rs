//! Textual toggling for buffer regions.
//!
//! A buffer holds markup as plain text, so "already marked" means the
//! selected text itself starts with an opening tag of the mark and ends with
//! a matching closing tag. Nothing outside the selection is inspected.

use crate::error::{InlineError, Result};
use crate::host::{HostRegion, Replacement, Substrate};
use crate::marks::MarkSpec;
use crate::toggle::{ToggleAction, ToggleOutcome, ToggleRequest, ToggleStrategy};
use crate::types::SubstrateKind;

/// Strategy for [`SubstrateKind::Buffer`] regions.
#[derive(Clone, Copy, Debug, Default)]
pub struct BufferToggle;

impl ToggleStrategy for BufferToggle {
    fn apply(
        &self,
        request: &ToggleRequest<'_>,
        region: &mut dyn HostRegion,
    ) -> Result<ToggleOutcome> {
        let Substrate::Buffer(buffer) = region.substrate() else {
            return Err(InlineError::SubstrateMismatch {
                id: region.id().clone(),
                registered: SubstrateKind::Buffer,
                actual: region.kind(),
            });
        };
        let range = request.range.clone();
        let selected = buffer
            .slice(range.clone())
            .ok_or_else(|| InlineError::out_of_range(range.end, buffer.len_chars()))?;

        let (replacement, action) = match strip_markup(request.spec, &selected) {
            Some(inner) => (inner, ToggleAction::Unwrapped),
            None => (
                format!(
                    "{}{}{}",
                    request.wrapper.open_markup(),
                    selected,
                    request.wrapper.close_markup()
                ),
                ToggleAction::Wrapped,
            ),
        };
        let new_len = replacement.chars().count();

        tracing::debug!(
            target: "weaver::inline::toggle",
            region = %region.id(),
            mark = %request.spec.mark(),
            ?action,
            start = range.start,
            end = range.end,
            new_len,
            "buffer toggle"
        );

        region.replace_range(range.clone(), Replacement::Text(replacement.into()))?;
        Ok(ToggleOutcome {
            action,
            range: range.start..range.start + new_len,
        })
    }
}

/// If `text`, ignoring surrounding whitespace, is one element of the mark,
/// return it with that outer tag pair removed and the whitespace kept.
///
/// Detection is textual: `<b>a</b> <b>b</b>` counts as marked and strips to
/// `a</b> <b>b`.
pub fn strip_markup(spec: &MarkSpec, text: &str) -> Option<String> {
    let body = text.trim();
    if body.is_empty() {
        return None;
    }
    let lead = &text[..text.len() - text.trim_start().len()];
    let trail = &text[text.trim_end().len()..];

    spec.tags().iter().find_map(|tag| {
        let close = format!("</{tag}>");
        let close_start = body.len().checked_sub(close.len())?;
        if !body.get(close_start..)?.eq_ignore_ascii_case(&close) {
            return None;
        }

        let prefix = tag.len() + 1;
        if !body.get(..prefix)?.eq_ignore_ascii_case(&format!("<{tag}")) {
            return None;
        }
        let next = body[prefix..].chars().next()?;
        if next != '>' && !next.is_whitespace() {
            return None;
        }
        let open_end = body.find('>')? + 1;
        if open_end > close_start {
            return None;
        }
        Some(format!("{lead}{}{trail}", &body[open_end..close_start]))
    })
}
