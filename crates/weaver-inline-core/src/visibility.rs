//! Show/hide state of the overlay.
//!
//! The controller is a two-state machine driven by selection events and
//! clicks. It does not touch the host; every transition yields an
//! [`OverlayEvent`] for the embedder to apply.

use crate::host::Host;
use crate::position::{self, Placement, PlacementOptions};
use crate::snapshot::SelectionSnapshot;

/// Current overlay state. Visible always carries the selection it was
/// shown for.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum OverlayState {
    #[default]
    Hidden,
    Visible(SelectionSnapshot),
}

impl OverlayState {
    pub fn is_visible(&self) -> bool {
        matches!(self, OverlayState::Visible(_))
    }

    pub fn selection(&self) -> Option<&SelectionSnapshot> {
        match self {
            OverlayState::Visible(snapshot) => Some(snapshot),
            OverlayState::Hidden => None,
        }
    }
}

/// What the host should do with the overlay.
#[derive(Clone, Debug, PartialEq)]
pub enum OverlayEvent {
    Show { placement: Placement },
    Hide,
}

/// Inputs to the state machine.
#[derive(Clone, Debug, PartialEq)]
pub enum VisibilityInput {
    /// A selection was read. `None` or a collapsed snapshot means nothing
    /// is selected.
    Selection(Option<SelectionSnapshot>),
    /// A click landed outside every registered region and the overlay.
    OutsideClick,
    /// A click landed inside the overlay itself.
    OverlayClick,
    /// A toggle rewrote the selection. The overlay stays up so marks can be
    /// toggled again without reselecting.
    MarkToggled(SelectionSnapshot),
}

/// Drives [`OverlayState`] transitions.
#[derive(Clone, Debug, Default)]
pub struct OverlayController {
    state: OverlayState,
    options: PlacementOptions,
}

impl OverlayController {
    pub fn new(options: PlacementOptions) -> Self {
        Self {
            state: OverlayState::Hidden,
            options,
        }
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn options(&self) -> PlacementOptions {
        self.options
    }

    /// Feed one input. Returns the event to apply, if anything changed.
    ///
    /// Re-reading an unchanged selection while visible is a no-op, as are
    /// clicks inside the overlay and outside clicks while hidden.
    pub fn handle<H: Host + ?Sized>(
        &mut self,
        input: VisibilityInput,
        host: &H,
    ) -> Option<OverlayEvent> {
        let event = match input {
            VisibilityInput::Selection(Some(snapshot)) | VisibilityInput::MarkToggled(snapshot)
                if !snapshot.is_collapsed() =>
            {
                self.show(snapshot, host)
            }
            VisibilityInput::Selection(_)
            | VisibilityInput::MarkToggled(_)
            | VisibilityInput::OutsideClick => self.hide(),
            VisibilityInput::OverlayClick => None,
        };

        if let Some(event) = &event {
            tracing::debug!(
                target: "weaver::inline::visibility",
                ?event,
                "overlay transition"
            );
        }
        event
    }

    fn show<H: Host + ?Sized>(
        &mut self,
        snapshot: SelectionSnapshot,
        host: &H,
    ) -> Option<OverlayEvent> {
        if self.state.selection() == Some(&snapshot) {
            return None;
        }
        let placement = position::place_overlay(
            snapshot.bounding_box,
            host.overlay_size(),
            host.viewport_frame(),
            self.options,
        );
        self.state = OverlayState::Visible(snapshot);
        Some(OverlayEvent::Show { placement })
    }

    /// Move to Hidden. Returns `Hide` only if the overlay was visible.
    pub fn hide(&mut self) -> Option<OverlayEvent> {
        match std::mem::take(&mut self.state) {
            OverlayState::Visible(_) => Some(OverlayEvent::Hide),
            OverlayState::Hidden => None,
        }
    }
}
