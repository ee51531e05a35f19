//! Per-toolbar state owned by the embedder.
//!
//! A [`ToolbarContext`] wires the pieces together for one toolbar: which
//! regions it serves, which marks it offers, whether it is showing, and any
//! pending deferred read. Hosts forward their events here and apply the
//! returned [`OverlayEvent`]s.

use std::collections::HashMap;

use web_time::Instant;

use crate::config::ToolbarConfig;
use crate::error::{InlineError, Result};
use crate::host::{Host, HostRegion};
use crate::marks::{Mark, MarkParams, MarkRegistry};
use crate::schedule::{DeferredRead, ReadTicket};
use crate::snapshot::SelectionSnapshot;
use crate::toggle::{self, Toggled};
use crate::types::{RegionId, SubstrateKind};
use crate::visibility::{OverlayController, OverlayEvent, OverlayState, VisibilityInput};

/// State for one toolbar instance.
#[derive(Debug, Clone)]
pub struct ToolbarContext {
    config: ToolbarConfig,
    registry: MarkRegistry,
    regions: HashMap<RegionId, SubstrateKind>,
    controller: OverlayController,
    deferred: DeferredRead,
    deferred_region: Option<RegionId>,
}

impl Default for ToolbarContext {
    fn default() -> Self {
        Self::new(ToolbarConfig::default())
    }
}

impl ToolbarContext {
    pub fn new(config: ToolbarConfig) -> Self {
        Self {
            registry: config.registry(),
            controller: OverlayController::new(config.placement_options()),
            deferred: DeferredRead::new(config.double_click_delay()),
            regions: HashMap::new(),
            deferred_region: None,
            config,
        }
    }

    pub fn config(&self) -> &ToolbarConfig {
        &self.config
    }

    pub fn registry(&self) -> &MarkRegistry {
        &self.registry
    }

    pub fn state(&self) -> &OverlayState {
        self.controller.state()
    }

    /// Selection the overlay is currently shown for.
    pub fn current_selection(&self) -> Option<&SelectionSnapshot> {
        self.controller.state().selection()
    }

    /// Start serving a region. Registering an id again replaces its kind.
    pub fn register_region<R: HostRegion + ?Sized>(&mut self, region: &R) {
        let kind = region.kind();
        if let Some(previous) = self.regions.insert(region.id().clone(), kind) {
            tracing::debug!(
                target: "weaver::inline::context",
                region = %region.id(),
                ?previous,
                ?kind,
                "re-registered region"
            );
        } else {
            tracing::debug!(
                target: "weaver::inline::context",
                region = %region.id(),
                ?kind,
                "registered region"
            );
        }
    }

    /// Stop serving a region. Hides the overlay if it belonged to it.
    pub fn unregister_region(&mut self, id: &RegionId) -> Result<Option<OverlayEvent>> {
        if self.regions.remove(id).is_none() {
            return Err(InlineError::UnknownRegion(id.clone()));
        }
        if self.deferred_region.as_ref() == Some(id) {
            self.deferred.cancel();
            self.deferred_region = None;
        }
        tracing::debug!(target: "weaver::inline::context", region = %id, "unregistered region");

        let owned = self
            .current_selection()
            .is_some_and(|s| &s.owner_id == id);
        Ok(if owned { self.controller.hide() } else { None })
    }

    pub fn is_registered(&self, id: &RegionId) -> bool {
        self.regions.contains_key(id)
    }

    fn check_region<R: HostRegion + ?Sized>(&self, region: &R) -> Result<()> {
        let id = region.id();
        let registered = *self
            .regions
            .get(id)
            .ok_or_else(|| InlineError::UnknownRegion(id.clone()))?;
        let actual = region.kind();
        if registered != actual {
            return Err(InlineError::SubstrateMismatch {
                id: id.clone(),
                registered,
                actual,
            });
        }
        Ok(())
    }

    /// The host reported a selection change in `region`.
    ///
    /// Reads the selection now and supersedes any pending deferred read.
    pub fn selection_changed<R, H>(&mut self, region: &R, host: &H) -> Result<Option<OverlayEvent>>
    where
        R: HostRegion + ?Sized,
        H: Host + ?Sized,
    {
        self.check_region(region)?;
        if self.deferred.cancel() {
            self.deferred_region = None;
        }
        self.read_selection(region, host)
    }

    fn read_selection<R, H>(&mut self, region: &R, host: &H) -> Result<Option<OverlayEvent>>
    where
        R: HostRegion + ?Sized,
        H: Host + ?Sized,
    {
        let snapshot = SelectionSnapshot::capture(region)?;
        Ok(self
            .controller
            .handle(VisibilityInput::Selection(snapshot), host))
    }

    /// A double activation (double-click) happened in `region`. The
    /// selection is read once the configured delay has passed, via
    /// [`poll_deferred`](Self::poll_deferred).
    pub fn double_activation<R: HostRegion + ?Sized>(
        &mut self,
        region: &R,
        now: Instant,
    ) -> Result<ReadTicket> {
        self.check_region(region)?;
        self.deferred_region = Some(region.id().clone());
        Ok(self.deferred.schedule(now))
    }

    /// Run the deferred read if it is due and belongs to `region`.
    pub fn poll_deferred<R, H>(
        &mut self,
        now: Instant,
        region: &R,
        host: &H,
    ) -> Result<Option<OverlayEvent>>
    where
        R: HostRegion + ?Sized,
        H: Host + ?Sized,
    {
        if self.deferred_region.as_ref() != Some(region.id()) {
            return Ok(None);
        }
        self.check_region(region)?;
        if !self.deferred.poll(now) {
            return Ok(None);
        }
        self.deferred_region = None;
        tracing::trace!(
            target: "weaver::inline::context",
            region = %region.id(),
            "deferred selection read"
        );
        self.read_selection(region, host)
    }

    /// A click landed outside the overlay and every registered region.
    pub fn outside_click<H: Host + ?Sized>(&mut self, host: &H) -> Option<OverlayEvent> {
        if self.deferred.cancel() {
            self.deferred_region = None;
        }
        self.controller.handle(VisibilityInput::OutsideClick, host)
    }

    /// A click landed inside the overlay. Never changes state.
    pub fn overlay_click<H: Host + ?Sized>(&mut self, host: &H) -> Option<OverlayEvent> {
        self.controller.handle(VisibilityInput::OverlayClick, host)
    }

    /// Toggle `mark` over the current selection in `region`.
    ///
    /// Uses the selection the overlay is showing when it belongs to
    /// `region`, otherwise reads the host's selection. The overlay stays
    /// visible on the updated selection.
    pub fn toggle_mark<H: Host + ?Sized>(
        &mut self,
        mark: Mark,
        params: Option<&MarkParams>,
        region: &mut dyn HostRegion,
        host: &H,
    ) -> Result<(Toggled, Option<OverlayEvent>)> {
        self.check_region(&*region)?;
        let range = match self.current_selection() {
            Some(shown) if &shown.owner_id == region.id() => shown.range(),
            _ => SelectionSnapshot::capture(&*region)?
                .map(|s| s.range())
                .ok_or(InlineError::EmptySelection)?,
        };

        let toggled =
            toggle::toggle(&self.registry, mark, region, range, params).inspect_err(|err| {
                if let InlineError::HostMutationRejected(reason) = err {
                    tracing::warn!(
                        target: "weaver::inline::context",
                        %mark,
                        %reason,
                        "host rejected toggle"
                    );
                }
            })?;

        let event = self
            .controller
            .handle(VisibilityInput::MarkToggled(toggled.selection.clone()), host);
        Ok((toggled, event))
    }
}
