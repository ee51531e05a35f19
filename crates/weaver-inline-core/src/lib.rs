//! weaver-inline-core: selection-driven inline formatting without framework dependencies.
//!
//! This crate provides:
//! - `HostRegion` / `Host` traits at the boundary with whatever owns the live document
//! - `SelectionSnapshot` - normalized selection over buffer or tree regions
//! - `place_overlay` - toolbar placement against the viewport
//! - `MarkRegistry` and `toggle` - applying and removing marks, textually or structurally
//! - `OverlayController` and `ToolbarContext` - show/hide state and event wiring
//! - In-memory regions (`MemoryBufferRegion`, `MemoryTreeRegion`) for embedders and tests

pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub mod indexer;
pub mod marks;
pub mod position;
pub mod schedule;
pub mod snapshot;
pub mod text;
pub mod toggle;
pub mod tree;
pub mod types;
pub mod visibility;

pub use config::ToolbarConfig;
pub use context::ToolbarContext;
pub use error::{InlineError, Result};
pub use host::{
    Host, HostRegion, MemoryBufferRegion, MemoryTreeRegion, MonospaceLayout, Replacement,
    StaticHost, Substrate, TreeSplice,
};
pub use indexer::{bounding_box_of, locate, offset_of};
pub use marks::{Mark, MarkParams, MarkRegistry, MarkSpec, WrapperDescriptor};
pub use position::{Placement, PlacementOptions, Side, place_overlay};
pub use schedule::{DeferredRead, ReadTicket};
pub use smol_str::SmolStr;
pub use snapshot::SelectionSnapshot;
pub use text::{EditorRope, TextBuffer};
pub use toggle::{ToggleAction, Toggled, toggle};
pub use tree::{ElementData, Fragment, FragmentNode, NodeId, NodeKind, Tree};
pub use types::{
    BoundingBox, ContainerRef, Endpoint, OverlaySize, RegionId, SelectionEndpoints,
    SubstrateKind, TreeAnchor, Viewport,
};
pub use visibility::{OverlayController, OverlayEvent, OverlayState, VisibilityInput};
