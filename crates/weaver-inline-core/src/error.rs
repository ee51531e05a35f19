//! Error types for selection capture and mark toggling.

use miette::Diagnostic;
use smol_str::SmolStr;

use crate::marks::Mark;
use crate::tree::NodeId;
use crate::types::{RegionId, SubstrateKind};

/// Errors reported by the inline mark core.
///
/// None of these leave host content partially modified: a toggle either
/// commits its whole replacement or performs no mutation at all.
#[derive(thiserror::Error, Debug, Diagnostic, Clone, PartialEq)]
#[non_exhaustive]
pub enum InlineError {
    /// An offset exceeds the region's flattened text length.
    #[error("offset {offset} is out of range (length {len})")]
    #[diagnostic(code(weaver::inline::offset_out_of_range))]
    OffsetOutOfRange { offset: usize, len: usize },

    /// A selection endpoint refers to a node outside the region root.
    #[error("node {0} is not attached to the region root")]
    #[diagnostic(code(weaver::inline::detached_node))]
    DetachedNode(NodeId),

    /// Toggling needs a non-collapsed selection.
    #[error("selection is empty")]
    #[diagnostic(
        code(weaver::inline::empty_selection),
        help("select some text before applying a mark")
    )]
    EmptySelection,

    /// The mark needs a caller-supplied parameter that was not given.
    #[error("{mark} requires a {param} parameter")]
    #[diagnostic(code(weaver::inline::missing_parameter))]
    MissingParameter { mark: Mark, param: &'static str },

    /// A parameter was given but is not usable (blank URL, heading level out of range).
    #[error("invalid {param} parameter for {mark}: {reason}")]
    #[diagnostic(code(weaver::inline::invalid_parameter))]
    InvalidParameter {
        mark: Mark,
        param: &'static str,
        reason: SmolStr,
    },

    /// The mark is not part of the enabled set.
    #[error("{0} is not enabled")]
    #[diagnostic(code(weaver::inline::mark_disabled))]
    MarkDisabled(Mark),

    /// The replacement cannot be re-inserted without splitting an atomic element.
    #[error("unsupported nesting: {0}")]
    #[diagnostic(code(weaver::inline::unsupported_nesting))]
    UnsupportedNesting(SmolStr),

    /// The host refused the replacement.
    #[error("host rejected mutation: {0}")]
    #[diagnostic(code(weaver::inline::host_mutation_rejected))]
    HostMutationRejected(SmolStr),

    /// An event arrived for a region that was never registered.
    #[error("region {0} is not registered")]
    #[diagnostic(code(weaver::inline::unknown_region))]
    UnknownRegion(RegionId),

    /// A region reported a different substrate than it was registered with.
    #[error("region {id} was registered as {registered:?} but reports {actual:?}")]
    #[diagnostic(code(weaver::inline::substrate_mismatch))]
    SubstrateMismatch {
        id: RegionId,
        registered: SubstrateKind,
        actual: SubstrateKind,
    },

    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    #[diagnostic(code(weaver::inline::config))]
    Config(SmolStr),
}

impl InlineError {
    pub(crate) fn out_of_range(offset: usize, len: usize) -> Self {
        Self::OffsetOutOfRange { offset, len }
    }

    pub(crate) fn nesting(reason: impl Into<SmolStr>) -> Self {
        Self::UnsupportedNesting(reason.into())
    }

    pub(crate) fn rejected(reason: impl Into<SmolStr>) -> Self {
        Self::HostMutationRejected(reason.into())
    }
}

pub type Result<T, E = InlineError> = std::result::Result<T, E>;
