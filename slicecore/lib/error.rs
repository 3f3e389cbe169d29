use std::{
    error::Error,
    fmt::{self, Display},
};
use thiserror::Error;

use crate::{
    builder::DraftState,
    models::{SliceAction, SliceStatus},
    topology::TopologyKind,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a slicecore-related operation.
pub type SliceResult<T> = Result<T, SliceError>;

/// An error that occurred while building, allocating or persisting a slice.
#[derive(pretty_error_debug::Debug, Error)]
pub enum SliceError {
    /// An I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An error that can represent any error.
    #[error(transparent)]
    Custom(#[from] AnyError),

    /// An error that occurred while encoding or decoding the JSON store.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error that occurred while encoding or decoding the YAML store.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The draft or a request failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Network resources could not be assigned to a slice.
    #[error("allocation error: {0}")]
    Allocation(#[from] AllocationError),

    /// The caller is not allowed to perform the action.
    #[error("permission denied: '{identity}' may not {action}")]
    PermissionDenied {
        /// The identity of the caller.
        identity: String,

        /// The action that was refused.
        action: SliceAction,
    },

    /// The store file was written by a newer version of slicecore.
    #[error("store version {found} is newer than supported version {supported}")]
    UnsupportedStoreVersion {
        /// The version found in the store file.
        found: u32,

        /// The newest version this build understands.
        supported: u32,
    },

    /// A loaded store snapshot breaks one of the store invariants.
    #[error("corrupt store: {0}")]
    CorruptStore(String),
}

/// An error that occurred when a slice draft or a store request was invalid.
///
/// Validation errors are always recoverable: the caller can correct the draft and retry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The slice name is empty.
    #[error("slice name cannot be empty")]
    EmptySliceName,

    /// The slice name exceeds the maximum length.
    #[error("slice name is {len} characters long, the maximum is {max}")]
    SliceNameTooLong {
        /// The length of the rejected name.
        len: usize,

        /// The maximum allowed length.
        max: usize,
    },

    /// A topology segment has fewer VMs than its kind requires.
    #[error("a {kind} topology requires at least {min} VMs, got {count}")]
    SegmentTooSmall {
        /// The topology kind.
        kind: TopologyKind,

        /// The requested VM count.
        count: usize,

        /// The minimum VM count for the kind.
        min: usize,
    },

    /// A topology segment has more VMs than allowed.
    #[error("a topology can have at most {max} VMs, got {count}")]
    SegmentTooLarge {
        /// The requested VM count.
        count: usize,

        /// The maximum VM count per segment.
        max: usize,
    },

    /// The draft already holds the maximum number of topology segments.
    #[error("a slice can have at most {max} topologies")]
    TooManySegments {
        /// The maximum number of segments per slice.
        max: usize,
    },

    /// A link references a VM index outside the draft.
    #[error("VM index {index} is out of range, the draft has {count} VMs")]
    VmIndexOutOfRange {
        /// The rejected index.
        index: usize,

        /// The number of VMs in the draft.
        count: usize,
    },

    /// A link connects a VM to itself.
    #[error("VM {0} cannot be linked to itself")]
    SelfLink(usize),

    /// The link already exists in the draft.
    #[error("link {0} <-> {1} already exists")]
    DuplicateLink(usize, usize),

    /// The draft has no VMs.
    #[error("a slice needs at least one VM")]
    NoVms,

    /// The VMs of the draft do not form a single connected graph.
    #[error("topologies are not joined: only {reachable} of {total} VMs are connected")]
    Disconnected {
        /// The number of VMs reachable from the first VM.
        reachable: usize,

        /// The number of VMs in the draft.
        total: usize,
    },

    /// A VM was given a zero-sized resource.
    #[error("{resource} of VM '{vm}' must be positive")]
    ZeroResource {
        /// The name of the VM.
        vm: String,

        /// The resource that was zero.
        resource: &'static str,
    },

    /// The draft was already finalized or cancelled.
    #[error("the draft is {0} and cannot be changed")]
    DraftClosed(DraftState),

    /// A slice cannot be moved to the requested status.
    #[error("a slice cannot be set to '{0}'")]
    InvalidStatusTarget(SliceStatus),
}

/// An error that occurred when the network address space for a slice ran out.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    /// There is no VLAN left that fits the slice address plan.
    #[error("no VLAN available: {next} exceeds the maximum of {max}")]
    VlanExhausted {
        /// The VLAN that would have been assigned.
        next: u32,

        /// The highest assignable VLAN.
        max: u32,
    },

    /// The slice has more VMs than its subnet can address.
    #[error("a slice can address at most {max} VMs, got {count}")]
    TooManyVms {
        /// The number of VMs in the slice.
        count: usize,

        /// The maximum number of VMs per slice.
        max: usize,
    },

    /// The VNC port range is exhausted.
    #[error("VNC port range exhausted")]
    VncPortsExhausted,
}

/// An error that can represent any error.
#[derive(Debug)]
pub struct AnyError {
    error: anyhow::Error,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl SliceError {
    /// Creates a new `Err` result.
    pub fn custom(error: impl Into<anyhow::Error>) -> SliceError {
        SliceError::Custom(AnyError {
            error: error.into(),
        })
    }
}

impl AnyError {
    /// Downcasts the error to a `T`.
    pub fn downcast<T>(&self) -> Option<&T>
    where
        T: Display + fmt::Debug + Send + Sync + 'static,
    {
        self.error.downcast_ref::<T>()
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `SliceResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> SliceResult<T> {
    Result::Ok(value)
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl PartialEq for AnyError {
    fn eq(&self, other: &Self) -> bool {
        self.error.to_string() == other.error.to_string()
    }
}

impl Display for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl Error for AnyError {}
