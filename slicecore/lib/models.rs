//! Persisted slice records.

use std::{fmt, net::Ipv4Addr, str::FromStr};

use chrono::{DateTime, Utc};
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

use crate::{
    config::Flavor,
    topology::{Link, TopologyKind},
    SliceError, SliceResult,
};

//--------------------------------------------------------------------------------------------------
// Types: Status
//--------------------------------------------------------------------------------------------------

/// The lifecycle status of a slice.
///
/// A slice starts as `Creating` and becomes `Active` once it is stored. From then on it can be
/// toggled between `Active` and `Inactive` until it is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceStatus {
    /// The slice is being created.
    Creating,

    /// The slice is running.
    Active,

    /// The slice is paused.
    Inactive,
}

/// The status of a VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VmStatus {
    /// The VM belongs to a slice that has not been stored yet.
    #[default]
    Pending,

    /// The VM belongs to a stored slice.
    Active,
}

/// An action a caller may or may not be allowed to perform on slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceAction {
    /// Create new slices.
    CreateSlice,

    /// Delete slices owned by the caller.
    DeleteOwnSlice,

    /// Delete any slice.
    DeleteAnySlice,

    /// See slices of every owner.
    ViewAllSlices,
}

//--------------------------------------------------------------------------------------------------
// Types: Records
//--------------------------------------------------------------------------------------------------

/// A VM that belongs to a stored slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, CopyGetters)]
pub struct Vm {
    /// The identifier of the VM, unique within its slice.
    #[getset(get = "pub with_prefix")]
    pub(crate) id: String,

    /// The name of the VM, `vm<N>`.
    #[getset(get = "pub with_prefix")]
    pub(crate) name: String,

    /// The number of vCPUs.
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) cpu: u32,

    /// RAM in MiB.
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) memory: u32,

    /// Disk in GiB.
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) disk: u32,

    /// The flavor the VM was sized from.
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) flavor: Flavor,

    /// The disk image the VM boots from.
    #[getset(get = "pub with_prefix")]
    pub(crate) image: String,

    /// The address of the VM inside the slice subnet.
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) ip: Ipv4Addr,

    /// The VNC console port of the VM.
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) vnc_port: u16,

    /// Whether remote access to the VM was requested.
    #[serde(default)]
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) remote_access: bool,

    /// The status of the VM.
    #[serde(default)]
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) status: VmStatus,
}

/// A topology pattern applied to a group of VMs in a slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, CopyGetters)]
pub struct TopologySegment {
    /// The pattern.
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) kind: TopologyKind,

    /// The slice-wide indices of the VMs in the segment, in pattern order.
    #[getset(get = "pub with_prefix")]
    pub(crate) members: Vec<usize>,

    /// The links the pattern produced, over slice-wide indices.
    #[getset(get = "pub with_prefix")]
    pub(crate) edges: Vec<Link>,
}

/// A named, owner-scoped collection of VMs wired into one or more topologies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, CopyGetters)]
pub struct Slice {
    /// The identifier of the slice, unique across the store.
    #[getset(get = "pub with_prefix")]
    pub(crate) id: String,

    /// The user-given name.
    #[getset(get = "pub with_prefix")]
    pub(crate) name: String,

    /// The identity of the creator.
    #[getset(get = "pub with_prefix")]
    pub(crate) owner: String,

    /// The VLAN that isolates the slice network.
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) vlan: u16,

    /// The topology label, e.g. `linear-3VMS+ring-4VMS`.
    #[getset(get = "pub with_prefix")]
    pub(crate) topology: String,

    /// The lifecycle status.
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) status: SliceStatus,

    /// Whether the slice has outbound internet access.
    #[serde(default)]
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) internet_egress: bool,

    /// When the slice was created.
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) created_at: DateTime<Utc>,

    /// The topology segments, in the order they were added.
    #[serde(default)]
    #[getset(get = "pub with_prefix")]
    pub(crate) segments: Vec<TopologySegment>,

    /// The links added by hand.
    #[serde(default)]
    #[getset(get = "pub with_prefix")]
    pub(crate) links: Vec<Link>,

    /// The VMs, in declaration order.
    #[getset(get = "pub with_prefix")]
    pub(crate) vms: Vec<Vm>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl SliceStatus {
    /// Returns the lowercase name of the status.
    pub fn name(&self) -> &'static str {
        match self {
            SliceStatus::Creating => "creating",
            SliceStatus::Active => "active",
            SliceStatus::Inactive => "inactive",
        }
    }
}

impl SliceAction {
    /// Returns the snake case name of the action.
    pub fn name(&self) -> &'static str {
        match self {
            SliceAction::CreateSlice => "create_slice",
            SliceAction::DeleteOwnSlice => "delete_own_slice",
            SliceAction::DeleteAnySlice => "delete_any_slice",
            SliceAction::ViewAllSlices => "view_all_slices",
        }
    }
}

impl TopologySegment {
    /// Returns the label of the segment, e.g. `ring-4VMS`.
    pub fn label(&self) -> String {
        format!("{}-{}VMS", self.kind, self.members.len())
    }
}

impl Slice {
    /// Returns every link of the slice: segment links first, then manual ones.
    pub fn edges(&self) -> impl Iterator<Item = Link> + '_ {
        self.segments
            .iter()
            .flat_map(|segment| segment.edges.iter().copied())
            .chain(self.links.iter().copied())
    }

    /// Returns true if `identity` owns the slice. Identities compare case-insensitively.
    pub fn is_owned_by(&self, identity: &str) -> bool {
        self.owner.to_lowercase() == identity.to_lowercase()
    }

    /// Returns a VM by name.
    pub fn get_vm(&self, name: &str) -> Option<&Vm> {
        self.vms.iter().find(|vm| vm.name == name)
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for SliceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SliceStatus {
    type Err = SliceError;

    fn from_str(s: &str) -> SliceResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "creating" => Ok(SliceStatus::Creating),
            "active" => Ok(SliceStatus::Active),
            "inactive" => Ok(SliceStatus::Inactive),
            other => Err(SliceError::custom(anyhow::anyhow!(
                "unknown slice status '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for SliceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
