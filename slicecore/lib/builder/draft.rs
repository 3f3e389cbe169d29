use std::{fmt, mem};

use getset::{CopyGetters, Getters};

use crate::{
    config::{MAX_SEGMENT_VMS, MAX_SLICE_NAME_LEN, MAX_TOPOLOGY_SEGMENTS},
    models::TopologySegment,
    topology::{self, Link, TopologyKind},
    SliceResult, ValidationError,
};

use super::{DraftVm, VmSpec};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The lifecycle of a draft.
///
/// ```text
/// Empty ──▶ Accumulating ──▶ Finalized
///   │            │
///   └────────────┴─────────▶ Cancelled
/// ```
///
/// `Finalized` and `Cancelled` are terminal: every operation on such a draft fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftState {
    /// Nothing has been added yet.
    Empty,

    /// VMs, segments or links have been added.
    Accumulating,

    /// The draft was turned into a [`FinalizedSlice`].
    Finalized,

    /// The draft was abandoned.
    Cancelled,
}

/// Builds a slice draft step by step.
///
/// ## Examples
///
/// ```
/// use slicecore::{builder::{SliceBuilder, VmSpec}, topology::TopologyKind};
///
/// # fn main() -> slicecore::SliceResult<()> {
/// let mut builder = SliceBuilder::new("lab")?;
/// builder.add_topology_segment(TopologyKind::Linear, vec![VmSpec::default(); 3])?;
///
/// let slice = builder.finalize()?;
/// assert_eq!(slice.get_topology(), "linear-3VMS");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SliceBuilder {
    name: String,
    internet_egress: bool,
    vms: Vec<DraftVm>,
    segments: Vec<TopologySegment>,
    links: Vec<Link>,
    edges: Vec<Link>,
    state: DraftState,
}

/// VM, link and segment counts of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftSummary {
    /// Number of VMs.
    pub vms: usize,

    /// Number of links, from segments and manual ones.
    pub links: usize,

    /// Number of topology segments.
    pub segments: usize,
}

/// A validated draft, ready for resource allocation.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct FinalizedSlice {
    /// The slice name.
    #[getset(get = "pub with_prefix")]
    pub(crate) name: String,

    /// The topology label.
    #[getset(get = "pub with_prefix")]
    pub(crate) topology: String,

    /// Whether the slice has outbound internet access.
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) internet_egress: bool,

    /// The VMs, in draft order.
    #[getset(get = "pub with_prefix")]
    pub(crate) vms: Vec<DraftVm>,

    /// The topology segments.
    #[getset(get = "pub with_prefix")]
    pub(crate) segments: Vec<TopologySegment>,

    /// The links added by hand.
    #[getset(get = "pub with_prefix")]
    pub(crate) links: Vec<Link>,

    /// Every link of the slice.
    #[getset(get = "pub with_prefix")]
    pub(crate) edges: Vec<Link>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl SliceBuilder {
    /// Starts an empty draft.
    ///
    /// The name is trimmed and must be non-empty and at most 20 characters long.
    pub fn new(name: impl AsRef<str>) -> SliceResult<Self> {
        let name = validate_slice_name(name.as_ref())?;
        Ok(Self {
            name,
            internet_egress: false,
            vms: Vec::new(),
            segments: Vec::new(),
            links: Vec::new(),
            edges: Vec::new(),
            state: DraftState::Empty,
        })
    }

    /// Sets whether the slice gets outbound internet access.
    pub fn set_internet_egress(&mut self, enabled: bool) -> SliceResult<()> {
        self.ensure_open()?;
        self.internet_egress = enabled;
        Ok(())
    }

    /// Appends a single VM and returns its index.
    ///
    /// The VM does not need to be linked to anything yet.
    pub fn add_vm(&mut self, spec: VmSpec) -> SliceResult<usize> {
        self.ensure_open()?;

        let index = self.vms.len();
        let vm = DraftVm::from_spec(index, &spec)?;
        tracing::debug!("draft '{}': added {} ({})", self.name, vm.name, vm.flavor);

        self.vms.push(vm);
        self.state = DraftState::Accumulating;
        Ok(index)
    }

    /// Appends one VM per spec, wires them with the links of `kind` and returns the segment
    /// index.
    ///
    /// Fails without touching the draft if there are fewer VMs than the kind needs, more than
    /// 10, or if the draft already has 3 segments.
    pub fn add_topology_segment(
        &mut self,
        kind: TopologyKind,
        specs: Vec<VmSpec>,
    ) -> SliceResult<usize> {
        self.ensure_open()?;

        if self.segments.len() >= MAX_TOPOLOGY_SEGMENTS {
            return Err(ValidationError::TooManySegments {
                max: MAX_TOPOLOGY_SEGMENTS,
            }
            .into());
        }

        let count = specs.len();
        if count < kind.min_members() {
            return Err(ValidationError::SegmentTooSmall {
                kind,
                count,
                min: kind.min_members(),
            }
            .into());
        }

        if count > MAX_SEGMENT_VMS {
            return Err(ValidationError::SegmentTooLarge {
                count,
                max: MAX_SEGMENT_VMS,
            }
            .into());
        }

        let start = self.vms.len();
        let vms = specs
            .iter()
            .enumerate()
            .map(|(offset, spec)| DraftVm::from_spec(start + offset, spec))
            .collect::<SliceResult<Vec<_>>>()?;

        let members: Vec<usize> = (start..start + count).collect();
        let edges: Vec<Link> = topology::generate_edges(kind, count)
            .iter()
            .map(|link| link.map(|position| members[position]))
            .collect();

        self.vms.extend(vms);
        self.edges.extend(edges.iter().copied());
        self.segments.push(TopologySegment {
            kind,
            members,
            edges,
        });
        self.state = DraftState::Accumulating;

        let index = self.segments.len() - 1;
        tracing::debug!(
            "draft '{}': added {} segment #{} with {} VMs",
            self.name,
            kind,
            index,
            count
        );

        Ok(index)
    }

    /// Links two VMs by index.
    ///
    /// Fails if either index is out of range, if both are the same VM, or if the VMs are
    /// already linked, by a segment or by hand.
    pub fn add_manual_link(&mut self, a: usize, b: usize) -> SliceResult<()> {
        self.ensure_open()?;

        let count = self.vms.len();
        for index in [a, b] {
            if index >= count {
                return Err(ValidationError::VmIndexOutOfRange { index, count }.into());
            }
        }

        if a == b {
            return Err(ValidationError::SelfLink(a).into());
        }

        let link = Link::new(a, b);
        if self.edges.contains(&link) {
            return Err(ValidationError::DuplicateLink(link.a(), link.b()).into());
        }

        self.links.push(link);
        self.edges.push(link);
        self.state = DraftState::Accumulating;
        tracing::debug!(
            "draft '{}': linked {} <-> {}",
            self.name,
            self.vms[link.a()].name,
            self.vms[link.b()].name
        );

        Ok(())
    }

    /// Validates the draft and turns it into a [`FinalizedSlice`].
    ///
    /// Fails if the draft has no VMs or if its VMs are not all connected. A failed call leaves
    /// the draft open so it can be corrected.
    pub fn finalize(&mut self) -> SliceResult<FinalizedSlice> {
        self.ensure_open()?;

        let total = self.vms.len();
        if total == 0 {
            return Err(ValidationError::NoVms.into());
        }

        let reachable = topology::reachable_count(total, &self.edges);
        if reachable != total {
            return Err(ValidationError::Disconnected { reachable, total }.into());
        }

        let topology = self.topology_label();
        self.state = DraftState::Finalized;
        tracing::debug!("draft '{}' finalized as {}", self.name, topology);

        Ok(FinalizedSlice {
            name: self.name.clone(),
            topology,
            internet_egress: self.internet_egress,
            vms: mem::take(&mut self.vms),
            segments: mem::take(&mut self.segments),
            links: mem::take(&mut self.links),
            edges: mem::take(&mut self.edges),
        })
    }

    /// Abandons the draft.
    pub fn cancel(&mut self) -> SliceResult<()> {
        self.ensure_open()?;
        self.state = DraftState::Cancelled;
        tracing::debug!("draft '{}' cancelled", self.name);
        Ok(())
    }

    /// Returns the label the draft would be finalized with.
    ///
    /// Segments are labelled `<kind>-<n>VMS` and joined with `+`. A draft without segments is
    /// labelled `manual-<n>VMS`.
    pub fn topology_label(&self) -> String {
        if self.segments.is_empty() {
            return format!("manual-{}VMS", self.vms.len());
        }

        self.segments
            .iter()
            .map(TopologySegment::label)
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Returns the slice name.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Returns the state of the draft.
    pub fn get_state(&self) -> DraftState {
        self.state
    }

    /// Returns the VMs of the draft.
    pub fn get_vms(&self) -> &[DraftVm] {
        &self.vms
    }

    /// Returns the topology segments of the draft.
    pub fn get_segments(&self) -> &[TopologySegment] {
        &self.segments
    }

    /// Returns every link of the draft.
    pub fn get_edges(&self) -> &[Link] {
        &self.edges
    }

    /// Returns the VM, link and segment counts.
    pub fn summary(&self) -> DraftSummary {
        DraftSummary {
            vms: self.vms.len(),
            links: self.edges.len(),
            segments: self.segments.len(),
        }
    }

    fn ensure_open(&self) -> SliceResult<()> {
        match self.state {
            DraftState::Finalized | DraftState::Cancelled => {
                Err(ValidationError::DraftClosed(self.state).into())
            }
            DraftState::Empty | DraftState::Accumulating => Ok(()),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Trims a slice name and checks that it is non-empty and at most 20 characters long.
pub fn validate_slice_name(name: &str) -> SliceResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptySliceName.into());
    }

    let len = name.chars().count();
    if len > MAX_SLICE_NAME_LEN {
        return Err(ValidationError::SliceNameTooLong {
            len,
            max: MAX_SLICE_NAME_LEN,
        }
        .into());
    }

    Ok(name.to_string())
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for DraftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DraftState::Empty => "empty",
            DraftState::Accumulating => "accumulating",
            DraftState::Finalized => "finalized",
            DraftState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

impl fmt::Display for DraftSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VMs: {} | Links: {} | Topologies: {}",
            self.vms, self.links, self.segments
        )
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
