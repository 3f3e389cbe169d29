use std::net::Ipv4Addr;

use chrono::Utc;

use crate::{
    builder::FinalizedSlice,
    config::{MAX_HOST_OCTET, MAX_VLAN, SLICE_SUBNET_PREFIX, VNC_BASE_PORT},
    models::{Slice, SliceStatus, Vm, VmStatus},
    AllocationError, SliceResult,
};

use super::StoreSnapshot;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const SLICE_ID_PREFIX: &str = "slice_";

const SLICE_ID_HEX_LEN: usize = 12;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Assigns an id, a VLAN and per-VM addresses and VNC ports to a finalized draft.
///
/// - The id is `slice_` followed by 12 hex characters of a v4 UUID, regenerated on collision.
/// - The VLAN is one more than the highest VLAN in the store, or 1 for an empty store.
/// - VM `n` (1-based) gets `10.7.<vlan>.<n + 1>` and VNC port `5900 + vnc_counter + n`.
///
/// The returned slice is `Creating`. Advancing the VNC counter is left to the caller, which
/// owns the snapshot.
pub fn allocate(snapshot: &StoreSnapshot, draft: FinalizedSlice, owner: &str) -> SliceResult<Slice> {
    let id = next_slice_id(snapshot);
    let vlan = next_vlan(snapshot)?;

    let count = draft.vms.len();
    if count + 1 > MAX_HOST_OCTET as usize {
        return Err(AllocationError::TooManyVms {
            count,
            max: MAX_HOST_OCTET as usize - 1,
        }
        .into());
    }

    let vms = draft
        .vms
        .into_iter()
        .enumerate()
        .map(|(i, vm)| {
            let n = i + 1;
            Ok(Vm {
                id: format!("{}_vm_{}", id, n),
                name: vm.name,
                cpu: vm.cpu,
                memory: vm.memory,
                disk: vm.disk,
                flavor: vm.flavor,
                image: vm.image,
                ip: vm_ip(vlan, n),
                vnc_port: vnc_port(snapshot.vnc_counter, n)?,
                remote_access: vm.remote_access,
                status: VmStatus::Pending,
            })
        })
        .collect::<SliceResult<Vec<_>>>()?;

    tracing::debug!(
        "allocated {} on vlan {} with {} VMs (vnc offset {})",
        id,
        vlan,
        vms.len(),
        snapshot.vnc_counter
    );

    Ok(Slice {
        id,
        name: draft.name,
        owner: owner.to_string(),
        vlan,
        topology: draft.topology,
        status: SliceStatus::Creating,
        internet_egress: draft.internet_egress,
        created_at: Utc::now(),
        segments: draft.segments,
        links: draft.links,
        vms,
    })
}

/// Returns the VLAN the next slice gets.
pub fn next_vlan(snapshot: &StoreSnapshot) -> SliceResult<u16> {
    let next = snapshot
        .slices
        .iter()
        .map(|slice| u32::from(slice.vlan))
        .max()
        .map_or(1, |max| max + 1);

    if next > MAX_VLAN {
        return Err(AllocationError::VlanExhausted {
            next,
            max: MAX_VLAN,
        }
        .into());
    }

    Ok(next as u16)
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn next_slice_id(snapshot: &StoreSnapshot) -> String {
    loop {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        let id = format!("{}{}", SLICE_ID_PREFIX, &hex[..SLICE_ID_HEX_LEN]);
        if snapshot.position(&id).is_none() {
            return id;
        }

        tracing::debug!("slice id {} already taken, regenerating", id);
    }
}

fn vm_ip(vlan: u16, n: usize) -> Ipv4Addr {
    let [a, b] = SLICE_SUBNET_PREFIX;
    Ipv4Addr::new(a, b, vlan as u8, (n + 1) as u8)
}

fn vnc_port(counter: u32, n: usize) -> SliceResult<u16> {
    u16::try_from(u64::from(VNC_BASE_PORT) + u64::from(counter) + n as u64)
        .map_err(|_| AllocationError::VncPortsExhausted.into())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builder::{SliceBuilder, VmSpec},
        topology::TopologyKind,
        SliceError,
    };

    fn linear(name: &str, count: usize) -> FinalizedSlice {
        let mut builder = SliceBuilder::new(name).unwrap();
        builder
            .add_topology_segment(TopologyKind::Linear, vec![VmSpec::default(); count])
            .unwrap();
        builder.finalize().unwrap()
    }

    fn stored(snapshot: &mut StoreSnapshot, slice: Slice) {
        snapshot.vnc_counter += slice.vms.len() as u32;
        snapshot.slices.push(slice);
    }

    #[test]
    fn test_allocate_on_empty_store() {
        let snapshot = StoreSnapshot::default();
        let slice = allocate(&snapshot, linear("lab", 3), "alice").unwrap();

        assert!(slice.id.starts_with("slice_"));
        assert_eq!(slice.id.len(), "slice_".len() + 12);
        assert!(slice.id["slice_".len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit()));

        assert_eq!(slice.vlan, 1);
        assert_eq!(slice.owner, "alice");
        assert_eq!(slice.status, SliceStatus::Creating);
        assert_eq!(slice.topology, "linear-3VMS");

        let ips: Vec<_> = slice.vms.iter().map(|vm| vm.ip.to_string()).collect();
        assert_eq!(ips, vec!["10.7.1.2", "10.7.1.3", "10.7.1.4"]);

        let ports: Vec<_> = slice.vms.iter().map(|vm| vm.vnc_port).collect();
        assert_eq!(ports, vec![5901, 5902, 5903]);

        assert_eq!(slice.vms[0].id, format!("{}_vm_1", slice.id));
    }

    #[test]
    fn test_allocate_follows_existing_slices() {
        let mut snapshot = StoreSnapshot::default();
        let first = allocate(&snapshot, linear("one", 2), "alice").unwrap();
        stored(&mut snapshot, first);

        let second = allocate(&snapshot, linear("two", 2), "bob").unwrap();
        assert_eq!(second.vlan, 2);
        assert_eq!(second.vms[0].ip, Ipv4Addr::new(10, 7, 2, 2));
        assert_eq!(second.vms[0].vnc_port, 5903);
        assert_eq!(second.vms[1].vnc_port, 5904);
    }

    #[test]
    fn test_next_vlan_uses_highest_existing() {
        let mut snapshot = StoreSnapshot::default();
        let mut slice = allocate(&snapshot, linear("gap", 2), "alice").unwrap();
        slice.vlan = 7;
        stored(&mut snapshot, slice);

        assert_eq!(next_vlan(&snapshot).unwrap(), 8);
    }

    #[test]
    fn test_allocate_vlan_exhausted() {
        let mut snapshot = StoreSnapshot::default();
        let mut slice = allocate(&snapshot, linear("full", 2), "alice").unwrap();
        slice.vlan = 255;
        stored(&mut snapshot, slice);

        let result = allocate(&snapshot, linear("more", 2), "alice");
        assert!(matches!(
            result,
            Err(SliceError::Allocation(AllocationError::VlanExhausted {
                next: 256,
                max: 255
            }))
        ));
    }

    #[test]
    fn test_allocate_vnc_ports_exhausted() {
        let snapshot = StoreSnapshot {
            vnc_counter: u32::from(u16::MAX - VNC_BASE_PORT) - 1,
            ..Default::default()
        };

        let result = allocate(&snapshot, linear("ports", 2), "alice");
        assert!(matches!(
            result,
            Err(SliceError::Allocation(AllocationError::VncPortsExhausted))
        ));
    }
}
