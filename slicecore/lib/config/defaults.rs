use std::{path::PathBuf, sync::LazyLock};

use crate::utils::SLICECORE_HOME_DIR;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The maximum number of characters in a slice name.
pub const MAX_SLICE_NAME_LEN: usize = 20;

/// The maximum number of topology segments in a single slice.
pub const MAX_TOPOLOGY_SEGMENTS: usize = 3;

/// The maximum number of VMs in a single topology segment.
pub const MAX_SEGMENT_VMS: usize = 10;

/// The flavor used when a requested flavor is not in the catalog.
pub const DEFAULT_FLAVOR: &str = "small";

/// The disk image used when a VM does not name one.
pub const DEFAULT_IMAGE: &str = "cirros-0.5.1-x86_64-disk.img";

/// Disk images offered by the slice builder.
pub const KNOWN_IMAGES: &[&str] = &[DEFAULT_IMAGE, "ubuntu-22.04-server-cloudimg-amd64.img"];

/// The first VNC port handed out to VMs.
pub const VNC_BASE_PORT: u16 = 5900;

/// The first two octets of every slice subnet. A slice on VLAN `v` uses `10.7.v.0/24`.
pub const SLICE_SUBNET_PREFIX: [u8; 2] = [10, 7];

/// The highest VLAN that still fits in the third octet of the slice subnet.
pub const MAX_VLAN: u32 = 255;

/// The highest host octet a VM can be given. `.1` is reserved for the gateway.
pub const MAX_HOST_OCTET: u8 = 254;

/// The default filename of the slice store inside the slicecore home directory.
pub const DEFAULT_STORE_FILENAME: &str = "slices.json";

/// The path where all slicecore global data is stored.
pub static DEFAULT_SLICECORE_HOME: LazyLock<PathBuf> = LazyLock::new(|| {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(SLICECORE_HOME_DIR)
});

