use getset::{CopyGetters, Getters};
use typed_builder::TypedBuilder;

use crate::{
    config::{Flavor, DEFAULT_FLAVOR, DEFAULT_IMAGE},
    SliceResult, ValidationError,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The user's request for a single VM.
///
/// Resources come from the flavor unless `cpu`, `memory` or `disk` are given explicitly.
///
/// ## Examples
///
/// ```
/// use slicecore::builder::VmSpec;
///
/// let spec = VmSpec::builder().flavor("medium").memory(6144).build();
/// assert_eq!(spec.get_flavor(), "medium");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder, Getters, CopyGetters)]
pub struct VmSpec {
    /// The flavor name. Unknown names fall back to the default flavor.
    #[builder(
        default = DEFAULT_FLAVOR.to_string(),
        setter(transform = |flavor: impl AsRef<str>| flavor.as_ref().to_string())
    )]
    #[getset(get = "pub with_prefix")]
    flavor: String,

    /// Overrides the flavor's vCPU count.
    #[builder(default, setter(strip_option))]
    #[getset(get_copy = "pub with_prefix")]
    cpu: Option<u32>,

    /// Overrides the flavor's RAM in MiB.
    #[builder(default, setter(strip_option))]
    #[getset(get_copy = "pub with_prefix")]
    memory: Option<u32>,

    /// Overrides the flavor's disk in GiB.
    #[builder(default, setter(strip_option))]
    #[getset(get_copy = "pub with_prefix")]
    disk: Option<u32>,

    /// The disk image to boot from.
    #[builder(
        default = DEFAULT_IMAGE.to_string(),
        setter(transform = |image: impl AsRef<str>| image.as_ref().to_string())
    )]
    #[getset(get = "pub with_prefix")]
    image: String,

    /// Whether remote access to the VM is requested.
    #[builder(default)]
    #[getset(get_copy = "pub with_prefix")]
    remote_access: bool,
}

/// A VM inside a draft. It has a position and a size but no network resources yet.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct DraftVm {
    /// The position of the VM in the draft.
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) index: usize,

    /// The name of the VM, `vm<index + 1>`.
    #[getset(get = "pub with_prefix")]
    pub(crate) name: String,

    /// The resolved flavor.
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) flavor: Flavor,

    /// The number of vCPUs.
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) cpu: u32,

    /// RAM in MiB.
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) memory: u32,

    /// Disk in GiB.
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) disk: u32,

    /// The disk image.
    #[getset(get = "pub with_prefix")]
    pub(crate) image: String,

    /// Whether remote access was requested.
    #[getset(get_copy = "pub with_prefix")]
    pub(crate) remote_access: bool,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl VmSpec {
    /// Creates a spec for a VM of the given flavor with every other field defaulted.
    pub fn with_flavor(flavor: impl AsRef<str>) -> Self {
        Self::builder().flavor(flavor).build()
    }
}

impl DraftVm {
    /// Sizes a VM at position `index` from a spec.
    ///
    /// Explicit resources take precedence over the flavor and must be positive.
    pub fn from_spec(index: usize, spec: &VmSpec) -> SliceResult<Self> {
        let name = format!("vm{}", index + 1);
        let flavor = Flavor::resolve(&spec.flavor);
        let defaults = flavor.specs();

        let cpu = positive(&name, "cpu", spec.cpu.unwrap_or(defaults.cpu))?;
        let memory = positive(&name, "memory", spec.memory.unwrap_or(defaults.memory))?;
        let disk = positive(&name, "disk", spec.disk.unwrap_or(defaults.disk))?;

        let image = match spec.image.trim() {
            "" => DEFAULT_IMAGE.to_string(),
            image => image.to_string(),
        };

        Ok(Self {
            index,
            name,
            flavor,
            cpu,
            memory,
            disk,
            image,
            remote_access: spec.remote_access,
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn positive(vm: &str, resource: &'static str, value: u32) -> SliceResult<u32> {
    if value == 0 {
        return Err(ValidationError::ZeroResource {
            vm: vm.to_string(),
            resource,
        }
        .into());
    }

    Ok(value)
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for VmSpec {
    fn default() -> Self {
        Self::builder().build()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SliceError;

    #[test]
    fn test_draft_vm_sized_from_flavor() {
        let vm = DraftVm::from_spec(2, &VmSpec::with_flavor("large")).unwrap();
        assert_eq!(vm.get_name(), "vm3");
        assert_eq!(vm.get_flavor(), Flavor::Large);
        assert_eq!((vm.get_cpu(), vm.get_memory(), vm.get_disk()), (4, 8192, 80));
        assert_eq!(vm.get_image(), DEFAULT_IMAGE);
        assert!(!vm.get_remote_access());
    }

    #[test]
    fn test_draft_vm_explicit_resources_override_flavor() {
        let spec = VmSpec::builder()
            .flavor("tiny")
            .cpu(3)
            .disk(15)
            .image("ubuntu-22.04-server-cloudimg-amd64.img")
            .remote_access(true)
            .build();
        let vm = DraftVm::from_spec(0, &spec).unwrap();
        assert_eq!((vm.get_cpu(), vm.get_memory(), vm.get_disk()), (3, 512, 15));
        assert_eq!(vm.get_image(), "ubuntu-22.04-server-cloudimg-amd64.img");
        assert!(vm.get_remote_access());
    }

    #[test]
    fn test_draft_vm_unknown_flavor_is_small() {
        let vm = DraftVm::from_spec(0, &VmSpec::with_flavor("enormous")).unwrap();
        assert_eq!(vm.get_flavor(), Flavor::Small);
        assert_eq!(vm.get_memory(), 2048);
    }

    #[test]
    fn test_draft_vm_rejects_zero_resources() {
        let spec = VmSpec::builder().memory(0).build();
        let err = DraftVm::from_spec(0, &spec).unwrap_err();
        assert!(matches!(
            err,
            SliceError::Validation(ValidationError::ZeroResource {
                resource: "memory",
                ..
            })
        ));
    }

    #[test]
    fn test_draft_vm_blank_image_uses_default() {
        let spec = VmSpec::builder().image("  ").build();
        let vm = DraftVm::from_spec(0, &spec).unwrap();
        assert_eq!(vm.get_image(), DEFAULT_IMAGE);
    }
}
