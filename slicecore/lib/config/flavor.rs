//! Flavor catalog.
//!
//! A flavor is a named sizing template for a VM. The catalog is static and lookups never fail:
//! an unknown name resolves to [`DEFAULT_FLAVOR`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::DEFAULT_FLAVOR;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A named VM sizing template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// 1 vCPU, 512 MiB RAM, 1 GiB disk.
    Tiny,

    /// 1 vCPU, 2 GiB RAM, 20 GiB disk.
    Small,

    /// 2 vCPUs, 4 GiB RAM, 40 GiB disk.
    Medium,

    /// 4 vCPUs, 8 GiB RAM, 80 GiB disk.
    Large,

    /// 8 vCPUs, 16 GiB RAM, 160 GiB disk.
    #[serde(rename = "xlarge")]
    XLarge,
}

/// The resources a flavor provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlavorSpecs {
    /// Number of vCPUs.
    pub cpu: u32,

    /// RAM in MiB.
    pub memory: u32,

    /// Disk in GiB.
    pub disk: u32,
}

/// The error returned when parsing a name that is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFlavor(pub String);

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Flavor {
    /// Every flavor in the catalog, smallest first.
    pub const ALL: [Flavor; 5] = [
        Flavor::Tiny,
        Flavor::Small,
        Flavor::Medium,
        Flavor::Large,
        Flavor::XLarge,
    ];

    /// Returns the catalog name of the flavor.
    pub fn name(&self) -> &'static str {
        match self {
            Flavor::Tiny => "tiny",
            Flavor::Small => "small",
            Flavor::Medium => "medium",
            Flavor::Large => "large",
            Flavor::XLarge => "xlarge",
        }
    }

    /// Returns the resources of the flavor.
    pub fn specs(&self) -> FlavorSpecs {
        let (cpu, memory, disk) = match self {
            Flavor::Tiny => (1, 512, 1),
            Flavor::Small => (1, 2048, 20),
            Flavor::Medium => (2, 4096, 40),
            Flavor::Large => (4, 8192, 80),
            Flavor::XLarge => (8, 16384, 160),
        };

        FlavorSpecs { cpu, memory, disk }
    }

    /// Resolves a flavor by name, falling back to the default flavor for unknown names.
    pub fn resolve(name: &str) -> Flavor {
        match name.parse() {
            Ok(flavor) => flavor,
            Err(UnknownFlavor(name)) => {
                tracing::warn!("unknown flavor '{}', using '{}'", name, DEFAULT_FLAVOR);
                Flavor::default()
            }
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Resolves the resources of a flavor by name. Unknown names get the default flavor's resources.
pub fn resolve(name: &str) -> FlavorSpecs {
    Flavor::resolve(name).specs()
}

/// Lists the whole catalog, smallest flavor first.
pub fn list() -> Vec<(Flavor, FlavorSpecs)> {
    Flavor::ALL.iter().map(|f| (*f, f.specs())).collect()
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for Flavor {
    fn default() -> Self {
        Flavor::Small
    }
}

impl FromStr for Flavor {
    type Err = UnknownFlavor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Flavor::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownFlavor(name.to_string()))
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for UnknownFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown flavor '{}'", self.0)
    }
}

impl std::error::Error for UnknownFlavor {}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
