use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{SliceError, SliceResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A topology pattern that can be applied to a group of VMs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopologyKind {
    /// A chain: every VM is linked to the next one.
    Linear,

    /// A chain whose last VM is linked back to the first one.
    Ring,

    /// A binary tree rooted at the first VM.
    Tree,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl TopologyKind {
    /// Returns the lowercase name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            TopologyKind::Linear => "linear",
            TopologyKind::Ring => "ring",
            TopologyKind::Tree => "tree",
        }
    }

    /// Returns the smallest number of VMs a segment of this kind can hold.
    pub fn min_members(&self) -> usize {
        match self {
            TopologyKind::Linear => 2,
            TopologyKind::Ring => 3,
            TopologyKind::Tree => 5,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TopologyKind {
    type Err = SliceError;

    fn from_str(s: &str) -> SliceResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(TopologyKind::Linear),
            "ring" => Ok(TopologyKind::Ring),
            "tree" => Ok(TopologyKind::Tree),
            other => Err(SliceError::custom(anyhow::anyhow!(
                "unknown topology kind '{}', expected one of: linear, ring, tree",
                other
            ))),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_kind_minimums() {
        assert_eq!(TopologyKind::Linear.min_members(), 2);
        assert_eq!(TopologyKind::Ring.min_members(), 3);
        assert_eq!(TopologyKind::Tree.min_members(), 5);
    }

    #[test]
    fn test_topology_kind_parse() {
        assert_eq!("Ring".parse::<TopologyKind>().unwrap(), TopologyKind::Ring);
        assert_eq!(" tree".parse::<TopologyKind>().unwrap(), TopologyKind::Tree);
        assert!("star".parse::<TopologyKind>().is_err());
    }
}
