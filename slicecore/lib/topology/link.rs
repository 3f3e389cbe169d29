use std::fmt;

use serde::{Deserialize, Serialize};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A direct network adjacency between two VMs, identified by their indices in the slice.
///
/// Links are unordered. They are always stored normalized, with the lower index first, so two
/// links between the same VMs compare equal regardless of the order they were given in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Link {
    a: usize,
    b: usize,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Link {
    /// Creates a normalized link between two VM indices.
    pub fn new(x: usize, y: usize) -> Self {
        Self {
            a: x.min(y),
            b: x.max(y),
        }
    }

    /// Returns the lower VM index.
    pub fn a(&self) -> usize {
        self.a
    }

    /// Returns the higher VM index.
    pub fn b(&self) -> usize {
        self.b
    }

    /// Returns true if both ends are the same VM.
    pub fn is_loop(&self) -> bool {
        self.a == self.b
    }

    /// Returns the same link with both ends passed through `f`, normalized again.
    pub fn map(&self, f: impl Fn(usize) -> usize) -> Self {
        Self::new(f(self.a), f(self.b))
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl From<(usize, usize)> for Link {
    fn from((x, y): (usize, usize)) -> Self {
        Self::new(x, y)
    }
}

impl From<Link> for (usize, usize) {
    fn from(link: Link) -> Self {
        (link.a, link.b)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.a, self.b)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_is_normalized() {
        assert_eq!(Link::new(3, 1), Link::new(1, 3));
        assert_eq!(Link::new(3, 1).a(), 1);
        assert_eq!(Link::new(3, 1).b(), 3);
        assert!(Link::new(2, 2).is_loop());
    }

    #[test]
    fn test_link_map_renormalizes() {
        let link = Link::new(0, 1).map(|i| 5 - i);
        assert_eq!((link.a(), link.b()), (4, 5));
    }

    #[test]
    fn test_link_serializes_as_pair() {
        assert_eq!(serde_json::to_string(&Link::new(2, 0)).unwrap(), "[0,2]");
        let link: Link = serde_json::from_str("[5,1]").unwrap();
        assert_eq!(link, Link::new(1, 5));
    }
}
