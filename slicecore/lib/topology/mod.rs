//! Topology patterns and graph checks.
//!
//! A slice wires its VMs together with links. Links come either from a topology segment, a
//! pattern such as a chain, a ring or a binary tree applied to a group of VMs, or are added by
//! hand. Before a slice can be stored, the VMs and all of their links must form one connected
//! graph.

mod connectivity;
mod generator;
mod kind;
mod link;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use connectivity::*;
pub use generator::*;
pub use kind::*;
pub use link::*;
