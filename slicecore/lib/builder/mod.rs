//! Slice drafts.
//!
//! A [`SliceBuilder`] accumulates VMs, topology segments and manual links into a draft, checks
//! that the result is one connected network and turns it into a [`FinalizedSlice`] that the
//! store can allocate resources for and persist.

mod draft;
mod vm_spec;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use draft::*;
pub use vm_spec::*;
