//! Slice lifecycle management.
//!
//! [`SliceStore`] owns every stored slice. It assigns network resources to finalized drafts,
//! serves owner-scoped queries and persists each change through a [`SliceRepository`] before
//! making it visible.

mod allocator;
mod persistence;
mod principal;
mod store;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use allocator::*;
pub use persistence::*;
pub use principal::*;
pub use store::*;
