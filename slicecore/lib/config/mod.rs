//! Configuration types and helpers.

mod defaults;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod flavor;

pub use defaults::*;
pub use flavor::{Flavor, FlavorSpecs, UnknownFlavor};
