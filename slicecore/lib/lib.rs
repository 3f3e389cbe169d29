//! `slicecore` assembles virtual machines into network topologies and manages the lifecycle of
//! the resulting slices.
//!
//! # Overview
//!
//! A slice is a named collection of VMs wired together by links. Links come from topology
//! segments (a chain, a ring or a binary tree applied to a group of VMs) or are added by hand.
//! slicecore handles:
//! - Assembling and validating slice drafts
//! - Assigning VLANs, IP addresses and VNC ports
//! - Storing, listing, pausing and deleting slices with owner-scoped access
//! - Persisting the whole store as JSON or YAML
//!
//! slicecore does not provision anything. It keeps the records a provisioning layer would act
//! on.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use slicecore::{
//!     builder::{SliceBuilder, VmSpec},
//!     management::{SliceStore, StaticPrincipal},
//!     topology::TopologyKind,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut builder = SliceBuilder::new("lab")?;
//!     builder.add_topology_segment(TopologyKind::Ring, vec![VmSpec::with_flavor("tiny"); 4])?;
//!     builder.add_vm(VmSpec::default())?;
//!     builder.add_manual_link(0, 4)?;
//!
//!     let store = SliceStore::open("/path/to/slices.json").await?;
//!     let slice = store
//!         .create(&StaticPrincipal::user("alice"), builder.finalize()?)
//!         .await?;
//!
//!     println!("{} is on vlan {}", slice.get_id(), slice.get_vlan());
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`builder`] - Slice drafts and VM specs
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Limits, defaults and the flavor catalog
//! - [`management`] - Resource allocation, the slice store and its persistence
//! - [`models`] - Persisted slice and VM records
//! - [`topology`] - Topology patterns and connectivity checks
//! - [`utils`] - Common utilities and helpers

#![warn(missing_docs)]

mod error;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod builder;
pub mod cli;
pub mod config;
pub mod management;
pub mod models;
pub mod topology;
pub mod utils;

pub use error::*;
