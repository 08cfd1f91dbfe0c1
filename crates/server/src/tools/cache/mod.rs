//! Cache inspection tools.
//!
//! These read and prune the partition storage directly, independent of the
//! gateway's lifecycle state.

pub mod list;
pub mod purge;

pub use list::{CacheListParams, list_impl};
pub use purge::{CachePurgeParams, purge_impl};
