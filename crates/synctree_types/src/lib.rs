//! # Synctree Types
//!
//! Shared data model for the Synctree client:
//! - Hierarchical tree values with deterministic content hashes
//! - Tree locations (paths) and filtered queries
//! - User-facing snapshots
//! - Write-sequence identifiers
//!
//! These types are the narrow surface the transaction coordinator and the
//! synced-tree engine exchange; they carry no engine or network state.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod path;
mod query;
mod snapshot;
mod types;
mod value;

pub use error::{TypeError, TypeResult};
pub use path::Path;
pub use query::Query;
pub use snapshot::Snapshot;
pub use types::WriteId;
pub use value::{TreeValue, ValueHash};
