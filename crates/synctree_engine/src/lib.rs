//! # Synctree Engine
//!
//! The synced-tree engine: a single-threaded run loop that owns the locally
//! cached tree and serializes every read and mutation against it.
//!
//! This crate provides:
//! - The serialized execution context (run loop) all engine state lives on
//! - Fetching current node state for a query, with its content hash
//! - Atomic multipath writes anchored in the local write sequence
//! - Ingestion of remote updates from the sync layer
//!
//! ## Key Invariants
//!
//! - All engine state is owned by the run loop thread; there is no
//!   lock-guarded concurrent access from other threads
//! - Tasks submitted to the run loop execute in submission order
//! - A multipath write is applied entirely or not at all; no task ever
//!   observes a partially applied write

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod error;
mod run_loop;
mod state;

pub use engine::SyncedEngine;
pub use error::{EngineError, EngineResult};
pub use run_loop::RunLoop;
pub use state::{EngineState, EngineStats, WriteLogEntry};
