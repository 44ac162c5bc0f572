//! # Synctree Transactions
//!
//! Optimistic-transaction coordinator for the Synctree client.
//!
//! A transaction runs a read-modify-write callback against one location in
//! the locally cached tree with all-or-nothing semantics under concurrent
//! remote mutation, without a server-side lock:
//!
//! 1. The callback executes on a bounded worker pool, never on the engine
//!    run loop.
//! 2. Every read is fetched on the run loop and recorded with the content
//!    hash observed at read time; all reads must precede all writes.
//! 3. At commit, the read set is re-validated by hash and the write set is
//!    applied as one atomic multipath update, both inside a single
//!    serialized engine task.
//! 4. On conflict the callback reruns from scratch with a fresh attempt,
//!    up to a bounded number of retries.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use synctree_engine::SyncedEngine;
//! use synctree_txn::TransactionCoordinator;
//! use synctree_types::{Path, TreeValue};
//!
//! let engine = Arc::new(SyncedEngine::new());
//! let coordinator = TransactionCoordinator::new(Arc::clone(&engine));
//! let counter = Path::parse("/counter")?;
//!
//! let committed = coordinator.run(counter, |txn| {
//!     let location = txn.location().clone();
//!     let current = match txn.read_at(&location)?.value() {
//!         TreeValue::Int(n) => *n,
//!         _ => 0,
//!     };
//!     txn.write(location, TreeValue::int(current + 1));
//!     Ok(())
//! })?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod attempt;
mod config;
mod coordinator;
mod error;
mod pool;
mod transaction;

pub use attempt::{Attempt, ReadRecord, WriteRecord};
pub use config::{CoordinatorConfig, PoolConfig};
pub use coordinator::{CommitOutcome, TransactionCoordinator, TransactionHandle};
pub use error::{TxnError, TxnResult};
pub use pool::{TaskHandle, WorkerPool};
pub use transaction::Transaction;
