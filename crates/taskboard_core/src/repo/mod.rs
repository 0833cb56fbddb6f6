//! Persistence adapter: snapshot codec and snapshot stores.
//!
//! # Responsibility
//! - Define the load/save contract used at process boundaries.
//! - Isolate SQLite and file details from the board service.
//!
//! # Invariants
//! - Stores read and write whole-board snapshots only.
//! - Malformed snapshots surface as `StoreError::Codec`, never as a board.

pub mod codec;
pub mod snapshot_repo;
