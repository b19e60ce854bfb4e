//! Versioned metadata snapshots.
//!
//! The store keeps one current snapshot, the fingerprint and raw bytes of the
//! descriptor it was committed with, and a bounded, newest-first history of
//! previous snapshots that can be rolled back to.

mod backend;
mod storage;
mod types;

pub use backend::*;
pub use storage::*;
pub use types::*;
