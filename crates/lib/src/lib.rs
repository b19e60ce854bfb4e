//! casagen-lib: versioned metadata diff & merge engine
//!
//! Turns a docker-compose descriptor into app-store metadata and keeps that
//! metadata in step with the descriptor across runs:
//! - `descriptor`: compose parsing into a typed service tree
//! - `metadata`: the metadata model, skeleton builder and params overrides
//! - `diff` / `merge`: structural diff and text-preserving merge
//! - `fill`: the external text-generation contract
//! - `snapshot`: fingerprinted, rollback-capable snapshot storage
//! - `update`: the orchestrator tying one update cycle together

pub mod consts;
pub mod descriptor;
pub mod diff;
pub mod fill;
pub mod merge;
pub mod metadata;
pub mod paths;
pub mod snapshot;
pub mod update;
pub mod util;
