//! Stack descriptors.
//!
//! A [`Descriptor`] is the parsed form of a docker-compose document, reduced to
//! what metadata generation cares about: service names and, per service, the
//! port, environment variable and mount identifiers.

mod parse;
mod types;

pub use parse::*;
pub use types::*;
