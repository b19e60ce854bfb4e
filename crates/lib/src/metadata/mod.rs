//! Human-readable metadata for a stack.
//!
//! A [`MetadataTree`] mirrors a [`Descriptor`](crate::descriptor::Descriptor):
//! one [`AppMetadata`] record plus, per service, ordered lists of
//! [`FieldDescription`] for ports, environment variables and volumes.

mod locator;
mod params;
mod skeleton;
mod types;

pub use locator::*;
pub use params::*;
pub use skeleton::*;
pub use types::*;
