//! Types shared by every layer of the community listings client: listing
//! categories, wire-level failure codes and the three-state [`Resource`]
//! handed to presentation code.

pub mod constants;
pub mod error;
pub mod resource;
pub mod types;

pub use error::RemoteFailure;
pub use resource::Resource;
pub use types::{ItemType, PriceRange};
