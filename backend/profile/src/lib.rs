//! `ambassador-profile`: the persisted creator profile.
//!
//! The store never hands back an unusable document: anything missing,
//! corrupted, or owned by someone else degrades to the built-in default.

pub mod error;
pub mod store;

pub use error::ProfileError;
pub use store::ProfileStore;
