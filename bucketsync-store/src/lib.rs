//! # bucketsync-store
//!
//! The object-store boundary the sync core talks to.
//!
//! [`RemoteStore`] is the capability trait; [`DirBucket`] is a bucket backed
//! by a local directory, and [`DryRunStore`] wraps any store so that only
//! listing touches it.

pub mod dir_bucket;
pub mod dry_run;
pub mod error;
pub mod index;
pub mod policy;
pub mod store;

pub use dir_bucket::DirBucket;
pub use dry_run::DryRunStore;
pub use error::RemoteError;
pub use policy::{ObjectHeaders, ObjectPolicy};
pub use store::RemoteStore;
