//! # campus-datastore
//!
//! Data store client implementations for the Campus Portal sync layer.
//! The same row-oriented contract is satisfied by two backends:
//!
//! - **remote**: the hosted row store's REST endpoint, via reqwest
//! - **local**: a process-local file-backed store, one JSON file per table
//!
//! The backend is selected once at startup based on configuration presence,
//! never branched on per call. Callers above this crate are correct against
//! either backend without modification.

pub mod local;
pub mod provider;
pub mod remote;

pub use local::LocalStore;
pub use provider::DataStoreManager;
pub use remote::RemoteStore;
