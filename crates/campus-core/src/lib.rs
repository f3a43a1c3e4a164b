//! # campus-core
//!
//! Core crate for the Campus Portal synchronization layer. Contains traits,
//! configuration schemas, typed identifiers, query types, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other Campus Portal crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
