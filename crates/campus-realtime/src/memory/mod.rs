//! In-process change hub.

pub mod hub;

pub use hub::MemoryChangeHub;
