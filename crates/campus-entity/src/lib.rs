//! # campus-entity
//!
//! Domain entity models for the Campus Portal sync layer. Every struct in
//! this crate represents a data store row or a derived value object. All
//! entities derive `Debug`, `Clone`, `Serialize`, and `Deserialize`, and
//! persisted entities declare their table name and upsert conflict target
//! as associated constants.

pub mod notice;
