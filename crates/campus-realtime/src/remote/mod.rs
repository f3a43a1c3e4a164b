//! Hosted change feed client.

pub mod feed;
pub mod frame;

pub use feed::RemoteChangeFeed;
