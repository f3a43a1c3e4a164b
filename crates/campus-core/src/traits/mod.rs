//! Abstract interfaces between the sync layer and its backing services.

pub mod changes;
pub mod datastore;

pub use changes::{ChangeEvent, ChangeFeed, ChangeHandler, ChangePublisher, SubscriptionHandle};
pub use datastore::DataStore;
