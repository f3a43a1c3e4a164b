//! Shared domain-neutral types: typed identifiers, query filters,
//! ordering, and the row representation exchanged with the data store.

pub mod filter;
pub mod id;
pub mod row;
pub mod sorting;

pub use filter::{Filter, FilterOp, FilterValue};
pub use id::{BatchId, DepartmentId, NoticeId, UserId};
pub use row::{Row, from_row, from_rows, to_row};
pub use sorting::{OrderBy, SortDirection};
