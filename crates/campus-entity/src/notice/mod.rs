//! Notice domain entities.

pub mod draft;
pub mod merged;
pub mod model;
pub mod read_state;

pub use draft::NoticeDraft;
pub use merged::MergedNotice;
pub use model::Notice;
pub use read_state::ReadState;
