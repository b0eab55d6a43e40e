//! Read-side queries over an `EventStore`.

mod event;
mod index;

pub use event::{EventRepository, QuerySettings};
pub use index::{Direction, IndexRepository, SortOrder};
