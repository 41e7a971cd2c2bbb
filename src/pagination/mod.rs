mod cursor;
mod engine;
mod view;

pub use cursor::{DecodedCursor, Direction, sort_key};
pub use engine::{KeysetView, Page, paginate};
pub use view::{CollectionSet, ItemSet};
