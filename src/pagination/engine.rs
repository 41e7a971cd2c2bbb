use crate::error::{Error, Result};

use super::cursor::{DecodedCursor, Direction};

/// One owner-scoped, sort-key-ordered row set that can be paged over. The
/// two live implementations differ only in their filter: all collections of
/// one owner, or all items of one owner's collection.
pub trait KeysetView {
    type Row;

    fn sort_key(row: &Self::Row) -> &str;

    /// Newest rows first, no boundary.
    fn head(&self, limit: i64) -> Result<Vec<Self::Row>>;
    /// Rows with sort key <= boundary, descending.
    fn at_or_before(&self, boundary: &str, limit: i64) -> Result<Vec<Self::Row>>;
    /// Rows with sort key >= boundary, ascending.
    fn at_or_after(&self, boundary: &str, limit: i64) -> Result<Vec<Self::Row>>;
    /// Sort key of the first row strictly below the boundary, if any.
    fn key_below(&self, boundary: &str) -> Result<Option<String>>;
    /// Sort key of the first row strictly above the boundary, if any.
    fn key_above(&self, boundary: &str) -> Result<Option<String>>;
    /// Count of the whole set, ignoring any cursor.
    fn count(&self) -> Result<i64>;
}

/// A page in descending sort-key order plus the cursors bounding it.
#[derive(Debug)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub next_cursor: Option<String>,
    pub prev_cursor: Option<String>,
    pub total: i64,
}

/// Resolves an optional cursor and a page size against a view.
///
/// Boundary comparisons are inclusive: a cursor carries the exact sort key
/// of the edge row of the page it points at. A boundary whose row was
/// deleted in the meantime degrades to a shifted window via the inequality,
/// never an error. The page query, the two neighbor lookups, and the count
/// are separate statements with no shared snapshot; concurrent writes
/// between them can shift a boundary by the rows mutated in that window.
pub fn paginate<V: KeysetView>(
    view: &V,
    cursor: Option<&str>,
    page_size: i64,
) -> Result<Page<V::Row>> {
    if page_size <= 0 {
        return Err(Error::InvalidPageSize(page_size));
    }

    let rows = match cursor {
        None => view.head(page_size)?,
        Some(encoded) => {
            let cursor = DecodedCursor::decode(encoded)?;
            match cursor.direction {
                Direction::Next => view.at_or_before(&cursor.boundary, page_size)?,
                Direction::Prev => {
                    // Queried ascending so the limit grabs the rows nearest
                    // the boundary; reversed to restore the external order.
                    let mut ascending = view.at_or_after(&cursor.boundary, page_size)?;
                    ascending.reverse();
                    ascending
                }
            }
        }
    };

    let (next_cursor, prev_cursor) = match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => (
            view.key_below(V::sort_key(last))?
                .map(|key| DecodedCursor::new(Direction::Next, key).encode()),
            view.key_above(V::sort_key(first))?
                .map(|key| DecodedCursor::new(Direction::Prev, key).encode()),
        ),
        _ => (None, None),
    };

    Ok(Page {
        rows,
        next_cursor,
        prev_cursor,
        total: view.count()?,
    })
}
