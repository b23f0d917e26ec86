//! Fallible, lazy iteration over wire sub-structures.
//!
//! Every streaming decoder in this crate (array dimensions and values, path
//! points, hstore entries, row description fields, data row ranges, error
//! fields, parameter OIDs, column formats, SASL mechanisms) implements
//! [`FallibleIterator`]. `next` returns `Ok(Some(item))`, `Ok(None)` at the
//! end, or `Err` for a malformed item.
//!
//! The decoders are forward-only and single-pass and hold no more than the
//! cursor into the borrowed buffer. After an error they exhaust that cursor,
//! so a caller that keeps polling sees `Ok(None)` and never a later item.
//! Generic combinators (`count`, `collect`, `map`, `filter`, `zip`) come from
//! the `fallible-iterator` crate and short-circuit on the first error.

pub use fallible_iterator::{FallibleIterator, IntoFallibleIterator};

use crate::cursor::Cursor;
use crate::error::DecodeError;

/// A countdown of declared items over a cursor.
///
/// Shared by the decoders whose wire form is "count, then items": it yields
/// exactly `remaining` items, requires the buffer to be consumed afterwards,
/// and exhausts itself on the first error.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Counted<'a> {
    pub(crate) cur: Cursor<'a>,
    pub(crate) remaining: usize,
}

impl<'a> Counted<'a> {
    pub(crate) fn new(buf: &'a [u8], remaining: usize) -> Self {
        Self {
            cur: Cursor::new(buf),
            remaining,
        }
    }

    /// Decodes the next item with `f`, enforcing the declared count.
    pub(crate) fn step<T, F>(&mut self, f: F) -> Result<Option<T>, DecodeError>
    where
        F: FnOnce(&mut Cursor<'a>) -> Result<T, DecodeError>,
    {
        if self.remaining == 0 {
            let res = self.cur.finish();
            return self.fail(res).map(|()| None);
        }
        self.remaining -= 1;
        let res = f(&mut self.cur);
        self.fail(res).map(Some)
    }

    fn fail<T>(&mut self, res: Result<T, DecodeError>) -> Result<T, DecodeError> {
        if res.is_err() {
            self.remaining = 0;
        }
        self.cur.guard(res)
    }

    pub(crate) fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
