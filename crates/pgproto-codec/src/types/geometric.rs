//! Geometric types: `POINT`, `BOX` and `PATH`.

use bytes::{BufMut, BytesMut};
use fallible_iterator::FallibleIterator;

use super::{len_i32, patch_i32, transactional};
use crate::cursor::Cursor;
use crate::error::{DecodeError, EncodeError};
use crate::iter::Counted;

/// A Postgres point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn read(cur: &mut Cursor<'_>) -> Result<Point, DecodeError> {
        Ok(Point {
            x: cur.read_f64()?,
            y: cur.read_f64()?,
        })
    }
}

/// A Postgres box, stored as its upper-right and lower-left corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box {
    pub upper_right: Point,
    pub lower_left: Point,
}

/// Serializes a point value.
pub fn point_to_sql(x: f64, y: f64, buf: &mut BytesMut) {
    buf.put_f64(x);
    buf.put_f64(y);
}

/// Deserializes a point value.
pub fn point_from_sql(buf: &[u8]) -> Result<Point, DecodeError> {
    let mut cur = Cursor::new(buf);
    let point = Point::read(&mut cur)?;
    cur.finish()?;
    Ok(point)
}

/// Serializes a box value from its upper-right (`x1`, `y1`) and lower-left
/// (`x2`, `y2`) corners.
pub fn box_to_sql(x1: f64, y1: f64, x2: f64, y2: f64, buf: &mut BytesMut) {
    point_to_sql(x1, y1, buf);
    point_to_sql(x2, y2, buf);
}

/// Deserializes a box value.
pub fn box_from_sql(buf: &[u8]) -> Result<Box, DecodeError> {
    let mut cur = Cursor::new(buf);
    let upper_right = Point::read(&mut cur)?;
    let lower_left = Point::read(&mut cur)?;
    cur.finish()?;
    Ok(Box {
        upper_right,
        lower_left,
    })
}

/// Serializes a path value.
pub fn path_to_sql<I>(closed: bool, points: I, buf: &mut BytesMut) -> Result<(), EncodeError>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    transactional(buf, |buf| {
        buf.put_u8(u8::from(closed));
        let count_idx = buf.len();
        buf.put_i32(0);

        let mut count = 0_usize;
        for (x, y) in points {
            count += 1;
            point_to_sql(x, y, buf);
        }
        patch_i32(buf, count_idx, len_i32("path point count", count)?);
        Ok(())
    })
}

/// Deserializes a path value.
pub fn path_from_sql(buf: &[u8]) -> Result<Path<'_>, DecodeError> {
    let mut cur = Cursor::new(buf);
    let closed = match cur.read_u8()? {
        0 => false,
        1 => true,
        _ => return Err(DecodeError::InvalidFormat("invalid path closed flag")),
    };
    let points = cur.read_i32()?;
    if points < 0 {
        return Err(DecodeError::InvalidFormat("negative path point count"));
    }
    Ok(Path {
        closed,
        points: points as usize,
        buf: cur.take_remaining(),
    })
}

/// A Postgres path.
#[derive(Debug, Clone, Copy)]
pub struct Path<'a> {
    closed: bool,
    points: usize,
    buf: &'a [u8],
}

impl<'a> Path<'a> {
    /// Whether the path is closed (a polygon outline) or open.
    pub fn closed(&self) -> bool {
        self.closed
    }

    /// Number of points declared by the header.
    pub fn len(&self) -> usize {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points == 0
    }

    /// An iterator over the points of the path.
    pub fn points(&self) -> PathPoints<'a> {
        PathPoints(Counted::new(self.buf, self.points))
    }
}

/// An iterator over the points of a Postgres path.
#[derive(Debug, Clone)]
pub struct PathPoints<'a>(Counted<'a>);

impl FallibleIterator for PathPoints<'_> {
    type Item = Point;
    type Error = DecodeError;

    fn next(&mut self) -> Result<Option<Point>, DecodeError> {
        self.0.step(Point::read)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}
