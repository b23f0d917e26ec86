//! Multi-dimensional arrays.
//!
//! ```text
//! +--------+-----------+----------+---------------------------+----------------------+
//! | ndim   | has_nulls | elem oid | ndim x (len, lower_bound) | elements (row-major) |
//! | i32    | i32 (0/1) | u32      | i32, i32                  | i32 len or -1, bytes |
//! +--------+-----------+----------+---------------------------+----------------------+
//! ```

use bytes::{BufMut, BytesMut};
use fallible_iterator::FallibleIterator;

use super::{IsNull, len_i32, patch_i32, transactional, write_nullable};
use crate::cursor::Cursor;
use crate::error::{DecodeError, EncodeError};
use crate::iter::Counted;
use crate::oid::Oid;

/// Size and lower bound of one array dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayDimension {
    /// Number of elements along this dimension.
    pub len: i32,
    /// Index of the first element (1 unless declared otherwise).
    pub lower_bound: i32,
}

impl ArrayDimension {
    /// A dimension of `len` elements starting at index 1.
    pub const fn new(len: i32) -> Self {
        Self { len, lower_bound: 1 }
    }
}

/// Serializes an array value.
///
/// `serializer` writes one element and reports whether it was NULL. The
/// number of elements must equal the product of the dimension lengths (zero
/// for an array with no dimensions); otherwise nothing is written.
pub fn array_to_sql<T, I, J, F>(
    dimensions: I,
    element_type: Oid,
    elements: J,
    mut serializer: F,
    buf: &mut BytesMut,
) -> Result<(), EncodeError>
where
    I: IntoIterator<Item = ArrayDimension>,
    J: IntoIterator<Item = T>,
    F: FnMut(T, &mut BytesMut) -> Result<IsNull, EncodeError>,
{
    transactional(buf, |buf| {
        let header_idx = buf.len();
        buf.put_i32(0);
        buf.put_i32(0);
        buf.put_u32(element_type);

        let mut ndim = 0_usize;
        let mut expected = 1_usize;
        for dim in dimensions {
            if dim.len < 0 {
                return Err(EncodeError::InvalidValue("negative array dimension length"));
            }
            ndim += 1;
            expected = expected
                .checked_mul(dim.len as usize)
                .ok_or(EncodeError::ValueTooLarge {
                    what: "array element count",
                    len: usize::MAX,
                })?;
            buf.put_i32(dim.len);
            buf.put_i32(dim.lower_bound);
        }
        if ndim == 0 {
            expected = 0;
        }
        patch_i32(buf, header_idx, len_i32("array dimension count", ndim)?);

        let mut has_nulls = false;
        let mut actual = 0_usize;
        for element in elements {
            actual += 1;
            if actual > expected {
                continue;
            }
            write_nullable(
                |buf| {
                    let is_null = serializer(element, buf)?;
                    has_nulls |= is_null == IsNull::Yes;
                    Ok(is_null)
                },
                buf,
            )?;
        }
        if actual != expected {
            return Err(EncodeError::ElementCountMismatch { expected, actual });
        }
        patch_i32(buf, header_idx + 4, i32::from(has_nulls));
        Ok(())
    })
}

/// Deserializes an array value.
///
/// The header and dimensions are validated eagerly; elements are decoded
/// lazily by [`Array::values`].
pub fn array_from_sql(buf: &[u8]) -> Result<Array<'_>, DecodeError> {
    let mut cur = Cursor::new(buf);
    let ndim = cur.read_i32()?;
    if ndim < 0 {
        return Err(DecodeError::InvalidFormat("negative array dimension count"));
    }
    let has_nulls = match cur.read_i32()? {
        0 => false,
        1 => true,
        _ => return Err(DecodeError::InvalidFormat("invalid array null flag")),
    };
    let element_type = cur.read_u32()?;

    let dims = cur.read_bytes(ndim as usize * 8)?;
    let mut elements = if ndim == 0 { 0_usize } else { 1 };
    let mut dim_cur = Cursor::new(dims);
    for _ in 0..ndim {
        let len = dim_cur.read_i32()?;
        let _lower_bound = dim_cur.read_i32()?;
        if len < 0 {
            return Err(DecodeError::InvalidFormat("negative array dimension length"));
        }
        elements = elements
            .checked_mul(len as usize)
            .ok_or(DecodeError::InvalidFormat("array element count overflows"))?;
    }

    Ok(Array {
        ndim: ndim as usize,
        has_nulls,
        element_type,
        elements,
        dims,
        values: cur.take_remaining(),
    })
}

/// A borrowed view of a binary array value.
#[derive(Debug, Clone, Copy)]
pub struct Array<'a> {
    ndim: usize,
    has_nulls: bool,
    element_type: Oid,
    elements: usize,
    dims: &'a [u8],
    values: &'a [u8],
}

impl<'a> Array<'a> {
    /// Whether the sender flagged NULL elements.
    pub fn has_nulls(&self) -> bool {
        self.has_nulls
    }

    /// OID of the element type.
    pub fn element_type(&self) -> Oid {
        self.element_type
    }

    /// Number of dimensions.
    pub fn dimension_count(&self) -> usize {
        self.ndim
    }

    /// Total number of elements declared by the dimensions.
    pub fn element_count(&self) -> usize {
        self.elements
    }

    /// Iterator over the dimensions.
    pub fn dimensions(&self) -> ArrayDimensions<'a> {
        ArrayDimensions(Counted::new(self.dims, self.ndim))
    }

    /// Iterator over the element values in row-major order.
    pub fn values(&self) -> ArrayValues<'a> {
        ArrayValues(Counted::new(self.values, self.elements))
    }
}

/// An iterator over the dimensions of an array.
#[derive(Debug, Clone)]
pub struct ArrayDimensions<'a>(Counted<'a>);

impl<'a> FallibleIterator for ArrayDimensions<'a> {
    type Item = ArrayDimension;
    type Error = DecodeError;

    fn next(&mut self) -> Result<Option<ArrayDimension>, DecodeError> {
        self.0.step(|cur| {
            Ok(ArrayDimension {
                len: cur.read_i32()?,
                lower_bound: cur.read_i32()?,
            })
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

/// An iterator over the values of an array, in row-major order.
///
/// NULL elements are yielded as `None`.
#[derive(Debug, Clone)]
pub struct ArrayValues<'a>(Counted<'a>);

impl<'a> FallibleIterator for ArrayValues<'a> {
    type Item = Option<&'a [u8]>;
    type Error = DecodeError;

    fn next(&mut self) -> Result<Option<Option<&'a [u8]>>, DecodeError> {
        self.0.step(Cursor::read_nullable)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}
