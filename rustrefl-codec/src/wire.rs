//! Fixed-width little-endian wire primitives.
//!
//! The format fixes the order and structure of the record layout; the
//! scalar widths live here so encoder and decoder share one definition.

use crate::{Error, Result};

/// A scalar that can cross the wire at a fixed width.
pub trait WireScalar: Sized + Copy {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Appends the little-endian encoding of `self` to `out`.
    fn to_wire(self, out: &mut Vec<u8>);

    /// Decodes from exactly [`Self::WIDTH`] bytes.
    fn from_wire(bytes: &[u8]) -> Self;
}

macro_rules! impl_wire_scalar {
    ($($ty:ty),*) => {
        $(
            impl WireScalar for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn to_wire(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn from_wire(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    Self::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_wire_scalar!(i32, u32, u64, f64);

impl WireScalar for bool {
    const WIDTH: usize = 1;

    #[inline]
    fn to_wire(self, out: &mut Vec<u8>) {
        out.push(u8::from(self));
    }

    #[inline]
    fn from_wire(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

/// Append-only byte buffer for encoding.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a scalar.
    #[inline]
    pub fn put<T: WireScalar>(&mut self, value: T) {
        value.to_wire(&mut self.buf);
    }

    /// Appends a fixed-size array element by element.
    #[inline]
    pub fn put_array<T: WireScalar, const N: usize>(&mut self, values: [T; N]) {
        for value in values {
            self.put(value);
        }
    }

    /// Appends a count (dimensionality or extent) as a `u64`.
    #[allow(clippy::cast_possible_truncation)]
    #[inline]
    pub fn put_count(&mut self, value: usize) {
        self.put(value as u64);
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consumes the writer, returning the encoded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over a byte buffer for decoding.
///
/// Every read checks the remaining length first and fails with
/// [`Error::BufferUnderrun`] rather than reading past the end.
#[derive(Debug)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader over `buf` positioned at the start.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Returns the number of unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns true if every byte has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Takes the next `n` bytes.
    ///
    /// # Errors
    /// Returns [`Error::BufferUnderrun`] if fewer than `n` bytes remain.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::BufferUnderrun {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Reads one scalar.
    ///
    /// # Errors
    /// Returns [`Error::BufferUnderrun`] if the buffer is exhausted.
    #[inline]
    pub fn get<T: WireScalar>(&mut self) -> Result<T> {
        let bytes = self.take(T::WIDTH)?;
        Ok(T::from_wire(bytes))
    }

    /// Reads a fixed-size array element by element.
    ///
    /// # Errors
    /// Returns [`Error::BufferUnderrun`] if the buffer is exhausted.
    pub fn get_array<T: WireScalar + Default, const N: usize>(&mut self) -> Result<[T; N]> {
        let mut values = [T::default(); N];
        for value in &mut values {
            *value = self.get()?;
        }
        Ok(values)
    }

    /// Reads a count (dimensionality or extent) written as a `u64`.
    ///
    /// The count itself is not bounds-checked here: an extent may legally
    /// exceed the remaining byte count when a sibling extent is zero.
    /// Consumers that turn counts into byte lengths ([`Self::take`],
    /// [`Self::get_vec`]) enforce the buffer bounds.
    ///
    /// # Errors
    /// Returns [`Error::BufferUnderrun`] on exhaustion, or if the count
    /// does not fit the address space.
    pub fn get_count(&mut self) -> Result<usize> {
        let raw: u64 = self.get()?;
        usize::try_from(raw).map_err(|_| Error::BufferUnderrun {
            needed: usize::MAX,
            remaining: self.remaining(),
        })
    }

    /// Reads `count` scalars into a vector.
    ///
    /// The total byte length is checked up front so an absurd count fails
    /// before any allocation.
    ///
    /// # Errors
    /// Returns [`Error::BufferUnderrun`] if the buffer is exhausted.
    pub fn get_vec<T: WireScalar>(&mut self, count: usize) -> Result<Vec<T>> {
        let total = count.checked_mul(T::WIDTH).unwrap_or(usize::MAX);
        if total > self.remaining() {
            return Err(Error::BufferUnderrun {
                needed: total,
                remaining: self.remaining(),
            });
        }
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.get()?);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_round_trip() {
        let mut writer = ByteWriter::new();
        writer.put(-42_i32);
        writer.put(7_u32);
        writer.put(1234_u64);
        writer.put(2.5_f64);
        writer.put(true);
        writer.put(false);
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 4 + 4 + 8 + 8 + 1 + 1);

        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.get::<i32>().unwrap(), -42);
        assert_eq!(reader.get::<u32>().unwrap(), 7);
        assert_eq!(reader.get::<u64>().unwrap(), 1234);
        assert_eq!(reader.get::<f64>().unwrap(), 2.5);
        assert!(reader.get::<bool>().unwrap());
        assert!(!reader.get::<bool>().unwrap());
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_underrun_on_short_buffer() {
        let bytes = [0u8; 3];
        let mut reader = ByteReader::new(&bytes);
        match reader.get::<f64>() {
            Err(Error::BufferUnderrun { needed, remaining }) => {
                assert_eq!(needed, 8);
                assert_eq!(remaining, 3);
            }
            other => panic!("expected underrun, got {other:?}"),
        }
        // Failed read must not advance the cursor.
        assert_eq!(reader.remaining(), 3);
    }

    #[test]
    fn test_array_round_trip() {
        let mut writer = ByteWriter::new();
        writer.put_array([1_i32, -2, 3]);
        let bytes = writer.into_bytes();

        let mut reader = ByteReader::new(&bytes);
        let values: [i32; 3] = reader.get_array().unwrap();
        assert_eq!(values, [1, -2, 3]);
    }

    #[test]
    fn test_counts_may_exceed_remaining_bytes() {
        // A count is an element count, not a byte length; reading one must
        // not depend on how much of the buffer is left.
        let mut writer = ByteWriter::new();
        writer.put(5000_u64);
        let bytes = writer.into_bytes();

        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.get_count().unwrap(), 5000);
        assert!(matches!(
            reader.get_vec::<f64>(5000),
            Err(Error::BufferUnderrun { .. })
        ));
    }

    #[test]
    fn test_get_vec_checks_total_before_allocating() {
        let mut writer = ByteWriter::new();
        writer.put(1.0_f64);
        let bytes = writer.into_bytes();

        let mut reader = ByteReader::new(&bytes);
        assert!(matches!(
            reader.get_vec::<f64>(usize::MAX / 4),
            Err(Error::BufferUnderrun { .. })
        ));
        assert_eq!(reader.get_vec::<f64>(1).unwrap(), vec![1.0]);
    }
}
