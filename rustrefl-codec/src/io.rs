//! File persistence for encoded reflection records.
//!
//! A reflection file is a flat sequence of records, each a `u64`
//! little-endian length prefix followed by the encoded bytes.

use crate::codec::{decode, encode};
use crate::wire::ByteReader;
use crate::Result;
use memmap2::Mmap;
use rayon::prelude::*;
use rustrefl_core::Reflection;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writer for reflection record files.
pub struct ReflectionFileWriter {
    writer: BufWriter<File>,
}

impl ReflectionFileWriter {
    /// Creates a new file writer, truncating any existing file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer })
    }

    /// Encodes one reflection and appends it with its length prefix.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_reflection(&mut self, reflection: &Reflection) -> Result<()> {
        let encoded = encode(reflection);
        self.writer.write_all(&(encoded.len() as u64).to_le_bytes())?;
        self.writer.write_all(&encoded)?;
        Ok(())
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if the flush fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Memory-mapped reader for reflection record files.
///
/// Uses memmap2 to access the file contents without loading the whole file
/// into memory; individual records are decoded on demand.
pub struct MappedReflectionReader {
    // None for a zero-length file, which cannot be mapped.
    mmap: Option<Mmap>,
}

impl MappedReflectionReader {
    /// Opens a reflection file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(Self { mmap: None });
        }
        // SAFETY: The file is opened read-only and we assume it is not modified
        // concurrently. This is the standard safety contract for memory mapping.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { mmap: Some(mmap) })
    }

    /// Returns the file contents as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// Returns an iterator over the encoded record slices.
    ///
    /// A malformed length prefix or truncated payload yields one
    /// `BufferUnderrun` and ends the iteration.
    #[must_use]
    pub fn records(&self) -> RecordSlices<'_> {
        RecordSlices {
            reader: ByteReader::new(self.as_bytes()),
            failed: false,
        }
    }

    /// Counts the records by scanning the length prefixes.
    ///
    /// # Errors
    /// Returns [`crate::Error::BufferUnderrun`] if the file is truncated.
    pub fn record_count(&self) -> Result<usize> {
        let mut count = 0;
        for record in self.records() {
            record?;
            count += 1;
        }
        Ok(count)
    }

    /// Decodes every record in the file, in file order.
    ///
    /// The record slices are located sequentially, then decoded in parallel;
    /// each decode operates on a disjoint sub-slice of the mapping.
    ///
    /// # Errors
    /// Returns the first codec error encountered.
    pub fn read_all(&self) -> Result<Vec<Reflection>> {
        let slices: Vec<&[u8]> = self.records().collect::<Result<_>>()?;
        slices.par_iter().map(|bytes| decode(bytes)).collect()
    }
}

/// Iterator over the encoded record slices of a mapped file.
pub struct RecordSlices<'a> {
    reader: ByteReader<'a>,
    failed: bool,
}

impl<'a> Iterator for RecordSlices<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.is_exhausted() {
            return None;
        }
        let result = self
            .reader
            .get_count()
            .and_then(|len| self.reader.take(len));
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use rustrefl_core::Profile;
    use tempfile::NamedTempFile;

    fn sample(h: i32) -> Reflection {
        Reflection {
            miller_index: [h, 2, 3],
            intensity: f64::from(h) * 10.0,
            shoebox: Profile::from_elem(vec![2, 2], 1.5),
            shoebox_mask: Profile::from_elem(vec![2, 2], 1),
            ..Reflection::new()
        }
    }

    #[test]
    fn test_write_then_read_all() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = ReflectionFileWriter::create(file.path()).unwrap();
        for h in 1..=5 {
            writer.write_reflection(&sample(h)).unwrap();
        }
        writer.flush().unwrap();

        let reader = MappedReflectionReader::open(file.path()).unwrap();
        assert_eq!(reader.record_count().unwrap(), 5);

        let records = reader.read_all().unwrap();
        assert_eq!(records.len(), 5);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(*record, sample(i as i32 + 1));
        }
    }

    #[test]
    fn test_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let reader = MappedReflectionReader::open(file.path()).unwrap();
        assert_eq!(reader.record_count().unwrap(), 0);
        assert!(reader.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_truncated_file_is_an_underrun() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = ReflectionFileWriter::create(file.path()).unwrap();
        writer.write_reflection(&sample(1)).unwrap();
        writer.flush().unwrap();

        let full = std::fs::read(file.path()).unwrap();
        let truncated = NamedTempFile::new().unwrap();
        std::fs::write(truncated.path(), &full[..full.len() - 4]).unwrap();

        let reader = MappedReflectionReader::open(truncated.path()).unwrap();
        assert!(matches!(
            reader.record_count(),
            Err(Error::BufferUnderrun { .. })
        ));
    }
}
