//! rustrefl-codec: Versioned binary serialization for reflection records.
//!
//! This crate defines the wire format for [`rustrefl_core::Reflection`]:
//! shared fixed-width primitives, the symmetric [`codec::encode`] /
//! [`codec::decode`] pair, and a length-prefixed file container with
//! memory-mapped reading.

pub mod codec;
pub mod error;
pub mod io;
pub mod wire;

pub use codec::{decode, encode, FORMAT_VERSION};
pub use error::{Error, Result};
pub use io::{MappedReflectionReader, RecordSlices, ReflectionFileWriter};
pub use wire::{ByteReader, ByteWriter, WireScalar};
