//! rustrefl-core: Record and container types for crystallographic
//! reflection data.
//!
//! This crate provides the [`Reflection`] observation record and the
//! [`Profile`] shoebox container that the rest of the workspace serializes,
//! persists, and exposes to Python.

pub mod error;
pub mod profile;
pub mod reflection;

pub use error::{Error, Result};
pub use profile::{element_count, Profile};
pub use reflection::Reflection;
