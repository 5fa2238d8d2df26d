//! Versioned binary encoder/decoder for [`Reflection`] records.
//!
//! The layout is fixed per format version: a `u32` version tag, the scalar
//! fields in declaration order, then the four shoebox profiles in order
//! {shoebox, mask, background, transformed}. Each profile stores its
//! dimensionality, then one extent per axis, then the flat values; the value
//! count is implied by the shape and never stored. Field order is part of
//! the format: neither side may reorder it independently, and a layout
//! change requires a new version tag with an explicit decode branch.

use crate::wire::{ByteReader, ByteWriter, WireScalar};
use crate::{Error, Result};
use rustrefl_core::{element_count, Profile, Reflection};

/// The format version this codec writes and the only one it reads.
pub const FORMAT_VERSION: u32 = 1;

fn put_profile<T: WireScalar>(writer: &mut ByteWriter, profile: &Profile<T>) {
    writer.put_count(profile.ndim());
    for &extent in profile.shape() {
        writer.put_count(extent);
    }
    for &value in profile.values() {
        writer.put(value);
    }
}

fn get_profile<T: WireScalar>(reader: &mut ByteReader<'_>) -> Result<Profile<T>> {
    let ndim = reader.get_count()?;
    let mut shape = Vec::with_capacity(ndim);
    for _ in 0..ndim {
        shape.push(reader.get_count()?);
    }
    let values = reader.get_vec(element_count(&shape))?;
    Ok(Profile::new(shape, values)?)
}

/// Encodes a reflection record to its versioned byte representation.
///
/// Encoding is infallible for a well-formed record and does not mutate the
/// source; the only side effect is growth of the output buffer.
#[must_use]
pub fn encode(reflection: &Reflection) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    writer.put(FORMAT_VERSION);

    writer.put_array(reflection.miller_index);
    writer.put(reflection.status);
    writer.put(reflection.entering);
    writer.put(reflection.rotation_angle);
    writer.put_array(reflection.beam_vector);
    writer.put_array(reflection.image_coord_px);
    writer.put_array(reflection.image_coord_mm);
    writer.put(reflection.frame_number);
    writer.put(reflection.panel_number);
    writer.put_array(reflection.bounding_box);
    writer.put_array(reflection.centroid_position);
    writer.put_array(reflection.centroid_variance);
    writer.put_array(reflection.centroid_sq_width);
    writer.put(reflection.intensity);
    writer.put(reflection.intensity_variance);
    writer.put(reflection.corrected_intensity);
    writer.put(reflection.corrected_intensity_variance);

    put_profile(&mut writer, &reflection.shoebox);
    put_profile(&mut writer, &reflection.shoebox_mask);
    put_profile(&mut writer, &reflection.shoebox_background);
    put_profile(&mut writer, &reflection.transformed_shoebox);

    writer.into_bytes()
}

/// Decodes a reflection record from bytes produced by [`encode`].
///
/// The version tag is validated before anything else is read. Decoded
/// integer fields are not range-checked: buffers are assumed to come from a
/// trusted producer, and this layer only enforces format structure.
///
/// # Errors
/// Returns [`Error::VersionMismatch`] if the buffer was written with a
/// different format version, or [`Error::BufferUnderrun`] if the buffer is
/// shorter than the layout requires. No partial record is ever returned.
pub fn decode(bytes: &[u8]) -> Result<Reflection> {
    let mut reader = ByteReader::new(bytes);

    let version: u32 = reader.get()?;
    if version != FORMAT_VERSION {
        return Err(Error::VersionMismatch {
            found: version,
            supported: FORMAT_VERSION,
        });
    }

    Ok(Reflection {
        miller_index: reader.get_array()?,
        status: reader.get()?,
        entering: reader.get()?,
        rotation_angle: reader.get()?,
        beam_vector: reader.get_array()?,
        image_coord_px: reader.get_array()?,
        image_coord_mm: reader.get_array()?,
        frame_number: reader.get()?,
        panel_number: reader.get()?,
        bounding_box: reader.get_array()?,
        centroid_position: reader.get_array()?,
        centroid_variance: reader.get_array()?,
        centroid_sq_width: reader.get_array()?,
        intensity: reader.get()?,
        intensity_variance: reader.get()?,
        corrected_intensity: reader.get()?,
        corrected_intensity_variance: reader.get()?,
        shoebox: get_profile(&mut reader)?,
        shoebox_mask: get_profile(&mut reader)?,
        shoebox_background: get_profile(&mut reader)?,
        transformed_shoebox: get_profile(&mut reader)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_layout() {
        let profile = Profile::new(vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let mut writer = ByteWriter::new();
        put_profile(&mut writer, &profile);
        let bytes = writer.into_bytes();
        // ndim + 2 extents + 6 values, 8 bytes each
        assert_eq!(bytes.len(), 8 * (1 + 2 + 6));

        let mut reader = ByteReader::new(&bytes);
        let back: Profile<f64> = get_profile(&mut reader).unwrap();
        assert_eq!(back, profile);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_empty_profile_is_one_count() {
        let profile: Profile<i32> = Profile::empty();
        let mut writer = ByteWriter::new();
        put_profile(&mut writer, &profile);
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 8);

        let mut reader = ByteReader::new(&bytes);
        let back: Profile<i32> = get_profile(&mut reader).unwrap();
        assert!(back.is_empty());
        assert_eq!(back.ndim(), 0);
    }

    #[test]
    fn test_version_tag_leads_the_buffer() {
        let bytes = encode(&Reflection::new());
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.get::<u32>().unwrap(), FORMAT_VERSION);
    }
}
