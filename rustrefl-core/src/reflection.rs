//! The crystallographic reflection record.

use crate::Profile;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single crystallographic observation: indexing, geometry, intensity,
/// and the raw pixel-region profiles around the spot.
///
/// All fields are public: the record and its codec are co-designed and the
/// upstream algorithms that populate it write fields directly. The record is
/// transient; it is created by upstream processing, serialized on demand,
/// and reconstructed fresh on deserialization.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reflection {
    /// Miller index (h, k, l) of the lattice plane.
    pub miller_index: [i32; 3],
    /// Processing status bitmask.
    pub status: u32,
    /// True if the reflection enters the Ewald sphere, false if it exits.
    pub entering: bool,
    /// Rotation angle of the observation in radians.
    pub rotation_angle: f64,
    /// Diffracted beam vector.
    pub beam_vector: [f64; 3],
    /// Image coordinate in pixel space (x, y).
    pub image_coord_px: [f64; 2],
    /// Image coordinate in millimetre space (x, y).
    pub image_coord_mm: [f64; 2],
    /// Frame on which the reflection was recorded.
    pub frame_number: i32,
    /// Detector panel the reflection falls on.
    pub panel_number: i32,
    /// Bounding box (x0, x1, y0, y1, z0, z1) of the shoebox region.
    pub bounding_box: [i32; 6],
    /// Centroid position (x, y, z).
    pub centroid_position: [f64; 3],
    /// Centroid variance per axis.
    pub centroid_variance: [f64; 3],
    /// Centroid squared width per axis.
    pub centroid_sq_width: [f64; 3],
    /// Raw integrated intensity.
    pub intensity: f64,
    /// Variance of the raw intensity.
    pub intensity_variance: f64,
    /// Intensity after correction.
    pub corrected_intensity: f64,
    /// Variance of the corrected intensity.
    pub corrected_intensity_variance: f64,
    /// Shoebox pixel values.
    pub shoebox: Profile<f64>,
    /// Shoebox pixel mask.
    pub shoebox_mask: Profile<i32>,
    /// Shoebox background estimate.
    pub shoebox_background: Profile<f64>,
    /// Shoebox after profile transformation.
    pub transformed_shoebox: Profile<f64>,
}

impl Reflection {
    /// Creates an empty record with zeroed fields and empty profiles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_zeroed() {
        let r = Reflection::new();
        assert_eq!(r.miller_index, [0, 0, 0]);
        assert_eq!(r.status, 0);
        assert!(!r.entering);
        assert_eq!(r.rotation_angle, 0.0);
        assert!(r.shoebox.is_empty());
        assert!(r.shoebox_mask.is_empty());
        assert!(r.shoebox_background.is_empty());
        assert!(r.transformed_shoebox.is_empty());
    }
}
