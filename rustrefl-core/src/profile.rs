//! N-dimensional dense profile container for shoebox data.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of values a shape implies.
///
/// A zero-length shape denotes the empty container and implies zero values,
/// not the mathematical empty product of one. An overflowing product
/// saturates; no real backing store can match it, so such shapes fail the
/// length check rather than wrapping to a spurious small count.
#[must_use]
pub fn element_count(shape: &[usize]) -> usize {
    if shape.is_empty() {
        0
    } else {
        shape
            .iter()
            .try_fold(1_usize, |acc, &extent| acc.checked_mul(extent))
            .unwrap_or(usize::MAX)
    }
}

/// An N-dimensional dense array with an explicit shape and a flat,
/// row-major backing store.
///
/// Profiles hold the pixel region around a diffraction spot (the shoebox),
/// its mask, its background estimate, or its transformed counterpart. The
/// shape is an ordered sequence of per-axis extents; the backing length is
/// always `element_count(shape)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Profile<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T> Profile<T> {
    /// Creates a profile from a shape and its flat backing values.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] if `data.len()` differs from the
    /// value count implied by `shape`.
    pub fn new(shape: Vec<usize>, data: Vec<T>) -> Result<Self> {
        let expected = element_count(&shape);
        if data.len() != expected {
            return Err(Error::ShapeMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Creates the empty profile (dimensionality zero, no values).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            shape: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Returns the per-axis extents.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the dimensionality.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the profile holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the flat values in row-major order.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.data
    }

    /// Returns the flat values mutably.
    ///
    /// The length is fixed by the shape; callers may overwrite values but
    /// not grow or shrink the store.
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the profile, returning its shape and flat values.
    #[must_use]
    pub fn into_parts(self) -> (Vec<usize>, Vec<T>) {
        (self.shape, self.data)
    }
}

impl<T: Clone> Profile<T> {
    /// Creates a profile of the given shape with every value set to `elem`.
    #[must_use]
    pub fn from_elem(shape: Vec<usize>, elem: T) -> Self {
        let n = element_count(&shape);
        Self {
            shape,
            data: vec![elem; n],
        }
    }
}

impl<T> Default for Profile<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(feature = "ndarray")]
mod ndarray_conv {
    use super::Profile;
    use crate::Error;
    use ndarray::ArrayD;

    impl<T> TryFrom<ArrayD<T>> for Profile<T> {
        type Error = Error;

        fn try_from(array: ArrayD<T>) -> Result<Self, Error> {
            let shape = array.shape().to_vec();
            let data = array.into_iter().collect();
            Profile::new(shape, data)
        }
    }

    impl<T> TryFrom<Profile<T>> for ArrayD<T> {
        type Error = ndarray::ShapeError;

        fn try_from(profile: Profile<T>) -> Result<Self, ndarray::ShapeError> {
            let (shape, data) = profile.into_parts();
            ArrayD::from_shape_vec(shape, data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_count() {
        assert_eq!(element_count(&[]), 0);
        assert_eq!(element_count(&[4]), 4);
        assert_eq!(element_count(&[2, 3]), 6);
        assert_eq!(element_count(&[3, 4, 5]), 60);
        assert_eq!(element_count(&[2, 0, 5]), 0);
    }

    #[test]
    fn test_element_count_saturates_on_overflow() {
        assert_eq!(element_count(&[usize::MAX, 2]), usize::MAX);
        assert!(Profile::new(vec![usize::MAX, 2], vec![0.0_f64; 4]).is_err());
    }

    #[test]
    fn test_zero_extent_shapes_hold_no_values() {
        let p = Profile::new(vec![1000, 0], Vec::<f64>::new()).unwrap();
        assert_eq!(p.shape(), &[1000, 0]);
        assert_eq!(p.ndim(), 2);
        assert!(p.is_empty());
    }

    #[test]
    fn test_new_checks_length() {
        let p = Profile::new(vec![2, 3], vec![0.0_f64; 6]).unwrap();
        assert_eq!(p.shape(), &[2, 3]);
        assert_eq!(p.ndim(), 2);
        assert_eq!(p.len(), 6);

        let err = Profile::new(vec![2, 3], vec![0.0_f64; 5]).unwrap_err();
        match err {
            Error::ShapeMismatch {
                expected, actual, ..
            } => {
                assert_eq!(expected, 6);
                assert_eq!(actual, 5);
            }
        }
    }

    #[test]
    fn test_empty_profile() {
        let p: Profile<f64> = Profile::empty();
        assert_eq!(p.ndim(), 0);
        assert_eq!(p.len(), 0);
        assert!(p.is_empty());
        assert_eq!(p, Profile::default());
    }

    #[test]
    fn test_from_elem() {
        let p = Profile::from_elem(vec![2, 2, 2], 7_i32);
        assert_eq!(p.len(), 8);
        assert!(p.values().iter().all(|&v| v == 7));
    }

    #[test]
    fn test_values_mut() {
        let mut p = Profile::from_elem(vec![3], 0.0_f64);
        p.values_mut()[1] = 2.5;
        assert_eq!(p.values(), &[0.0, 2.5, 0.0]);
    }

    #[test]
    fn test_into_parts() {
        let p = Profile::new(vec![2, 2], vec![1, 2, 3, 4]).unwrap();
        let (shape, data) = p.into_parts();
        assert_eq!(shape, vec![2, 2]);
        assert_eq!(data, vec![1, 2, 3, 4]);
    }

    #[cfg(feature = "ndarray")]
    #[test]
    fn test_ndarray_round_trip() {
        use ndarray::ArrayD;

        let p = Profile::new(vec![2, 3], (0..6).map(f64::from).collect()).unwrap();
        let array: ArrayD<f64> = p.clone().try_into().unwrap();
        assert_eq!(array.shape(), &[2, 3]);
        let back: Profile<f64> = array.try_into().unwrap();
        assert_eq!(back, p);
    }
}
