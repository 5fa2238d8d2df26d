//! rustrefl-python: PyO3 Python bindings for rustrefl.
#![allow(
    clippy::doc_markdown,
    clippy::needless_pass_by_value,
    clippy::uninlined_format_args
)]
//!
//! Exposes the `Reflection` record to Python with numpy exchange for the
//! shoebox profiles and pickle support through `__getstate__` and
//! `__setstate__`, backed by the versioned binary codec.

use ndarray::ArrayD;
use numpy::{Element, IntoPyArray, PyArrayDyn, PyReadonlyArrayDyn};
use pyo3::prelude::*;
use pyo3::types::PyBytes;
use rustrefl_codec::{decode, encode, Error as CodecError};
use rustrefl_core::{Profile, Reflection};

fn value_error(context: &str, err: impl std::fmt::Display) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(format!("{context}: {err}"))
}

fn codec_error(err: CodecError) -> PyErr {
    match err {
        CodecError::BufferUnderrun { .. } => {
            pyo3::exceptions::PyEOFError::new_err(err.to_string())
        }
        _ => pyo3::exceptions::PyValueError::new_err(err.to_string()),
    }
}

fn profile_to_numpy<'py, T: Element + Copy>(
    py: Python<'py>,
    profile: &Profile<T>,
) -> PyResult<Bound<'py, PyArrayDyn<T>>> {
    // The empty container surfaces as an empty 1-D array; numpy has no
    // zero-dimensional empty.
    let shape = if profile.ndim() == 0 {
        vec![0]
    } else {
        profile.shape().to_vec()
    };
    let array = ArrayD::from_shape_vec(shape, profile.values().to_vec())
        .map_err(|err| value_error("profile shape", err))?;
    Ok(array.into_pyarray(py))
}

/// Inverse of the getter's empty mapping: a 1-D empty array denotes the
/// empty container, so getter output assigned back through a setter
/// restores the original profile.
fn normalize_empty<T>(profile: Profile<T>) -> Profile<T> {
    if profile.shape() == [0] {
        Profile::empty()
    } else {
        profile
    }
}

fn profile_from_numpy<T: Element + Copy>(
    array: &PyReadonlyArrayDyn<'_, T>,
    context: &str,
) -> PyResult<Profile<T>> {
    let view = array.as_array();
    let shape = view.shape().to_vec();
    let data = view.iter().copied().collect();
    Profile::new(shape, data)
        .map(normalize_empty)
        .map_err(|err| value_error(context, err))
}

/// Python wrapper for Reflection.
#[pyclass(name = "Reflection")]
#[derive(Clone, Default)]
pub struct PyReflection {
    inner: Reflection,
}

#[pymethods]
impl PyReflection {
    #[new]
    fn new() -> Self {
        Self::default()
    }

    #[getter]
    fn miller_index(&self) -> (i32, i32, i32) {
        let [h, k, l] = self.inner.miller_index;
        (h, k, l)
    }

    #[setter]
    fn set_miller_index(&mut self, value: (i32, i32, i32)) {
        self.inner.miller_index = [value.0, value.1, value.2];
    }

    #[getter]
    fn status(&self) -> u32 {
        self.inner.status
    }

    #[setter]
    fn set_status(&mut self, value: u32) {
        self.inner.status = value;
    }

    #[getter]
    fn entering(&self) -> bool {
        self.inner.entering
    }

    #[setter]
    fn set_entering(&mut self, value: bool) {
        self.inner.entering = value;
    }

    #[getter]
    fn rotation_angle(&self) -> f64 {
        self.inner.rotation_angle
    }

    #[setter]
    fn set_rotation_angle(&mut self, value: f64) {
        self.inner.rotation_angle = value;
    }

    #[getter]
    fn beam_vector(&self) -> (f64, f64, f64) {
        let [x, y, z] = self.inner.beam_vector;
        (x, y, z)
    }

    #[setter]
    fn set_beam_vector(&mut self, value: (f64, f64, f64)) {
        self.inner.beam_vector = [value.0, value.1, value.2];
    }

    #[getter]
    fn image_coord_px(&self) -> (f64, f64) {
        let [x, y] = self.inner.image_coord_px;
        (x, y)
    }

    #[setter]
    fn set_image_coord_px(&mut self, value: (f64, f64)) {
        self.inner.image_coord_px = [value.0, value.1];
    }

    #[getter]
    fn image_coord_mm(&self) -> (f64, f64) {
        let [x, y] = self.inner.image_coord_mm;
        (x, y)
    }

    #[setter]
    fn set_image_coord_mm(&mut self, value: (f64, f64)) {
        self.inner.image_coord_mm = [value.0, value.1];
    }

    #[getter]
    fn frame_number(&self) -> i32 {
        self.inner.frame_number
    }

    #[setter]
    fn set_frame_number(&mut self, value: i32) {
        self.inner.frame_number = value;
    }

    #[getter]
    fn panel_number(&self) -> i32 {
        self.inner.panel_number
    }

    #[setter]
    fn set_panel_number(&mut self, value: i32) {
        self.inner.panel_number = value;
    }

    #[getter]
    fn bounding_box(&self) -> (i32, i32, i32, i32, i32, i32) {
        let [x0, x1, y0, y1, z0, z1] = self.inner.bounding_box;
        (x0, x1, y0, y1, z0, z1)
    }

    #[setter]
    fn set_bounding_box(&mut self, value: (i32, i32, i32, i32, i32, i32)) {
        self.inner.bounding_box = [value.0, value.1, value.2, value.3, value.4, value.5];
    }

    #[getter]
    fn centroid_position(&self) -> (f64, f64, f64) {
        let [x, y, z] = self.inner.centroid_position;
        (x, y, z)
    }

    #[setter]
    fn set_centroid_position(&mut self, value: (f64, f64, f64)) {
        self.inner.centroid_position = [value.0, value.1, value.2];
    }

    #[getter]
    fn centroid_variance(&self) -> (f64, f64, f64) {
        let [x, y, z] = self.inner.centroid_variance;
        (x, y, z)
    }

    #[setter]
    fn set_centroid_variance(&mut self, value: (f64, f64, f64)) {
        self.inner.centroid_variance = [value.0, value.1, value.2];
    }

    #[getter]
    fn centroid_sq_width(&self) -> (f64, f64, f64) {
        let [x, y, z] = self.inner.centroid_sq_width;
        (x, y, z)
    }

    #[setter]
    fn set_centroid_sq_width(&mut self, value: (f64, f64, f64)) {
        self.inner.centroid_sq_width = [value.0, value.1, value.2];
    }

    #[getter]
    fn intensity(&self) -> f64 {
        self.inner.intensity
    }

    #[setter]
    fn set_intensity(&mut self, value: f64) {
        self.inner.intensity = value;
    }

    #[getter]
    fn intensity_variance(&self) -> f64 {
        self.inner.intensity_variance
    }

    #[setter]
    fn set_intensity_variance(&mut self, value: f64) {
        self.inner.intensity_variance = value;
    }

    #[getter]
    fn corrected_intensity(&self) -> f64 {
        self.inner.corrected_intensity
    }

    #[setter]
    fn set_corrected_intensity(&mut self, value: f64) {
        self.inner.corrected_intensity = value;
    }

    #[getter]
    fn corrected_intensity_variance(&self) -> f64 {
        self.inner.corrected_intensity_variance
    }

    #[setter]
    fn set_corrected_intensity_variance(&mut self, value: f64) {
        self.inner.corrected_intensity_variance = value;
    }

    #[getter]
    fn shoebox<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
        profile_to_numpy(py, &self.inner.shoebox)
    }

    #[setter]
    fn set_shoebox(&mut self, value: PyReadonlyArrayDyn<'_, f64>) -> PyResult<()> {
        self.inner.shoebox = profile_from_numpy(&value, "shoebox")?;
        Ok(())
    }

    #[getter]
    fn shoebox_mask<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArrayDyn<i32>>> {
        profile_to_numpy(py, &self.inner.shoebox_mask)
    }

    #[setter]
    fn set_shoebox_mask(&mut self, value: PyReadonlyArrayDyn<'_, i32>) -> PyResult<()> {
        self.inner.shoebox_mask = profile_from_numpy(&value, "shoebox_mask")?;
        Ok(())
    }

    #[getter]
    fn shoebox_background<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
        profile_to_numpy(py, &self.inner.shoebox_background)
    }

    #[setter]
    fn set_shoebox_background(&mut self, value: PyReadonlyArrayDyn<'_, f64>) -> PyResult<()> {
        self.inner.shoebox_background = profile_from_numpy(&value, "shoebox_background")?;
        Ok(())
    }

    #[getter]
    fn transformed_shoebox<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
        profile_to_numpy(py, &self.inner.transformed_shoebox)
    }

    #[setter]
    fn set_transformed_shoebox(&mut self, value: PyReadonlyArrayDyn<'_, f64>) -> PyResult<()> {
        self.inner.transformed_shoebox = profile_from_numpy(&value, "transformed_shoebox")?;
        Ok(())
    }

    /// State capture for pickle: the versioned opaque buffer.
    fn __getstate__<'py>(&self, py: Python<'py>) -> Bound<'py, PyBytes> {
        PyBytes::new(py, &encode(&self.inner))
    }

    /// State restore for pickle: decodes the buffer written by
    /// `__getstate__`. Raises ValueError for an unsupported format version
    /// and EOFError for a truncated buffer.
    fn __setstate__(&mut self, state: &[u8]) -> PyResult<()> {
        self.inner = decode(state).map_err(codec_error)?;
        Ok(())
    }

    fn __getnewargs__<'py>(&self, py: Python<'py>) -> Bound<'py, pyo3::types::PyTuple> {
        pyo3::types::PyTuple::empty(py)
    }

    fn __eq__(&self, other: &Bound<'_, PyAny>) -> bool {
        other
            .extract::<PyRef<'_, Self>>()
            .is_ok_and(|other| self.inner == other.inner)
    }

    fn __repr__(&self) -> String {
        format!(
            "Reflection(miller_index=({}, {}, {}), frame={}, panel={}, intensity={:.2})",
            self.inner.miller_index[0],
            self.inner.miller_index[1],
            self.inner.miller_index[2],
            self.inner.frame_number,
            self.inner.panel_number,
            self.inner.intensity
        )
    }
}

/// Encode a reflection to its versioned byte representation.
#[pyfunction]
fn encode_reflection<'py>(py: Python<'py>, reflection: &PyReflection) -> Bound<'py, PyBytes> {
    PyBytes::new(py, &encode(&reflection.inner))
}

/// Decode a reflection from bytes produced by `encode_reflection`.
#[pyfunction]
fn decode_reflection(data: &[u8]) -> PyResult<PyReflection> {
    let inner = decode(data).map_err(codec_error)?;
    Ok(PyReflection { inner })
}

#[cfg(test)]
mod tests {
    use super::normalize_empty;
    use rustrefl_core::Profile;

    #[test]
    fn test_normalize_empty_inverts_the_getter_mapping() {
        let empty = normalize_empty(Profile::<f64>::new(vec![0], Vec::new()).unwrap());
        assert_eq!(empty.ndim(), 0);
        assert!(empty.is_empty());

        // Zero extents inside a larger shape are legitimate and kept.
        let kept = normalize_empty(Profile::<i32>::new(vec![2, 0], Vec::new()).unwrap());
        assert_eq!(kept.shape(), &[2, 0]);

        let dense = normalize_empty(Profile::from_elem(vec![3], 1.0_f64));
        assert_eq!(dense.shape(), &[3]);
    }
}

#[pymodule]
fn rustrefl(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyReflection>()?;
    m.add_function(wrap_pyfunction!(encode_reflection, m)?)?;
    m.add_function(wrap_pyfunction!(decode_reflection, m)?)?;
    m.add("FORMAT_VERSION", rustrefl_codec::FORMAT_VERSION)?;
    Ok(())
}
