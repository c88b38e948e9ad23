//! Pixel grid shared by micrographs and thickness maps

use crate::error::{Error, Result};
use crate::raster::RasterElement;
use ndarray::Array2;

/// Row-major 2D grid of pixels.
///
/// Micrographs are `Raster<f64>` intensities in `[0, 1]`; local-thickness
/// maps are `Raster<u32>` pixel radii. Width is the column count and height
/// the row count, so calibration lookups use `(width(), height())`.
///
/// ```
/// use poromet_core::Raster;
///
/// let mut image: Raster<f64> = Raster::new(4, 6);
/// image.set(1, 2, 0.5).unwrap();
/// assert_eq!(image.get(1, 2).unwrap(), 0.5);
/// assert_eq!((image.width(), image.height()), (6, 4));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T: RasterElement> {
    data: Array2<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Zero-filled grid
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
        }
    }

    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
        }
    }

    /// Wrap row-major samples; the length must equal `rows * cols`
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        Array2::from_shape_vec((rows, cols), data)
            .map(|data| Self { data })
            .map_err(|e| Error::Other(e.to_string()))
    }

    pub fn from_array(data: Array2<T>) -> Self {
        Self { data }
    }

    /// Evaluate `f(row, col)` for every pixel
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        Self {
            data: Array2::from_shape_fn((rows, cols), |(r, c)| f(r, c)),
        }
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.cols()
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.rows()
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Pixel at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or_else(|| self.out_of_bounds(row, col))
    }

    /// Overwrite the pixel at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let err = self.out_of_bounds(row, col);
        match self.data.get_mut((row, col)) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(err),
        }
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> Error {
        Error::IndexOutOfBounds {
            row,
            col,
            rows: self.rows(),
            cols: self.cols(),
        }
    }

    /// Underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Pixels in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.data.iter()
    }

    /// Range, mean and variance over finite pixels
    pub fn statistics(&self) -> RasterStatistics {
        let mut stats = RasterStatistics {
            min: None,
            max: None,
            mean: None,
            variance: None,
            valid_count: 0,
            invalid_count: 0,
        };
        let mut sum = 0.0;
        let mut sum_sq = 0.0;

        for value in self.data.iter() {
            if !value.is_valid() {
                stats.invalid_count += 1;
                continue;
            }
            let v = RasterElement::to_f64(*value);
            stats.min = Some(stats.min.map_or(v, |m: f64| m.min(v)));
            stats.max = Some(stats.max.map_or(v, |m: f64| m.max(v)));
            sum += v;
            sum_sq += v * v;
            stats.valid_count += 1;
        }

        if stats.valid_count > 0 {
            let n = stats.valid_count as f64;
            let mean = sum / n;
            stats.mean = Some(mean);
            stats.variance = Some((sum_sq / n - mean * mean).max(0.0));
        }
        stats
    }
}

/// Summary of the finite pixels of a raster
#[derive(Debug, Clone, PartialEq)]
pub struct RasterStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub variance: Option<f64>,
    pub valid_count: usize,
    /// NaN or infinite pixels
    pub invalid_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let raster: Raster<f32> = Raster::new(100, 200);
        assert_eq!(raster.shape(), (100, 200));
        assert_eq!((raster.width(), raster.height()), (200, 100));
        assert_eq!(raster.len(), 20_000);
    }

    #[test]
    fn test_bounds_checked_access() {
        let mut raster: Raster<u32> = Raster::new(10, 10);
        raster.set(5, 5, 42).unwrap();
        assert_eq!(raster.get(5, 5).unwrap(), 42);
        assert!(matches!(
            raster.get(10, 0),
            Err(Error::IndexOutOfBounds { row: 10, rows: 10, .. })
        ));
        assert!(raster.set(0, 10, 1).is_err());
    }

    #[test]
    fn test_from_vec_dimension_check() {
        assert!(Raster::from_vec(vec![0.0f64; 6], 2, 3).is_ok());
        assert!(matches!(
            Raster::from_vec(vec![0.0f64; 5], 2, 3),
            Err(Error::InvalidDimensions { width: 3, height: 2 })
        ));
    }

    #[test]
    fn test_statistics() {
        let raster = Raster::from_fn(10, 10, |i, j| (i * 10 + j) as f64);
        let stats = raster.statistics();
        assert_eq!(stats.min, Some(0.0));
        assert_eq!(stats.max, Some(99.0));
        assert_eq!(stats.valid_count, 100);
        let var = stats.variance.unwrap();
        assert!((var - 833.25).abs() < 1e-9, "variance {}", var);
    }

    #[test]
    fn test_statistics_skip_non_finite() {
        let mut raster = Raster::filled(2, 2, 1.0f64);
        raster.set(0, 0, f64::NAN).unwrap();
        raster.set(0, 1, f64::INFINITY).unwrap();
        let stats = raster.statistics();
        assert_eq!(stats.valid_count, 2);
        assert_eq!(stats.invalid_count, 2);
        assert_eq!(stats.variance, Some(0.0));

        let empty: Raster<f64> = Raster::new(0, 0);
        assert_eq!(empty.statistics().min, None);
    }

    #[test]
    fn test_statistics_integer_thickness() {
        let thickness = Raster::from_vec(vec![0u32, 2, 2, 4], 2, 2).unwrap();
        let stats = thickness.statistics();
        assert_eq!(stats.min, Some(0.0));
        assert_eq!(stats.max, Some(4.0));
        assert_eq!(stats.mean, Some(2.0));
        assert_eq!(stats.variance, Some(2.0));
        assert_eq!(stats.invalid_count, 0);
    }
}
