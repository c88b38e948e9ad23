//! Binary pore/solid mask

use ndarray::Array2;

use crate::error::{Error, Result};
use crate::raster::Raster;

/// Boolean pore-phase mask: `true` marks a pore pixel, `false` solid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoreMask {
    data: Array2<bool>,
}

impl PoreMask {
    /// All-solid mask of the given size
    pub fn solid(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), false),
        }
    }

    /// Wrap an existing boolean array
    pub fn from_array(data: Array2<bool>) -> Self {
        Self { data }
    }

    /// Build a mask from row-major booleans
    pub fn from_vec(data: Vec<bool>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;
        Ok(Self { data: array })
    }

    /// Build a mask by evaluating `f(row, col)` for every pixel
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        Self {
            data: Array2::from_shape_fn((rows, cols), |(r, c)| f(r, c)),
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of pixels
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the mask has no pixels
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether (row, col) is a pore pixel; out-of-bounds reads as solid
    pub fn is_pore(&self, row: usize, col: usize) -> bool {
        self.data.get((row, col)).copied().unwrap_or(false)
    }

    /// Set the phase of one pixel
    pub fn set(&mut self, row: usize, col: usize, pore: bool) -> Result<()> {
        let (rows, cols) = self.shape();
        match self.data.get_mut((row, col)) {
            Some(v) => {
                *v = pore;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds { row, col, rows, cols }),
        }
    }

    /// Number of pore pixels
    pub fn pore_count(&self) -> usize {
        self.data.iter().filter(|&&p| p).count()
    }

    /// Fraction of pixels in the pore phase (0 for an empty mask)
    pub fn porosity(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.pore_count() as f64 / self.len() as f64
    }

    /// Reference to the underlying array
    pub fn data(&self) -> &Array2<bool> {
        &self.data
    }

    /// Row-major copy of the pixels
    pub fn to_vec(&self) -> Vec<bool> {
        self.data.iter().copied().collect()
    }

    /// Render as 0/255 bytes for export
    pub fn to_u8(&self) -> Raster<u8> {
        Raster::from_array(self.data.map(|&p| if p { 255 } else { 0 }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_porosity() {
        let mask = PoreMask::from_fn(4, 5, |r, _| r < 1);
        assert_eq!(mask.pore_count(), 5);
        assert!((mask.porosity() - 0.25).abs() < 1e-12);
        assert_eq!(PoreMask::solid(0, 0).porosity(), 0.0);
    }

    #[test]
    fn test_out_of_bounds_is_solid() {
        let mask = PoreMask::from_fn(3, 3, |_, _| true);
        assert!(mask.is_pore(2, 2));
        assert!(!mask.is_pore(3, 0));
    }

    #[test]
    fn test_to_u8() {
        let mut mask = PoreMask::solid(2, 2);
        mask.set(1, 0, true).unwrap();
        let img = mask.to_u8();
        assert_eq!(img.get(1, 0).unwrap(), 255);
        assert_eq!(img.get(0, 0).unwrap(), 0);
        assert!(mask.set(2, 0, true).is_err());
    }
}
