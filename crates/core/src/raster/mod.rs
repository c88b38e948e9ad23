//! Raster data structures

mod element;
mod grid;
mod mask;

pub use element::RasterElement;
pub use grid::{Raster, RasterStatistics};
pub use mask::PoreMask;

/// Grayscale micrograph intensities
pub type GrayImage = Raster<f64>;

/// Local thickness map: per-pixel disk radius in pixels, 0 for solid or
/// unreachable pixels
pub type ThicknessMap = Raster<u32>;
