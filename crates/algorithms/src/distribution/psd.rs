//! Calibrated pore-size distribution
//!
//! Thickness values are pixel radii. They are binned in the radius domain
//! first and then mapped to physical diameters:
//!
//! ```text
//! pixel radius --(× nm_per_pixel)--> nm radius --(× 2)--> nm diameter
//! ```
//!
//! Centers and widths scale by `2 · nm_per_pixel` and densities divide by the
//! same factor, so `Σ density · width` stays 1.

use poromet_core::{Error, Result, ThicknessMap};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calibration::Calibration;
use crate::histogram::Histogram;

/// One histogram bin of a probability density
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub center: f64,
    pub width: f64,
    pub density: f64,
}

impl Bin {
    /// Probability mass held by the bin
    pub fn mass(&self) -> f64 {
        self.density * self.width
    }

    pub fn lower(&self) -> f64 {
        self.center - self.width / 2.0
    }

    pub fn upper(&self) -> f64 {
        self.center + self.width / 2.0
    }
}

/// Parameters for [`build_psd`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionParams {
    /// Number of equal-width bins
    pub bin_count: usize,
}

impl Default for DistributionParams {
    fn default() -> Self {
        Self { bin_count: 100 }
    }
}

/// Pore-size distribution over nanometre diameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoreSizeDistribution {
    /// Density over diameter (nm), ascending
    pub bins: Vec<Bin>,
    /// The same distribution over pixel radius
    pub radius_bins: Vec<Bin>,
    /// Scale used to convert radius bins
    pub nm_per_pixel: f64,
    /// Number of pore pixels that contributed
    pub sample_count: usize,
}

impl PoreSizeDistribution {
    /// Running probability mass at the upper edge of each bin
    pub fn cumulative(&self) -> Vec<f64> {
        cumulative(&self.bins)
    }

    /// (diameter center, density) pairs
    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.bins.iter().map(|b| (b.center, b.density)).collect()
    }

    /// Σ density · width; 1 up to rounding
    pub fn total_mass(&self) -> f64 {
        self.bins.iter().map(Bin::mass).sum()
    }
}

pub(crate) fn cumulative(bins: &[Bin]) -> Vec<f64> {
    bins.iter()
        .scan(0.0, |acc, b| {
            *acc += b.mass();
            Some(*acc)
        })
        .collect()
}

/// Build the calibrated distribution of a thickness map
///
/// Every non-zero pixel is one sample.
///
/// # Errors
/// - [`Error::InvalidParameter`] when `bin_count` is zero
/// - [`Error::NoPoresDetected`] when no pixel has a non-zero thickness
pub fn build_psd(
    thickness: &ThicknessMap,
    calibration: &Calibration,
    bin_count: usize,
) -> Result<PoreSizeDistribution> {
    if bin_count == 0 {
        return Err(Error::invalid_parameter(
            "bin_count",
            bin_count,
            "at least one bin is required",
        ));
    }

    let samples: Vec<f64> = thickness
        .iter()
        .filter(|&&t| t > 0)
        .map(|&t| t as f64)
        .collect();
    if samples.is_empty() {
        return Err(Error::NoPoresDetected);
    }

    let (mut lo, mut hi) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if hi <= lo {
        lo -= 0.5;
        hi += 0.5;
    }

    let hist = Histogram::from_values(samples.iter().copied(), bin_count, lo, hi)?;
    let total = hist.total() as f64;
    let width = hist.bin_width();
    let radius_bins: Vec<Bin> = hist
        .counts()
        .iter()
        .enumerate()
        .map(|(i, &count)| Bin {
            center: hist.center(i),
            width,
            density: count as f64 / total / width,
        })
        .collect();

    let nm_per_pixel = calibration.nm_per_pixel();
    let scale = 2.0 * nm_per_pixel;
    let bins = radius_bins
        .iter()
        .map(|b| Bin {
            center: b.center * scale,
            width: b.width * scale,
            density: b.density / scale,
        })
        .collect();

    debug!(
        samples = samples.len(),
        bin_count,
        min_radius_px = lo,
        max_radius_px = hi,
        "built pore-size distribution"
    );

    Ok(PoreSizeDistribution {
        bins,
        radius_bins,
        nm_per_pixel,
        sample_count: samples.len(),
    })
}
