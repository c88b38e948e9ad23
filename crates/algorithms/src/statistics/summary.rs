//! Summary statistics of a pore-size distribution

use serde::{Deserialize, Serialize};

use crate::distribution::{cumulative, Bin, PoreSizeDistribution};

/// Scalar descriptors of a distribution, all in nanometres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PsdSummary {
    /// Σ center · density · width
    pub mean_diameter: f64,
    /// Center of the highest-density bin
    pub mode_diameter: f64,
    pub d10: f64,
    pub d50: f64,
    pub d90: f64,
}

/// Summarize a distribution
pub fn summarize(psd: &PoreSizeDistribution) -> PsdSummary {
    summarize_bins(&psd.bins)
}

/// Summarize raw bins
///
/// The mean weights each center by its probability mass, so bins of unequal
/// width contribute in proportion to the area they hold. Ties for the mode go
/// to the smallest diameter. An empty slice summarizes to zeros.
pub fn summarize_bins(bins: &[Bin]) -> PsdSummary {
    if bins.is_empty() {
        return PsdSummary {
            mean_diameter: 0.0,
            mode_diameter: 0.0,
            d10: 0.0,
            d50: 0.0,
            d90: 0.0,
        };
    }

    let mean_diameter: f64 = bins.iter().map(|b| b.center * b.mass()).sum();

    let mut mode = &bins[0];
    for b in &bins[1..] {
        if b.density > mode.density {
            mode = b;
        }
    }

    let cum = cumulative(bins);
    PsdSummary {
        mean_diameter,
        mode_diameter: mode.center,
        d10: percentile(bins, &cum, 0.1),
        d50: percentile(bins, &cum, 0.5),
        d90: percentile(bins, &cum, 0.9),
    }
}

/// Diameter below which a fraction `p` of the mass lies, interpolated
/// linearly inside the crossing bin
fn percentile(bins: &[Bin], cum: &[f64], p: f64) -> f64 {
    let mut before = 0.0;
    for (b, &after) in bins.iter().zip(cum) {
        if after >= p && b.mass() > 0.0 {
            return b.lower() + (p - before) / b.mass() * b.width;
        }
        before = after;
    }
    bins.last().map_or(0.0, Bin::upper)
}
