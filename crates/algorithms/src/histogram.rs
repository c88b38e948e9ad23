//! Equal-width histograms shared by segmentation and the size distribution

use poromet_core::{Error, Result};

/// Equal-width histogram over a closed range
///
/// Bins are half-open `[lo, hi)` except the last, which also includes the
/// upper bound so the range maximum is always counted.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    counts: Vec<u64>,
    lo: f64,
    hi: f64,
}

impl Histogram {
    /// Count `values` into `bins` equal-width bins spanning `[lo, hi]`
    ///
    /// Values outside the range (or non-finite) are ignored.
    pub fn from_values<I>(values: I, bins: usize, lo: f64, hi: f64) -> Result<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        if bins == 0 {
            return Err(Error::invalid_parameter(
                "bins",
                bins,
                "histogram needs at least one bin",
            ));
        }
        if !(lo.is_finite() && hi.is_finite()) || hi <= lo {
            return Err(Error::invalid_parameter(
                "range",
                format!("[{}, {}]", lo, hi),
                "histogram range must be finite and non-empty",
            ));
        }

        let mut counts = vec![0u64; bins];
        let scale = bins as f64 / (hi - lo);
        for v in values {
            if !v.is_finite() || v < lo || v > hi {
                continue;
            }
            let idx = (((v - lo) * scale) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Ok(Self { counts, lo, hi })
    }

    /// Per-bin counts
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Width of every bin
    pub fn bin_width(&self) -> f64 {
        (self.hi - self.lo) / self.counts.len() as f64
    }

    /// Center of bin `i`
    pub fn center(&self, i: usize) -> f64 {
        self.lo + (i as f64 + 0.5) * self.bin_width()
    }

    /// Total number of counted samples
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_bin_closed() {
        let h = Histogram::from_values([0.0, 0.5, 1.0, 1.0], 2, 0.0, 1.0).unwrap();
        assert_eq!(h.counts(), &[1, 3]);
        assert_eq!(h.total(), 4);
        assert!((h.center(0) - 0.25).abs() < 1e-12);
        assert!((h.bin_width() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_ignored() {
        let h = Histogram::from_values([-1.0, 0.2, f64::NAN, 3.0], 4, 0.0, 1.0).unwrap();
        assert_eq!(h.total(), 1);
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(Histogram::from_values([1.0], 0, 0.0, 1.0).is_err());
        assert!(Histogram::from_values([1.0], 4, 1.0, 1.0).is_err());
        assert!(Histogram::from_values([1.0], 4, 0.0, f64::INFINITY).is_err());
    }
}
