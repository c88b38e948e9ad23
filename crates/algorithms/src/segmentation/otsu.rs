//! Otsu's global threshold
//!
//! Chooses the intensity cutoff that maximizes the between-class variance
//! of a 256-bin histogram over the image's intensity range. The returned
//! value is the center of the winning bin.

use poromet_core::{Error, GrayImage, Result};

use crate::histogram::Histogram;

/// Number of histogram bins used for the threshold search
pub const OTSU_BINS: usize = 256;

/// Compute Otsu's threshold of a grayscale image
///
/// # Errors
/// - [`Error::Input`] for an empty image or one containing non-finite values
/// - [`Error::DegenerateImage`] when every pixel has the same intensity
pub fn otsu_threshold(image: &GrayImage) -> Result<f64> {
    if image.is_empty() {
        return Err(Error::Input("image has no pixels".into()));
    }

    let stats = image.statistics();
    if stats.invalid_count > 0 {
        return Err(Error::Input(format!(
            "image contains {} non-finite intensities",
            stats.invalid_count
        )));
    }
    let (lo, hi) = match (stats.min, stats.max) {
        (Some(lo), Some(hi)) => (lo, hi),
        _ => return Err(Error::Input("image has no valid intensities".into())),
    };
    if hi <= lo {
        return Err(Error::DegenerateImage { value: lo });
    }

    let hist = Histogram::from_values(image.iter().copied(), OTSU_BINS, lo, hi)?;
    Ok(threshold_from_histogram(&hist))
}

/// Between-class variance maximization over a histogram
///
/// Splitting after bin `i` puts bins `0..=i` in the lower class. Both end
/// bins are non-empty for a histogram spanning the data range, so every
/// split has two populated classes.
pub fn threshold_from_histogram(hist: &Histogram) -> f64 {
    let counts = hist.counts();
    let n = counts.len();
    if n < 2 {
        return hist.center(0);
    }

    let total_weight: f64 = counts.iter().map(|&c| c as f64).sum();
    let total_moment: f64 = counts
        .iter()
        .enumerate()
        .map(|(i, &c)| c as f64 * hist.center(i))
        .sum();

    let mut best_idx = 0;
    let mut best_var = f64::NEG_INFINITY;
    let mut w1 = 0.0;
    let mut m1 = 0.0;

    for (i, &count) in counts.iter().enumerate().take(n - 1) {
        w1 += count as f64;
        m1 += count as f64 * hist.center(i);
        let w2 = total_weight - w1;
        if w1 == 0.0 || w2 == 0.0 {
            continue;
        }
        let mean1 = m1 / w1;
        let mean2 = (total_moment - m1) / w2;
        let var = w1 * w2 * (mean1 - mean2) * (mean1 - mean2);
        if var > best_var {
            best_var = var;
            best_idx = i;
        }
    }

    hist.center(best_idx)
}
