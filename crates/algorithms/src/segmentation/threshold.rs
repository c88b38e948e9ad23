//! Pore/solid segmentation of a grayscale micrograph
//!
//! Pores image dark: a pixel is pore when its intensity is strictly below
//! the scaled Otsu threshold.

use poromet_core::{Algorithm, Error, GrayImage, PoreMask, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::otsu::otsu_threshold;

/// Porosity below which a segmentation is flagged as suspicious
pub const LOW_POROSITY: f64 = 0.001;
/// Porosity above which a segmentation is flagged as suspicious
pub const HIGH_POROSITY: f64 = 0.9;

/// Parameters for [`Segment`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentParams {
    /// Factor applied to the Otsu threshold before comparison
    pub threshold_multiplier: f64,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            threshold_multiplier: 1.0,
        }
    }
}

/// Outcome of a porosity plausibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PorosityCheck {
    Ok,
    TooLow,
    TooHigh,
}

impl PorosityCheck {
    /// Classify a pore fraction against the plausibility band
    pub fn classify(porosity: f64) -> Self {
        if porosity < LOW_POROSITY {
            Self::TooLow
        } else if porosity > HIGH_POROSITY {
            Self::TooHigh
        } else {
            Self::Ok
        }
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

/// Segmented micrograph
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Pore mask (`true` = pore)
    pub mask: PoreMask,
    /// Threshold actually applied (Otsu value times the multiplier)
    pub threshold: f64,
    /// Fraction of pore pixels
    pub porosity: f64,
}

impl Segmentation {
    pub fn check(&self) -> PorosityCheck {
        PorosityCheck::classify(self.porosity)
    }
}

/// Threshold segmentation algorithm
#[derive(Debug, Clone, Default)]
pub struct Segment;

impl Algorithm for Segment {
    type Input = GrayImage;
    type Output = Segmentation;
    type Params = SegmentParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Segment"
    }

    fn description(&self) -> &'static str {
        "Otsu threshold segmentation into pore and solid phases"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        segment(&input, params.threshold_multiplier)
    }
}

/// Segment an image into pore and solid phases
///
/// Implausible porosities are logged but not rejected.
///
/// # Errors
/// - [`Error::InvalidParameter`] for a non-finite or non-positive multiplier
/// - anything [`otsu_threshold`] reports
pub fn segment(image: &GrayImage, threshold_multiplier: f64) -> Result<Segmentation> {
    if !threshold_multiplier.is_finite() || threshold_multiplier <= 0.0 {
        return Err(Error::invalid_parameter(
            "threshold_multiplier",
            threshold_multiplier,
            "must be a positive finite number",
        ));
    }

    let otsu = otsu_threshold(image)?;
    let threshold = otsu * threshold_multiplier;
    let mask = PoreMask::from_array(image.data().mapv(|v| v < threshold));
    let porosity = mask.porosity();

    debug!(otsu, threshold, porosity, "segmented image");
    match PorosityCheck::classify(porosity) {
        PorosityCheck::TooLow => warn!(
            porosity,
            "very low porosity; the threshold multiplier may be too small"
        ),
        PorosityCheck::TooHigh => warn!(
            porosity,
            "very high porosity; the threshold multiplier may be too large"
        ),
        PorosityCheck::Ok => {}
    }

    Ok(Segmentation {
        mask,
        threshold,
        porosity,
    })
}
