//! Analysis requests and per-run configuration

use std::time::Duration;

use poromet_algorithms::distribution::DistributionParams;
use poromet_algorithms::porosimetry::PorosimetryParams;
use poromet_algorithms::segmentation::SegmentParams;
use poromet_algorithms::CancelToken;
use poromet_core::{Error, GrayImage, Result};
use serde::{Deserialize, Serialize};

/// One micrograph to analyze
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Grayscale intensities in `[0, 1]`
    pub image: GrayImage,
    /// Microscope magnification, used with the image size to find the pixel size
    pub magnification: u32,
    /// Largest pore diameter to test, in nanometres
    pub max_diameter_nm: f64,
    /// Factor applied to the Otsu threshold
    pub threshold_multiplier: f64,
    /// Bins in the size distribution
    pub bin_count: usize,
}

impl AnalysisRequest {
    /// Request with the default threshold multiplier and bin count
    pub fn new(image: GrayImage, magnification: u32, max_diameter_nm: f64) -> Self {
        Self {
            image,
            magnification,
            max_diameter_nm,
            threshold_multiplier: SegmentParams::default().threshold_multiplier,
            bin_count: DistributionParams::default().bin_count,
        }
    }

    pub fn with_threshold_multiplier(mut self, threshold_multiplier: f64) -> Self {
        self.threshold_multiplier = threshold_multiplier;
        self
    }

    pub fn with_bin_count(mut self, bin_count: usize) -> Self {
        self.bin_count = bin_count;
        self
    }

    /// Image size as (width, height)
    pub fn resolution(&self) -> (usize, usize) {
        (self.image.width(), self.image.height())
    }

    /// Reject parameters that no stage could accept
    pub fn validate(&self) -> Result<()> {
        if self.image.is_empty() {
            return Err(Error::Input("image has no pixels".into()));
        }
        if !self.max_diameter_nm.is_finite() || self.max_diameter_nm <= 0.0 {
            return Err(Error::invalid_parameter(
                "max_diameter_nm",
                self.max_diameter_nm,
                "must be a positive finite number",
            ));
        }
        if !self.threshold_multiplier.is_finite() || self.threshold_multiplier <= 0.0 {
            return Err(Error::invalid_parameter(
                "threshold_multiplier",
                self.threshold_multiplier,
                "must be a positive finite number",
            ));
        }
        if self.bin_count == 0 {
            return Err(Error::invalid_parameter(
                "bin_count",
                self.bin_count,
                "at least one bin is required",
            ));
        }
        Ok(())
    }
}

/// Settings shared by every request an [`crate::Analyzer`] serves
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Engine strategy, border treatment and request limits
    pub porosimetry: PorosimetryParams,
    /// Wall-clock budget per request
    pub timeout: Option<Duration>,
}

impl AnalysisConfig {
    /// Fresh cancellation token honoring the configured timeout
    pub fn cancel_token(&self) -> CancelToken {
        match self.timeout {
            Some(timeout) => CancelToken::with_timeout(timeout),
            None => CancelToken::new(),
        }
    }
}
