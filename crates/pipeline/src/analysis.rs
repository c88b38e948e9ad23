//! The analysis pipeline: calibrate, segment, measure, summarize

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use poromet_algorithms::calibration::CalibrationTable;
use poromet_algorithms::distribution::{build_psd, PoreSizeDistribution};
use poromet_algorithms::porosimetry::{compute_thickness_with, RadiusSet};
use poromet_algorithms::segmentation::{segment, PorosityCheck};
use poromet_algorithms::statistics::{summarize, PsdSummary};
use poromet_algorithms::CancelToken;
use poromet_core::{Error, PoreMask, Result, ThicknessMap};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::request::{AnalysisConfig, AnalysisRequest};

/// Serializable result of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Identifier, unique within the process
    pub id: String,
    /// (diameter center in nm, density) per bin
    pub histogram: Vec<(f64, f64)>,
    pub psd: PoreSizeDistribution,
    pub summary: PsdSummary,
    /// Physical size of one pixel in nm
    pub pixel_size_nm: f64,
    /// Threshold applied during segmentation
    pub threshold: f64,
    /// Pore fraction of the image
    pub porosity: f64,
    pub porosity_check: PorosityCheck,
    /// (width, height) in pixels
    pub resolution: (usize, usize),
    pub magnification: u32,
    /// Largest tested radius in pixels
    pub max_radius_px: u32,
}

/// Report plus the intermediate rasters needed for export
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub report: AnalysisReport,
    pub mask: PoreMask,
    pub thickness: ThicknessMap,
}

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Timestamp-based analysis id, `<unix seconds>_<millis>_<sequence>`
pub fn next_analysis_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}_{:03}_{}", now.as_secs(), now.subsec_millis(), seq)
}

/// Run one request end to end
///
/// Calibration and parameter errors surface before any image work. The
/// cancel token is checked between stages and between radii.
pub fn run_analysis(
    request: &AnalysisRequest,
    table: &CalibrationTable,
    config: &AnalysisConfig,
    cancel: &CancelToken,
) -> Result<AnalysisOutput> {
    request.validate()?;
    let (width, height) = request.resolution();

    let limits = &config.porosimetry.limits;
    if request.image.len() > limits.max_pixels {
        return Err(Error::LimitExceeded {
            what: "pixels",
            actual: request.image.len(),
            limit: limits.max_pixels,
        });
    }

    let calibration = table.resolve(width, height, request.magnification)?;
    let max_radius_px = calibration.radius_bound(request.max_diameter_nm)?;
    let radii = RadiusSet::up_to(max_radius_px)?;
    info!(
        width,
        height,
        magnification = request.magnification,
        nm_per_pixel = calibration.nm_per_pixel(),
        max_radius_px,
        "calibrated"
    );

    cancel.check("segmentation")?;
    let seg = segment(&request.image, request.threshold_multiplier)?;
    let porosity_check = seg.check();
    info!(threshold = seg.threshold, porosity = seg.porosity, "segmented");

    let thickness = compute_thickness_with(&seg.mask, &radii, &config.porosimetry, cancel)?;
    info!(radii = radii.len(), "local thickness computed");

    cancel.check("distribution")?;
    let psd = build_psd(&thickness, &calibration, request.bin_count)?;
    let summary = summarize(&psd);
    info!(
        mean_nm = summary.mean_diameter,
        mode_nm = summary.mode_diameter,
        samples = psd.sample_count,
        "distribution summarized"
    );

    let report = AnalysisReport {
        id: next_analysis_id(),
        histogram: psd.pairs(),
        psd,
        summary,
        pixel_size_nm: calibration.nm_per_pixel(),
        threshold: seg.threshold,
        porosity: seg.porosity,
        porosity_check,
        resolution: (width, height),
        magnification: request.magnification,
        max_radius_px,
    };

    Ok(AnalysisOutput {
        report,
        mask: seg.mask,
        thickness,
    })
}
