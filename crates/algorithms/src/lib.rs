//! # Poromet Algorithms
//!
//! Pore-size analysis of segmented micrographs.
//!
//! ## Available Algorithm Categories
//!
//! - **segmentation**: Otsu threshold, pore/solid masks, porosity checks
//! - **morphology**: Disk structuring elements, erosion, dilation, opening, exact distance transform
//! - **porosimetry**: Local-thickness maps from nested openings
//! - **distribution**: Calibrated pore-size density over diameter
//! - **statistics**: Mean, mode and percentile diameters
//! - **calibration**: Pixel-size lookup by resolution and magnification

pub mod calibration;
pub mod cancel;
pub mod distribution;
pub mod histogram;
pub(crate) mod maybe_rayon;
pub mod morphology;
pub mod porosimetry;
pub mod segmentation;
pub mod statistics;

pub use cancel::CancelToken;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::calibration::{Calibration, CalibrationTable};
    pub use crate::cancel::CancelToken;
    pub use crate::distribution::{build_psd, Bin, DistributionParams, PoreSizeDistribution};
    pub use crate::morphology::{
        dilate, distance_map, erode, opening, BorderMode, Opening, OpeningParams,
        StructuringElement,
    };
    pub use crate::porosimetry::{
        compute_thickness, compute_thickness_with, opening_at, Limits, OpeningStrategy,
        Porosimetry, PorosimetryParams, RadiusSet,
    };
    pub use crate::segmentation::{
        otsu_threshold, segment, PorosityCheck, Segment, SegmentParams, Segmentation,
    };
    pub use crate::statistics::{summarize, PsdSummary};
    pub use poromet_core::prelude::*;
}
