//! Grayscale to pore-mask segmentation

mod otsu;
mod threshold;

pub use otsu::{otsu_threshold, threshold_from_histogram, OTSU_BINS};
pub use threshold::{
    segment, PorosityCheck, Segment, SegmentParams, Segmentation, HIGH_POROSITY, LOW_POROSITY,
};
