//! Thickness map to pore-size distribution

mod psd;

pub(crate) use psd::cumulative;
pub use psd::{build_psd, Bin, DistributionParams, PoreSizeDistribution};
