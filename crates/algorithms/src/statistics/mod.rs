//! Distribution statistics

mod summary;

pub use summary::{summarize, summarize_bins, PsdSummary};
