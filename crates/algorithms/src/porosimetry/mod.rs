//! Morphological porosimetry: local-thickness maps from pore masks

mod engine;
mod radii;

pub use engine::{
    compute_thickness, compute_thickness_with, opening_at, Limits, OpeningStrategy, Porosimetry,
    PorosimetryParams,
};
pub use radii::RadiusSet;
