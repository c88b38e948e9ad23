//! Local-thickness porosimetry
//!
//! For every pore pixel, finds the largest tested disk radius whose opening
//! still contains the pixel:
//!
//! ```text
//! T[p] = max { r ∈ radii : p ∈ Opening(mask, r) }   (0 when none)
//! ```
//!
//! Radii are visited from largest to smallest while an "unassigned" bitmap
//! tracks pixels that have not been claimed yet; the first radius that covers
//! a pixel is its thickness and the pixel is never revisited.

use poromet_core::{Algorithm, Error, PoreMask, Raster, Result, ThicknessMap};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cancel::CancelToken;
use crate::morphology::{
    opening, squared_distance_to_sites, squared_distance_to_solid, BorderMode,
    StructuringElement,
};

use super::radii::RadiusSet;

/// How each radius's opening is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpeningStrategy {
    /// One distance-to-solid transform shared by all radii; each opening is
    /// recovered with a distance transform to the fitting centers.
    /// O(W·H) per radius.
    #[default]
    DistanceTransform,
    /// Explicit disk offsets for erosion and dilation. O(W·H·r²) per radius.
    StructuringElement,
}

/// Upper bounds on a single porosimetry request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum number of pixels in the mask
    pub max_pixels: usize,
    /// Maximum number of tested radii
    pub max_radii: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_pixels: 4096 * 4096,
            max_radii: 512,
        }
    }
}

impl Limits {
    /// Reject masks or radius sets beyond the configured bounds
    pub fn check(&self, mask: &PoreMask, radii: &RadiusSet) -> Result<()> {
        if mask.len() > self.max_pixels {
            return Err(Error::LimitExceeded {
                what: "pixels",
                actual: mask.len(),
                limit: self.max_pixels,
            });
        }
        if radii.len() > self.max_radii {
            return Err(Error::LimitExceeded {
                what: "radii",
                actual: radii.len(),
                limit: self.max_radii,
            });
        }
        Ok(())
    }
}

/// Parameters for the thickness engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PorosimetryParams {
    /// Opening computation strategy
    pub strategy: OpeningStrategy,
    /// Treatment of pixels outside the image
    pub border: BorderMode,
    /// Request bounds
    pub limits: Limits,
}

/// Porosimetry algorithm
#[derive(Debug, Clone, Default)]
pub struct Porosimetry;

impl Algorithm for Porosimetry {
    type Input = (PoreMask, RadiusSet);
    type Output = ThicknessMap;
    type Params = PorosimetryParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Porosimetry"
    }

    fn description(&self) -> &'static str {
        "Local thickness: largest fitting disk radius covering each pore pixel"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (mask, radii) = input;
        compute_thickness_with(&mask, &radii, &params, &CancelToken::new())
    }
}

/// Compute the local-thickness map with default parameters
pub fn compute_thickness(mask: &PoreMask, radii: &RadiusSet) -> Result<ThicknessMap> {
    compute_thickness_with(mask, radii, &PorosimetryParams::default(), &CancelToken::new())
}

/// Compute the local-thickness map
///
/// A mask without pore pixels yields an all-zero map. The cancel token is
/// checked before every radius.
///
/// # Arguments
/// * `mask` - Pore mask (`true` = pore)
/// * `radii` - Candidate radii in pixels
/// * `params` - Strategy, border treatment and limits
/// * `cancel` - Cooperative cancellation
pub fn compute_thickness_with(
    mask: &PoreMask,
    radii: &RadiusSet,
    params: &PorosimetryParams,
    cancel: &CancelToken,
) -> Result<ThicknessMap> {
    params.limits.check(mask, radii)?;

    let (rows, cols) = mask.shape();
    let pore = mask.to_vec();
    let mut thickness = vec![0u32; pore.len()];
    let mut unassigned = pore.clone();
    let mut remaining = unassigned.iter().filter(|&&u| u).count();

    // Distance to solid is shared by every radius
    let solid_d2 = match params.strategy {
        OpeningStrategy::DistanceTransform if remaining > 0 => {
            Some(squared_distance_to_solid(mask, params.border))
        }
        _ => None,
    };

    for radius in radii.descending() {
        if remaining == 0 {
            break;
        }
        cancel.check(&format!("porosimetry at radius {}", radius))?;

        let covered = match &solid_d2 {
            Some(d2) => opening_from_distance(d2, rows, cols, radius),
            None => opening(mask, &StructuringElement::disk(radius as usize)?, params.border)?
                .to_vec(),
        };

        let mut assigned = 0usize;
        for ((slot, free), &hit) in thickness
            .iter_mut()
            .zip(unassigned.iter_mut())
            .zip(covered.iter())
        {
            if hit && *free {
                *slot = radius;
                *free = false;
                assigned += 1;
            }
        }
        remaining -= assigned;
        debug!(radius, assigned, remaining, "porosimetry radius done");
    }

    Raster::from_vec(thickness, rows, cols)
}

/// Opening at a single radius using the engine's configured strategy
pub fn opening_at(mask: &PoreMask, radius: u32, params: &PorosimetryParams) -> Result<PoreMask> {
    let (rows, cols) = mask.shape();
    match params.strategy {
        OpeningStrategy::DistanceTransform => {
            if radius == 0 {
                return Err(Error::invalid_parameter("radius", 0, "radius must be at least 1"));
            }
            let d2 = squared_distance_to_solid(mask, params.border);
            PoreMask::from_vec(opening_from_distance(&d2, rows, cols, radius), rows, cols)
        }
        OpeningStrategy::StructuringElement => {
            opening(mask, &StructuringElement::disk(radius as usize)?, params.border)
        }
    }
}

/// Pixels within distance `< radius` of a center whose distance to solid is
/// at least `radius`
fn opening_from_distance(solid_d2: &[f64], rows: usize, cols: usize, radius: u32) -> Vec<bool> {
    let r2 = f64::from(radius) * f64::from(radius);
    let centers: Vec<bool> = solid_d2.iter().map(|&d| d >= r2).collect();
    if !centers.iter().any(|&c| c) {
        return vec![false; solid_d2.len()];
    }
    squared_distance_to_sites(&centers, rows, cols)
        .into_iter()
        .map(|d| d < r2)
        .collect()
}
