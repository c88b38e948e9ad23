//! Binary opening (erosion followed by dilation)
//!
//! The opening at radius `r` is the union of all disks of radius `r` that
//! fit entirely in the pore phase.

use poromet_core::{Algorithm, Error, PoreMask, Result};

use super::dilate::dilate;
use super::distance::BorderMode;
use super::element::StructuringElement;
use super::erode::erode;

/// Parameters for morphological opening
#[derive(Debug, Clone)]
pub struct OpeningParams {
    /// Disk radius in pixels
    pub radius: usize,
    /// Treatment of pixels outside the image
    pub border: BorderMode,
}

impl Default for OpeningParams {
    fn default() -> Self {
        Self {
            radius: 1,
            border: BorderMode::Open,
        }
    }
}

/// Opening algorithm
#[derive(Debug, Clone, Default)]
pub struct Opening;

impl Algorithm for Opening {
    type Input = PoreMask;
    type Output = PoreMask;
    type Params = OpeningParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Opening"
    }

    fn description(&self) -> &'static str {
        "Binary opening by a disk (erosion then dilation) keeping regions that fit the disk"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let element = StructuringElement::disk(params.radius)?;
        opening(&input, &element, params.border)
    }
}

/// Perform binary opening of a pore mask
///
/// # Arguments
/// * `mask` - Pore mask
/// * `element` - Disk structuring element
/// * `border` - Treatment of pixels outside the image
pub fn opening(
    mask: &PoreMask,
    element: &StructuringElement,
    border: BorderMode,
) -> Result<PoreMask> {
    let centers = erode(mask, element, border)?;
    dilate(&centers, element)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk_mask(size: usize, center: usize, radius_sq: usize) -> PoreMask {
        PoreMask::from_fn(size, size, |r, c| {
            let dr = r.abs_diff(center);
            let dc = c.abs_diff(center);
            dr * dr + dc * dc <= radius_sq
        })
    }

    #[test]
    fn test_opening_removes_thin_line() {
        // Blob plus a one-pixel-wide tail
        let mask = PoreMask::from_fn(15, 15, |r, c| {
            ((3..10).contains(&r) && (3..10).contains(&c)) || (r == 6 && c >= 10)
        });
        let se = StructuringElement::disk(2).unwrap();
        let opened = opening(&mask, &se, BorderMode::Open).unwrap();
        assert!(opened.is_pore(6, 6));
        assert!(!opened.is_pore(6, 12));
    }

    #[test]
    fn test_opening_subset_of_mask() {
        let mask = disk_mask(31, 15, 49);
        for radius in 1..=8 {
            let se = StructuringElement::disk(radius).unwrap();
            let opened = opening(&mask, &se, BorderMode::Open).unwrap();
            for r in 0..31 {
                for c in 0..31 {
                    assert!(!opened.is_pore(r, c) || mask.is_pore(r, c));
                }
            }
        }
    }

    #[test]
    fn test_opening_via_algorithm_trait() {
        let mask = disk_mask(21, 10, 25);
        let opened = Opening
            .execute(mask.clone(), OpeningParams { radius: 5, border: BorderMode::Open })
            .unwrap();
        // Only the center fits radius 5; the rim at distance exactly 5 is not covered
        assert!(opened.is_pore(10, 10));
        assert!(opened.is_pore(10, 14));
        assert!(!opened.is_pore(10, 15));
        assert!(!opened.is_pore(13, 14));

        let too_big = Opening
            .execute(mask, OpeningParams { radius: 6, border: BorderMode::Open })
            .unwrap();
        assert_eq!(too_big.pore_count(), 0);
    }
}
