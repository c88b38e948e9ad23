//! Binary dilation by a disk
//!
//! Marks every pixel covered by the structuring element centered on some
//! seed pixel. The disk is symmetric, so coverage is a gather over the same
//! offsets.

use crate::maybe_rayon::*;
use poromet_core::{PoreMask, Result};

use super::element::StructuringElement;
use super::erode::neighbor;

/// Dilate a seed mask by a structuring element
pub fn dilate(seeds: &PoreMask, element: &StructuringElement) -> Result<PoreMask> {
    let (rows, cols) = seeds.shape();
    let offsets = element.offsets();
    let pixels = seeds.data();

    let data: Vec<bool> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| {
                    offsets.iter().any(|&(dr, dc)| {
                        neighbor(row, col, dr, dc, rows, cols).is_some_and(|idx| pixels[idx])
                    })
                })
                .collect::<Vec<bool>>()
        })
        .collect();

    PoreMask::from_vec(data, rows, cols)
}
