//! Binary erosion by a disk
//!
//! Keeps a pore pixel only when the whole structuring element centered on it
//! lies in the pore phase.

use crate::maybe_rayon::*;
use poromet_core::{PoreMask, Result};

use super::distance::BorderMode;
use super::element::StructuringElement;

/// Erode a pore mask by a structuring element
///
/// Offsets falling outside the image are ignored with [`BorderMode::Open`]
/// and count as solid with [`BorderMode::Solid`].
pub fn erode(
    mask: &PoreMask,
    element: &StructuringElement,
    border: BorderMode,
) -> Result<PoreMask> {
    let (rows, cols) = mask.shape();
    let offsets = element.offsets();
    let pixels = mask.data();

    let data: Vec<bool> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![false; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                if !pixels[(row, col)] {
                    continue;
                }
                *out = offsets.iter().all(|&(dr, dc)| {
                    match neighbor(row, col, dr, dc, rows, cols) {
                        Some(idx) => pixels[idx],
                        None => border == BorderMode::Open,
                    }
                });
            }
            row_data
        })
        .collect();

    PoreMask::from_vec(data, rows, cols)
}

/// In-bounds neighbor index of (row + dr, col + dc)
pub(crate) fn neighbor(
    row: usize,
    col: usize,
    dr: isize,
    dc: isize,
    rows: usize,
    cols: usize,
) -> Option<(usize, usize)> {
    let r = row.checked_add_signed(dr)?;
    let c = col.checked_add_signed(dc)?;
    (r < rows && c < cols).then_some((r, c))
}
