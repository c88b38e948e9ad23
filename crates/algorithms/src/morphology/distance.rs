//! Exact Euclidean distance transform
//!
//! Separable lower-envelope algorithm (Felzenszwalb & Huttenlocher, 2012):
//! a 1-D pass along every row followed by a 1-D pass along every column.
//! Distances are kept squared so every value is an exact integer stored in
//! an `f64`, which makes repeated runs bit-identical.

use crate::maybe_rayon::*;
use poromet_core::{PoreMask, Raster, Result};
use serde::{Deserialize, Serialize};

/// How pixels outside the image are treated when measuring distance to solid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderMode {
    /// Outside the image counts as pore; pores touching the edge are not truncated
    #[default]
    Open,
    /// Outside the image counts as solid
    Solid,
}

/// Squared Euclidean distance from every pixel to the nearest `true` site.
///
/// `sites` is row-major with `rows * cols` entries. Pixels have distance 0
/// when they are themselves sites; when there are no sites at all every
/// distance is `f64::INFINITY`.
pub fn squared_distance_to_sites(sites: &[bool], rows: usize, cols: usize) -> Vec<f64> {
    debug_assert_eq!(sites.len(), rows * cols);
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    let mut grid: Vec<f64> = sites
        .iter()
        .map(|&s| if s { 0.0 } else { f64::INFINITY })
        .collect();

    // Rows, then columns via transpose so both passes parallelize on rows.
    envelope_rows(&mut grid, cols);
    let mut transposed = transpose(&grid, rows, cols);
    envelope_rows(&mut transposed, rows);
    transpose(&transposed, cols, rows)
}

/// Squared distance from each pore pixel to the nearest solid pixel.
///
/// Solid pixels have distance 0. With [`BorderMode::Solid`] the image
/// frame also acts as solid.
pub fn squared_distance_to_solid(mask: &PoreMask, border: BorderMode) -> Vec<f64> {
    let (rows, cols) = mask.shape();
    let solid: Vec<bool> = mask.data().iter().map(|&p| !p).collect();
    let mut dist = squared_distance_to_sites(&solid, rows, cols);

    if border == BorderMode::Solid {
        for row in 0..rows {
            let dr = (row + 1).min(rows - row);
            for col in 0..cols {
                let edge = dr.min(col + 1).min(cols - col) as f64;
                let d = &mut dist[row * cols + col];
                *d = d.min(edge * edge);
            }
        }
    }
    dist
}

/// Euclidean distance-to-solid map of a pore mask
pub fn distance_map(mask: &PoreMask, border: BorderMode) -> Result<Raster<f64>> {
    let (rows, cols) = mask.shape();
    let data = squared_distance_to_solid(mask, border)
        .into_iter()
        .map(f64::sqrt)
        .collect();
    Raster::from_vec(data, rows, cols)
}

fn envelope_rows(grid: &mut [f64], width: usize) {
    grid.par_chunks_mut(width).for_each(|line| {
        let mut sites = Vec::with_capacity(width);
        let mut bounds = Vec::with_capacity(width);
        let input = line.to_vec();
        lower_envelope(&input, line, &mut sites, &mut bounds);
    });
}

/// 1-D squared distance transform of the sampled function `f`.
///
/// `sites` and `bounds` are scratch buffers: the abscissae of the parabolas
/// on the lower envelope and the left end of the range each one dominates.
fn lower_envelope(f: &[f64], out: &mut [f64], sites: &mut Vec<usize>, bounds: &mut Vec<f64>) {
    sites.clear();
    bounds.clear();

    for q in 0..f.len() {
        if !f[q].is_finite() {
            continue;
        }
        let fq = f[q] + (q * q) as f64;
        loop {
            let Some(&p) = sites.last() else {
                sites.push(q);
                bounds.push(f64::NEG_INFINITY);
                break;
            };
            let fp = f[p] + (p * p) as f64;
            let s = (fq - fp) / (2.0 * (q - p) as f64);
            if bounds.last().is_some_and(|&b| s <= b) {
                sites.pop();
                bounds.pop();
            } else {
                sites.push(q);
                bounds.push(s);
                break;
            }
        }
    }

    if sites.is_empty() {
        out.fill(f64::INFINITY);
        return;
    }

    let mut k = 0;
    for (q, slot) in out.iter_mut().enumerate() {
        while k + 1 < sites.len() && bounds[k + 1] < q as f64 {
            k += 1;
        }
        let p = sites[k];
        let d = q.abs_diff(p) as f64;
        *slot = d * d + f[p];
    }
}

fn transpose(grid: &[f64], rows: usize, cols: usize) -> Vec<f64> {
    let mut out = vec![0.0; grid.len()];
    for r in 0..rows {
        for c in 0..cols {
            out[c * rows + r] = grid[r * cols + c];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(sites: &[bool], rows: usize, cols: usize) -> Vec<f64> {
        let mut out = vec![f64::INFINITY; rows * cols];
        for r in 0..rows {
            for c in 0..cols {
                for sr in 0..rows {
                    for sc in 0..cols {
                        if sites[sr * cols + sc] {
                            let dr = r as f64 - sr as f64;
                            let dc = c as f64 - sc as f64;
                            let d = dr * dr + dc * dc;
                            if d < out[r * cols + c] {
                                out[r * cols + c] = d;
                            }
                        }
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_single_site() {
        let (rows, cols) = (5, 7);
        let mut sites = vec![false; rows * cols];
        sites[2 * cols + 3] = true;
        let d = squared_distance_to_sites(&sites, rows, cols);
        assert_eq!(d[2 * cols + 3], 0.0);
        assert_eq!(d[0], 4.0 + 9.0);
        assert_eq!(d[4 * cols + 6], 4.0 + 9.0);
    }

    #[test]
    fn test_matches_brute_force() {
        let (rows, cols) = (13, 17);
        // Deterministic scattered sites
        let sites: Vec<bool> = (0..rows * cols).map(|i| (i * 37 + 11) % 23 == 0).collect();
        let fast = squared_distance_to_sites(&sites, rows, cols);
        let slow = brute_force(&sites, rows, cols);
        assert_eq!(fast, slow);
    }

    #[test]
    fn test_no_sites_is_infinite() {
        let d = squared_distance_to_sites(&[false; 6], 2, 3);
        assert!(d.iter().all(|v| v.is_infinite()));
    }

    #[test]
    fn test_solid_border_mode() {
        let mask = PoreMask::from_fn(5, 5, |_, _| true);
        let open = squared_distance_to_solid(&mask, BorderMode::Open);
        assert!(open.iter().all(|v| v.is_infinite()));

        let framed = squared_distance_to_solid(&mask, BorderMode::Solid);
        assert_eq!(framed[0], 1.0);
        assert_eq!(framed[2 * 5 + 2], 9.0);
        assert_eq!(framed[1 * 5 + 2], 4.0);
    }

    #[test]
    fn test_distance_map_disk_center() {
        // Pore disk of radius 5: nearest solid to the center is (5, 1) away
        let mask = PoreMask::from_fn(21, 21, |r, c| {
            let dr = r as i64 - 10;
            let dc = c as i64 - 10;
            dr * dr + dc * dc <= 25
        });
        let map = distance_map(&mask, BorderMode::Open).unwrap();
        assert_eq!(map.shape(), (21, 21));
        let center = map.get(10, 10).unwrap();
        assert!((center - 26f64.sqrt()).abs() < 1e-12);
        assert_eq!(map.get(0, 0).unwrap(), 0.0);
    }
}
