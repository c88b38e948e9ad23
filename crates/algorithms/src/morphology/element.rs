//! Disk structuring element for binary morphology
//!
//! The disk of radius `r` is the open Euclidean ball
//! `{(dr, dc) : dr² + dc² < r²}`. A center therefore fits inside the pore
//! phase exactly when no solid pixel lies closer than `r`, which is the same
//! test the distance-transform path applies (`dist² >= r²`).

use poromet_core::{Error, Result};

/// Disk-shaped structuring element with precomputed pixel offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    radius: usize,
    offsets: Vec<(isize, isize)>,
}

impl StructuringElement {
    /// Build the disk of the given radius (must be at least 1)
    pub fn disk(radius: usize) -> Result<Self> {
        if radius == 0 {
            return Err(Error::invalid_parameter(
                "radius",
                0,
                "structuring element radius must be at least 1",
            ));
        }

        let r = radius as isize;
        let r2 = r * r;
        let mut offsets = Vec::new();
        for dr in -r..=r {
            for dc in -r..=r {
                if dr * dr + dc * dc < r2 {
                    offsets.push((dr, dc));
                }
            }
        }

        Ok(Self { radius, offsets })
    }

    /// Radius of the disk
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// (dr, dc) offsets relative to center for all covered pixels
    pub fn offsets(&self) -> &[(isize, isize)] {
        &self.offsets
    }

    /// Number of pixels covered by the element
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Always false: every disk covers at least its center
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}
