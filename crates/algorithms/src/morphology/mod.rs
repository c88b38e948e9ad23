//! Binary mathematical morphology on pore masks
//!
//! - **Distance transform**: exact squared Euclidean distance to the nearest solid
//! - **Erosion**: keep pixels whose whole disk lies in the pore phase
//! - **Dilation**: grow seeds by a disk
//! - **Opening**: erosion then dilation (union of fitting disks)

mod dilate;
mod distance;
mod element;
mod erode;
mod opening;

pub use dilate::dilate;
pub use distance::{
    distance_map, squared_distance_to_sites, squared_distance_to_solid, BorderMode,
};
pub use element::StructuringElement;
pub use erode::erode;
pub use opening::{opening, Opening, OpeningParams};
