//! I/O for micrographs and analysis rasters

mod native;

pub use native::{read_image, read_image_from_buffer, write_mask, write_raster};
