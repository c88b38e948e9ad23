//! # Poromet Core
//!
//! Core types, traits and I/O for the Poromet pore-size analysis library.
//!
//! This crate provides:
//! - `Raster<T>`: Generic pixel grid type
//! - `PoreMask`: Boolean pore/solid phase mask
//! - `Error`: Error taxonomy shared by every stage, with client/server classification
//! - Algorithm traits for consistent API
//! - Image I/O: TIFF, PNG and JPEG micrographs in, TIFF rasters out

pub mod error;
pub mod io;
pub mod raster;

pub use error::{Error, ErrorClass, Result};
pub use raster::{GrayImage, PoreMask, Raster, RasterElement, ThicknessMap};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, ErrorClass, Result};
    pub use crate::raster::{GrayImage, PoreMask, Raster, RasterElement, ThicknessMap};
    pub use crate::Algorithm;
}

/// Uniform entry point for the analysis stages.
///
/// Each stage (segmentation, opening, porosimetry) is a unit struct that
/// takes its input by value and a `Default`-able parameter struct.
pub trait Algorithm {
    type Input;
    type Output;
    type Params: Default;
    type Error: std::error::Error;

    /// Short stage name used in logs
    fn name(&self) -> &'static str;

    /// One-line description of what the stage computes
    fn description(&self) -> &'static str;

    fn execute(
        &self,
        input: Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;

    /// Run with `Params::default()`
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
