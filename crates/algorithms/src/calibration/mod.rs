//! Pixel-size calibration

mod table;

pub use table::{Calibration, CalibrationEntry, CalibrationTable, CalibrationTableBuilder};
