//! Microscope calibration lookup
//!
//! Maps (image width, image height, magnification) to the physical pixel
//! size. Tables are plain data: the built-in one covers the instruments the
//! tool ships with, custom ones come from a builder or a JSON file.

use std::collections::BTreeMap;

use poromet_core::error::SupportedCombinations;
use poromet_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Physical scale of one image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Pixels per nanometre
    pub pixels_per_nm: f64,
}

impl Calibration {
    pub fn new(pixels_per_nm: f64) -> Result<Self> {
        if !pixels_per_nm.is_finite() || pixels_per_nm <= 0.0 {
            return Err(Error::invalid_parameter(
                "pixels_per_nm",
                pixels_per_nm,
                "must be a positive finite number",
            ));
        }
        Ok(Self { pixels_per_nm })
    }

    /// Nanometres spanned by one pixel
    pub fn nm_per_pixel(&self) -> f64 {
        1.0 / self.pixels_per_nm
    }

    /// Largest pixel radius that fits within `max_diameter_nm`
    ///
    /// `floor((max_diameter_nm / 2) * pixels_per_nm)`; a bound below one pixel
    /// is rejected.
    pub fn radius_bound(&self, max_diameter_nm: f64) -> Result<u32> {
        if !max_diameter_nm.is_finite() || max_diameter_nm <= 0.0 {
            return Err(Error::invalid_parameter(
                "max_diameter_nm",
                max_diameter_nm,
                "must be a positive finite number",
            ));
        }
        let bound = ((max_diameter_nm / 2.0) * self.pixels_per_nm).floor();
        if bound < 1.0 {
            return Err(Error::invalid_parameter(
                "max_diameter_nm",
                max_diameter_nm,
                format!(
                    "maximum pore radius is {:.3} px at this calibration; at least 1 px is required",
                    (max_diameter_nm / 2.0) * self.pixels_per_nm
                ),
            ));
        }
        if bound > u32::MAX as f64 {
            return Err(Error::invalid_parameter(
                "max_diameter_nm",
                max_diameter_nm,
                "radius bound does not fit in 32 bits",
            ));
        }
        Ok(bound as u32)
    }
}

/// One row of a calibration table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationEntry {
    pub width: usize,
    pub height: usize,
    pub magnification: u32,
    pub pixels_per_nm: f64,
}

type Key = (usize, usize, u32);

/// Lookup table from (resolution, magnification) to [`Calibration`]
///
/// Serialized as a list of [`CalibrationEntry`] rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CalibrationEntry>", into = "Vec<CalibrationEntry>")]
pub struct CalibrationTable {
    entries: BTreeMap<Key, Calibration>,
}

impl Default for CalibrationTable {
    fn default() -> Self {
        let rows: [(usize, usize, u32, f64); 7] = [
            (2560, 1920, 10, 1008.0 / 5000.0),
            (2560, 1920, 20, 807.0 / 2000.0),
            (2560, 1920, 50, 1022.0 / 1000.0),
            (2560, 1920, 100, 1018.0 / 500.0),
            (1280, 960, 200, 406.0 / 200.0),
            (1280, 960, 300, 303.0 / 100.0),
            (554, 416, 200, 174.0 / 200.0),
        ];
        let entries = rows
            .into_iter()
            .map(|(w, h, m, ppn)| ((w, h, m), Calibration { pixels_per_nm: ppn }))
            .collect();
        Self { entries }
    }
}

impl CalibrationTable {
    /// Empty table builder
    pub fn builder() -> CalibrationTableBuilder {
        CalibrationTableBuilder::default()
    }

    /// Look up the calibration for an image
    ///
    /// # Errors
    /// [`Error::Calibration`] listing every supported combination when the
    /// triple is unknown.
    pub fn resolve(&self, width: usize, height: usize, magnification: u32) -> Result<Calibration> {
        self.entries
            .get(&(width, height, magnification))
            .copied()
            .ok_or_else(|| Error::Calibration {
                width,
                height,
                magnification,
                supported: self.supported(),
            })
    }

    /// Supported magnifications grouped by resolution
    pub fn supported(&self) -> SupportedCombinations {
        let mut out: SupportedCombinations = BTreeMap::new();
        for &(w, h, m) in self.entries.keys() {
            out.entry((w, h)).or_default().push(m);
        }
        out
    }

    /// All rows in key order
    pub fn entries(&self) -> Vec<CalibrationEntry> {
        self.entries
            .iter()
            .map(|(&(width, height, magnification), cal)| CalibrationEntry {
                width,
                height,
                magnification,
                pixels_per_nm: cal.pixels_per_nm,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a table from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Input(format!("invalid calibration table: {}", e)))
    }
}

impl TryFrom<Vec<CalibrationEntry>> for CalibrationTable {
    type Error = Error;

    fn try_from(rows: Vec<CalibrationEntry>) -> Result<Self> {
        rows.into_iter()
            .fold(Self::builder(), |b, e| {
                b.entry(e.width, e.height, e.magnification, e.pixels_per_nm)
            })
            .build()
    }
}

impl From<CalibrationTable> for Vec<CalibrationEntry> {
    fn from(table: CalibrationTable) -> Self {
        table.entries()
    }
}

/// Builder for custom [`CalibrationTable`]s
#[derive(Debug, Clone, Default)]
pub struct CalibrationTableBuilder {
    rows: Vec<CalibrationEntry>,
}

impl CalibrationTableBuilder {
    /// Add one (width, height, magnification) → pixels-per-nm row
    pub fn entry(mut self, width: usize, height: usize, magnification: u32, pixels_per_nm: f64) -> Self {
        self.rows.push(CalibrationEntry {
            width,
            height,
            magnification,
            pixels_per_nm,
        });
        self
    }

    /// Validate and build; duplicate keys and non-positive scales are rejected
    pub fn build(self) -> Result<CalibrationTable> {
        let mut entries = BTreeMap::new();
        for row in self.rows {
            let cal = Calibration::new(row.pixels_per_nm)?;
            let key = (row.width, row.height, row.magnification);
            if entries.insert(key, cal).is_some() {
                return Err(Error::invalid_parameter(
                    "calibration",
                    format!("{}x{} @ {}x", row.width, row.height, row.magnification),
                    "duplicate calibration entry",
                ));
            }
        }
        Ok(CalibrationTable { entries })
    }
}
