//! Report files written for each analysis

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use poromet_core::io::{write_mask, write_raster};
use poromet_core::{Error, Result};
use tracing::{error, info, warn};

use crate::analysis::{AnalysisOutput, AnalysisReport};

pub const SUMMARY_FILE: &str = "pore_size_analysis.txt";
pub const RAW_HISTOGRAM_FILE: &str = "raw_histogram_data.txt";
pub const MASK_FILE: &str = "thresholded_image.tif";
pub const THICKNESS_FILE: &str = "local_thickness.tif";
pub const REPORT_JSON_FILE: &str = "report.json";

/// Locations of the files written by [`export_analysis`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub dir: PathBuf,
    pub summary: PathBuf,
    pub raw_histogram: PathBuf,
    pub mask: PathBuf,
    pub thickness: PathBuf,
    pub report_json: PathBuf,
}

impl ExportedFiles {
    fn in_dir(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            summary: dir.join(SUMMARY_FILE),
            raw_histogram: dir.join(RAW_HISTOGRAM_FILE),
            mask: dir.join(MASK_FILE),
            thickness: dir.join(THICKNESS_FILE),
            report_json: dir.join(REPORT_JSON_FILE),
        }
    }

    /// Every file, in write order
    pub fn all(&self) -> [&Path; 5] {
        [
            &self.summary,
            &self.raw_histogram,
            &self.mask,
            &self.thickness,
            &self.report_json,
        ]
    }
}

/// Directory name used for one analysis under an output root
pub fn analysis_dir(root: &Path, id: &str) -> PathBuf {
    root.join(format!("analysis_{}", id))
}

/// Human-readable summary with the full binned distribution
pub fn format_summary(report: &AnalysisReport) -> String {
    let (w, h) = report.resolution;
    let mut out = String::new();
    out.push_str("Pore Size Analysis (all nm units)\n");
    let _ = writeln!(out, "Image : {}×{}px , {}×", w, h, report.magnification);
    let _ = writeln!(out, "Pixel  : {:.4} nm / px\n", report.pixel_size_nm);
    let _ = writeln!(out, "Average Diameter : {:.3} nm", report.summary.mean_diameter);
    let _ = writeln!(out, "Mode    Diameter : {:.3} nm", report.summary.mode_diameter);
    let _ = writeln!(
        out,
        "D10 / D50 / D90  : {:.3} / {:.3} / {:.3} nm",
        report.summary.d10, report.summary.d50, report.summary.d90
    );
    let _ = writeln!(
        out,
        "Porosity         : {:.4} (threshold {:.4})\n",
        report.porosity, report.threshold
    );
    out.push_str("Diameter_center(nm)\tBin_width(nm)\tPDF_diameter\n");
    for bin in &report.psd.bins {
        let _ = writeln!(out, "{:.3}\t{:.3}\t{:.6}", bin.center, bin.width, bin.density);
    }
    out
}

/// Two-column (diameter, density) table followed by the mean diameter
pub fn format_raw_histogram(report: &AnalysisReport) -> String {
    let mut out = String::from("Diameter_center(nm)\tPDF_diameter\n");
    for &(center, density) in &report.histogram {
        let _ = writeln!(out, "{:.3}\t{:.6}", center, density);
    }
    let _ = writeln!(
        out,
        "\nWeighted Mean Diameter: {:.3} nm",
        report.summary.mean_diameter
    );
    out
}

/// Write every report file into `dir`, creating it if needed
pub fn export_analysis(dir: &Path, output: &AnalysisOutput) -> Result<ExportedFiles> {
    fs::create_dir_all(dir)
        .map_err(|e| Error::Export(format!("cannot create {}: {}", dir.display(), e)))?;
    let files = ExportedFiles::in_dir(dir);

    write_text(&files.summary, &format_summary(&output.report))?;
    write_text(&files.raw_histogram, &format_raw_histogram(&output.report))?;
    write_mask(&output.mask, &files.mask).map_err(|e| export_error(&files.mask, e))?;
    write_raster(&output.thickness, &files.thickness)
        .map_err(|e| export_error(&files.thickness, e))?;
    let json = serde_json::to_string_pretty(&output.report)
        .map_err(|e| Error::Export(format!("cannot serialize report: {}", e)))?;
    write_text(&files.report_json, &json)?;

    info!(dir = %dir.display(), "exported analysis");
    Ok(files)
}

/// Like [`export_analysis`], but failures are logged and swallowed
///
/// A partially written directory is removed, since no cache entry will own it.
pub fn export_or_log(dir: &Path, output: &AnalysisOutput) -> Option<ExportedFiles> {
    match export_analysis(dir, output) {
        Ok(files) => Some(files),
        Err(e) => {
            error!(dir = %dir.display(), error = %e, "export failed");
            if dir.exists() {
                match fs::remove_dir_all(dir) {
                    Ok(()) => warn!(dir = %dir.display(), "removed partial export"),
                    Err(e) => {
                        error!(dir = %dir.display(), error = %e, "cannot remove partial export")
                    }
                }
            }
            None
        }
    }
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|e| export_error(path, e))
}

fn export_error(path: &Path, e: impl std::fmt::Display) -> Error {
    Error::Export(format!("cannot write {}: {}", path.display(), e))
}
