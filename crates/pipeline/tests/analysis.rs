//! Pipeline behaviour on small synthetic micrographs

use std::fs;
use std::time::Duration;

use poromet_algorithms::calibration::CalibrationTable;
use poromet_algorithms::porosimetry::{Limits, PorosimetryParams};
use poromet_algorithms::CancelToken;
use poromet_core::io::read_image;
use poromet_core::{Error, ErrorClass, GrayImage, Raster};
use poromet_pipeline::export::{MASK_FILE, RAW_HISTOGRAM_FILE, SUMMARY_FILE, THICKNESS_FILE};
use poromet_pipeline::{
    analysis_dir, export_or_log, run_analysis, AnalysisConfig, AnalysisReport, AnalysisRequest,
    Analyzer, CacheConfig,
};

/// 64x48 at 1x, two nanometres per pixel
fn table() -> CalibrationTable {
    CalibrationTable::builder()
        .entry(64, 48, 1, 0.5)
        .build()
        .unwrap()
}

/// Dark disks of radius 6 and 3 on a bright background
fn micrograph() -> GrayImage {
    Raster::from_fn(48, 64, |r, c| {
        let (r, c) = (r as i64, c as i64);
        let big = (r - 24).pow(2) + (c - 20).pow(2) <= 36;
        let small = (r - 24).pow(2) + (c - 48).pow(2) <= 9;
        if big || small {
            0.1
        } else {
            0.9
        }
    })
}

fn request() -> AnalysisRequest {
    AnalysisRequest::new(micrograph(), 1, 32.0)
}

fn analyze(config: &AnalysisConfig, request: &AnalysisRequest) -> poromet_core::Result<AnalysisReport> {
    run_analysis(request, &table(), config, &CancelToken::new()).map(|out| out.report)
}

#[test]
fn reports_calibrated_distribution() {
    let output = run_analysis(&request(), &table(), &AnalysisConfig::default(), &CancelToken::new())
        .unwrap();
    let report = &output.report;

    assert_eq!(report.resolution, (64, 48));
    assert_eq!(report.pixel_size_nm, 2.0);
    assert_eq!(report.max_radius_px, 8);
    assert_eq!(report.histogram.len(), 100);
    assert!((report.psd.total_mass() - 1.0).abs() < 1e-6);
    assert!((report.porosity - (113.0 + 29.0) / 3072.0).abs() < 1e-12);
    assert_eq!(output.thickness.get(24, 20).unwrap(), 6);
    assert_eq!(output.thickness.get(24, 48).unwrap(), 3);

    // Diameters run from 2 px to 12 px radius-doubled, at 2 nm per pixel
    let first = report.psd.bins.first().unwrap();
    let last = report.psd.bins.last().unwrap();
    assert!(first.lower() >= 2.0 * 2.0 - 1e-9);
    assert!(last.upper() <= 2.0 * 2.0 * 6.0 + 1e-9);
    assert!(report.summary.mode_diameter > 0.0);
}

#[test]
fn analyzer_exports_and_caches() {
    let tmp = tempfile::tempdir().unwrap();
    let analyzer = Analyzer::new(table(), AnalysisConfig::default(), CacheConfig::default())
        .with_output_root(tmp.path());

    let report = analyzer.analyze(&request()).unwrap();
    let dir = analyzer.output_dir(&report.id).unwrap().unwrap();
    assert!(dir.starts_with(tmp.path()));

    let summary = fs::read_to_string(dir.join(SUMMARY_FILE)).unwrap();
    assert!(summary.starts_with("Pore Size Analysis (all nm units)\n"));
    assert!(summary.contains("Image : 64×48px , 1×"));
    assert!(summary.contains("Pixel  : 2.0000 nm / px"));
    assert!(summary.contains("Diameter_center(nm)\tBin_width(nm)\tPDF_diameter"));

    let raw = fs::read_to_string(dir.join(RAW_HISTOGRAM_FILE)).unwrap();
    assert_eq!(raw.lines().next(), Some("Diameter_center(nm)\tPDF_diameter"));
    assert!(raw.contains("Weighted Mean Diameter:"));

    let mask = read_image(dir.join(MASK_FILE)).unwrap();
    let pores = mask.iter().filter(|&&v| v > 0.5).count();
    assert_eq!(pores, 113 + 29);

    let thickness = read_image(dir.join(THICKNESS_FILE)).unwrap();
    assert_eq!(thickness.get(24, 20).unwrap(), 6.0);

    let cached = analyzer.report(&report.id).unwrap().unwrap();
    assert_eq!(*cached, *report);
    assert_eq!(analyzer.cached().unwrap(), 1);
}

#[test]
fn eviction_removes_old_exports() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = CacheConfig {
        capacity: 1,
        ttl: Duration::from_secs(3600),
    };
    let analyzer =
        Analyzer::new(table(), AnalysisConfig::default(), cache).with_output_root(tmp.path());

    let first = analyzer.analyze(&request()).unwrap();
    let first_dir = analyzer.output_dir(&first.id).unwrap().unwrap();
    assert!(first_dir.exists());

    let second = analyzer.analyze(&request()).unwrap();
    assert_ne!(first.id, second.id);
    assert!(analyzer.report(&first.id).unwrap().is_none());
    assert!(!first_dir.exists());
}

#[test]
fn export_failure_does_not_fail_analysis() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("not_a_dir");
    fs::write(&blocker, b"file").unwrap();

    let analyzer = Analyzer::new(table(), AnalysisConfig::default(), CacheConfig::default())
        .with_output_root(&blocker);
    let report = analyzer.analyze(&request()).unwrap();
    assert!(analyzer.output_dir(&report.id).unwrap().is_none());
}

#[test]
fn failed_export_leaves_no_partial_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let output = run_analysis(&request(), &table(), &AnalysisConfig::default(), &CancelToken::new())
        .unwrap();
    let dir = analysis_dir(tmp.path(), &output.report.id);
    // The text reports succeed, then the mask write hits a directory
    fs::create_dir_all(dir.join(MASK_FILE)).unwrap();

    assert!(export_or_log(&dir, &output).is_none());
    assert!(!dir.exists());
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn unknown_calibration_is_client_error() {
    let req = AnalysisRequest::new(micrograph(), 15, 32.0);
    let err = analyze(&AnalysisConfig::default(), &req).unwrap_err();
    assert!(matches!(err, Error::Calibration { magnification: 15, .. }));
    assert_eq!(err.class(), ErrorClass::Client);
    assert_eq!(err.status_code(), 400);
}

#[test]
fn diameter_below_one_pixel_is_rejected() {
    // 0.5 px/nm: a 3 nm diameter is a 0.75 px radius
    let req = AnalysisRequest::new(micrograph(), 1, 3.0);
    let err = analyze(&AnalysisConfig::default(), &req).unwrap_err();
    assert!(matches!(err, Error::InvalidParameter { name: "max_diameter_nm", .. }));
}

#[test]
fn oversized_request_is_rejected() {
    let config = AnalysisConfig {
        porosimetry: PorosimetryParams {
            limits: Limits {
                max_pixels: 1000,
                max_radii: 512,
            },
            ..Default::default()
        },
        ..Default::default()
    };
    let err = analyze(&config, &request()).unwrap_err();
    assert!(matches!(err, Error::LimitExceeded { what: "pixels", .. }));
    assert_eq!(err.status_code(), 413);
}

#[test]
fn cancelled_request_stops() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = run_analysis(&request(), &table(), &AnalysisConfig::default(), &cancel).unwrap_err();
    assert!(matches!(err, Error::Cancelled(_)));
    assert_eq!(err.status_code(), 503);

    let config = AnalysisConfig {
        timeout: Some(Duration::ZERO),
        ..Default::default()
    };
    let analyzer = Analyzer::new(table(), config, CacheConfig::default());
    assert!(matches!(analyzer.analyze(&request()), Err(Error::Cancelled(_))));
}

#[test]
fn degenerate_images_are_server_errors() {
    let flat = AnalysisRequest::new(Raster::filled(48, 64, 0.3), 1, 32.0);
    let err = analyze(&AnalysisConfig::default(), &flat).unwrap_err();
    assert!(matches!(err, Error::DegenerateImage { .. }));
    assert_eq!(err.class(), ErrorClass::Server);

    let no_pores = request().with_threshold_multiplier(1e-6);
    let err = analyze(&AnalysisConfig::default(), &no_pores).unwrap_err();
    assert!(matches!(err, Error::NoPoresDetected));
    assert_eq!(err.status_code(), 500);
}
