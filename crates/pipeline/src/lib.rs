//! # Poromet Pipeline
//!
//! Runs complete analyses of micrographs and keeps their results.
//!
//! - **request**: `AnalysisRequest` and shared `AnalysisConfig`
//! - **analysis**: calibrate → segment → local thickness → distribution → summary
//! - **cache**: bounded, expiring `ResultCache` keyed by analysis id
//! - **export**: text reports and TIFF rasters per analysis

pub mod analysis;
pub mod cache;
pub mod export;
pub mod request;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use poromet_algorithms::calibration::CalibrationTable;
use poromet_algorithms::CancelToken;
use poromet_core::{Error, Result};
use tracing::warn;

pub use analysis::{next_analysis_id, run_analysis, AnalysisOutput, AnalysisReport};
pub use cache::{CacheConfig, ResultCache};
pub use export::{analysis_dir, export_analysis, export_or_log, ExportedFiles};
pub use request::{AnalysisConfig, AnalysisRequest};

/// Long-lived analysis service: calibration table, configuration, result
/// cache and an optional export root.
///
/// Shareable across threads; only the cache is behind a lock.
pub struct Analyzer {
    table: CalibrationTable,
    config: AnalysisConfig,
    output_root: Option<PathBuf>,
    cache: Mutex<ResultCache>,
}

impl Analyzer {
    pub fn new(table: CalibrationTable, config: AnalysisConfig, cache: CacheConfig) -> Self {
        Self {
            table,
            config,
            output_root: None,
            cache: Mutex::new(ResultCache::new(cache)),
        }
    }

    /// Export every analysis under `root/analysis_<id>`
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = Some(root.into());
        self
    }

    pub fn table(&self) -> &CalibrationTable {
        &self.table
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run a request with the configured timeout
    pub fn analyze(&self, request: &AnalysisRequest) -> Result<Arc<AnalysisReport>> {
        self.analyze_with(request, &self.config.cancel_token())
    }

    /// Run a request with a caller-supplied cancellation token
    ///
    /// Export failures are logged and leave the analysis without a directory.
    pub fn analyze_with(
        &self,
        request: &AnalysisRequest,
        cancel: &CancelToken,
    ) -> Result<Arc<AnalysisReport>> {
        let output = run_analysis(request, &self.table, &self.config, cancel)?;
        let dir = self.output_root.as_ref().and_then(|root| {
            let dir = analysis_dir(root, &output.report.id);
            export_or_log(&dir, &output).map(|files| files.dir)
        });
        let report = self.lock_cache()?.insert(output.report, dir);
        Ok(report)
    }

    /// Cached report by id
    pub fn report(&self, id: &str) -> Result<Option<Arc<AnalysisReport>>> {
        Ok(self.lock_cache()?.get(id))
    }

    /// Export directory of a cached analysis
    pub fn output_dir(&self, id: &str) -> Result<Option<PathBuf>> {
        Ok(self.lock_cache()?.dir(id))
    }

    /// Number of cached analyses after dropping expired ones
    pub fn cached(&self) -> Result<usize> {
        let mut cache = self.lock_cache()?;
        cache.purge_expired();
        Ok(cache.len())
    }

    fn lock_cache(&self) -> Result<MutexGuard<'_, ResultCache>> {
        self.cache.lock().map_err(|_| {
            warn!("result cache lock poisoned");
            Error::Other("result cache lock poisoned".into())
        })
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(
            CalibrationTable::default(),
            AnalysisConfig::default(),
            CacheConfig::default(),
        )
    }
}
