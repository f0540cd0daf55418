//! End-to-end extraction: load, normalize, extract

use crate::calendar;
use crate::data::{load_rows, normalize_rows};
use crate::features::{FeatureExtractor, FeatureMatrix};
use crate::{Config, NormalizedRecord, Result};
use std::collections::BTreeSet;

/// Load the named resource and build its feature matrix
pub fn extract_from_resource(config: &Config, name: &str) -> Result<FeatureMatrix> {
    let rows = load_rows(&config.data, name)?;
    let records = normalize_rows(&rows, &config.labels)?;
    extract_records(config, &records)
}

/// Build the feature matrix for already normalized records.
///
/// A fresh holiday calendar is built for every call, preloaded with the
/// configured years and, if enabled, the years the record windows touch.
pub fn extract_records(config: &Config, records: &[NormalizedRecord]) -> Result<FeatureMatrix> {
    let extractor = FeatureExtractor::new(config.features.clone())?;

    let extra_years = if config.holidays.expand_years {
        extractor.window_years(records)
    } else {
        BTreeSet::new()
    };
    let holidays = calendar::from_config(&config.holidays, extra_years)?;

    let matrix = extractor.extract(records, holidays.as_ref())?;
    log::info!(
        "Built feature matrix with {} rows and {} columns",
        matrix.n_records(),
        matrix.names.len()
    );
    Ok(matrix)
}
