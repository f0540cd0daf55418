//! Feature extraction
//!
//! Converts normalized records into a model-ready calendar feature matrix.

pub mod calendar_day;
pub mod extractor;

pub use calendar_day::{DateFeature, DayFeatures};
pub use extractor::{FeatureExtractor, FeatureMatrix, WeekIndexMode};
