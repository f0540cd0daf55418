//! Data ingestion
//!
//! Loading delimited event rows and normalizing them into typed records.

pub mod loader;
pub mod normalizer;

pub use loader::{load_rows, read_rows, RawRow};
pub use normalizer::{normalize_row, normalize_rows, LabelTable};
