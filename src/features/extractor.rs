//! Windowed calendar feature extraction
//!
//! For every record a window of `time_range` days around its anchor date is
//! expanded into `DateFeature::COUNT` features per day. Offset index `t` maps
//! to the day `anchor + (t - time_range / 2)`, so the default window of 8
//! covers days -4..=3.

use super::calendar_day::{flag, DateFeature, DayFeatures};
use crate::calendar::HolidayCalendar;
use crate::{FeatureConfig, FeatureError, NormalizedRecord, Result};
use chrono::{Datelike, Duration, NaiveDate};
use ndarray::{s, Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which day the week-of-year and week-of-month columns are derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeekIndexMode {
    /// Every offset uses the first day of the window. Matches matrices
    /// produced by the original preprocessing pipeline.
    FirstOffset,
    /// Each offset uses its own day
    PerOffset,
}

/// Feature matrix with one row per record and its column names
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub values: Array2<f64>,
    pub names: Vec<String>,
    time_range: usize,
}

impl FeatureMatrix {
    /// (records, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn n_records(&self) -> usize {
        self.values.nrows()
    }

    pub fn time_range(&self) -> usize {
        self.time_range
    }

    pub fn row(&self, record: usize) -> ArrayView1<'_, f64> {
        self.values.row(record)
    }

    /// Column holding `feature` for offset index `offset_index`
    pub fn column_index(&self, offset_index: usize, feature: DateFeature) -> usize {
        offset_index * DateFeature::COUNT + feature.index()
    }

    /// Value of one feature of one record at an offset index
    pub fn value(&self, record: usize, offset_index: usize, feature: DateFeature) -> f64 {
        self.values[[record, self.column_index(offset_index, feature)]]
    }

    /// Column by name
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values.column(i))
    }

    /// Features of one record at one offset index
    pub fn day_block(&self, record: usize, offset_index: usize) -> ArrayView1<'_, f64> {
        let start = offset_index * DateFeature::COUNT;
        self.values
            .slice(s![record, start..start + DateFeature::COUNT])
    }
}

/// Computes the windowed calendar features of normalized records
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Result<Self> {
        if config.time_range == 0 {
            return Err(FeatureError::Config(
                "time_range must be at least 1".to_string(),
            ));
        }
        if config.num_features_per_date != DateFeature::COUNT {
            return Err(FeatureError::Config(format!(
                "num_features_per_date must be {}, got {}",
                DateFeature::COUNT,
                config.num_features_per_date
            )));
        }
        Ok(FeatureExtractor { config })
    }

    /// Total number of matrix columns
    pub fn num_columns(&self) -> usize {
        self.config.time_range * self.config.num_features_per_date
    }

    /// Day delta of each offset index, in column order
    pub fn offsets(&self) -> Vec<i64> {
        let half = (self.config.time_range / 2) as i64;
        (0..self.config.time_range as i64).map(|t| t - half).collect()
    }

    /// Column names in matrix column order
    pub fn column_names(&self) -> Vec<String> {
        self.offsets()
            .into_iter()
            .flat_map(|delta| DateFeature::all().iter().map(move |f| f.column_name(delta)))
            .collect()
    }

    /// Calendar years touched by the windows of the given records
    pub fn window_years(&self, records: &[NormalizedRecord]) -> BTreeSet<i32> {
        let offsets = self.offsets();
        let (Some(&first), Some(&last)) = (offsets.first(), offsets.last()) else {
            return BTreeSet::new();
        };

        records
            .iter()
            .filter_map(|r| {
                let anchor = r.anchor_date();
                Some((shift(anchor, first)?.year(), shift(anchor, last)?.year()))
            })
            .flat_map(|(from, to)| from..=to)
            .collect()
    }

    /// Build the feature matrix for `records`
    pub fn extract(
        &self,
        records: &[NormalizedRecord],
        calendar: &dyn HolidayCalendar,
    ) -> Result<FeatureMatrix> {
        let mut values = Array2::<f64>::zeros((records.len(), self.num_columns()));

        for (i, record) in records.iter().enumerate() {
            let days = self.window(record.anchor_date())?;
            let first_day = days[0];

            for (t, day) in days.iter().enumerate() {
                let features = self.day_features(*day, first_day, calendar);
                let start = t * DayFeatures::DIM;
                values
                    .slice_mut(s![i, start..start + DayFeatures::DIM])
                    .assign(&Array1::from(features.to_vec()));
            }
        }

        log::debug!(
            "Extracted features for {} records: shape {:?}",
            records.len(),
            values.dim()
        );

        Ok(FeatureMatrix {
            values,
            names: self.column_names(),
            time_range: self.config.time_range,
        })
    }

    /// Days of the window around `anchor`, in offset order
    fn window(&self, anchor: NaiveDate) -> Result<Vec<NaiveDate>> {
        self.offsets()
            .into_iter()
            .map(|delta| {
                shift(anchor, delta).ok_or_else(|| {
                    FeatureError::InvalidCalendarDate(format!(
                        "{} shifted by {} days is out of range",
                        anchor, delta
                    ))
                })
            })
            .collect()
    }

    fn day_features(
        &self,
        day: NaiveDate,
        first_day: NaiveDate,
        calendar: &dyn HolidayCalendar,
    ) -> DayFeatures {
        let week_ref = match self.config.week_index {
            WeekIndexMode::FirstOffset => first_day,
            WeekIndexMode::PerOffset => day,
        };
        let mut features = DayFeatures::compute(day, week_ref, self.config.epoch);

        if calendar.is_holiday(day) {
            features.is_holiday = 1.0;
            if let Some(name) = calendar.holiday_name(day) {
                features.is_christmas = flag(self.config.christmas.iter().any(|n| n == name));
                features.is_easter = flag(self.config.easter.iter().any(|n| n == name));
            }
        } else {
            features.is_christmas = 0.0;
            features.is_easter = 0.0;
        }

        features
    }
}

fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{GermanHolidays, HolidayTable, Region};
    use crate::CategoryCode;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(anchor: NaiveDate) -> NormalizedRecord {
        NormalizedRecord {
            start: anchor.and_hms_opt(9, 0, 0).unwrap(),
            end: anchor.and_hms_opt(10, 0, 0).unwrap(),
            labels: vec![CategoryCode(3)],
        }
    }

    fn lower_saxony() -> GermanHolidays {
        GermanHolidays::new(&Region::new("DE", Some("NI")), 2015..=2020).unwrap()
    }

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(FeatureConfig::default()).unwrap()
    }

    /// Offset index of day delta 0 in the default window
    const ANCHOR: usize = 4;

    #[test]
    fn test_shape_and_names() {
        let extractor = extractor();
        let records = vec![record(date(2016, 6, 15)), record(date(2016, 12, 25))];
        let matrix = extractor.extract(&records, &lower_saxony()).unwrap();

        assert_eq!(matrix.shape(), (2, 96));
        assert_eq!(matrix.names.len(), 96);
        assert_eq!(matrix.names[0], "Ordinal of day -4");
        assert_eq!(matrix.names[11], "Easter of day -4");
        assert_eq!(matrix.names[12], "Ordinal of day -3");
        assert_eq!(matrix.names[95], "Easter of day 3");
    }

    #[test]
    fn test_empty_input() {
        let matrix = extractor().extract(&[], &HolidayTable::new()).unwrap();
        assert_eq!(matrix.shape(), (0, 96));
        assert_eq!(matrix.names.len(), 96);
    }

    #[test]
    fn test_offsets() {
        assert_eq!(extractor().offsets(), vec![-4, -3, -2, -1, 0, 1, 2, 3]);

        let odd = FeatureExtractor::new(FeatureConfig {
            time_range: 5,
            ..FeatureConfig::default()
        })
        .unwrap();
        assert_eq!(odd.offsets(), vec![-2, -1, 0, 1, 2]);
        assert_eq!(odd.num_columns(), 60);
    }

    #[test]
    fn test_ordinal_increases_by_one() {
        let matrix = extractor()
            .extract(&[record(date(2016, 2, 27))], &HolidayTable::new())
            .unwrap();

        for t in 1..8 {
            let prev = matrix.value(0, t - 1, DateFeature::Ordinal);
            let cur = matrix.value(0, t, DateFeature::Ordinal);
            assert_eq!(cur - prev, 1.0);
        }
        // 2016-02-27 is day 422 after 2015-01-01
        assert_eq!(matrix.value(0, ANCHOR, DateFeature::Ordinal), 422.0);
    }

    #[test]
    fn test_weekday_and_weekend() {
        let matrix = extractor()
            .extract(&[record(date(2016, 6, 15))], &HolidayTable::new())
            .unwrap();

        for t in 0..8 {
            let weekday = matrix.value(0, t, DateFeature::Weekday);
            let weekend = matrix.value(0, t, DateFeature::Weekend);
            assert!((0.0..=6.0).contains(&weekday));
            assert_eq!(weekend, flag(weekday >= 5.0));
        }
        // Anchor is a Wednesday
        assert_eq!(matrix.value(0, ANCHOR, DateFeature::Weekday), 2.0);
    }

    #[test]
    fn test_christmas_anchor() {
        let matrix = extractor()
            .extract(&[record(date(2016, 12, 25))], &lower_saxony())
            .unwrap();

        assert_eq!(matrix.value(0, ANCHOR, DateFeature::Holiday), 1.0);
        assert_eq!(matrix.value(0, ANCHOR, DateFeature::Christmas), 1.0);
        assert_eq!(matrix.value(0, ANCHOR, DateFeature::Easter), 0.0);

        // Second Christmas day is the next offset, Christmas Eve is not a holiday
        assert_eq!(matrix.value(0, ANCHOR + 1, DateFeature::Christmas), 1.0);
        assert_eq!(matrix.value(0, ANCHOR - 1, DateFeature::Holiday), 0.0);
        assert_eq!(matrix.value(0, ANCHOR - 1, DateFeature::Christmas), 0.0);
    }

    #[test]
    fn test_easter_monday() {
        let matrix = extractor()
            .extract(&[record(date(2016, 3, 28))], &lower_saxony())
            .unwrap();

        assert_eq!(matrix.value(0, ANCHOR, DateFeature::Holiday), 1.0);
        assert_eq!(matrix.value(0, ANCHOR, DateFeature::Easter), 1.0);
        assert_eq!(matrix.value(0, ANCHOR, DateFeature::Christmas), 0.0);

        // Good Friday: holiday without a named flag
        assert_eq!(matrix.value(0, ANCHOR - 3, DateFeature::Holiday), 1.0);
        assert_eq!(matrix.value(0, ANCHOR - 3, DateFeature::Easter), 0.0);
    }

    #[test]
    fn test_ordinary_day() {
        let matrix = extractor()
            .extract(&[record(date(2016, 6, 15))], &lower_saxony())
            .unwrap();

        assert_eq!(matrix.value(0, ANCHOR, DateFeature::Holiday), 0.0);
        assert_eq!(matrix.value(0, ANCHOR, DateFeature::Christmas), 0.0);
        assert_eq!(matrix.value(0, ANCHOR, DateFeature::Easter), 0.0);
    }

    #[test]
    fn test_week_columns_use_first_offset() {
        // Window runs 2016-01-03 ..= 2016-01-10
        let matrix = extractor()
            .extract(&[record(date(2016, 1, 7))], &HolidayTable::new())
            .unwrap();

        for t in 0..8 {
            assert_eq!(matrix.value(0, t, DateFeature::WeekOfYear), 0.0);
            assert_eq!(matrix.value(0, t, DateFeature::WeekOfMonth), 0.0);
        }
        assert_eq!(matrix.value(0, 7, DateFeature::DayOfYear), 10.0);
    }

    #[test]
    fn test_week_columns_per_offset() {
        let extractor = FeatureExtractor::new(FeatureConfig {
            week_index: WeekIndexMode::PerOffset,
            ..FeatureConfig::default()
        })
        .unwrap();
        let matrix = extractor
            .extract(&[record(date(2016, 1, 7))], &HolidayTable::new())
            .unwrap();

        assert_eq!(matrix.value(0, 0, DateFeature::WeekOfYear), 0.0);
        assert_eq!(matrix.value(0, 7, DateFeature::WeekOfYear), 1.0);
        assert_eq!(matrix.value(0, 7, DateFeature::WeekOfMonth), 1.0);
    }

    #[test]
    fn test_holiday_without_name_matches() {
        let mut table = HolidayTable::new();
        table.insert(date(2016, 12, 25), "Christmas Day");

        let matrix = extractor()
            .extract(&[record(date(2016, 12, 25))], &table)
            .unwrap();

        assert_eq!(matrix.value(0, ANCHOR, DateFeature::Holiday), 1.0);
        assert_eq!(matrix.value(0, ANCHOR, DateFeature::Christmas), 0.0);
    }

    /// Calendar that knows a date is a holiday but not what it is called
    struct UnnamedHolidays(NaiveDate);

    impl HolidayCalendar for UnnamedHolidays {
        fn holiday_name(&self, _date: NaiveDate) -> Option<&str> {
            None
        }

        fn is_holiday(&self, date: NaiveDate) -> bool {
            date == self.0
        }
    }

    #[test]
    fn test_holiday_without_name() {
        let day = date(2016, 12, 25);
        let matrix = extractor()
            .extract(&[record(day)], &UnnamedHolidays(day))
            .unwrap();

        assert_eq!(matrix.value(0, ANCHOR, DateFeature::Holiday), 1.0);
        assert_eq!(matrix.value(0, ANCHOR, DateFeature::Christmas), 0.0);
        assert_eq!(matrix.value(0, ANCHOR, DateFeature::Easter), 0.0);
        assert_eq!(matrix.value(0, ANCHOR + 1, DateFeature::Holiday), 0.0);
    }

    #[test]
    fn test_column_lookup() {
        let matrix = extractor()
            .extract(&[record(date(2016, 12, 25))], &lower_saxony())
            .unwrap();

        let christmas = matrix.column("Christmas of day 0").unwrap();
        assert_eq!(christmas[0], 1.0);
        assert!(matrix.column("Christmas of day 9").is_none());

        let block = matrix.day_block(0, ANCHOR);
        assert_eq!(block.len(), DateFeature::COUNT);
        assert_eq!(block[DateFeature::Month.index()], 12.0);
    }

    #[test]
    fn test_window_years() {
        let extractor = extractor();
        let years = extractor.window_years(&[
            record(date(2016, 1, 2)),
            record(date(2018, 12, 30)),
        ]);
        assert_eq!(years.into_iter().collect::<Vec<_>>(), vec![2015, 2016, 2018, 2019]);
    }

    #[test]
    fn test_invalid_config() {
        let zero = FeatureConfig {
            time_range: 0,
            ..FeatureConfig::default()
        };
        assert!(matches!(FeatureExtractor::new(zero), Err(FeatureError::Config(_))));

        let wrong_count = FeatureConfig {
            num_features_per_date: 10,
            ..FeatureConfig::default()
        };
        assert!(matches!(FeatureExtractor::new(wrong_count), Err(FeatureError::Config(_))));
    }
}
