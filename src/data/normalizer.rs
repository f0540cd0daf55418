//! Raw row normalization
//!
//! Turns the string fields of a row into timestamps and category codes.

use super::loader::RawRow;
use crate::{CategoryCode, FeatureError, NormalizedRecord, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label of the sentinel category for events not yet assigned to a project
pub const UNASSIGNED_LABEL: &str = "Noch nicht zugeordnet";

/// Mapping from category labels to integer codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelTable {
    codes: BTreeMap<String, CategoryCode>,
}

impl Default for LabelTable {
    fn default() -> Self {
        LabelTable::from_pairs([
            ("S-B - intern (901106)", 0),
            ("ISO Zertifizierung smO (2990191)", 1),
            ("ISO Zertifizierung SWO Netz (2910667)", 2),
            ("E - intern (901107)", 3),
            ("E - MPM (2900041)", 4),
            ("E - smartTT", 5),
            ("S-B - smartTT2.0 (901106)", 6),
            (UNASSIGNED_LABEL, 7),
        ])
    }
}

impl LabelTable {
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        LabelTable {
            codes: pairs
                .into_iter()
                .map(|(label, code)| (label.to_string(), CategoryCode(code)))
                .collect(),
        }
    }

    /// Code for an exact label
    pub fn code(&self, label: &str) -> Option<CategoryCode> {
        self.codes.get(label).copied()
    }

    /// Label for a code (first match if several labels share it)
    pub fn label(&self, code: CategoryCode) -> Option<&str> {
        self.iter().find(|(_, c)| *c == code).map(|(label, _)| label)
    }

    /// Code of the unassigned sentinel, if the table defines one
    pub fn unassigned(&self) -> Option<CategoryCode> {
        self.code(UNASSIGNED_LABEL)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Entries ordered by code, then label
    pub fn iter(&self) -> impl Iterator<Item = (&str, CategoryCode)> {
        let mut entries: Vec<_> = self
            .codes
            .iter()
            .map(|(label, code)| (label.as_str(), *code))
            .collect();
        entries.sort_by_key(|(label, code)| (*code, *label));
        entries.into_iter()
    }

    /// Decode a comma-separated label string, preserving order and duplicates
    pub fn decode(&self, label_str: &str) -> Result<Vec<CategoryCode>> {
        if label_str.trim().is_empty() {
            return Ok(Vec::new());
        }

        label_str
            .split(',')
            .map(str::trim)
            .map(|token| {
                self.code(token).ok_or_else(|| FeatureError::UnknownCategory {
                    token: token.to_string(),
                })
            })
            .collect()
    }
}

/// Normalize every row, failing on the first bad one
pub fn normalize_rows(rows: &[RawRow], labels: &LabelTable) -> Result<Vec<NormalizedRecord>> {
    rows.iter().map(|row| normalize_row(row, labels)).collect()
}

/// Normalize a single row
pub fn normalize_row(row: &RawRow, labels: &LabelTable) -> Result<NormalizedRecord> {
    check_field_count(row)?;

    let fields = &row.fields;
    let date = parse_date(&fields[0])?;
    let start = NaiveDateTime::new(date, parse_time(&fields[1])?);
    let end = NaiveDateTime::new(date, parse_time(&fields[2])?);
    let labels = labels.decode(&fields[3])?;

    Ok(NormalizedRecord { start, end, labels })
}

/// Rows need the four leading fields; anything past them must be empty
fn check_field_count(row: &RawRow) -> Result<()> {
    let found = row.fields.len();
    let extra = row
        .fields
        .iter()
        .skip(RawRow::FIELDS)
        .any(|f| !f.trim().is_empty());

    if found < RawRow::FIELDS || extra {
        return Err(FeatureError::MalformedRow {
            line: row.line,
            message: format!("expected {} fields, found {}", RawRow::FIELDS, found),
        });
    }
    Ok(())
}

/// Parse `day.month.year`
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let [day, month, year] = split_components(s, '.')
        .ok_or_else(|| FeatureError::InvalidDateFormat(s.to_string()))?;

    let year = i32::try_from(year)
        .map_err(|_| FeatureError::InvalidCalendarDate(format!("year out of range in {:?}", s)))?;
    let (month, day) = (to_u32(month), to_u32(day));

    month
        .zip(day)
        .and_then(|(m, d)| NaiveDate::from_ymd_opt(year, m, d))
        .ok_or_else(|| FeatureError::InvalidCalendarDate(format!("no such date {:?}", s)))
}

/// Parse `hour:minute:second`
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let [hour, minute, second] = split_components(s, ':')
        .ok_or_else(|| FeatureError::InvalidTimeFormat(s.to_string()))?;

    let time = match (to_u32(hour), to_u32(minute), to_u32(second)) {
        (Some(h), Some(m), Some(sec)) => NaiveTime::from_hms_opt(h, m, sec),
        _ => None,
    };
    time.ok_or_else(|| FeatureError::InvalidCalendarDate(format!("no such time {:?}", s)))
}

/// Split into exactly three integer components
fn split_components(s: &str, sep: char) -> Option<[i64; 3]> {
    let parts: Vec<i64> = s
        .trim()
        .split(sep)
        .map(|p| p.trim().parse::<i64>().ok())
        .collect::<Option<_>>()?;

    parts.try_into().ok()
}

fn to_u32(v: i64) -> Option<u32> {
    u32::try_from(v).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> RawRow {
        RawRow::new(2, fields.iter().map(|f| f.to_string()).collect())
    }

    #[test]
    fn test_single_label() {
        let table = LabelTable::default();
        let record = normalize_row(
            &row(&["15.06.2016", "09:00:00", "10:30:00", "E - intern (901107)"]),
            &table,
        )
        .unwrap();

        assert_eq!(record.labels, vec![CategoryCode(3)]);
        assert_eq!(
            record.start,
            NaiveDate::from_ymd_opt(2016, 6, 15).unwrap().and_hms_opt(9, 0, 0).unwrap()
        );
        assert_eq!(
            record.end,
            NaiveDate::from_ymd_opt(2016, 6, 15).unwrap().and_hms_opt(10, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_multiple_labels_keep_order() {
        let table = LabelTable::default();
        let codes = table
            .decode("E - intern (901107),E - MPM (2900041)")
            .unwrap();
        assert_eq!(codes, vec![CategoryCode(3), CategoryCode(4)]);

        let codes = table.decode("E - MPM (2900041), E - intern (901107),E - MPM (2900041)").unwrap();
        assert_eq!(codes, vec![CategoryCode(4), CategoryCode(3), CategoryCode(4)]);
    }

    #[test]
    fn test_unknown_category() {
        let table = LabelTable::default();
        let err = normalize_row(
            &row(&["15.06.2016", "09:00:00", "10:30:00", "Unknown Category"]),
            &table,
        )
        .unwrap_err();

        match err {
            FeatureError::UnknownCategory { token } => assert_eq!(token, "Unknown Category"),
            other => panic!("expected UnknownCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_token_is_unknown() {
        let table = LabelTable::default();
        assert!(matches!(
            table.decode("E - smartTT,,E - smartTT"),
            Err(FeatureError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_empty_label_string() {
        let table = LabelTable::default();
        assert!(table.decode("").unwrap().is_empty());
        assert!(table.decode("  ").unwrap().is_empty());
    }

    #[test]
    fn test_unpadded_date() {
        assert_eq!(parse_date("1.3.2016").unwrap(), NaiveDate::from_ymd_opt(2016, 3, 1).unwrap());
        assert_eq!(parse_time("8:5:0").unwrap(), NaiveTime::from_hms_opt(8, 5, 0).unwrap());
    }

    #[test]
    fn test_date_format_errors() {
        assert!(matches!(parse_date("2016-06-15"), Err(FeatureError::InvalidDateFormat(_))));
        assert!(matches!(parse_date("15.06"), Err(FeatureError::InvalidDateFormat(_))));
        assert!(matches!(parse_date("15.xx.2016"), Err(FeatureError::InvalidDateFormat(_))));
        assert!(matches!(parse_time("09:00"), Err(FeatureError::InvalidTimeFormat(_))));
        assert!(matches!(parse_time("09:00:00:00"), Err(FeatureError::InvalidTimeFormat(_))));
    }

    #[test]
    fn test_out_of_range_values() {
        assert!(matches!(parse_date("15.13.2016"), Err(FeatureError::InvalidCalendarDate(_))));
        assert!(matches!(parse_date("30.02.2016"), Err(FeatureError::InvalidCalendarDate(_))));
        assert!(matches!(parse_date("-1.02.2016"), Err(FeatureError::InvalidCalendarDate(_))));
        assert!(matches!(parse_time("24:00:00"), Err(FeatureError::InvalidCalendarDate(_))));
        assert!(matches!(parse_time("12:60:00"), Err(FeatureError::InvalidCalendarDate(_))));
    }

    #[test]
    fn test_field_count() {
        let table = LabelTable::default();

        let short = row(&["15.06.2016", "09:00:00", "10:30:00"]);
        assert!(matches!(
            normalize_row(&short, &table),
            Err(FeatureError::MalformedRow { line: 2, .. })
        ));

        let extra = row(&["15.06.2016", "09:00:00", "10:30:00", "E - smartTT", "oops"]);
        assert!(matches!(
            normalize_row(&extra, &table),
            Err(FeatureError::MalformedRow { .. })
        ));

        let trailing = row(&["15.06.2016", "09:00:00", "10:30:00", "E - smartTT", ""]);
        assert!(normalize_row(&trailing, &table).is_ok());
    }

    #[test]
    fn test_end_is_not_validated_against_start() {
        let table = LabelTable::default();
        let record = normalize_row(
            &row(&["15.06.2016", "17:00:00", "09:00:00", "E - smartTT"]),
            &table,
        )
        .unwrap();
        assert!(record.duration() < chrono::Duration::zero());
    }

    #[test]
    fn test_label_table_lookups() {
        let table = LabelTable::default();
        assert_eq!(table.len(), 8);
        assert_eq!(table.unassigned(), Some(CategoryCode(7)));
        assert_eq!(table.label(CategoryCode(5)), Some("E - smartTT"));
        assert_eq!(table.label(CategoryCode(42)), None);

        let codes: Vec<u32> = table.iter().map(|(_, c)| c.0).collect();
        assert_eq!(codes, (0..8).collect::<Vec<_>>());
    }
}
