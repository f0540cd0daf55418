//! Holiday calendars
//!
//! The feature extractor only asks two questions of a calendar: is a date a
//! holiday, and what is it called. Any source that can answer those (a rule
//! set, a precomputed table) can stand behind [`HolidayCalendar`].

pub mod german;

pub use german::GermanHolidays;

use crate::{FeatureError, HolidayConfig, Result};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Holiday lookups used during feature extraction
pub trait HolidayCalendar {
    /// Name of the holiday on `date`, or None if it is an ordinary day
    fn holiday_name(&self, date: NaiveDate) -> Option<&str>;

    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holiday_name(date).is_some()
    }
}

/// Jurisdiction a calendar applies to, e.g. `DE` or `DE-NI`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region {
    pub country: String,
    pub subdivision: Option<String>,
}

impl Region {
    pub fn new(country: &str, subdivision: Option<&str>) -> Self {
        Region {
            country: country.to_uppercase(),
            subdivision: subdivision.map(str::to_uppercase),
        }
    }

    /// Parse `COUNTRY` or `COUNTRY-SUBDIVISION`
    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim();
        let (country, subdivision) = match code.split_once('-') {
            Some((c, s)) => (c, Some(s)),
            None => (code, None),
        };

        let valid = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid(country) || subdivision.map_or(false, |s| !valid(s)) {
            return Err(FeatureError::UnsupportedRegion(code.to_string()));
        }

        Ok(Region::new(country, subdivision))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subdivision {
            Some(sub) => write!(f, "{}-{}", self.country, sub),
            None => write!(f, "{}", self.country),
        }
    }
}

/// Calendar backed by an explicit list of dated holidays
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayTable {
    entries: BTreeMap<NaiveDate, String>,
}

impl HolidayTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a holiday. A second holiday on the same date joins the names with ", ".
    pub fn insert(&mut self, date: NaiveDate, name: impl Into<String>) {
        let name = name.into();
        self.entries
            .entry(date)
            .and_modify(|existing| {
                if !existing.split(", ").any(|n| n == name) {
                    existing.push_str(", ");
                    existing.push_str(&name);
                }
            })
            .or_insert(name);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All holidays in date order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &str)> {
        self.entries.iter().map(|(d, n)| (*d, n.as_str()))
    }

    /// Holidays falling in one calendar year
    pub fn in_year(&self, year: i32) -> impl Iterator<Item = (NaiveDate, &str)> {
        self.iter().filter(move |(d, _)| d.year() == year)
    }
}

impl FromIterator<(NaiveDate, String)> for HolidayTable {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, String)>>(iter: I) -> Self {
        let mut table = HolidayTable::new();
        for (date, name) in iter {
            table.insert(date, name);
        }
        table
    }
}

impl HolidayCalendar for HolidayTable {
    fn holiday_name(&self, date: NaiveDate) -> Option<&str> {
        self.entries.get(&date).map(String::as_str)
    }
}

/// Holidays of `region` for the given years, from the provider serving its country
pub fn for_region(
    region: &Region,
    years: impl IntoIterator<Item = i32>,
) -> Result<HolidayTable> {
    match region.country.as_str() {
        "DE" => Ok(GermanHolidays::new(region, years)?.into_table()),
        _ => Err(FeatureError::UnsupportedRegion(region.to_string())),
    }
}

/// Build the calendar configured for a run, preloaded with `extra_years`
/// on top of the configured years
pub fn from_config(
    config: &HolidayConfig,
    extra_years: impl IntoIterator<Item = i32>,
) -> Result<Box<dyn HolidayCalendar>> {
    let region = Region::parse(&config.region)?;
    let mut years: BTreeSet<i32> = config.years.iter().copied().collect();
    years.extend(extra_years);

    Ok(Box::new(for_region(&region, years)?))
}
