//! German public holidays
//!
//! Nationwide holidays plus the state holidays of the sixteen Länder, preloaded
//! for an explicit set of years. Names are the official German designations.

use super::{HolidayCalendar, HolidayTable, Region};
use crate::{FeatureError, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::BTreeSet;

pub const NEW_YEAR: &str = "Neujahr";
pub const GOOD_FRIDAY: &str = "Karfreitag";
pub const EASTER_SUNDAY: &str = "Ostersonntag";
pub const EASTER_MONDAY: &str = "Ostermontag";
pub const LABOUR_DAY: &str = "Erster Mai";
pub const ASCENSION_DAY: &str = "Christi Himmelfahrt";
pub const WHIT_SUNDAY: &str = "Pfingstsonntag";
pub const WHIT_MONDAY: &str = "Pfingstmontag";
pub const GERMAN_UNITY_DAY: &str = "Tag der Deutschen Einheit";
pub const FIRST_CHRISTMAS_DAY: &str = "Erster Weihnachtstag";
pub const SECOND_CHRISTMAS_DAY: &str = "Zweiter Weihnachtstag";

pub const EPIPHANY: &str = "Heilige Drei Könige";
pub const WOMENS_DAY: &str = "Internationaler Frauentag";
pub const CORPUS_CHRISTI: &str = "Fronleichnam";
pub const ASSUMPTION_DAY: &str = "Mariä Himmelfahrt";
pub const CHILDRENS_DAY: &str = "Weltkindertag";
pub const REFORMATION_DAY: &str = "Reformationstag";
pub const ALL_SAINTS_DAY: &str = "Allerheiligen";
pub const REPENTANCE_DAY: &str = "Buß- und Bettag";

/// State codes of the German Länder
pub const STATES: [&str; 16] = [
    "BB", "BE", "BW", "BY", "HB", "HE", "HH", "MV", "NI", "NW", "RP", "SH", "SL", "SN", "ST", "TH",
];

/// Current holiday rules, in effect since reunification
const FIRST_YEAR: i32 = 1991;

/// German public holiday calendar for one state (or nationwide only)
#[derive(Debug, Clone)]
pub struct GermanHolidays {
    state: Option<String>,
    years: BTreeSet<i32>,
    table: HolidayTable,
}

impl GermanHolidays {
    /// Build the calendar for `region` and preload the given years.
    /// Years before 1991 are skipped.
    pub fn new(region: &Region, years: impl IntoIterator<Item = i32>) -> Result<Self> {
        if region.country != "DE" {
            return Err(FeatureError::UnsupportedRegion(region.to_string()));
        }
        if let Some(state) = &region.subdivision {
            if !STATES.contains(&state.as_str()) {
                return Err(FeatureError::UnsupportedRegion(region.to_string()));
            }
        }

        let mut calendar = GermanHolidays {
            state: region.subdivision.clone(),
            years: BTreeSet::new(),
            table: HolidayTable::new(),
        };
        for year in years {
            calendar.load_year(year);
        }

        log::debug!(
            "Loaded {} holidays for {} ({} years)",
            calendar.table.len(),
            region,
            calendar.years.len()
        );
        Ok(calendar)
    }

    /// All loaded holidays in date order
    pub fn into_table(self) -> HolidayTable {
        self.table
    }

    fn load_year(&mut self, year: i32) {
        if year < FIRST_YEAR || !self.years.insert(year) {
            return;
        }

        let Some(easter) = easter_sunday(year) else {
            return;
        };
        let fixed = |month: u32, day: u32| NaiveDate::from_ymd_opt(year, month, day);
        let mut add = |date: Option<NaiveDate>, name: &str| {
            if let Some(date) = date {
                self.table.insert(date, name);
            }
        };

        // Nationwide
        add(fixed(1, 1), NEW_YEAR);
        add(Some(easter - Duration::days(2)), GOOD_FRIDAY);
        add(Some(easter + Duration::days(1)), EASTER_MONDAY);
        add(fixed(5, 1), LABOUR_DAY);
        add(Some(easter + Duration::days(39)), ASCENSION_DAY);
        add(Some(easter + Duration::days(50)), WHIT_MONDAY);
        add(fixed(10, 3), GERMAN_UNITY_DAY);
        add(fixed(12, 25), FIRST_CHRISTMAS_DAY);
        add(fixed(12, 26), SECOND_CHRISTMAS_DAY);

        // 500th anniversary of the Reformation was a one-off nationwide holiday
        if year == 2017 {
            add(fixed(10, 31), REFORMATION_DAY);
        }

        let Some(state) = self.state.clone() else {
            return;
        };
        let is = |states: &[&str]| states.contains(&state.as_str());

        if is(&["BW", "BY", "ST"]) {
            add(fixed(1, 6), EPIPHANY);
        }
        if (is(&["BE"]) && year >= 2019) || (is(&["MV"]) && year >= 2023) {
            add(fixed(3, 8), WOMENS_DAY);
        }
        if is(&["BB"]) {
            add(Some(easter), EASTER_SUNDAY);
            add(Some(easter + Duration::days(49)), WHIT_SUNDAY);
        }
        if is(&["BW", "BY", "HE", "NW", "RP", "SL"]) {
            add(Some(easter + Duration::days(60)), CORPUS_CHRISTI);
        }
        if is(&["SL"]) {
            add(fixed(8, 15), ASSUMPTION_DAY);
        }
        if is(&["TH"]) && year >= 2019 {
            add(fixed(9, 20), CHILDRENS_DAY);
        }
        if is(&["BB", "MV", "SN", "ST", "TH"]) || (is(&["HB", "HH", "NI", "SH"]) && year >= 2018)
        {
            add(fixed(10, 31), REFORMATION_DAY);
        }
        if is(&["BW", "BY", "NW", "RP", "SL"]) {
            add(fixed(11, 1), ALL_SAINTS_DAY);
        }
        if is(&["SN"]) {
            add(repentance_day(year), REPENTANCE_DAY);
        }
    }
}

impl HolidayCalendar for GermanHolidays {
    fn holiday_name(&self, date: NaiveDate) -> Option<&str> {
        self.table.holiday_name(date)
    }
}

/// Easter Sunday in the Gregorian calendar (anonymous Gregorian algorithm)
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Wednesday before 23 November
fn repentance_day(year: i32) -> Option<NaiveDate> {
    let nov_22 = NaiveDate::from_ymd_opt(year, 11, 22)?;
    let back = (nov_22.weekday().num_days_from_monday() + 7
        - Weekday::Wed.num_days_from_monday())
        % 7;
    Some(nov_22 - Duration::days(back as i64))
}
