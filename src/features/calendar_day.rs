//! Calendar features of a single day

use chrono::{Datelike, NaiveDate, Weekday};

/// One of the per-day features, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateFeature {
    Ordinal,
    Year,
    Month,
    DayOfYear,
    DayOfMonth,
    Weekday,
    Weekend,
    WeekOfYear,
    WeekOfMonth,
    Holiday,
    Christmas,
    Easter,
}

impl DateFeature {
    /// Number of features computed per day
    pub const COUNT: usize = 12;

    /// All features in column order
    pub fn all() -> &'static [DateFeature; DateFeature::COUNT] {
        &[
            DateFeature::Ordinal,
            DateFeature::Year,
            DateFeature::Month,
            DateFeature::DayOfYear,
            DateFeature::DayOfMonth,
            DateFeature::Weekday,
            DateFeature::Weekend,
            DateFeature::WeekOfYear,
            DateFeature::WeekOfMonth,
            DateFeature::Holiday,
            DateFeature::Christmas,
            DateFeature::Easter,
        ]
    }

    /// Position of the feature inside one day's block of columns
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display label used in column names
    pub fn label(self) -> &'static str {
        match self {
            DateFeature::Ordinal => "Ordinal",
            DateFeature::Year => "Year",
            DateFeature::Month => "Month",
            DateFeature::DayOfYear => "Day of Year",
            DateFeature::DayOfMonth => "Day of Month",
            DateFeature::Weekday => "Weekday",
            DateFeature::Weekend => "Weekend",
            DateFeature::WeekOfYear => "Week of year",
            DateFeature::WeekOfMonth => "Week of month",
            DateFeature::Holiday => "Holiday",
            DateFeature::Christmas => "Christmas",
            DateFeature::Easter => "Easter",
        }
    }

    /// Column name for this feature at a day offset, e.g. "Holiday of day -3"
    pub fn column_name(self, delta: i64) -> String {
        format!("{} of day {}", self.label(), delta)
    }
}

/// Feature values for one day of a window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DayFeatures {
    /// Days since the epoch (negative before it)
    pub ordinal: f64,
    pub year: f64,
    /// 1-12
    pub month: f64,
    /// 1-based
    pub day_of_year: f64,
    pub day_of_month: f64,
    /// Monday = 0 ... Sunday = 6
    pub weekday: f64,
    /// 1.0 on Saturday and Sunday
    pub is_weekend: f64,
    /// floor(day_of_year / 7) of the week reference day
    pub week_of_year: f64,
    /// floor(day_of_month / 7) of the week reference day
    pub week_of_month: f64,
    pub is_holiday: f64,
    /// 1.0 on first or second Christmas day
    pub is_christmas: f64,
    /// 1.0 on Easter Monday
    pub is_easter: f64,
}

impl DayFeatures {
    /// Number of features in this struct
    pub const DIM: usize = DateFeature::COUNT;

    /// Date-only features of `day`. Week indices are taken from `week_ref`,
    /// holiday flags are left at zero.
    pub fn compute(day: NaiveDate, week_ref: NaiveDate, epoch: NaiveDate) -> Self {
        let weekday = day.weekday();

        DayFeatures {
            ordinal: (day - epoch).num_days() as f64,
            year: day.year() as f64,
            month: day.month() as f64,
            day_of_year: day.ordinal() as f64,
            day_of_month: day.day() as f64,
            weekday: weekday.num_days_from_monday() as f64,
            is_weekend: flag(matches!(weekday, Weekday::Sat | Weekday::Sun)),
            week_of_year: (week_ref.ordinal() / 7) as f64,
            week_of_month: (week_ref.day() / 7) as f64,
            ..Default::default()
        }
    }

    /// Value of a single feature
    pub fn get(&self, feature: DateFeature) -> f64 {
        match feature {
            DateFeature::Ordinal => self.ordinal,
            DateFeature::Year => self.year,
            DateFeature::Month => self.month,
            DateFeature::DayOfYear => self.day_of_year,
            DateFeature::DayOfMonth => self.day_of_month,
            DateFeature::Weekday => self.weekday,
            DateFeature::Weekend => self.is_weekend,
            DateFeature::WeekOfYear => self.week_of_year,
            DateFeature::WeekOfMonth => self.week_of_month,
            DateFeature::Holiday => self.is_holiday,
            DateFeature::Christmas => self.is_christmas,
            DateFeature::Easter => self.is_easter,
        }
    }

    /// Convert to flat vector in column order
    pub fn to_vec(&self) -> Vec<f64> {
        DateFeature::all().iter().map(|f| self.get(*f)).collect()
    }
}

pub(crate) fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}
