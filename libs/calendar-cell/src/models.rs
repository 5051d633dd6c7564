// libs/calendar-cell/src/models.rs
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    #[default]
    Week,
    Month,
    Year,
}

impl fmt::Display for CalendarView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarView::Week => write!(f, "week"),
            CalendarView::Month => write!(f, "month"),
            CalendarView::Year => write!(f, "year"),
        }
    }
}

impl FromStr for CalendarView {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(CalendarView::Week),
            "month" => Ok(CalendarView::Month),
            "year" => Ok(CalendarView::Year),
            other => Err(CalendarError::UnknownView(other.to_string())),
        }
    }
}

/// Seven consecutive dates, Monday through Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekGrid {
    pub days: [NaiveDate; 7],
}

impl WeekGrid {
    pub fn start(&self) -> NaiveDate {
        self.days[0]
    }

    pub fn end(&self) -> NaiveDate {
        self.days[6]
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start() <= date && date <= self.end()
    }
}

/// Layout of one month. Columns run Sunday to Saturday, so `first_weekday`
/// (Sunday = 0) is also the number of blank cells before day 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub first_day: NaiveDate,
    pub day_count: u32,
    pub first_weekday: u32,
}

impl MonthGrid {
    pub fn leading_blanks(&self) -> u32 {
        self.first_weekday
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.first_day.iter_days().take(self.day_count as usize)
    }

    /// Blank cells as `None`, then every day of the month in order.
    pub fn cells(&self) -> Vec<Option<NaiveDate>> {
        let mut cells = Vec::with_capacity((self.leading_blanks() + self.day_count) as usize);
        cells.extend((0..self.leading_blanks()).map(|_| None));
        cells.extend(self.days().map(Some));
        cells
    }

    pub fn week_rows(&self) -> u32 {
        (self.leading_blanks() + self.day_count).div_ceil(7)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearGrid {
    pub year: i32,
    pub months: Vec<MonthGrid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum CalendarGrid {
    Week(WeekGrid),
    Month(MonthGrid),
    Year(YearGrid),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Date out of supported range for year {year}")]
    OutOfRange { year: i32 },

    #[error("Invalid month: {0}")]
    InvalidMonth(u32),

    #[error("Unknown calendar view: {0}")]
    UnknownView(String),
}
