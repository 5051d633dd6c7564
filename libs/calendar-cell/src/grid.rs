// libs/calendar-cell/src/grid.rs
use chrono::{Datelike, Days, Months, NaiveDate};

use crate::models::{CalendarError, CalendarGrid, CalendarView, MonthGrid, WeekGrid, YearGrid};

/// Week containing `reference`, starting on Monday. A Sunday belongs to the
/// week that began six days earlier.
pub fn week_grid(reference: NaiveDate) -> Result<WeekGrid, CalendarError> {
    let out_of_range = || CalendarError::OutOfRange { year: reference.year() };

    let offset = u64::from(reference.weekday().num_days_from_monday());
    let monday = reference.checked_sub_days(Days::new(offset)).ok_or_else(out_of_range)?;

    let mut days = [monday; 7];
    for (i, day) in days.iter_mut().enumerate().skip(1) {
        *day = monday
            .checked_add_days(Days::new(i as u64))
            .ok_or_else(out_of_range)?;
    }

    Ok(WeekGrid { days })
}

pub fn month_grid(reference: NaiveDate) -> Result<MonthGrid, CalendarError> {
    month_grid_of(reference.year(), reference.month())
}

pub fn month_grid_of(year: i32, month: u32) -> Result<MonthGrid, CalendarError> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::InvalidMonth(month));
    }

    let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::OutOfRange { year })?;

    // Walking the days keeps this total even for the last month chrono can represent.
    let day_count = first_day
        .iter_days()
        .take(31)
        .take_while(|d| d.month() == month)
        .count() as u32;

    Ok(MonthGrid {
        year,
        month,
        first_day,
        day_count,
        first_weekday: first_day.weekday().num_days_from_sunday(),
    })
}

pub fn year_grid(year: i32) -> Result<YearGrid, CalendarError> {
    let months = (1..=12)
        .map(|month| month_grid_of(year, month))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(YearGrid { year, months })
}

pub fn generate(reference: NaiveDate, view: CalendarView) -> Result<CalendarGrid, CalendarError> {
    match view {
        CalendarView::Week => week_grid(reference).map(CalendarGrid::Week),
        CalendarView::Month => month_grid(reference).map(CalendarGrid::Month),
        CalendarView::Year => year_grid(reference.year()).map(CalendarGrid::Year),
    }
}

/// Moves `reference` by `steps` pages of `view`. Month and year steps clamp
/// the day to the length of the target month.
pub fn navigate(reference: NaiveDate, view: CalendarView, steps: i32) -> Result<NaiveDate, CalendarError> {
    let magnitude = steps.unsigned_abs();
    let forward = steps >= 0;

    let moved = match view {
        CalendarView::Week => {
            let days = Days::new(u64::from(magnitude) * 7);
            if forward {
                reference.checked_add_days(days)
            } else {
                reference.checked_sub_days(days)
            }
        }
        CalendarView::Month | CalendarView::Year => {
            let factor = if view == CalendarView::Year { 12 } else { 1 };
            let months = Months::new(magnitude.saturating_mul(factor));
            if forward {
                reference.checked_add_months(months)
            } else {
                reference.checked_sub_months(months)
            }
        }
    };

    moved.ok_or(CalendarError::OutOfRange { year: reference.year() })
}

/// Hour rows of the day view, `start` inclusive, `end` exclusive.
pub fn hour_rows(start: u32, end: u32) -> Vec<u32> {
    (start..end.min(24)).collect()
}
