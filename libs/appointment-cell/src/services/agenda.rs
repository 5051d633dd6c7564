// libs/appointment-cell/src/services/agenda.rs
use chrono::NaiveDate;
use serde::Serialize;

use calendar_cell::{month_grid, month_grid_of, week_grid, MonthGrid, WeekGrid};

use crate::models::{Appointment, AppointmentError, SlotKey, SlotView};
use crate::services::slot_index::SlotIndex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourRow {
    pub hour: u32,
    pub label: String,
    pub cells: Vec<SlotView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekAgenda {
    pub week: WeekGrid,
    pub rows: Vec<HourRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayAgenda {
    pub date: NaiveDate,
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthAgenda {
    pub grid: MonthGrid,
    pub days: Vec<DayAgenda>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthOverview {
    pub grid: MonthGrid,
    /// Days of the month with at least one appointment.
    pub busy_days: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearAgenda {
    pub year: i32,
    pub months: Vec<MonthOverview>,
}

pub fn build_week(index: &SlotIndex<'_>, reference: NaiveDate, hours: &[u32]) -> Result<WeekAgenda, AppointmentError> {
    let week = week_grid(reference)?;

    let rows = hours
        .iter()
        .map(|&hour| {
            let cells = week
                .days
                .iter()
                .map(|&day| SlotKey::new(day, hour).map(|key| index.slot(key)))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(HourRow {
                hour,
                label: format!("{:02}:00", hour),
                cells,
            })
        })
        .collect::<Result<Vec<_>, AppointmentError>>()?;

    Ok(WeekAgenda { week, rows })
}

pub fn build_month(index: &SlotIndex<'_>, reference: NaiveDate) -> Result<MonthAgenda, AppointmentError> {
    let grid = month_grid(reference)?;

    let days = grid
        .days()
        .map(|date| DayAgenda {
            date,
            appointments: index.appointments_on(date).into_iter().cloned().collect(),
        })
        .collect();

    Ok(MonthAgenda { grid, days })
}

pub fn build_year(index: &SlotIndex<'_>, year: i32) -> Result<YearAgenda, AppointmentError> {
    let months = (1..=12)
        .map(|month| {
            let grid = month_grid_of(year, month)?;
            let busy_days = grid
                .days()
                .zip(1..)
                .filter(|(date, _)| index.has_appointments_on(*date))
                .map(|(_, day)| day)
                .collect();
            Ok(MonthOverview { grid, busy_days })
        })
        .collect::<Result<Vec<_>, AppointmentError>>()?;

    Ok(YearAgenda { year, months })
}
