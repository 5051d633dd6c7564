// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use calendar_cell::CalendarError;
use shared_database::RemoteError;

// ==============================================================================
// CORE AGENDA MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "paciente_id")]
    pub patient_id: i64,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(rename = "type")]
    pub appointment_type: String,
}

impl Appointment {
    /// Hour bucket the appointment occupies; minutes are truncated.
    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    pub fn slot_key(&self) -> SlotKey {
        SlotKey {
            date: self.date,
            hour: self.hour(),
        }
    }
}

/// Body of a create call: an appointment that has no identity yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    #[serde(rename = "paciente_id")]
    pub patient_id: i64,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(rename = "type")]
    pub appointment_type: String,
}

impl NewAppointment {
    pub fn slot_key(&self) -> SlotKey {
        SlotKey {
            date: self.date,
            hour: self.time.hour(),
        }
    }

    pub fn into_draft(self) -> Appointment {
        Appointment {
            id: None,
            patient_id: self.patient_id,
            date: self.date,
            time: self.time,
            appointment_type: self.appointment_type,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hhmm_option")]
    pub time: Option<NaiveTime>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub appointment_type: Option<String>,
    #[serde(default, rename = "paciente_id", skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<i64>,
}

impl AppointmentUpdate {
    pub fn reschedule(date: NaiveDate, time: Option<NaiveTime>) -> Self {
        Self {
            date: Some(date),
            time,
            ..Self::default()
        }
    }

    /// True when the update moves the appointment to another date or time.
    pub fn moves(&self) -> bool {
        self.date.is_some() || self.time.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.moves() && self.appointment_type.is_none() && self.patient_id.is_none()
    }

    pub fn apply_to(&self, appointment: &mut Appointment) {
        if let Some(date) = self.date {
            appointment.date = date;
        }
        if let Some(time) = self.time {
            appointment.time = time;
        }
        if let Some(appointment_type) = &self.appointment_type {
            appointment.appointment_type = appointment_type.clone();
        }
        if let Some(patient_id) = self.patient_id {
            appointment.patient_id = patient_id;
        }
    }
}

impl From<&Appointment> for AppointmentUpdate {
    fn from(appointment: &Appointment) -> Self {
        Self {
            date: Some(appointment.date),
            time: Some(appointment.time),
            appointment_type: Some(appointment.appointment_type.clone()),
            patient_id: Some(appointment.patient_id),
        }
    }
}

/// Wire form of a blocked hour. `time` is always written as `HH:00`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedSlot {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
}

impl BlockedSlot {
    pub fn key(&self) -> SlotKey {
        SlotKey {
            date: self.date,
            hour: self.time.hour(),
        }
    }
}

impl From<SlotKey> for BlockedSlot {
    fn from(key: SlotKey) -> Self {
        Self {
            date: key.date,
            time: NaiveTime::from_hms_opt(key.hour, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// An (date, hour) cell of the schedule. Displays as `YYYY-MM-DD:HH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    date: NaiveDate,
    hour: u32,
}

impl SlotKey {
    pub fn new(date: NaiveDate, hour: u32) -> Result<Self, AppointmentError> {
        if hour > 23 {
            return Err(AppointmentError::InvalidHour(hour));
        }
        Ok(Self { date, hour })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Start of the hour, as used when an appointment is dropped on the slot.
    pub fn start_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, 0, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.date.format("%Y-%m-%d"), self.hour)
    }
}

impl Serialize for SlotKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ==============================================================================
// VIEW MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Blocked,
    Unblocked,
    /// The slot holds appointments, so blocking is disabled.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotView {
    pub key: SlotKey,
    pub date: NaiveDate,
    pub hour: u32,
    /// Blocked and empty. Appointments take visual precedence over a block.
    pub blocked: bool,
    pub marked_blocked: bool,
    pub can_toggle_block: bool,
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgendaSnapshot {
    pub appointments: Vec<Appointment>,
    pub blocked_slots: Vec<SlotKey>,
    pub pending_creates: usize,
    pub last_error: Option<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppointmentError {
    #[error("Slot {0} is blocked. Choose another time.")]
    SlotBlocked(SlotKey),

    #[error("Slot {0} already has an appointment")]
    SlotOccupied(SlotKey),

    #[error("Appointment {0} not found")]
    NotFound(i64),

    #[error("Invalid hour: {0}")]
    InvalidHour(u32),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    #[error("{0}")]
    Remote(#[from] RemoteError),
}

// ==============================================================================
// TIME FORMAT
// ==============================================================================

/// Parses `HH:MM`, also accepting the `HH:MM:SS` some backends return.
pub fn parse_time(raw: &str) -> Result<NaiveTime, AppointmentError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| AppointmentError::InvalidTime(raw.to_string()))
}

pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

pub mod hhmm_option {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(time) => serializer.collect_str(&time.format("%H:%M")),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse_time(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}