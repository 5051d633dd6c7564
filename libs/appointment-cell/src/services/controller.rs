// libs/appointment-cell/src/services/controller.rs
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use calendar_cell::hour_rows;
use shared_config::{AppConfig, SlotOverlapPolicy};
use shared_database::RemoteError;

use crate::models::{
    AgendaSnapshot, Appointment, AppointmentError, AppointmentUpdate, BlockedSlot, NewAppointment,
    SlotKey, SlotView, ToggleOutcome,
};
use crate::services::agenda::{build_month, build_week, build_year, MonthAgenda, WeekAgenda, YearAgenda};
use crate::services::optimistic::{apply_optimistic, Applied};
use crate::services::state::AgendaState;
use crate::services::store::{AgendaStore, HttpAgendaStore};

/// Keeps the local agenda in step with the remote store.
///
/// Every mutation is applied to [`AgendaState`] first and confirmed with the
/// store afterwards; a failed call rolls back only the entity it touched and
/// leaves a message in [`last_error`](Self::last_error).
pub struct SchedulingController {
    store: Arc<dyn AgendaStore>,
    state: RwLock<AgendaState>,
    policy: SlotOverlapPolicy,
    hours: Vec<u32>,
}

impl SchedulingController {
    pub fn new(store: Arc<dyn AgendaStore>, policy: SlotOverlapPolicy) -> Self {
        Self {
            store,
            state: RwLock::new(AgendaState::default()),
            policy,
            hours: hour_rows(8, 20),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, RemoteError> {
        let store = HttpAgendaStore::from_config(config)?;
        Ok(Self::new(Arc::new(store), config.slot_overlap)
            .with_hours(config.day_start_hour, config.day_end_hour))
    }

    /// Hour rows shown by the week view, `start` inclusive, `end` exclusive.
    pub fn with_hours(mut self, start: u32, end: u32) -> Self {
        self.hours = hour_rows(start, end);
        self
    }

    pub fn policy(&self) -> SlotOverlapPolicy {
        self.policy
    }

    pub fn hours(&self) -> &[u32] {
        &self.hours
    }

    // ==============================================================================
    // LOADING
    // ==============================================================================

    /// Loads appointments and blocked slots from the store.
    pub async fn hydrate(&self) -> Result<(), AppointmentError> {
        debug!("Hydrating agenda from remote store");

        let loaded = futures::try_join!(self.store.list_appointments(), self.store.list_blocked_slots());

        let result = match loaded {
            Ok((appointments, blocked)) => {
                info!(
                    "Loaded {} appointments and {} blocked slots",
                    appointments.len(),
                    blocked.len()
                );
                let mut state = self.state.write().await;
                state.replace_all(appointments, blocked.iter().map(BlockedSlot::key));
                state.clear_error();
                Ok(())
            }
            Err(err) => Err(AppointmentError::Remote(err)),
        };

        self.settle("load agenda", result).await
    }

    // ==============================================================================
    // SLOT BLOCKING
    // ==============================================================================

    /// Blocks an empty slot or unblocks it. Occupied slots are left alone.
    pub async fn toggle_block(&self, date: NaiveDate, hour: u32) -> Result<ToggleOutcome, AppointmentError> {
        let key = match SlotKey::new(date, hour) {
            Ok(key) => key,
            Err(err) => return self.settle("toggle slot block", Err(err)).await,
        };
        let store = &self.store;

        let result = apply_optimistic(
            &self.state,
            "toggle slot block",
            |state: &mut AgendaState| {
                if !state.slot_index().can_toggle_block(&key) {
                    debug!("Slot {} has appointments, block toggle ignored", key);
                    return Ok(Applied::untouched(None));
                }

                let was_blocked = state.is_blocked(&key);
                state.set_blocked(key, !was_blocked);
                Ok(Applied::new(Some(!was_blocked), move |state: &mut AgendaState| {
                    state.set_blocked(key, was_blocked);
                }))
            },
            |blocking| async move {
                let slot = BlockedSlot::from(key);
                match blocking {
                    Some(true) => store.block_slot(&slot).await.map(|_| ToggleOutcome::Blocked),
                    Some(false) => store.unblock_slot(&slot).await.map(|_| ToggleOutcome::Unblocked),
                    None => Ok(ToggleOutcome::Unchanged),
                }
            },
        )
        .await;

        if let Ok(outcome) = &result {
            info!("Slot {} toggle: {:?}", key, outcome);
        }
        self.settle("toggle slot block", result).await
    }

    // ==============================================================================
    // APPOINTMENTS
    // ==============================================================================

    /// Creates an appointment unless its slot is blocked. A draft shows in the
    /// agenda until the backend answers with the persisted record.
    pub async fn create_appointment(&self, appointment: NewAppointment) -> Result<Appointment, AppointmentError> {
        let key = appointment.slot_key();
        let policy = self.policy;
        let store = &self.store;

        let result = apply_optimistic(
            &self.state,
            "create appointment",
            |state: &mut AgendaState| {
                {
                    let index = state.slot_index();
                    if index.is_blocked(&key) {
                        return Err(AppointmentError::SlotBlocked(key));
                    }
                    if policy == SlotOverlapPolicy::Reject && index.is_occupied(&key) {
                        return Err(AppointmentError::SlotOccupied(key));
                    }
                }

                let token = state.insert_draft(appointment.clone().into_draft());
                Ok(Applied::new((token, appointment), move |state: &mut AgendaState| {
                    state.discard_draft(token);
                }))
            },
            |(token, body)| async move {
                store
                    .create_appointment(&body)
                    .await
                    .map(|record| (token, record))
            },
        )
        .await;

        let result = match result {
            Ok((token, record)) => {
                info!("Appointment {:?} created in slot {}", record.id, record.slot_key());
                self.state.write().await.confirm_draft(token, record.clone());
                Ok(record)
            }
            Err(err) => Err(err),
        };

        self.settle("create appointment", result).await
    }

    /// Edits an appointment. Any change of date or time is refused when the
    /// destination slot is blocked.
    pub async fn update_appointment(
        &self,
        id: i64,
        update: AppointmentUpdate,
    ) -> Result<Appointment, AppointmentError> {
        let policy = self.policy;
        let store = &self.store;

        let result = apply_optimistic(
            &self.state,
            "update appointment",
            |state: &mut AgendaState| {
                let previous = state.find(id).cloned().ok_or(AppointmentError::NotFound(id))?;
                let mut next = previous.clone();
                update.apply_to(&mut next);

                if update.moves() {
                    let key = next.slot_key();
                    let index = state.slot_index();
                    if index.is_blocked(&key) {
                        return Err(AppointmentError::SlotBlocked(key));
                    }
                    if policy == SlotOverlapPolicy::Reject && index.is_occupied_by_other(&key, id) {
                        return Err(AppointmentError::SlotOccupied(key));
                    }
                }

                state.replace(id, next.clone());
                Ok(Applied::new(next, move |state: &mut AgendaState| {
                    state.replace(id, previous);
                }))
            },
            |next| async move {
                let body = AppointmentUpdate::from(&next);
                store
                    .update_appointment(id, &body)
                    .await
                    .map(|record| record.unwrap_or(next))
            },
        )
        .await;

        let result = match result {
            Ok(record) => {
                let mut state = self.state.write().await;
                // The id in the path is authoritative even if the body omits it.
                let record = Appointment { id: Some(id), ..record };
                state.replace(id, record.clone());
                info!("Appointment {} now in slot {}", id, record.slot_key());
                Ok(record)
            }
            Err(err) => Err(err),
        };

        self.settle("update appointment", result).await
    }

    /// Moves an appointment to `date`, optionally at a new `time`.
    pub async fn reschedule(
        &self,
        id: i64,
        date: NaiveDate,
        time: Option<NaiveTime>,
    ) -> Result<Appointment, AppointmentError> {
        self.update_appointment(id, AppointmentUpdate::reschedule(date, time)).await
    }

    /// Drag-and-drop: the appointment lands at the start of the target hour.
    pub async fn move_to_slot(&self, id: i64, date: NaiveDate, hour: u32) -> Result<Appointment, AppointmentError> {
        match SlotKey::new(date, hour) {
            Ok(key) => self.reschedule(id, key.date(), Some(key.start_time())).await,
            Err(err) => self.settle("move appointment", Err(err)).await,
        }
    }

    pub async fn delete_appointment(&self, id: i64) -> Result<(), AppointmentError> {
        let store = &self.store;

        let result = apply_optimistic(
            &self.state,
            "delete appointment",
            |state: &mut AgendaState| {
                let (position, removed) = state.remove(id).ok_or(AppointmentError::NotFound(id))?;
                Ok(Applied::new((), move |state: &mut AgendaState| {
                    state.restore(position, removed);
                }))
            },
            |_| async move { store.delete_appointment(id).await },
        )
        .await;

        if result.is_ok() {
            info!("Appointment {} deleted", id);
        }
        self.settle("delete appointment", result).await
    }

    // ==============================================================================
    // READ SIDE
    // ==============================================================================

    pub async fn slot(&self, date: NaiveDate, hour: u32) -> Result<SlotView, AppointmentError> {
        let key = SlotKey::new(date, hour)?;
        Ok(self.state.read().await.slot_index().slot(key))
    }

    pub async fn appointments(&self) -> Vec<Appointment> {
        self.state.read().await.appointments().cloned().collect()
    }

    pub async fn is_blocked(&self, date: NaiveDate, hour: u32) -> bool {
        match SlotKey::new(date, hour) {
            Ok(key) => self.state.read().await.is_blocked(&key),
            Err(_) => false,
        }
    }

    pub async fn snapshot(&self) -> AgendaSnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn week_agenda(&self, reference: NaiveDate) -> Result<WeekAgenda, AppointmentError> {
        let state = self.state.read().await;
        build_week(&state.slot_index(), reference, &self.hours)
    }

    pub async fn month_agenda(&self, reference: NaiveDate) -> Result<MonthAgenda, AppointmentError> {
        let state = self.state.read().await;
        build_month(&state.slot_index(), reference)
    }

    pub async fn year_agenda(&self, year: i32) -> Result<YearAgenda, AppointmentError> {
        let state = self.state.read().await;
        build_year(&state.slot_index(), year)
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error().map(str::to_string)
    }

    pub async fn clear_error(&self) {
        self.state.write().await.clear_error();
    }

    /// Logs a failed action and keeps its message for the UI.
    async fn settle<T>(&self, action: &str, result: Result<T, AppointmentError>) -> Result<T, AppointmentError> {
        if let Err(err) = &result {
            match err {
                AppointmentError::Remote(_) => error!("{} failed: {}", action, err),
                _ => warn!("{} rejected: {}", action, err),
            }
            self.state.write().await.record_error(err.to_string());
        }
        result
    }
}
