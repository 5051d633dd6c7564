// libs/appointment-cell/src/services/state.rs
use std::collections::HashSet;

use tracing::debug;
use uuid::Uuid;

use crate::models::{AgendaSnapshot, Appointment, SlotKey};
use crate::services::slot_index::SlotIndex;

#[derive(Debug, Clone)]
struct AgendaEntry {
    /// Set while the create call for this appointment is in flight.
    draft: Option<Uuid>,
    appointment: Appointment,
}

/// Local, optimistic copy of the agenda. Mutated only through the controller.
#[derive(Debug, Default)]
pub struct AgendaState {
    entries: Vec<AgendaEntry>,
    blocked: HashSet<SlotKey>,
    last_error: Option<String>,
}

impl AgendaState {
    pub fn appointments(&self) -> impl Iterator<Item = &Appointment> {
        self.entries.iter().map(|entry| &entry.appointment)
    }

    pub fn blocked(&self) -> &HashSet<SlotKey> {
        &self.blocked
    }

    pub fn is_blocked(&self, key: &SlotKey) -> bool {
        self.blocked.contains(key)
    }

    pub fn slot_index(&self) -> SlotIndex<'_> {
        SlotIndex::new(&self.blocked, self.appointments())
    }

    pub fn find(&self, id: i64) -> Option<&Appointment> {
        self.appointments().find(|a| a.id == Some(id))
    }

    pub fn pending_creates(&self) -> usize {
        self.entries.iter().filter(|entry| entry.draft.is_some()).count()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn snapshot(&self) -> AgendaSnapshot {
        let mut blocked_slots: Vec<SlotKey> = self.blocked.iter().copied().collect();
        blocked_slots.sort();

        AgendaSnapshot {
            appointments: self.appointments().cloned().collect(),
            blocked_slots,
            pending_creates: self.pending_creates(),
            last_error: self.last_error.clone(),
        }
    }

    /// Replaces persisted data with a fresh load. Drafts still awaiting their
    /// create call survive the reload.
    pub(crate) fn replace_all<I>(&mut self, appointments: Vec<Appointment>, blocked: I)
    where
        I: IntoIterator<Item = SlotKey>,
    {
        self.entries.retain(|entry| entry.draft.is_some());
        self.entries.extend(appointments.into_iter().map(|appointment| AgendaEntry {
            draft: None,
            appointment,
        }));
        self.blocked = blocked.into_iter().collect();
        debug!(
            "Agenda state replaced: {} appointments, {} blocked slots",
            self.entries.len(),
            self.blocked.len()
        );
    }

    pub(crate) fn set_blocked(&mut self, key: SlotKey, blocked: bool) {
        if blocked {
            self.blocked.insert(key);
        } else {
            self.blocked.remove(&key);
        }
    }

    pub(crate) fn insert_draft(&mut self, appointment: Appointment) -> Uuid {
        let token = Uuid::new_v4();
        self.entries.push(AgendaEntry {
            draft: Some(token),
            appointment,
        });
        token
    }

    /// Swaps a draft for the record the backend returned.
    pub(crate) fn confirm_draft(&mut self, token: Uuid, record: Appointment) {
        let already_loaded = record.id.is_some() && self.appointments().any(|a| a.id == record.id);

        match self.entries.iter().position(|entry| entry.draft == Some(token)) {
            Some(position) if already_loaded => {
                self.entries.remove(position);
            }
            Some(position) => {
                self.entries[position] = AgendaEntry {
                    draft: None,
                    appointment: record,
                };
            }
            None if !already_loaded => self.entries.push(AgendaEntry {
                draft: None,
                appointment: record,
            }),
            None => {}
        }
    }

    pub(crate) fn discard_draft(&mut self, token: Uuid) {
        self.entries.retain(|entry| entry.draft != Some(token));
    }

    /// Overwrites appointment `id`; returns false when it is no longer present.
    pub(crate) fn replace(&mut self, id: i64, appointment: Appointment) -> bool {
        match self.entries.iter_mut().find(|entry| entry.appointment.id == Some(id)) {
            Some(entry) => {
                entry.appointment = appointment;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: i64) -> Option<(usize, Appointment)> {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.draft.is_none() && entry.appointment.id == Some(id))?;
        Some((position, self.entries.remove(position).appointment))
    }

    pub(crate) fn restore(&mut self, position: usize, appointment: Appointment) {
        if appointment.id.is_some() && self.appointments().any(|a| a.id == appointment.id) {
            return;
        }
        let position = position.min(self.entries.len());
        self.entries.insert(
            position,
            AgendaEntry {
                draft: None,
                appointment,
            },
        );
    }

    pub(crate) fn record_error(&mut self, message: String) {
        self.last_error = Some(message);
    }

    pub(crate) fn clear_error(&mut self) {
        self.last_error = None;
    }
}