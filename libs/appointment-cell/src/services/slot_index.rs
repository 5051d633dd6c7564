// libs/appointment-cell/src/services/slot_index.rs
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::models::{Appointment, SlotKey, SlotView};

/// Per-slot lookup over a blocked-key set and an appointment list.
pub struct SlotIndex<'a> {
    blocked: &'a HashSet<SlotKey>,
    occupancy: HashMap<SlotKey, Vec<&'a Appointment>>,
}

impl<'a> SlotIndex<'a> {
    pub fn new<I>(blocked: &'a HashSet<SlotKey>, appointments: I) -> Self
    where
        I: IntoIterator<Item = &'a Appointment>,
    {
        let mut occupancy: HashMap<SlotKey, Vec<&'a Appointment>> = HashMap::new();
        for appointment in appointments {
            occupancy.entry(appointment.slot_key()).or_default().push(appointment);
        }

        Self { blocked, occupancy }
    }

    pub fn is_blocked(&self, key: &SlotKey) -> bool {
        self.blocked.contains(key)
    }

    pub fn occupants(&self, key: &SlotKey) -> &[&'a Appointment] {
        self.occupancy.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_occupied(&self, key: &SlotKey) -> bool {
        !self.occupants(key).is_empty()
    }

    /// Whether anything other than appointment `id` sits in the slot.
    pub fn is_occupied_by_other(&self, key: &SlotKey, id: i64) -> bool {
        self.occupants(key).iter().any(|a| a.id != Some(id))
    }

    pub fn shows_blocked(&self, key: &SlotKey) -> bool {
        self.is_blocked(key) && !self.is_occupied(key)
    }

    /// Blocking and unblocking are only allowed on empty slots.
    pub fn can_toggle_block(&self, key: &SlotKey) -> bool {
        !self.is_occupied(key)
    }

    pub fn slot(&self, key: SlotKey) -> SlotView {
        let mut appointments: Vec<Appointment> =
            self.occupants(&key).iter().map(|a| (*a).clone()).collect();
        appointments.sort_by_key(|a| (a.time, a.id));

        SlotView {
            key,
            date: key.date(),
            hour: key.hour(),
            blocked: self.shows_blocked(&key),
            marked_blocked: self.is_blocked(&key),
            can_toggle_block: self.can_toggle_block(&key),
            appointments,
        }
    }

    pub fn appointments_on(&self, date: NaiveDate) -> Vec<&'a Appointment> {
        let mut appointments: Vec<&'a Appointment> = self
            .occupancy
            .iter()
            .filter(|(key, _)| key.date() == date)
            .flat_map(|(_, occupants)| occupants.iter().copied())
            .collect();
        appointments.sort_by_key(|a| (a.time, a.id));
        appointments
    }

    pub fn has_appointments_on(&self, date: NaiveDate) -> bool {
        self.occupancy.keys().any(|key| key.date() == date)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn appointment(id: i64, day: NaiveDate, hour: u32, minute: u32) -> Appointment {
        Appointment {
            id: Some(id),
            patient_id: 1,
            date: day,
            time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
            appointment_type: "Fisioterapia".to_string(),
        }
    }

    #[test]
    fn test_blocked_key_format() {
        let key = SlotKey::new(date(2025, 3, 10), 9).unwrap();
        assert_eq!(key.to_string(), "2025-03-10:09");
        assert!(SlotKey::new(date(2025, 3, 10), 24).is_err());
    }

    #[test]
    fn test_minutes_are_truncated_to_hour_bucket() {
        let day = date(2025, 3, 10);
        let appointments = vec![appointment(1, day, 9, 45)];
        let blocked = HashSet::new();
        let index = SlotIndex::new(&blocked, &appointments);

        let nine = SlotKey::new(day, 9).unwrap();
        let ten = SlotKey::new(day, 10).unwrap();

        assert_eq!(index.occupants(&nine).len(), 1);
        assert_eq!(index.occupants(&nine)[0].id, Some(1));
        assert!(!index.is_occupied(&ten));
    }

    #[test]
    fn test_appointments_take_precedence_over_block() {
        let day = date(2025, 3, 10);
        let nine = SlotKey::new(day, 9).unwrap();
        let eleven = SlotKey::new(day, 11).unwrap();
        let appointments = vec![appointment(1, day, 9, 0)];
        let blocked: HashSet<SlotKey> = [nine, eleven].into_iter().collect();
        let index = SlotIndex::new(&blocked, &appointments);

        let occupied = index.slot(nine);
        assert!(occupied.marked_blocked);
        assert!(!occupied.blocked);
        assert!(!occupied.can_toggle_block);

        let empty = index.slot(eleven);
        assert!(empty.blocked);
        assert!(empty.can_toggle_block);
        assert!(empty.appointments.is_empty());
    }

    #[test]
    fn test_several_appointments_share_a_slot() {
        let day = date(2025, 3, 10);
        let appointments = vec![appointment(2, day, 9, 30), appointment(1, day, 9, 0)];
        let blocked = HashSet::new();
        let index = SlotIndex::new(&blocked, &appointments);
        let nine = SlotKey::new(day, 9).unwrap();

        let view = index.slot(nine);
        assert_eq!(view.appointments.iter().map(|a| a.id).collect::<Vec<_>>(), vec![Some(1), Some(2)]);
        assert!(index.is_occupied_by_other(&nine, 1));

        let single = vec![appointment(1, day, 9, 0)];
        let index = SlotIndex::new(&blocked, &single);
        assert!(!index.is_occupied_by_other(&nine, 1));
    }

    #[test]
    fn test_day_lookup() {
        let day = date(2025, 3, 10);
        let appointments = vec![
            appointment(3, day, 15, 0),
            appointment(1, day, 8, 15),
            appointment(2, date(2025, 3, 11), 9, 0),
        ];
        let blocked = HashSet::new();
        let index = SlotIndex::new(&blocked, &appointments);

        let ids: Vec<_> = index.appointments_on(day).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![Some(1), Some(3)]);
        assert!(index.has_appointments_on(date(2025, 3, 11)));
        assert!(!index.has_appointments_on(date(2025, 3, 12)));
    }
}