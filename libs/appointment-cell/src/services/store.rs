// libs/appointment-cell/src/services/store.rs
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

use shared_config::{AppConfig, CreateMethod};
use shared_database::{RemoteError, RestClient};

use crate::models::{Appointment, AppointmentUpdate, BlockedSlot, NewAppointment};

const APPOINTMENTS_PATH: &str = "/agendamentos";
const BLOCKED_SLOTS_PATH: &str = "/horarios-bloqueados";

/// Source of truth for appointments and blocked slots.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgendaStore: Send + Sync {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, RemoteError>;

    async fn create_appointment(&self, appointment: &NewAppointment) -> Result<Appointment, RemoteError>;

    /// Returns the updated record when the backend sends one back.
    async fn update_appointment(
        &self,
        id: i64,
        update: &AppointmentUpdate,
    ) -> Result<Option<Appointment>, RemoteError>;

    async fn delete_appointment(&self, id: i64) -> Result<(), RemoteError>;

    async fn list_blocked_slots(&self) -> Result<Vec<BlockedSlot>, RemoteError>;

    async fn block_slot(&self, slot: &BlockedSlot) -> Result<(), RemoteError>;

    async fn unblock_slot(&self, slot: &BlockedSlot) -> Result<(), RemoteError>;
}

pub struct HttpAgendaStore {
    client: Arc<RestClient>,
    create_method: CreateMethod,
}

impl HttpAgendaStore {
    pub fn new(client: Arc<RestClient>, create_method: CreateMethod) -> Self {
        Self { client, create_method }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, RemoteError> {
        Ok(Self::new(Arc::new(RestClient::new(config)?), config.create_method))
    }

    fn create_verb(&self) -> Method {
        match self.create_method {
            CreateMethod::Post => Method::POST,
            CreateMethod::Put => Method::PUT,
        }
    }
}

#[async_trait]
impl AgendaStore for HttpAgendaStore {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, RemoteError> {
        debug!("Fetching appointments");
        self.client.get(APPOINTMENTS_PATH).await
    }

    async fn create_appointment(&self, appointment: &NewAppointment) -> Result<Appointment, RemoteError> {
        debug!("Creating appointment for patient {} on {}", appointment.patient_id, appointment.date);
        self.client
            .request(self.create_verb(), APPOINTMENTS_PATH, Some(appointment))
            .await
    }

    async fn update_appointment(
        &self,
        id: i64,
        update: &AppointmentUpdate,
    ) -> Result<Option<Appointment>, RemoteError> {
        debug!("Updating appointment {}", id);
        let path = format!("{}/{}", APPOINTMENTS_PATH, id);
        self.client.request_optional(Method::POST, &path, Some(update)).await
    }

    async fn delete_appointment(&self, id: i64) -> Result<(), RemoteError> {
        debug!("Deleting appointment {}", id);
        let path = format!("{}/{}", APPOINTMENTS_PATH, id);
        self.client.execute::<()>(Method::DELETE, &path, None).await
    }

    async fn list_blocked_slots(&self) -> Result<Vec<BlockedSlot>, RemoteError> {
        debug!("Fetching blocked slots");
        self.client.get(BLOCKED_SLOTS_PATH).await
    }

    async fn block_slot(&self, slot: &BlockedSlot) -> Result<(), RemoteError> {
        debug!("Blocking slot {}", slot.key());
        self.client.execute(Method::POST, BLOCKED_SLOTS_PATH, Some(slot)).await
    }

    async fn unblock_slot(&self, slot: &BlockedSlot) -> Result<(), RemoteError> {
        debug!("Unblocking slot {}", slot.key());
        self.client.execute(Method::DELETE, BLOCKED_SLOTS_PATH, Some(slot)).await
    }
}