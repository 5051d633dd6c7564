use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use shared_database::RestClient;

use crate::models::{Patient, PatientError};

const PATIENTS_PATH: &str = "/pacientes";

pub struct PatientService {
    client: Arc<RestClient>,
}

impl PatientService {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, PatientError> {
        debug!("Fetching patients");
        let patients: Vec<Patient> = self.client.get(PATIENTS_PATH).await?;
        debug!("Fetched {} patients", patients.len());
        Ok(patients)
    }

    pub async fn directory(&self) -> Result<PatientDirectory, PatientError> {
        Ok(PatientDirectory::new(self.list_patients().await?))
    }

    /// The backend has no single-patient route, so this filters the list.
    pub async fn get_patient(&self, id: i64) -> Result<Patient, PatientError> {
        self.directory()
            .await?
            .get(id)
            .cloned()
            .ok_or(PatientError::NotFound(id))
    }
}

/// Patients indexed by id, used to label appointments.
#[derive(Debug, Clone, Default)]
pub struct PatientDirectory {
    patients: Vec<Patient>,
    by_id: HashMap<i64, usize>,
}

impl PatientDirectory {
    pub fn new(patients: Vec<Patient>) -> Self {
        let by_id = patients
            .iter()
            .enumerate()
            .map(|(position, patient)| (patient.id, position))
            .collect();
        Self { patients, by_id }
    }

    pub fn get(&self, id: i64) -> Option<&Patient> {
        self.by_id.get(&id).map(|&position| &self.patients[position])
    }

    /// Name shown on an appointment card; unknown ids get a placeholder.
    pub fn display_name(&self, id: i64) -> String {
        match self.get(id) {
            Some(patient) => patient.name.clone(),
            None => format!("Paciente #{}", id),
        }
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }
}
