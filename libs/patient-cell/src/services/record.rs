use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, info};

use shared_database::{RemoteError, RestClient};

use crate::models::{ClinicalRecord, Patient, PatientError};

const RECORDS_PATH: &str = "/prontuarios";

pub struct ClinicalRecordService {
    client: Arc<RestClient>,
}

impl ClinicalRecordService {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }

    pub async fn get_record(&self, id: i64) -> Result<ClinicalRecord, PatientError> {
        debug!("Fetching clinical record {}", id);
        let path = format!("{}/{}", RECORDS_PATH, id);

        match self.client.get(&path).await {
            Ok(record) => Ok(record),
            Err(RemoteError::Status { status: 404, .. }) => Err(PatientError::RecordNotFound(id)),
            Err(err) => Err(err.into()),
        }
    }

    /// Updates an existing record in place, or creates it when it has no id yet.
    /// An empty answer from the backend returns the record as sent.
    pub async fn save_record(&self, record: ClinicalRecord) -> Result<ClinicalRecord, PatientError> {
        let saved: Option<ClinicalRecord> = match record.id {
            Some(id) => {
                debug!("Updating clinical record {}", id);
                let path = format!("{}/{}", RECORDS_PATH, id);
                self.client.request_optional(Method::POST, &path, Some(&record)).await?
            }
            None => {
                debug!("Creating clinical record");
                self.client.request_optional(Method::PUT, RECORDS_PATH, Some(&record)).await?
            }
        };

        let saved = saved.unwrap_or(record);
        info!("Clinical record {:?} saved", saved.id);
        Ok(saved)
    }

    /// Chart to show when a patient is opened: the linked record with the
    /// patient's identity applied, or a blank prefilled chart.
    pub async fn open_for_patient(&self, patient: &Patient) -> Result<ClinicalRecord, PatientError> {
        match patient.record_id() {
            Some(id) => Ok(self.get_record(id).await?.with_patient_identity(patient)),
            None => {
                debug!("Patient {} has no clinical record yet", patient.id);
                Ok(ClinicalRecord::blank_for(patient))
            }
        }
    }
}