use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use shared_database::RemoteError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    #[serde(default)]
    pub cpf: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
    #[serde(rename = "prontuario", default, skip_serializing_if = "Option::is_none")]
    pub clinical_record: Option<ClinicalRecordRef>,
}

impl Patient {
    /// Id of the linked clinical record, if one was ever saved.
    pub fn record_id(&self) -> Option<i64> {
        self.clinical_record.as_ref().and_then(|record| record.id)
    }

    /// Phone number, ignoring blanks.
    pub fn contact_phone(&self) -> Option<&str> {
        self.phone.as_deref().map(str::trim).filter(|phone| !phone.is_empty())
    }
}

/// The record embedded in a patient; only its id is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalRecordRef {
    #[serde(default)]
    pub id: Option<i64>,
}

/// A physiotherapy chart. Named fields are the ones the agenda relies on;
/// every other section travels untouched in `sections`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "nomeCompleto", default)]
    pub full_name: Option<String>,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
    #[serde(rename = "sessoes", default)]
    pub sessions: Vec<Value>,
    #[serde(flatten)]
    pub sections: BTreeMap<String, Value>,
}

impl ClinicalRecord {
    /// Blank chart prefilled from the patient.
    pub fn blank_for(patient: &Patient) -> Self {
        Self {
            id: None,
            full_name: Some(patient.name.clone()),
            phone: Some(patient.contact_phone().unwrap_or_default().to_string()),
            sessions: Vec::new(),
            sections: BTreeMap::new(),
        }
    }

    /// The patient's name always wins; the phone only when the patient has one.
    pub fn with_patient_identity(mut self, patient: &Patient) -> Self {
        self.full_name = Some(patient.name.clone());
        if let Some(phone) = patient.contact_phone() {
            self.phone = Some(phone.to_string());
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatientError {
    #[error("Patient {0} not found")]
    NotFound(i64),

    #[error("Clinical record {0} not found")]
    RecordNotFound(i64),

    #[error("{0}")]
    Remote(#[from] RemoteError),
}
