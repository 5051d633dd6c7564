use std::time::Duration;

use serde_json::json;

use shared_config::{AppConfig, CreateMethod, SlotOverlapPolicy};

pub struct TestConfig {
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub create_method: CreateMethod,
    pub slot_overlap: SlotOverlapPolicy,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 5,
            create_method: CreateMethod::Post,
            slot_overlap: SlotOverlapPolicy::Allow,
        }
    }
}

impl TestConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            api_base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            api_base_url: self.api_base_url.clone(),
            request_timeout: Duration::from_secs(self.timeout_secs),
            create_method: self.create_method,
            slot_overlap: self.slot_overlap,
            ..AppConfig::default()
        }
    }
}

/// Bodies in the shape the clinic backend sends them.
pub struct MockAgendaResponses;

impl MockAgendaResponses {
    pub fn appointment(id: i64, patient_id: i64, date: &str, time: &str) -> serde_json::Value {
        json!({
            "id": id,
            "paciente_id": patient_id,
            "date": date,
            "time": time,
            "type": "Fisioterapia"
        })
    }

    pub fn blocked_slot(date: &str, hour: u32) -> serde_json::Value {
        json!({
            "date": date,
            "time": format!("{:02}:00", hour)
        })
    }

    pub fn patient(id: i64, name: &str, phone: &str) -> serde_json::Value {
        json!({
            "id": id,
            "cpf": "123.456.789-00",
            "nome": name,
            "telefone": phone,
            "prontuario": null
        })
    }

    pub fn patient_with_record(id: i64, name: &str, phone: &str, record_id: i64) -> serde_json::Value {
        json!({
            "id": id,
            "cpf": "123.456.789-00",
            "nome": name,
            "telefone": phone,
            "prontuario": { "id": record_id }
        })
    }

    pub fn clinical_record(id: i64, name: &str, phone: &str) -> serde_json::Value {
        json!({
            "id": id,
            "nomeCompleto": name,
            "telefone": phone,
            "queixaPrincipal": "Dor lombar",
            "sessoes": [
                { "data": "2025-03-10", "evolucao": "Melhora da mobilidade" }
            ]
        })
    }

    pub fn error_response(message: &str) -> serde_json::Value {
        json!({ "message": message })
    }
}
