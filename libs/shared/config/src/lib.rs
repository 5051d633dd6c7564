use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub create_method: CreateMethod,
    pub slot_overlap: SlotOverlapPolicy,
    pub day_start_hour: u32,
    pub day_end_hour: u32,
    pub port: u16,
}

/// HTTP verb the backend expects when an appointment is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CreateMethod {
    #[default]
    Post,
    Put,
}

impl FromStr for CreateMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POST" => Ok(CreateMethod::Post),
            "PUT" => Ok(CreateMethod::Put),
            other => Err(format!("unsupported create method: {}", other)),
        }
    }
}

/// Whether a slot may hold more than one appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotOverlapPolicy {
    #[default]
    Allow,
    Reject,
}

impl FromStr for SlotOverlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(SlotOverlapPolicy::Allow),
            "reject" => Ok(SlotOverlapPolicy::Reject),
            other => Err(format!("unsupported slot overlap policy: {}", other)),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            create_method: CreateMethod::default(),
            slot_overlap: SlotOverlapPolicy::default(),
            day_start_hour: 8,
            day_end_hour: 20,
            port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            api_base_url: env::var("AGENDA_API_URL")
                .unwrap_or_else(|_| {
                    warn!("AGENDA_API_URL not set, using {}", DEFAULT_API_URL);
                    String::new()
                }),
            request_timeout: parse_var("AGENDA_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            create_method: parse_var("AGENDA_CREATE_METHOD", defaults.create_method)
                .unwrap_or(defaults.create_method),
            slot_overlap: parse_var("AGENDA_SLOT_OVERLAP", defaults.slot_overlap)
                .unwrap_or(defaults.slot_overlap),
            day_start_hour: parse_var("AGENDA_DAY_START_HOUR", defaults.day_start_hour)
                .unwrap_or(defaults.day_start_hour),
            day_end_hour: parse_var("AGENDA_DAY_END_HOUR", defaults.day_end_hour)
                .unwrap_or(defaults.day_end_hour),
            port: parse_var("PORT", defaults.port).unwrap_or(defaults.port),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - falling back to the local backend URL");
        }

        config.normalized()
    }

    pub fn is_configured(&self) -> bool {
        !self.api_base_url.is_empty()
    }

    /// Fills in the default URL and repairs an inverted or out-of-range hour window.
    pub fn normalized(mut self) -> Self {
        if self.api_base_url.is_empty() {
            self.api_base_url = DEFAULT_API_URL.to_string();
        }
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();

        if self.day_end_hour > 24 || self.day_start_hour >= self.day_end_hour {
            warn!(
                "Invalid agenda hours {}..{}, using 8..20",
                self.day_start_hour, self.day_end_hour
            );
            self.day_start_hour = 8;
            self.day_end_hour = 20;
        }

        self
    }
}

fn parse_var<T>(name: &str, default: T) -> Option<T>
where
    T: FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("{} has invalid value {:?} ({}), using {:?}", name, raw, e, default);
                None
            }
        },
        Err(_) => Some(default),
    }
}
