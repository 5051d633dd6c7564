pub mod patient;
pub mod record;

pub use patient::{PatientDirectory, PatientService};
pub use record::ClinicalRecordService;
