pub mod error;
pub mod rest;

pub use error::RemoteError;
pub use rest::RestClient;
