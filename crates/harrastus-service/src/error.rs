//! Geocoding error types.

use harrastus_core::error::HarrastusError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed for {address}: {reason}")]
    Request { address: String, reason: String },

    #[error("geocoding returned status {status} for {address}")]
    Status { address: String, status: String },

    #[error("malformed geocoding response for {address}: {reason}")]
    Malformed { address: String, reason: String },
}

impl GeocodeError {
    pub fn address(&self) -> &str {
        match self {
            Self::Request { address, .. }
            | Self::Status { address, .. }
            | Self::Malformed { address, .. } => address,
        }
    }
}

impl From<GeocodeError> for HarrastusError {
    fn from(err: GeocodeError) -> Self {
        HarrastusError::Geocoding {
            address: err.address().to_owned(),
        }
    }
}
