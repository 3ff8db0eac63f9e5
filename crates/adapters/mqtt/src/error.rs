//! MQTT adapter error types.

use thingsync_domain::broker::BrokerUriError;
use thingsync_domain::error::{ThingSyncError, ValidationError};

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client refused the request (its event loop is gone).
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// Failed to parse an incoming MQTT payload as JSON.
    #[error("failed to parse MQTT payload")]
    PayloadParse(#[source] serde_json::Error),

    /// The configured server is not a valid broker URI.
    #[error("invalid broker URI")]
    InvalidUri(#[source] BrokerUriError),

    /// The broker URI uses a scheme the connection cannot speak.
    #[error("unsupported broker scheme {0:?}")]
    UnsupportedScheme(String),
}

impl MqttError {
    /// Convert into a [`ThingSyncError`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> ThingSyncError {
        match self {
            Self::InvalidUri(err) => ValidationError::Invalid(err.to_string()).into(),
            Self::UnsupportedScheme(scheme) => {
                ValidationError::Invalid(format!("unsupported broker scheme {scheme:?}")).into()
            }
            other => ThingSyncError::Transport(Box::new(other)),
        }
    }
}

impl From<MqttError> for ThingSyncError {
    fn from(err: MqttError) -> Self {
        err.into_domain()
    }
}
