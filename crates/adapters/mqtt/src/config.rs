//! MQTT integration configuration.

use std::fmt;
use std::time::Duration;

use rumqttc::MqttOptions;
use serde::Deserialize;

use thingsync_domain::broker::{BrokerSettings, BrokerUri, Credentials};

use crate::error::MqttError;

const DEFAULT_PORT: u16 = 1883;

/// Configuration for the MQTT connection.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker URI, `scheme://host[:port]`.
    pub server: String,
    /// MQTT client identifier.
    pub client_id: String,
    /// Topic prefix the device host publishes under (e.g. `zigbee2mqtt`).
    pub base_topic: String,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Capacity of the client's outgoing request queue.
    pub channel_capacity: usize,
    /// Largest packet accepted or sent, in bytes. Bridge device lists of big
    /// networks easily exceed the client default.
    pub max_packet_size: usize,
    /// Pause after a connection error before polling again, in seconds.
    pub reconnect_delay_secs: u16,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            server: "mqtt://localhost:1883".to_string(),
            client_id: "thingsync".to_string(),
            base_topic: "zigbee2mqtt".to_string(),
            user: None,
            password: None,
            keep_alive_secs: 30,
            channel_capacity: 64,
            max_packet_size: 1024 * 1024,
            reconnect_delay_secs: 5,
        }
    }
}

impl fmt::Debug for MqttConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MqttConfig")
            .field("server", &self.server)
            .field("client_id", &self.client_id)
            .field("base_topic", &self.base_topic)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("keep_alive_secs", &self.keep_alive_secs)
            .field("channel_capacity", &self.channel_capacity)
            .field("max_packet_size", &self.max_packet_size)
            .field("reconnect_delay_secs", &self.reconnect_delay_secs)
            .finish()
    }
}

impl MqttConfig {
    /// Parse the configured server URI.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::InvalidUri`] when `server` is not `scheme://host[:port]`.
    pub fn broker_uri(&self) -> Result<BrokerUri, MqttError> {
        self.server.parse().map_err(MqttError::InvalidUri)
    }

    /// Credentials, when both user and password are set.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::from_parts(self.user.as_deref(), self.password.as_deref())
    }

    /// Broker settings as seen by the description publisher.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::InvalidUri`] when `server` cannot be parsed.
    pub fn broker_settings(&self) -> Result<BrokerSettings, MqttError> {
        Ok(BrokerSettings {
            uri: self.broker_uri()?,
            base_topic: self.base_topic.clone(),
            credentials: self.credentials(),
        })
    }

    /// Topic the device host retains its device list on.
    #[must_use]
    pub fn devices_topic(&self) -> String {
        format!("{}/bridge/devices", self.base_topic)
    }

    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(u64::from(self.reconnect_delay_secs))
    }

    /// Build rumqttc connection options.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::InvalidUri`] for an unparsable server and
    /// [`MqttError::UnsupportedScheme`] for anything but plain `mqtt`.
    pub fn mqtt_options(&self) -> Result<MqttOptions, MqttError> {
        let uri = self.broker_uri()?;
        if uri.scheme != "mqtt" {
            return Err(MqttError::UnsupportedScheme(uri.scheme));
        }

        let mut options = MqttOptions::new(
            self.client_id.clone(),
            uri.host,
            uri.port.unwrap_or(DEFAULT_PORT),
        );
        options.set_keep_alive(Duration::from_secs(u64::from(self.keep_alive_secs)));
        options.set_max_packet_size(self.max_packet_size, self.max_packet_size);
        if let Some(credentials) = self.credentials() {
            options.set_credentials(credentials.user, credentials.password);
        }
        Ok(options)
    }
}
