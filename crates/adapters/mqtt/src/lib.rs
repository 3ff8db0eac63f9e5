//! # thingsync-adapter-mqtt
//!
//! MQTT adapter — the broker side of thingsync.
//!
//! ## Responsibilities
//! - Connect to an MQTT broker (rumqttc)
//! - Publish retained thing descriptions and tombstones
//!   ([`MqttDiscoveryPublisher`] implements the `DiscoveryTransport` port)
//! - Subscribe to the host's retained device list and translate each new list
//!   into lifecycle events ([`BridgeTracker`])
//!
//! ## Dependency rule
//! Same as other adapters: depends on `thingsync-app` and `thingsync-domain`.

pub mod bridge;
mod config;
mod connection;
mod error;
mod publisher;

pub use bridge::BridgeTracker;
pub use config::MqttConfig;
pub use connection::MqttConnection;
pub use error::MqttError;
pub use publisher::MqttDiscoveryPublisher;
