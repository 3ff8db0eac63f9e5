//! # thingsyncd — thing description sync daemon
//!
//! Composition root that wires all adapters together and runs the sync.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install the tracing subscriber
//! - Connect to the broker and start listening for bridge device lists
//! - Construct the description publisher, injecting adapters via port traits
//! - Run the description sync until the event channel closes or SIGINT
//! - Disconnect cleanly on shutdown
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use thingsync_adapter_host::{FsTemplateStore, SystemInterfaces};
use thingsync_adapter_mqtt::MqttConnection;
use thingsync_app::services::description_publisher::DescriptionPublisher;
use thingsync_app::sync::DescriptionSync;
use thingsync_domain::event::LifecycleEvent;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    let filter = EnvFilter::try_new(&config.logging.filter)
        .with_context(|| format!("invalid log filter {:?}", config.logging.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::debug!(?config, "configuration loaded");

    let settings = config
        .mqtt
        .broker_settings()
        .context("invalid broker settings")?;

    // Broker
    let (events_tx, events_rx) = mpsc::unbounded_channel::<LifecycleEvent>();
    let connection =
        MqttConnection::start(&config.mqtt, events_tx).context("failed to start MQTT connection")?;

    // Services
    let templates = FsTemplateStore::new(&config.templates.dir);
    tracing::info!(dir = %templates.dir().display(), "reading thing models");
    let publisher =
        DescriptionPublisher::new(connection.publisher(), templates, SystemInterfaces, settings);
    let mut sync_task = tokio::spawn(DescriptionSync::new(publisher).run(events_rx));

    let sync_finished = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for shutdown signal")?;
            tracing::info!("shutdown signal received");
            false
        }
        joined = &mut sync_task => {
            if let Err(err) = joined {
                tracing::error!(%err, "description sync task failed");
            }
            true
        }
    };

    connection
        .shutdown()
        .await
        .context("failed to disconnect from broker")?;

    // Stopping the connection drops the event sender, so the sync drains
    // whatever is still queued and returns.
    if !sync_finished && let Err(err) = sync_task.await {
        tracing::error!(%err, "description sync task failed");
    }

    Ok(())
}
