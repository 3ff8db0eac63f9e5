//! # thingsync-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DiscoveryTransport` — retained publishes to the broker
//!   - `TemplateStore` — per-model thing description templates
//!   - `InterfaceAddresses` — the host's network addresses
//! - Keep the **device registry** (process-lifetime, rebuilt from events)
//! - Provide the **description publisher** use-case (render, publish, retract)
//! - Run the **sync state machine** that turns lifecycle events into registry
//!   mutations and publish/retract calls, one event at a time
//!
//! ## Dependency rule
//! Depends on `thingsync-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod registry;
pub mod services;
pub mod sync;

#[cfg(test)]
mod test_support;
