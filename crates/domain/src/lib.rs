//! # thingsync-domain
//!
//! Pure domain model for publishing Web of Things descriptions of devices.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions
//! - Define **device records** (what the registry remembers per device)
//! - Define **lifecycle events** (appear, rename, disappear)
//! - Render **thing descriptions** from templates (placeholder substitution,
//!   security override, canonical serialisation)
//! - Parse **broker settings** and resolve the address remote consumers use
//! - Name the **discovery topics** descriptions are retained under
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod broker;
pub mod description;
pub mod device;
pub mod event;
pub mod topic;
