//! # thingsync-adapter-host
//!
//! Adapters for what the publishing machine itself provides.
//!
//! ## Responsibilities
//! - Implement the `TemplateStore` port over a directory of
//!   `<model>.tm.json` files
//! - Implement the `InterfaceAddresses` port over the OS interface table
//!
//! ## Dependency rule
//! Depends on `thingsync-app` (for port traits) and `thingsync-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod interfaces;
mod templates;

pub use error::TemplateStoreError;
pub use interfaces::SystemInterfaces;
pub use templates::FsTemplateStore;
