//! Clinic administration console core.
//!
//! - models: entities, identifiers and write payloads
//! - gateway: typed operations over a pluggable transport
//! - store / selector: fetched collections and parent-to-child cascades
//! - forms / entity_forms: modal form state and per-entity templates
//! - status: appointment status transitions
//! - reports: report filters, queries and the active result
//! - screens: the state each console page owns

pub mod config;
pub mod entity_forms;
pub mod error;
pub mod forms;
pub mod gateway;
pub mod models;
pub mod reports;
pub mod screens;
pub mod selector;
pub mod status;
pub mod store;

pub use config::ConsoleConfig;
pub use error::{ApiError, ConsoleError};
pub use gateway::{Gateway, Transport};
