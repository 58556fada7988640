//! Shared types and models for the stock ledger
//!
//! This crate holds the domain model, input validation and the pure
//! read-side projector. It is used by the backend and by the WASM bindings.

pub mod alerts;
pub mod ids;
pub mod models;
pub mod projection;
pub mod types;
pub mod validation;

pub use alerts::*;
pub use models::*;
pub use projection::*;
pub use types::*;
pub use validation::*;
