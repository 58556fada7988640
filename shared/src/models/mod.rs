//! Domain models for the stock ledger

mod catalog;
mod movement;
mod pricing;
mod product;
mod settings;

pub use catalog::*;
pub use movement::*;
pub use pricing::*;
pub use product::*;
pub use settings::*;
