//! HTTP handlers

pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod movements;
pub mod notification;
pub mod prices;
pub mod products;
pub mod settings;

pub use catalog::*;
pub use dashboard::*;
pub use health::*;
pub use movements::*;
pub use notification::*;
pub use prices::*;
pub use products::*;
pub use settings::*;
