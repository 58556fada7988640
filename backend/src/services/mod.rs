//! Business logic services for the stock ledger

pub mod catalog;
pub mod dashboard;
pub mod ledger;
pub mod notification;
pub mod price_history;
pub mod reporting;
pub mod settings;

pub use catalog::CatalogService;
pub use dashboard::DashboardService;
pub use ledger::StockMutationEngine;
pub use notification::NotificationService;
pub use price_history::PriceHistoryRecorder;
pub use reporting::ReportingService;
pub use settings::SettingsService;
