pub mod analytics;
pub mod asset;
pub mod chart;
pub mod holding;
pub mod performance;
pub mod period;
pub mod portfolio;
pub mod rate;
pub mod settings;
