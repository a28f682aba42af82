pub mod price_resolver;
pub mod series_service;
pub mod valuation_service;
