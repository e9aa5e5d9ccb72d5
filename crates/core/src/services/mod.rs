pub mod aggregation_service;
pub mod breakdown_service;
pub mod fetch_service;
pub mod filter_service;
