//! # Kitchen Costing
//!
//! Recipe costing for a small food business: unit conversion, ingredient price
//! resolution, cost breakdowns with utilities and overhead, pricing and profit
//! analysis, bulk scaling and ingredient availability checks.
//!
//! Calculators borrow a [`kitchen_data::KitchenData`] snapshot and a
//! [`costing_config::CostingConfig`]; [`costing_service::CostingService`] wraps
//! them for callers that only want results or display sentinels.

pub mod availability;
pub mod cost_aggregator;
pub mod costing_config;
pub mod costing_errors;
pub mod costing_service;
pub mod kitchen_data;
pub mod loader;
pub mod localization;
pub mod persistence;
pub mod price_resolver;
pub mod pricing;
pub mod report;
pub mod scaling;
pub mod units;
