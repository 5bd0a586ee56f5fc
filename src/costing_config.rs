//! # Costing Configuration Module
//!
//! This module defines the typed configuration for the cost calculators: gas and
//! electricity tariffs, tax rates, and the business policy parameters (overhead,
//! packaging fallback, markups, discount tiers, bulk multipliers, basic
//! ingredients).
//!
//! Every section has exactly one set of defaults, its `Default` impl. Each JSON
//! file is loaded independently; a missing, malformed or invalid file is replaced
//! by its defaults with a warning and never aborts a calculation.

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::costing_errors::{CostingError, CostingResult};
use crate::kitchen_data::normalize_name;

pub const GAS_SETTINGS_FILE: &str = "gas_settings.json";
pub const ELECTRICITY_SETTINGS_FILE: &str = "electricity_settings.json";
pub const TAX_SETTINGS_FILE: &str = "tax_settings.json";
pub const COSTING_POLICY_FILE: &str = "costing_policy.json";

/// Cooking gas consumption and tariff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasSettings {
    pub gas_consumption_per_hour_kg: f64,
    pub cost_per_kg_inr: f64,
    pub minimum_cost_inr: f64,
    /// Charge gas for prep + cook time instead of cook time only
    pub use_total_preparation_time: bool,
}

impl Default for GasSettings {
    fn default() -> Self {
        Self {
            gas_consumption_per_hour_kg: 0.3,
            cost_per_kg_inr: 60.67,
            minimum_cost_inr: 0.5,
            use_total_preparation_time: true,
        }
    }
}

/// A powered appliance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appliance {
    pub power_consumption_kw: f64,
}

/// Electricity tariff and the opt-in recipe to appliance mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectricitySettings {
    pub electricity_rate_per_kwh_inr: f64,
    /// Basic (lighting) charge, also the floor for mapped recipes
    pub minimum_cost_inr: f64,
    pub appliances: HashMap<String, Appliance>,
    /// Recipe name -> appliance name
    pub recipe_appliance_mapping: HashMap<String, String>,
}

impl Default for ElectricitySettings {
    fn default() -> Self {
        let appliances = [
            ("mixer", 0.5),
            ("induction", 2.0),
            ("oven", 2.4),
            ("microwave", 1.2),
            ("refrigerator", 0.15),
        ]
        .into_iter()
        .map(|(name, kw)| {
            (
                name.to_string(),
                Appliance {
                    power_consumption_kw: kw,
                },
            )
        })
        .collect();

        Self {
            electricity_rate_per_kwh_inr: 8.0,
            minimum_cost_inr: 0.5,
            appliances,
            recipe_appliance_mapping: HashMap::new(),
        }
    }
}

impl ElectricitySettings {
    /// Appliance mapped to a recipe, if any
    ///
    /// Recipe and appliance names are matched case-insensitively. A mapping that
    /// names an unknown appliance counts as unmapped.
    pub fn appliance_for(&self, recipe_name: &str) -> Option<(&str, &Appliance)> {
        let wanted = normalize_name(recipe_name);
        let appliance_name = self
            .recipe_appliance_mapping
            .iter()
            .find(|(recipe, _)| normalize_name(recipe) == wanted)
            .map(|(_, appliance)| normalize_name(appliance))?;

        let found = self
            .appliances
            .iter()
            .find(|(name, _)| normalize_name(name) == appliance_name)
            .map(|(name, appliance)| (name.as_str(), appliance));
        if found.is_none() {
            warn!(
                "Recipe '{}' is mapped to unknown appliance '{}'",
                recipe_name, appliance_name
            );
        }
        found
    }
}

/// Tax rates in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxSettings {
    pub gst_rate: f64,
    pub sgst_rate: f64,
}

impl Default for TaxSettings {
    fn default() -> Self {
        Self {
            gst_rate: 2.5,
            sgst_rate: 2.5,
        }
    }
}

/// How a selling price is suggested when none is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellingStrategy {
    /// `total_cost * (1 + margin%)`
    MarginAnchored,
    /// `others_pricing * competitor_markup`, margin-anchored without a competitor price
    CompetitorAnchored,
}

/// Flat economies-of-scale multipliers applied above a scale factor of 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkDiscounts {
    pub utilities: f64,
    pub packaging: f64,
    pub other_charges: f64,
}

impl Default for BulkDiscounts {
    fn default() -> Self {
        Self {
            utilities: 0.85,
            packaging: 0.75,
            other_charges: 0.9,
        }
    }
}

/// Lower bounds (exclusive) of the profit-percentage status buckets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusThresholds {
    pub excellent: f64,
    pub good: f64,
    pub average: f64,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            excellent: 100.0,
            good: 50.0,
            average: 0.0,
        }
    }
}

/// Business policy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostPolicy {
    pub overhead_rate_percent: f64,
    pub other_charges: f64,
    /// Packaging cost for recipes without packing-material rows
    pub default_packaging_cost: f64,
    /// Resolved unit prices are capped at this value
    pub max_unit_price: f64,
    pub target_margin_percent: f64,
    pub competitor_markup: f64,
    pub selling_strategy: SellingStrategy,
    /// Minimum profitable price is `total_cost * minimum_profit_factor`
    pub minimum_profit_factor: f64,
    pub discount_tiers_percent: Vec<f64>,
    pub status_thresholds: StatusThresholds,
    pub bulk_discounts: BulkDiscounts,
    /// Staples that must be physically in stock to count as available
    pub basic_ingredients: Vec<String>,
}

impl Default for CostPolicy {
    fn default() -> Self {
        Self {
            overhead_rate_percent: 15.0,
            other_charges: 2.0,
            default_packaging_cost: 5.0,
            max_unit_price: 1000.0,
            target_margin_percent: 30.0,
            competitor_markup: 1.8,
            selling_strategy: SellingStrategy::MarginAnchored,
            minimum_profit_factor: 1.05,
            discount_tiers_percent: vec![10.0, 15.0, 25.0, 30.0, 40.0],
            status_thresholds: StatusThresholds::default(),
            bulk_discounts: BulkDiscounts::default(),
            basic_ingredients: [
                "salt", "oil", "rice", "onion", "garlic", "ginger", "sugar", "water", "turmeric",
                "chilli powder", "tomato", "potato", "milk", "ghee", "atta", "maida",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl CostPolicy {
    pub fn overhead_rate(&self) -> f64 {
        self.overhead_rate_percent / 100.0
    }

    /// Whether an ingredient is a staple subject to the in-stock rule
    ///
    /// Matches whole words, so "Sunflower Oil" is basic but "Boiled Egg" is not.
    pub fn is_basic_ingredient(&self, name: &str) -> bool {
        let padded = format!(" {} ", normalize_name(name));
        self.basic_ingredients
            .iter()
            .map(|term| normalize_name(term))
            .filter(|term| !term.is_empty())
            .any(|term| padded.contains(&format!(" {term} ")))
    }
}

/// A configuration section backed by one JSON file
pub trait SettingsFile: DeserializeOwned + Default {
    const FILE_NAME: &'static str;

    /// Reject values no calculation can use
    fn validate(&self) -> Result<(), String>;
}

fn check_non_negative(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{field} must be a non-negative number, got {value}"))
    }
}

impl SettingsFile for GasSettings {
    const FILE_NAME: &'static str = GAS_SETTINGS_FILE;

    fn validate(&self) -> Result<(), String> {
        check_non_negative("gas_consumption_per_hour_kg", self.gas_consumption_per_hour_kg)?;
        check_non_negative("cost_per_kg_inr", self.cost_per_kg_inr)?;
        check_non_negative("minimum_cost_inr", self.minimum_cost_inr)
    }
}

impl SettingsFile for ElectricitySettings {
    const FILE_NAME: &'static str = ELECTRICITY_SETTINGS_FILE;

    fn validate(&self) -> Result<(), String> {
        check_non_negative("electricity_rate_per_kwh_inr", self.electricity_rate_per_kwh_inr)?;
        check_non_negative("minimum_cost_inr", self.minimum_cost_inr)?;
        for (name, appliance) in &self.appliances {
            check_non_negative(
                &format!("{name}.power_consumption_kw"),
                appliance.power_consumption_kw,
            )?;
        }
        Ok(())
    }
}

impl SettingsFile for TaxSettings {
    const FILE_NAME: &'static str = TAX_SETTINGS_FILE;

    fn validate(&self) -> Result<(), String> {
        for (field, rate) in [("gst_rate", self.gst_rate), ("sgst_rate", self.sgst_rate)] {
            check_non_negative(field, rate)?;
            if rate > 100.0 {
                return Err(format!("{field} is a percentage and must not exceed 100"));
            }
        }
        Ok(())
    }
}

impl SettingsFile for CostPolicy {
    const FILE_NAME: &'static str = COSTING_POLICY_FILE;

    fn validate(&self) -> Result<(), String> {
        check_non_negative("overhead_rate_percent", self.overhead_rate_percent)?;
        check_non_negative("other_charges", self.other_charges)?;
        check_non_negative("default_packaging_cost", self.default_packaging_cost)?;
        check_non_negative("target_margin_percent", self.target_margin_percent)?;
        check_non_negative("competitor_markup", self.competitor_markup)?;
        check_non_negative("minimum_profit_factor", self.minimum_profit_factor)?;
        if !(self.max_unit_price.is_finite() && self.max_unit_price > 0.0) {
            return Err("max_unit_price must be positive".to_string());
        }
        for tier in &self.discount_tiers_percent {
            if !(0.0..=100.0).contains(tier) {
                return Err(format!("discount tier {tier}% is outside 0..=100"));
            }
        }
        let bulk = &self.bulk_discounts;
        for (field, multiplier) in [
            ("bulk_discounts.utilities", bulk.utilities),
            ("bulk_discounts.packaging", bulk.packaging),
            ("bulk_discounts.other_charges", bulk.other_charges),
        ] {
            check_non_negative(field, multiplier)?;
        }
        Ok(())
    }
}

/// Read and validate one settings file
pub fn read_settings<T: SettingsFile>(config_dir: &Path) -> CostingResult<T> {
    let path = config_dir.join(T::FILE_NAME);
    let content = fs::read_to_string(&path)?;

    let settings: T = serde_json::from_str(&content).map_err(|e| CostingError::Config {
        file: T::FILE_NAME.to_string(),
        message: e.to_string(),
    })?;
    settings.validate().map_err(|message| CostingError::Config {
        file: T::FILE_NAME.to_string(),
        message,
    })?;

    debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Load one settings file, falling back to defaults on any problem
pub fn load_settings<T: SettingsFile>(config_dir: &Path) -> T {
    match read_settings(config_dir) {
        Ok(settings) => settings,
        Err(CostingError::Io(e)) => {
            warn!(
                "Could not read {} ({}), using default settings",
                config_dir.join(T::FILE_NAME).display(),
                e
            );
            T::default()
        }
        Err(e) => {
            warn!("{}, using default settings", e);
            T::default()
        }
    }
}

/// Complete configuration for the cost calculators
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostingConfig {
    pub gas: GasSettings,
    pub electricity: ElectricitySettings,
    pub tax: TaxSettings,
    pub policy: CostPolicy,
}

impl CostingConfig {
    /// Load every settings file from a directory; never fails
    pub fn load(config_dir: &Path) -> Self {
        info!("Loading costing configuration from {}", config_dir.display());
        Self {
            gas: load_settings(config_dir),
            electricity: load_settings(config_dir),
            tax: load_settings(config_dir),
            policy: load_settings(config_dir),
        }
    }
}
