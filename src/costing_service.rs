//! # Costing Service
//!
//! Entry points the host application calls per recipe. The service is built
//! explicitly from a data snapshot and a configuration; there is no process-wide
//! state. Every entry point returns an [`Outcome`]: calculation errors are logged
//! and turned into "missing ingredients" or "unavailable" sentinels instead of
//! escaping to the caller.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::availability::{AvailabilityValidator, MissingIngredientsReport, RecipeAvailability};
use crate::cost_aggregator::{CostAggregator, CostBreakdown};
use crate::costing_config::CostingConfig;
use crate::costing_errors::{CostingError, CostingResult};
use crate::kitchen_data::KitchenData;
use crate::pricing::{PricingBook, PricingCalculator, PricingResult, ProfitStatus};
use crate::scaling::{ScaledCostBreakdown, ScalingCalculator};

/// Result of a calculation entry point as the UI should render it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome<T> {
    Ready(T),
    /// Cost unknown because these ingredients have no price
    MissingIngredients {
        recipe: String,
        ingredients: Vec<String>,
    },
    /// Any other failure, already logged
    Unavailable { reason: String },
}

impl<T> Outcome<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Outcome::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }
}

impl<T> From<CostingResult<T>> for Outcome<T> {
    fn from(result: CostingResult<T>) -> Self {
        match result {
            Ok(value) => Outcome::Ready(value),
            Err(CostingError::MissingPrices {
                recipe,
                ingredients,
            }) => Outcome::MissingIngredients {
                recipe,
                ingredients,
            },
            Err(e) => {
                warn!("Calculation unavailable: {}", e);
                Outcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Cost breakdown together with its pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedRecipe {
    pub breakdown: CostBreakdown,
    pub pricing: PricingResult,
}

/// One row of the portfolio summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub recipe_id: i64,
    pub recipe_name: String,
    pub total_cost: Option<f64>,
    pub selling_price: Option<f64>,
    pub price_configured: bool,
    pub profit_percentage: Option<f64>,
    pub status: Option<ProfitStatus>,
    pub missing_ingredients: Vec<String>,
}

/// Costs and margins across every recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub rows: Vec<SummaryRow>,
    pub recipes_costed: usize,
    pub recipes_missing_ingredients: usize,
    /// Mean over recipes with a configured selling price
    pub average_profit_percentage: Option<f64>,
    pub most_profitable: Option<String>,
    pub least_profitable: Option<String>,
}

/// Calculator facade over one snapshot and configuration
pub struct CostingService<'a> {
    data: &'a KitchenData,
    config: &'a CostingConfig,
    aggregator: CostAggregator<'a>,
}

impl<'a> CostingService<'a> {
    pub fn new(data: &'a KitchenData, config: &'a CostingConfig) -> Self {
        Self {
            data,
            config,
            aggregator: CostAggregator::new(data, config),
        }
    }

    pub fn data(&self) -> &KitchenData {
        self.data
    }

    pub fn config(&self) -> &CostingConfig {
        self.config
    }

    /// Cost breakdown of one recipe
    pub fn cost(&self, recipe_id: i64) -> Outcome<CostBreakdown> {
        self.aggregator.try_aggregate(recipe_id).into()
    }

    /// Cost breakdown plus pricing of one recipe
    pub fn price(&self, recipe_id: i64, book: &PricingBook) -> Outcome<PricedRecipe> {
        self.aggregator
            .try_aggregate(recipe_id)
            .map(|breakdown| {
                let pricing = PricingCalculator::new(self.config, book)
                    .price(&breakdown.recipe_name, breakdown.total_cost);
                PricedRecipe { breakdown, pricing }
            })
            .into()
    }

    /// Batch cost at a scale factor
    pub fn scale(&self, recipe_id: i64, factor: f64) -> Outcome<ScaledCostBreakdown> {
        let policy = &self.config.policy;
        ScalingCalculator::new(
            self.data,
            &self.aggregator,
            &policy.bulk_discounts,
            policy.overhead_rate(),
        )
        .scale(recipe_id, factor)
        .into()
    }

    /// Ingredient availability of one recipe
    pub fn validate(&self, recipe_id: i64) -> Outcome<RecipeAvailability> {
        self.validator().validate_recipe(recipe_id).into()
    }

    /// Availability scan over every recipe
    pub fn scan_missing_ingredients(&self) -> MissingIngredientsReport {
        self.validator().scan_all()
    }

    /// Cost and price every recipe
    pub fn summarize(&self, book: &PricingBook) -> PortfolioSummary {
        let rows: Vec<SummaryRow> = self
            .data
            .recipes
            .iter()
            .map(|recipe| match self.price(recipe.recipe_id, book) {
                Outcome::Ready(priced) => SummaryRow {
                    recipe_id: recipe.recipe_id,
                    recipe_name: recipe.recipe_name.clone(),
                    total_cost: Some(priced.breakdown.total_cost),
                    selling_price: Some(priced.pricing.selling_price),
                    price_configured: priced.pricing.our_pricing.is_some(),
                    profit_percentage: priced.pricing.profit_percentage,
                    status: priced.pricing.status,
                    missing_ingredients: Vec::new(),
                },
                Outcome::MissingIngredients { ingredients, .. } => SummaryRow {
                    missing_ingredients: ingredients,
                    ..empty_row(recipe.recipe_id, &recipe.recipe_name)
                },
                Outcome::Unavailable { .. } => empty_row(recipe.recipe_id, &recipe.recipe_name),
            })
            .collect();

        let recipes_costed = rows.iter().filter(|row| row.total_cost.is_some()).count();
        let recipes_missing_ingredients = rows
            .iter()
            .filter(|row| !row.missing_ingredients.is_empty())
            .count();

        let priced: Vec<(&str, f64)> = rows
            .iter()
            .filter_map(|row| row.profit_percentage.map(|pct| (row.recipe_name.as_str(), pct)))
            .collect();
        let average_profit_percentage = (!priced.is_empty())
            .then(|| priced.iter().map(|(_, pct)| pct).sum::<f64>() / priced.len() as f64);
        let most_profitable = priced
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(name, _)| name.to_string());
        let least_profitable = priced
            .iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(name, _)| name.to_string());

        info!(
            "Summary: {} of {} recipes costed, {} missing ingredients",
            recipes_costed,
            rows.len(),
            recipes_missing_ingredients
        );

        PortfolioSummary {
            rows,
            recipes_costed,
            recipes_missing_ingredients,
            average_profit_percentage,
            most_profitable,
            least_profitable,
        }
    }

    fn validator(&self) -> AvailabilityValidator<'_> {
        AvailabilityValidator::new(self.data, &self.config.policy)
    }
}

fn empty_row(recipe_id: i64, recipe_name: &str) -> SummaryRow {
    SummaryRow {
        recipe_id,
        recipe_name: recipe_name.to_string(),
        total_cost: None,
        selling_price: None,
        price_configured: false,
        profit_percentage: None,
        status: None,
        missing_ingredients: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kitchen_data::{InventoryEntry, Recipe, RecipeIngredient};

    fn data() -> KitchenData {
        let mut data = KitchenData::default();
        data.recipes.push(Recipe::new(1, "Plain Rice").with_times(0.0, 20.0));
        data.recipes.push(Recipe::new(2, "Saffron Milk").with_times(5.0, 10.0));
        data.recipe_ingredients.push(RecipeIngredient::new(1, "Rice", 100.0, "g"));
        data.recipe_ingredients.push(RecipeIngredient::new(2, "Milk", 200.0, "ml"));
        data.recipe_ingredients.push(RecipeIngredient::new(2, "Saffron", 0.2, "g"));
        data.inventory
            .push(InventoryEntry::new("Rice", 5000.0, "g").with_avg_price(0.05));
        data
    }

    #[test]
    fn test_outcomes() {
        let data = data();
        let config = CostingConfig::default();
        let service = CostingService::new(&data, &config);

        assert!(service.cost(1).is_ready());
        assert_eq!(
            service.cost(2),
            Outcome::MissingIngredients {
                recipe: "Saffron Milk".to_string(),
                ingredients: vec!["Saffron".to_string()],
            }
        );
        assert!(matches!(service.cost(42), Outcome::Unavailable { .. }));
        assert!(matches!(service.scale(1, -1.0), Outcome::Unavailable { .. }));
    }

    #[test]
    fn test_summary() {
        let data = data();
        let config = CostingConfig::default();
        let service = CostingService::new(&data, &config);
        let mut book = PricingBook::default();
        book.upsert("Plain Rice", Some(40.0), None);

        let summary = service.summarize(&book);
        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.recipes_costed, 1);
        assert_eq!(summary.recipes_missing_ingredients, 1);
        assert_eq!(summary.most_profitable.as_deref(), Some("Plain Rice"));
        assert!(summary.average_profit_percentage.unwrap() > 0.0);
        assert!(summary.rows[1].profit_percentage.is_none());
    }
}
