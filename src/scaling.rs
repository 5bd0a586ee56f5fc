//! # Bulk Scaling Module
//!
//! Re-costs a recipe for a batch of N units. Ingredient and making costs scale
//! linearly; utilities, packaging and other charges also get a flat bulk
//! multiplier once the batch is larger than one unit.

use log::info;
use serde::{Deserialize, Serialize};

use crate::cost_aggregator::{BaseCosts, CostAggregator, CostBreakdown, IngredientCost};
use crate::costing_config::BulkDiscounts;
use crate::costing_errors::{CostingError, CostingResult};
use crate::kitchen_data::KitchenData;

/// Cost of a recipe at a scale factor, compared with a single unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledCostBreakdown {
    pub factor: f64,
    pub bulk_discount_applied: bool,
    pub single_unit: CostBreakdown,
    /// Whole-batch costs
    pub scaled: CostBreakdown,
    pub cost_per_unit: f64,
    pub savings_per_unit: f64,
    pub savings_percentage: f64,
}

/// Scale single-unit costs by `factor`, applying bulk multipliers above one unit
pub fn scale_base_costs(base: &BaseCosts, factor: f64, bulk: &BulkDiscounts) -> BaseCosts {
    let (utilities, packaging, other) = if factor > 1.0 {
        (bulk.utilities, bulk.packaging, bulk.other_charges)
    } else {
        (1.0, 1.0, 1.0)
    };

    BaseCosts {
        ingredient: base.ingredient * factor,
        making: base.making * factor,
        packaging: base.packaging * factor * packaging,
        electricity: base.electricity * factor * utilities,
        gas: base.gas * factor * utilities,
        other: base.other * factor * other,
    }
}

/// Ingredient lines for a batch; bulk multipliers never touch ingredients
pub fn scale_lines(lines: &[IngredientCost], factor: f64) -> Vec<IngredientCost> {
    lines
        .iter()
        .map(|line| IngredientCost {
            quantity: line.quantity * factor,
            converted_quantity: line.converted_quantity * factor,
            cost: line.cost * factor,
            ..line.clone()
        })
        .collect()
}

/// Bulk cost calculator
pub struct ScalingCalculator<'a> {
    data: &'a KitchenData,
    aggregator: &'a CostAggregator<'a>,
    bulk: &'a BulkDiscounts,
    overhead_rate: f64,
}

impl<'a> ScalingCalculator<'a> {
    pub fn new(
        data: &'a KitchenData,
        aggregator: &'a CostAggregator<'a>,
        bulk: &'a BulkDiscounts,
        overhead_rate: f64,
    ) -> Self {
        Self {
            data,
            aggregator,
            bulk,
            overhead_rate,
        }
    }

    pub fn scale(&self, recipe_id: i64, factor: f64) -> CostingResult<ScaledCostBreakdown> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(CostingError::InvalidScaleFactor(factor));
        }

        let recipe = self
            .data
            .recipe(recipe_id)
            .ok_or_else(|| CostingError::RecipeNotFound(recipe_id.to_string()))?;
        let (base, appliance, lines) = self.aggregator.base_costs(recipe)?;

        let batch_lines = scale_lines(&lines, factor);
        let single_unit =
            base.into_breakdown(recipe, self.overhead_rate, appliance.clone(), lines);
        let scaled = scale_base_costs(&base, factor, self.bulk).into_breakdown(
            recipe,
            self.overhead_rate,
            appliance,
            batch_lines,
        );

        let cost_per_unit = scaled.total_cost / factor;
        let savings_per_unit = single_unit.total_cost - cost_per_unit;
        let savings_percentage = if single_unit.total_cost > 0.0 {
            savings_per_unit / single_unit.total_cost * 100.0
        } else {
            0.0
        };

        info!(
            "Scaled '{}' x{}: {:.2} per unit ({:.1}% saved)",
            recipe.recipe_name, factor, cost_per_unit, savings_percentage
        );

        Ok(ScaledCostBreakdown {
            factor,
            bulk_discount_applied: factor > 1.0,
            single_unit,
            scaled,
            cost_per_unit,
            savings_per_unit,
            savings_percentage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing_config::CostingConfig;
    use crate::kitchen_data::{InventoryEntry, Recipe, RecipeIngredient};

    fn rice_data() -> KitchenData {
        let mut data = KitchenData::default();
        data.recipes.push(Recipe::new(1, "Plain Rice").with_times(0.0, 20.0));
        data.recipe_ingredients.push(RecipeIngredient::new(1, "Rice", 100.0, "g"));
        data.inventory
            .push(InventoryEntry::new("Rice", 5000.0, "g").with_avg_price(0.05));
        data
    }

    #[test]
    fn test_factor_one_matches_single_unit_exactly() {
        let data = rice_data();
        let config = CostingConfig::default();
        let aggregator = CostAggregator::new(&data, &config);
        let calculator = ScalingCalculator::new(
            &data,
            &aggregator,
            &config.policy.bulk_discounts,
            config.policy.overhead_rate(),
        );

        let scaled = calculator.scale(1, 1.0).unwrap();
        let single = aggregator.aggregate(1).unwrap();
        assert_eq!(scaled.cost_per_unit, single.total_cost);
        assert!(!scaled.bulk_discount_applied);
        assert_eq!(scaled.savings_per_unit, 0.0);
    }

    #[test]
    fn test_bulk_multipliers() {
        let base = BaseCosts {
            ingredient: 10.0,
            making: 10.0,
            packaging: 4.0,
            electricity: 2.0,
            gas: 6.0,
            other: 2.0,
        };
        let scaled = scale_base_costs(&base, 10.0, &BulkDiscounts::default());

        assert_eq!(scaled.ingredient, 100.0);
        assert_eq!(scaled.making, 100.0);
        assert!((scaled.packaging - 30.0).abs() < 1e-9);
        assert!((scaled.electricity - 17.0).abs() < 1e-9);
        assert!((scaled.gas - 51.0).abs() < 1e-9);
        assert!((scaled.other - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_bulk_batch_saves_per_unit() {
        let data = rice_data();
        let config = CostingConfig::default();
        let aggregator = CostAggregator::new(&data, &config);
        let calculator = ScalingCalculator::new(
            &data,
            &aggregator,
            &config.policy.bulk_discounts,
            config.policy.overhead_rate(),
        );

        let scaled = calculator.scale(1, 10.0).unwrap();
        assert!(scaled.bulk_discount_applied);
        assert!(scaled.cost_per_unit < scaled.single_unit.total_cost);
        assert!(scaled.savings_percentage > 0.0);
        assert_eq!(scaled.scaled.making_cost, scaled.scaled.ingredient_cost);
    }

    #[test]
    fn test_batch_lines_add_up_to_ingredient_cost() {
        let data = rice_data();
        let config = CostingConfig::default();
        let aggregator = CostAggregator::new(&data, &config);
        let calculator = ScalingCalculator::new(
            &data,
            &aggregator,
            &config.policy.bulk_discounts,
            config.policy.overhead_rate(),
        );

        let scaled = calculator.scale(1, 10.0).unwrap();
        let line_total: f64 = scaled.scaled.lines.iter().map(|line| line.cost).sum();
        assert!((scaled.scaled.ingredient_cost - 50.0).abs() < 1e-9);
        assert!((line_total - scaled.scaled.ingredient_cost).abs() < 1e-9);
        assert_eq!(scaled.scaled.lines[0].quantity, 1000.0);

        let single_total: f64 = scaled.single_unit.lines.iter().map(|line| line.cost).sum();
        assert!((single_total - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_factor() {
        let data = rice_data();
        let config = CostingConfig::default();
        let aggregator = CostAggregator::new(&data, &config);
        let calculator = ScalingCalculator::new(
            &data,
            &aggregator,
            &config.policy.bulk_discounts,
            config.policy.overhead_rate(),
        );

        for factor in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                calculator.scale(1, factor),
                Err(CostingError::InvalidScaleFactor(_))
            ));
        }
    }
}
