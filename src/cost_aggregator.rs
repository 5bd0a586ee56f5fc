//! # Recipe Cost Aggregator
//!
//! Builds the full cost breakdown of a recipe:
//!
//! - ingredient cost: converted quantity times resolved unit price, summed over lines
//! - making cost: equal to the ingredient cost
//! - packaging: packing-material rows for the recipe, or a flat fallback
//! - electricity: mapped appliance power over cook time, or the basic charge
//! - gas: consumption over prep + cook (or cook only) time
//! - other charges: flat
//! - overhead: a percentage of the six components above
//!
//! A single unpriced ingredient aborts the whole recipe; partial totals are
//! never reported.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::costing_config::CostingConfig;
use crate::costing_errors::{CostingError, CostingResult};
use crate::kitchen_data::{KitchenData, Recipe, RecipeIngredient};
use crate::price_resolver::{PriceResolver, PriceSource, ResolvedPrice};
use crate::units::{convert_units, Unit};

/// Round a currency amount to paise
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Costed ingredient line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientCost {
    pub ingredient_name: String,
    pub quantity: f64,
    pub unit: String,
    /// Quantity expressed in the price's unit
    pub converted_quantity: f64,
    pub price_unit: String,
    pub unit_price: f64,
    pub cost: f64,
    pub source: PriceSource,
    pub price_capped: bool,
}

/// Named cost component, used for share reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostComponent {
    Ingredients,
    Making,
    Packaging,
    Electricity,
    Gas,
    OtherCharges,
    Overhead,
}

impl CostComponent {
    pub const ALL: [CostComponent; 7] = [
        CostComponent::Ingredients,
        CostComponent::Making,
        CostComponent::Packaging,
        CostComponent::Electricity,
        CostComponent::Gas,
        CostComponent::OtherCharges,
        CostComponent::Overhead,
    ];

    /// Localization key of the component label
    pub fn message_key(&self) -> &'static str {
        match self {
            CostComponent::Ingredients => "component-ingredients",
            CostComponent::Making => "component-making",
            CostComponent::Packaging => "component-packaging",
            CostComponent::Electricity => "component-electricity",
            CostComponent::Gas => "component-gas",
            CostComponent::OtherCharges => "component-other",
            CostComponent::Overhead => "component-overhead",
        }
    }
}

/// Full cost breakdown of one recipe
///
/// `total_cost` is always the sum of the seven components and `making_cost`
/// always equals `ingredient_cost`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub recipe_id: i64,
    pub recipe_name: String,
    pub ingredient_cost: f64,
    pub making_cost: f64,
    pub packaging_cost: f64,
    pub electricity_cost: f64,
    pub gas_cost: f64,
    pub other_charges: f64,
    pub overhead_cost: f64,
    pub total_cost: f64,
    pub overhead_rate: f64,
    /// Appliance charged for electricity, if the recipe is mapped to one
    pub appliance: Option<String>,
    pub lines: Vec<IngredientCost>,
}

impl CostBreakdown {
    /// Sum of every component except overhead
    pub fn subtotal(&self) -> f64 {
        self.ingredient_cost
            + self.making_cost
            + self.packaging_cost
            + self.electricity_cost
            + self.gas_cost
            + self.other_charges
    }

    pub fn component(&self, component: CostComponent) -> f64 {
        match component {
            CostComponent::Ingredients => self.ingredient_cost,
            CostComponent::Making => self.making_cost,
            CostComponent::Packaging => self.packaging_cost,
            CostComponent::Electricity => self.electricity_cost,
            CostComponent::Gas => self.gas_cost,
            CostComponent::OtherCharges => self.other_charges,
            CostComponent::Overhead => self.overhead_cost,
        }
    }

    /// Percentage of `total_cost` taken by each component
    pub fn component_shares(&self) -> Vec<(CostComponent, f64)> {
        CostComponent::ALL
            .iter()
            .map(|component| {
                let share = if self.total_cost > 0.0 {
                    self.component(*component) / self.total_cost * 100.0
                } else {
                    0.0
                };
                (*component, share)
            })
            .collect()
    }
}

/// Component amounts before making, overhead and total are derived
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseCosts {
    pub ingredient: f64,
    pub making: f64,
    pub packaging: f64,
    pub electricity: f64,
    pub gas: f64,
    pub other: f64,
}

impl BaseCosts {
    pub fn subtotal(&self) -> f64 {
        self.ingredient + self.making + self.packaging + self.electricity + self.gas + self.other
    }

    /// Add overhead and total, keeping the breakdown invariant
    pub fn into_breakdown(
        self,
        recipe: &Recipe,
        overhead_rate: f64,
        appliance: Option<String>,
        lines: Vec<IngredientCost>,
    ) -> CostBreakdown {
        let subtotal = self.subtotal();
        let overhead_cost = overhead_rate * subtotal;
        CostBreakdown {
            recipe_id: recipe.recipe_id,
            recipe_name: recipe.recipe_name.clone(),
            ingredient_cost: self.ingredient,
            making_cost: self.making,
            packaging_cost: self.packaging,
            electricity_cost: self.electricity,
            gas_cost: self.gas,
            other_charges: self.other,
            overhead_cost,
            total_cost: subtotal + overhead_cost,
            overhead_rate,
            appliance,
            lines,
        }
    }
}

/// Computes cost breakdowns over one data snapshot
pub struct CostAggregator<'a> {
    data: &'a KitchenData,
    config: &'a CostingConfig,
    resolver: PriceResolver<'a>,
}

impl<'a> CostAggregator<'a> {
    pub fn new(data: &'a KitchenData, config: &'a CostingConfig) -> Self {
        Self {
            data,
            config,
            resolver: PriceResolver::new(data, &config.policy),
        }
    }

    /// Cost a recipe, returning `None` when any ingredient price is unknown
    pub fn aggregate(&self, recipe_id: i64) -> Option<CostBreakdown> {
        match self.try_aggregate(recipe_id) {
            Ok(breakdown) => Some(breakdown),
            Err(e) => {
                warn!("Cost for recipe {} unavailable: {}", recipe_id, e);
                None
            }
        }
    }

    /// Cost a recipe, reporting why when it cannot be costed
    pub fn try_aggregate(&self, recipe_id: i64) -> CostingResult<CostBreakdown> {
        let recipe = self
            .data
            .recipe(recipe_id)
            .ok_or_else(|| CostingError::RecipeNotFound(recipe_id.to_string()))?;
        self.aggregate_recipe(recipe)
    }

    /// Cost an already looked-up recipe
    pub fn aggregate_recipe(&self, recipe: &Recipe) -> CostingResult<CostBreakdown> {
        let (base, appliance, lines) = self.base_costs(recipe)?;
        let breakdown = base.into_breakdown(
            recipe,
            self.config.policy.overhead_rate(),
            appliance,
            lines,
        );

        info!(
            "Costed '{}': ingredients {:.2}, total {:.2}",
            breakdown.recipe_name, breakdown.ingredient_cost, breakdown.total_cost
        );
        Ok(breakdown)
    }

    /// Single-unit component costs of a recipe
    pub fn base_costs(
        &self,
        recipe: &Recipe,
    ) -> CostingResult<(BaseCosts, Option<String>, Vec<IngredientCost>)> {
        let lines = self.ingredient_costs(recipe)?;
        let ingredient = lines.iter().map(|line| line.cost).sum::<f64>();
        let (electricity, appliance) = self.electricity_cost(recipe);

        let base = BaseCosts {
            ingredient,
            making: ingredient,
            packaging: self.packaging_cost(&recipe.recipe_name),
            electricity,
            gas: self.gas_cost(recipe),
            other: self.config.policy.other_charges,
        };
        Ok((base, appliance, lines))
    }

    /// Cost every ingredient line; fails listing every unpriced ingredient
    pub fn ingredient_costs(&self, recipe: &Recipe) -> CostingResult<Vec<IngredientCost>> {
        let mut lines = Vec::new();
        let mut unpriced = Vec::new();

        for line in self.data.ingredients_for(recipe.recipe_id) {
            match self.resolver.resolve(&line.item_name) {
                Some(price) => lines.push(cost_line(line, &price)),
                None => unpriced.push(line.item_name.clone()),
            }
        }

        if !unpriced.is_empty() {
            return Err(CostingError::MissingPrices {
                recipe: recipe.recipe_name.clone(),
                ingredients: unpriced,
            });
        }
        if lines.is_empty() {
            warn!("Recipe '{}' has no ingredient lines", recipe.recipe_name);
        }
        Ok(lines)
    }

    /// Packing-material cost, or the flat fallback when the recipe has no rows
    pub fn packaging_cost(&self, recipe_name: &str) -> f64 {
        let mut rows = self.data.packing_for(recipe_name).peekable();
        if rows.peek().is_none() {
            debug!(
                "No packing materials for '{}', using fallback {:.2}",
                recipe_name, self.config.policy.default_packaging_cost
            );
            return self.config.policy.default_packaging_cost;
        }
        rows.filter_map(|row| row.cost_per_recipe)
            .filter(|cost| *cost > 0.0)
            .sum()
    }

    /// Electricity charge and the appliance it was computed for
    ///
    /// Unmapped recipes pay only the basic charge.
    pub fn electricity_cost(&self, recipe: &Recipe) -> (f64, Option<String>) {
        let settings = &self.config.electricity;
        match settings.appliance_for(&recipe.recipe_name) {
            Some((name, appliance)) => {
                let hours = recipe.cook_minutes() / 60.0;
                let cost = appliance.power_consumption_kw
                    * hours
                    * settings.electricity_rate_per_kwh_inr;
                let cost = round_currency(cost.max(settings.minimum_cost_inr));
                debug!(
                    "Electricity for '{}' on {}: {:.2}",
                    recipe.recipe_name, name, cost
                );
                (cost, Some(name.to_string()))
            }
            None => (round_currency(settings.minimum_cost_inr), None),
        }
    }

    /// Gas charge over prep + cook time, or cook time only, floored at the minimum
    pub fn gas_cost(&self, recipe: &Recipe) -> f64 {
        let settings = &self.config.gas;
        let minutes = if settings.use_total_preparation_time {
            recipe.prep_minutes() + recipe.cook_minutes()
        } else {
            recipe.cook_minutes()
        };
        let cost =
            settings.gas_consumption_per_hour_kg * (minutes / 60.0) * settings.cost_per_kg_inr;
        round_currency(cost.max(settings.minimum_cost_inr))
    }
}

fn cost_line(line: &RecipeIngredient, price: &ResolvedPrice) -> IngredientCost {
    let quantity = match line.quantity {
        Some(quantity) => quantity,
        None => {
            warn!("Ingredient line '{}' has no quantity, costing it as 0", line.item_name);
            0.0
        }
    };

    let line_unit = Unit::parse(&line.unit);
    let unitless = line.unit.trim().is_empty() || price.unit == Unit::Other(String::new());
    let converted_quantity = if unitless {
        quantity
    } else {
        convert_units(quantity, &line_unit, &price.unit)
    };

    IngredientCost {
        ingredient_name: line.item_name.clone(),
        quantity,
        unit: line.unit.clone(),
        converted_quantity,
        price_unit: price.unit.to_string(),
        unit_price: price.unit_price,
        cost: converted_quantity * price.unit_price,
        source: price.source,
        price_capped: price.capped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kitchen_data::{InventoryEntry, PackingMaterial};

    fn approx(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }

    fn rice_data() -> KitchenData {
        let mut data = KitchenData::default();
        data.recipes.push(Recipe::new(1, "Plain Rice").with_times(0.0, 20.0));
        data.recipe_ingredients.push(RecipeIngredient::new(1, "Rice", 100.0, "g"));
        data.inventory
            .push(InventoryEntry::new("Rice", 5000.0, "g").with_avg_price(0.05));
        data
    }

    #[test]
    fn test_reference_breakdown() {
        let data = rice_data();
        let config = CostingConfig::default();
        let breakdown = CostAggregator::new(&data, &config).try_aggregate(1).unwrap();

        assert!(approx(breakdown.ingredient_cost, 5.0, 1e-9));
        assert_eq!(breakdown.making_cost, breakdown.ingredient_cost);
        assert_eq!(breakdown.packaging_cost, 5.0);
        assert_eq!(breakdown.electricity_cost, 0.5);
        assert!(approx(breakdown.gas_cost, 6.07, 1e-9));
        assert_eq!(breakdown.other_charges, 2.0);
        assert!(approx(breakdown.subtotal(), 23.57, 1e-9));
        assert!(approx(breakdown.overhead_cost, 3.54, 0.005));
        assert!(approx(breakdown.total_cost, 27.11, 0.005));
        assert!(breakdown.appliance.is_none());
    }

    #[test]
    fn test_unit_conversion_into_price_unit() {
        let mut data = rice_data();
        data.inventory[0] = InventoryEntry::new("Rice", 5.0, "kg").with_avg_price(50.0);
        let config = CostingConfig::default();
        let breakdown = CostAggregator::new(&data, &config).try_aggregate(1).unwrap();

        assert!(approx(breakdown.lines[0].converted_quantity, 0.1, 1e-12));
        assert!(approx(breakdown.ingredient_cost, 5.0, 1e-9));
    }

    #[test]
    fn test_missing_price_aborts_recipe() {
        let mut data = rice_data();
        data.recipe_ingredients.push(RecipeIngredient::new(1, "Saffron", 0.5, "g"));
        data.recipe_ingredients.push(RecipeIngredient::new(1, "Truffle Oil Extract", 5.0, "ml"));
        let config = CostingConfig::default();
        let aggregator = CostAggregator::new(&data, &config);

        assert!(aggregator.aggregate(1).is_none());
        match aggregator.try_aggregate(1) {
            Err(CostingError::MissingPrices { ingredients, .. }) => {
                assert_eq!(ingredients, vec!["Saffron".to_string()]);
            }
            other => panic!("expected missing prices, got {other:?}"),
        }
    }

    #[test]
    fn test_packaging_from_materials() {
        let mut data = rice_data();
        data.packing_materials.push(PackingMaterial::new("Plain Rice", "Container", 4.0));
        data.packing_materials.push(PackingMaterial::new("plain rice", "Lid", 1.5));
        let config = CostingConfig::default();

        let aggregator = CostAggregator::new(&data, &config);
        assert_eq!(aggregator.packaging_cost("Plain Rice"), 5.5);
        assert_eq!(aggregator.packaging_cost("Unmapped"), 5.0);
    }

    #[test]
    fn test_mapped_appliance_electricity() {
        let mut data = rice_data();
        data.recipes.push(Recipe::new(2, "Chocolate Cake").with_times(15.0, 45.0));
        let mut config = CostingConfig::default();
        config
            .electricity
            .recipe_appliance_mapping
            .insert("Chocolate Cake".to_string(), "oven".to_string());

        let aggregator = CostAggregator::new(&data, &config);
        let cake = data.recipe(2).unwrap();
        // 2.4 kW * 0.75 h * 8.0
        assert_eq!(aggregator.electricity_cost(cake), (14.4, Some("oven".to_string())));

        let quick = Recipe::new(3, "Chocolate Cake").with_times(0.0, 1.0);
        assert_eq!(aggregator.electricity_cost(&quick).0, 0.5);
    }

    #[test]
    fn test_gas_time_basis() {
        let data = KitchenData::default();
        let mut config = CostingConfig::default();
        let recipe = Recipe::new(1, "Dal").with_times(30.0, 30.0);

        assert_eq!(CostAggregator::new(&data, &config).gas_cost(&recipe), 18.2);
        config.gas.use_total_preparation_time = false;
        assert_eq!(CostAggregator::new(&data, &config).gas_cost(&recipe), 9.1);

        let instant = Recipe::new(2, "Salad");
        assert_eq!(CostAggregator::new(&data, &config).gas_cost(&instant), 0.5);
    }

    #[test]
    fn test_component_shares_sum_to_hundred() {
        let data = rice_data();
        let config = CostingConfig::default();
        let breakdown = CostAggregator::new(&data, &config).try_aggregate(1).unwrap();

        let total: f64 = breakdown.component_shares().iter().map(|(_, share)| share).sum();
        assert!(approx(total, 100.0, 1e-9));
    }
}
