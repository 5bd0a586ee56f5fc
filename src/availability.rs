//! # Ingredient Availability Module
//!
//! Checks whether a recipe's ingredients can be sourced. Each ingredient line
//! runs through three steps:
//!
//! 1. **Catalog membership**: exact, then partial match against the catalog.
//!    Failure makes the ingredient missing outright.
//! 2. **Categorization**: the catalog row has a non-blank category. Recorded
//!    for audit only.
//! 3. **Inventory presence**: exact, substring or reverse-substring match against
//!    inventory. Only row presence counts; quantity is ignored.
//!
//! An ingredient is available when it is in the catalog and either stocked or not
//! a basic ingredient. Staples must be physically in stock; specialty items only
//! need to be known, since they can be purchased on demand.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::costing_config::CostPolicy;
use crate::costing_errors::{CostingError, CostingResult};
use crate::kitchen_data::{normalize_name, CatalogItem, KitchenData};
use crate::persistence::write_json_atomic;

/// Default file name of the persisted scan
pub const MISSING_INGREDIENTS_FILE: &str = "missing_ingredients.json";

/// Names shorter than this never take part in substring matching
const MIN_PARTIAL_LEN: usize = 3;

/// Outcome code for one ingredient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityReason {
    NotInCatalog,
    BasicIngredientMissingFromInventory,
    InCatalogCanBePurchased,
    AvailableInInventory,
}

impl AvailabilityReason {
    pub fn code(&self) -> &'static str {
        match self {
            AvailabilityReason::NotInCatalog => "not_in_catalog",
            AvailabilityReason::BasicIngredientMissingFromInventory => {
                "basic_ingredient_missing_from_inventory"
            }
            AvailabilityReason::InCatalogCanBePurchased => "in_catalog_can_be_purchased",
            AvailabilityReason::AvailableInInventory => "available_in_inventory",
        }
    }

    pub fn message_key(&self) -> &'static str {
        match self {
            AvailabilityReason::NotInCatalog => "reason-not-in-catalog",
            AvailabilityReason::BasicIngredientMissingFromInventory => "reason-basic-missing",
            AvailabilityReason::InCatalogCanBePurchased => "reason-can-be-purchased",
            AvailabilityReason::AvailableInInventory => "reason-in-inventory",
        }
    }
}

/// Result of the three checks for one ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientCheck {
    pub ingredient_name: String,
    pub catalog_name: Option<String>,
    pub inventory_name: Option<String>,
    pub in_catalog: bool,
    pub categorized: bool,
    pub in_inventory: bool,
    pub is_basic: bool,
    pub available: bool,
    pub reason: AvailabilityReason,
}

/// Availability of every ingredient line of one recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeAvailability {
    pub recipe_id: i64,
    pub recipe_name: String,
    pub missing: Vec<IngredientCheck>,
    pub found: Vec<IngredientCheck>,
}

impl RecipeAvailability {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn missing_names(&self) -> Vec<String> {
        self.missing
            .iter()
            .map(|check| check.ingredient_name.clone())
            .collect()
    }
}

/// Persisted entry for a recipe with at least one missing ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingIngredientsRecord {
    pub recipe_id: i64,
    pub recipe_name: String,
    pub total_ingredients: usize,
    pub available_ingredients: usize,
    pub missing_ingredients: Vec<IngredientCheck>,
    pub last_checked: DateTime<Utc>,
}

/// Full scan result, replaced wholesale on every scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingIngredientsReport {
    pub generated_at: DateTime<Utc>,
    pub recipes_checked: usize,
    /// Keyed by `recipe_<id>`
    pub recipes: BTreeMap<String, MissingIngredientsRecord>,
}

impl MissingIngredientsReport {
    pub fn record_key(recipe_id: i64) -> String {
        format!("recipe_{recipe_id}")
    }

    pub fn get(&self, recipe_id: i64) -> Option<&MissingIngredientsRecord> {
        self.recipes.get(&Self::record_key(recipe_id))
    }

    /// Overwrite `path` with this report
    pub fn save(&self, path: &Path) -> CostingResult<()> {
        write_json_atomic(path, self)?;
        info!(
            "Saved missing-ingredients report for {} recipes to {}",
            self.recipes.len(),
            path.display()
        );
        Ok(())
    }
}

/// Three-step availability checker over one data snapshot
pub struct AvailabilityValidator<'a> {
    data: &'a KitchenData,
    policy: &'a CostPolicy,
}

impl<'a> AvailabilityValidator<'a> {
    pub fn new(data: &'a KitchenData, policy: &'a CostPolicy) -> Self {
        Self { data, policy }
    }

    /// Run the three checks for one ingredient name
    pub fn check_ingredient(&self, ingredient_name: &str) -> IngredientCheck {
        let is_basic = self.policy.is_basic_ingredient(ingredient_name);

        let Some(catalog_item) = self.find_in_catalog(ingredient_name) else {
            debug!("'{}' not found in catalog", ingredient_name);
            return IngredientCheck {
                ingredient_name: ingredient_name.to_string(),
                catalog_name: None,
                inventory_name: None,
                in_catalog: false,
                categorized: false,
                in_inventory: false,
                is_basic,
                available: false,
                reason: AvailabilityReason::NotInCatalog,
            };
        };

        let categorized = catalog_item.is_categorized();
        if !categorized {
            debug!("Catalog item '{}' has no category", catalog_item.name);
        }

        let inventory_name = self.find_in_inventory(&catalog_item.name);
        let in_inventory = inventory_name.is_some();

        let (available, reason) = if in_inventory {
            (true, AvailabilityReason::AvailableInInventory)
        } else if is_basic {
            (false, AvailabilityReason::BasicIngredientMissingFromInventory)
        } else {
            (true, AvailabilityReason::InCatalogCanBePurchased)
        };

        IngredientCheck {
            ingredient_name: ingredient_name.to_string(),
            catalog_name: Some(catalog_item.name.clone()),
            inventory_name,
            in_catalog: true,
            categorized,
            in_inventory,
            is_basic,
            available,
            reason,
        }
    }

    /// Check every ingredient line of a recipe
    pub fn validate_recipe(&self, recipe_id: i64) -> CostingResult<RecipeAvailability> {
        let recipe = self
            .data
            .recipe(recipe_id)
            .ok_or_else(|| CostingError::RecipeNotFound(recipe_id.to_string()))?;

        let (found, missing): (Vec<_>, Vec<_>) = self
            .data
            .ingredients_for(recipe_id)
            .map(|line| self.check_ingredient(&line.item_name))
            .partition(|check| check.available);

        if !missing.is_empty() {
            warn!(
                "Recipe '{}' has {} missing ingredient(s)",
                recipe.recipe_name,
                missing.len()
            );
        }

        Ok(RecipeAvailability {
            recipe_id,
            recipe_name: recipe.recipe_name.clone(),
            missing,
            found,
        })
    }

    /// Validate every recipe and collect those with missing ingredients
    pub fn scan_all(&self) -> MissingIngredientsReport {
        let now = Utc::now();
        let mut recipes = BTreeMap::new();

        for recipe in &self.data.recipes {
            let availability = match self.validate_recipe(recipe.recipe_id) {
                Ok(availability) => availability,
                Err(e) => {
                    warn!("Skipping recipe {}: {}", recipe.recipe_id, e);
                    continue;
                }
            };
            if availability.is_complete() {
                continue;
            }
            recipes.insert(
                MissingIngredientsReport::record_key(recipe.recipe_id),
                MissingIngredientsRecord {
                    recipe_id: recipe.recipe_id,
                    recipe_name: availability.recipe_name,
                    total_ingredients: availability.found.len() + availability.missing.len(),
                    available_ingredients: availability.found.len(),
                    missing_ingredients: availability.missing,
                    last_checked: now,
                },
            );
        }

        info!(
            "Scanned {} recipes, {} with missing ingredients",
            self.data.recipes.len(),
            recipes.len()
        );

        MissingIngredientsReport {
            generated_at: now,
            recipes_checked: self.data.recipes.len(),
            recipes,
        }
    }

    fn find_in_catalog(&self, ingredient_name: &str) -> Option<&'a CatalogItem> {
        let wanted = normalize_name(ingredient_name);
        if wanted.is_empty() {
            return None;
        }

        self.data
            .catalog
            .iter()
            .find(|item| normalize_name(&item.name) == wanted)
            .or_else(|| {
                if wanted.len() < MIN_PARTIAL_LEN {
                    return None;
                }
                self.data.catalog.iter().find(|item| {
                    let name = normalize_name(&item.name);
                    name.len() >= MIN_PARTIAL_LEN
                        && (name.contains(&wanted) || wanted.contains(&name))
                })
            })
    }

    /// Exact, then substring, then reverse-substring match; quantity is ignored
    fn find_in_inventory(&self, catalog_name: &str) -> Option<String> {
        let wanted = normalize_name(catalog_name);
        let inventory = &self.data.inventory;

        if let Some(entry) = inventory
            .iter()
            .find(|entry| normalize_name(&entry.item_name) == wanted)
        {
            return Some(entry.item_name.clone());
        }

        if wanted.len() < MIN_PARTIAL_LEN {
            return None;
        }
        let long_enough = |name: &String| name.len() >= MIN_PARTIAL_LEN;

        inventory
            .iter()
            .find(|entry| {
                let name = normalize_name(&entry.item_name);
                long_enough(&name) && name.contains(&wanted)
            })
            .or_else(|| {
                inventory.iter().find(|entry| {
                    let name = normalize_name(&entry.item_name);
                    long_enough(&name) && wanted.contains(&name)
                })
            })
            .map(|entry| entry.item_name.clone())
    }
}
