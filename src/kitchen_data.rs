//! # Kitchen Data Model
//!
//! Typed rows for the tables the host application supplies: the ingredient
//! catalog, inventory, shopping-list history, recipes, recipe ingredient lines
//! and packing-material mappings. [`KitchenData`] bundles one consistent
//! snapshot of all of them; calculators only ever borrow it.
//!
//! ## Usage
//!
//! ```rust
//! use kitchen_costing::kitchen_data::{InventoryEntry, KitchenData, Recipe, RecipeIngredient};
//!
//! let mut data = KitchenData::default();
//! data.recipes.push(Recipe::new(1, "Plain Rice").with_times(5.0, 20.0));
//! data.recipe_ingredients.push(RecipeIngredient::new(1, "Rice", 100.0, "g"));
//! data.inventory.push(InventoryEntry::new("Rice", 10_000.0, "g").with_avg_price(0.05));
//!
//! assert_eq!(data.ingredients_for(1).count(), 1);
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("Whitespace pattern should be valid");
}

/// Normalise an item name for case-insensitive comparison
///
/// Lowercases, trims and collapses internal whitespace, so "  Basmati   RICE "
/// and "basmati rice" compare equal.
pub fn normalize_name(name: &str) -> String {
    WHITESPACE.replace_all(name.trim(), " ").to_lowercase()
}

/// Row of the ingredient catalog ("items" table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(alias = "item_name")]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Row of the inventory (stock) table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryEntry {
    #[serde(alias = "name")]
    pub item_name: String,
    /// May be zero or negative; only the row's presence matters for availability
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_per_unit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_price: Option<f64>,
}

/// Row of the shopping-list purchase history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListEntry {
    #[serde(alias = "name")]
    pub item_name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub last_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_price: Option<f64>,
}

/// Row of the recipes table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub recipe_id: i64,
    pub recipe_name: String,
    /// Minutes
    #[serde(default, deserialize_with = "lenient_f64")]
    pub prep_time: Option<f64>,
    /// Minutes
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cook_time: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub servings: Option<f64>,
}

/// One ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub recipe_id: i64,
    #[serde(alias = "ingredient_name")]
    pub item_name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: String,
}

/// Pre-computed packing material cost for one recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingMaterial {
    pub recipe_name: String,
    #[serde(default)]
    pub material_name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost_per_recipe: Option<f64>,
}

/// One consistent snapshot of every input table
#[derive(Debug, Clone, Default)]
pub struct KitchenData {
    pub catalog: Vec<CatalogItem>,
    pub inventory: Vec<InventoryEntry>,
    pub shopping_list: Vec<ShoppingListEntry>,
    pub recipes: Vec<Recipe>,
    pub recipe_ingredients: Vec<RecipeIngredient>,
    pub packing_materials: Vec<PackingMaterial>,
}

impl CatalogItem {
    pub fn new(name: &str, category: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            category: category.map(str::to_string),
        }
    }

    /// A catalog row counts as categorized when its category is non-blank
    pub fn is_categorized(&self) -> bool {
        self.category
            .as_deref()
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false)
    }
}

impl InventoryEntry {
    pub fn new(item_name: &str, quantity: f64, unit: &str) -> Self {
        Self {
            item_name: item_name.to_string(),
            quantity: Some(quantity),
            unit: unit.to_string(),
            price_per_unit: None,
            avg_price: None,
        }
    }

    pub fn with_avg_price(mut self, price: f64) -> Self {
        self.avg_price = Some(price);
        self
    }

    pub fn with_price_per_unit(mut self, price: f64) -> Self {
        self.price_per_unit = Some(price);
        self
    }
}

impl ShoppingListEntry {
    pub fn new(item_name: &str, quantity: f64, unit: &str) -> Self {
        Self {
            item_name: item_name.to_string(),
            unit: unit.to_string(),
            quantity: Some(quantity),
            last_price: None,
            current_price: None,
            avg_price: None,
        }
    }

    pub fn with_last_price(mut self, price: f64) -> Self {
        self.last_price = Some(price);
        self
    }

    pub fn with_current_price(mut self, price: f64) -> Self {
        self.current_price = Some(price);
        self
    }

    pub fn with_avg_price(mut self, price: f64) -> Self {
        self.avg_price = Some(price);
        self
    }
}

impl Recipe {
    pub fn new(recipe_id: i64, recipe_name: &str) -> Self {
        Self {
            recipe_id,
            recipe_name: recipe_name.to_string(),
            prep_time: None,
            cook_time: None,
            category: None,
            servings: None,
        }
    }

    /// Set preparation and cooking time in minutes
    pub fn with_times(mut self, prep_minutes: f64, cook_minutes: f64) -> Self {
        self.prep_time = Some(prep_minutes);
        self.cook_time = Some(cook_minutes);
        self
    }

    pub fn prep_minutes(&self) -> f64 {
        self.prep_time.unwrap_or(0.0).max(0.0)
    }

    pub fn cook_minutes(&self) -> f64 {
        self.cook_time.unwrap_or(0.0).max(0.0)
    }
}

impl RecipeIngredient {
    pub fn new(recipe_id: i64, item_name: &str, quantity: f64, unit: &str) -> Self {
        Self {
            recipe_id,
            item_name: item_name.to_string(),
            quantity: Some(quantity),
            unit: unit.to_string(),
        }
    }
}

impl PackingMaterial {
    pub fn new(recipe_name: &str, material_name: &str, cost_per_recipe: f64) -> Self {
        Self {
            recipe_name: recipe_name.to_string(),
            material_name: material_name.to_string(),
            cost_per_recipe: Some(cost_per_recipe),
        }
    }
}

impl KitchenData {
    /// Find a recipe by id
    pub fn recipe(&self, recipe_id: i64) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.recipe_id == recipe_id)
    }

    /// Find a recipe by name, ignoring case and extra whitespace
    pub fn recipe_by_name(&self, recipe_name: &str) -> Option<&Recipe> {
        let wanted = normalize_name(recipe_name);
        self.recipes
            .iter()
            .find(|r| normalize_name(&r.recipe_name) == wanted)
    }

    /// All ingredient lines of one recipe, in table order
    pub fn ingredients_for(&self, recipe_id: i64) -> impl Iterator<Item = &RecipeIngredient> {
        self.recipe_ingredients
            .iter()
            .filter(move |line| line.recipe_id == recipe_id)
    }

    /// All packing-material rows mapped to a recipe name
    pub fn packing_for<'a>(
        &'a self,
        recipe_name: &str,
    ) -> impl Iterator<Item = &'a PackingMaterial> {
        let wanted = normalize_name(recipe_name);
        self.packing_materials
            .iter()
            .filter(move |row| normalize_name(&row.recipe_name) == wanted)
    }
}

/// Parse a numeric cell, treating blanks, currency signs and garbage leniently
pub(crate) fn parse_lenient_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('₹')
        .trim_start_matches("Rs.")
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Cell>::deserialize(deserializer)? {
        Some(Cell::Number(value)) if value.is_finite() => Some(value),
        Some(Cell::Number(_)) => None,
        Some(Cell::Text(text)) => parse_lenient_number(&text),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Basmati   RICE "), "basmati rice");
        assert_eq!(normalize_name("Salt"), "salt");
    }

    #[test]
    fn test_parse_lenient_number() {
        assert_eq!(parse_lenient_number("12.5"), Some(12.5));
        assert_eq!(parse_lenient_number("₹1,250"), Some(1250.0));
        assert_eq!(parse_lenient_number(""), None);
        assert_eq!(parse_lenient_number("NaN"), None);
        assert_eq!(parse_lenient_number("abc"), None);
    }

    #[test]
    fn test_catalog_categorization() {
        assert!(CatalogItem::new("Rice", Some("Grains")).is_categorized());
        assert!(!CatalogItem::new("Saffron", Some("  ")).is_categorized());
        assert!(!CatalogItem::new("Saffron", None).is_categorized());
    }

    #[test]
    fn test_snapshot_lookups() {
        let mut data = KitchenData::default();
        data.recipes.push(Recipe::new(7, "Masala Dosa"));
        data.recipe_ingredients.push(RecipeIngredient::new(7, "Rice", 200.0, "g"));
        data.recipe_ingredients.push(RecipeIngredient::new(8, "Milk", 1.0, "l"));
        data.packing_materials.push(PackingMaterial::new("masala dosa", "Box", 3.0));

        assert!(data.recipe(7).is_some());
        assert!(data.recipe_by_name("MASALA  dosa").is_some());
        assert_eq!(data.ingredients_for(7).count(), 1);
        assert_eq!(data.packing_for("Masala Dosa").count(), 1);
    }

    #[test]
    fn test_recipe_minutes_default_to_zero() {
        let recipe = Recipe::new(1, "Tea");
        assert_eq!(recipe.prep_minutes(), 0.0);
        assert_eq!(recipe.cook_minutes(), 0.0);
    }
}
