//! # Ingredient Price Resolver
//!
//! Looks up a price per unit for a named ingredient. Sources are searched in
//! priority order and the first positive price wins:
//!
//! 1. exact name match in inventory
//! 2. partial (substring) match in inventory
//! 3. exact name match in the shopping list
//! 4. partial match in the shopping list
//! 5. the built-in default price table
//!
//! No hit is a first-class outcome (`None`), never a silent zero. Resolved prices
//! are capped at [`CostPolicy::max_unit_price`](crate::costing_config::CostPolicy)
//! to keep unit mix-ups from producing absurd totals.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::costing_config::CostPolicy;
use crate::kitchen_data::{normalize_name, InventoryEntry, KitchenData, ShoppingListEntry};
use crate::units::Unit;

/// Inventory `price_per_unit` above this, with quantity > 1, is read as a lot total
const LOT_PRICE_THRESHOLD: f64 = 100.0;

/// Names shorter than this never take part in substring matching
const MIN_PARTIAL_LEN: usize = 3;

/// Fallback prices in INR for common ingredients: (name, price, unit)
const DEFAULT_PRICES: &[(&str, f64, &str)] = &[
    ("rice", 0.06, "g"),
    ("basmati rice", 0.12, "g"),
    ("wheat flour", 0.045, "g"),
    ("atta", 0.045, "g"),
    ("maida", 0.05, "g"),
    ("besan", 0.09, "g"),
    ("sugar", 0.045, "g"),
    ("salt", 0.02, "g"),
    ("oil", 0.15, "ml"),
    ("ghee", 0.6, "g"),
    ("butter", 0.55, "g"),
    ("milk", 0.06, "ml"),
    ("curd", 0.07, "g"),
    ("paneer", 0.4, "g"),
    ("onion", 0.04, "g"),
    ("tomato", 0.04, "g"),
    ("potato", 0.03, "g"),
    ("garlic", 0.15, "g"),
    ("ginger", 0.12, "g"),
    ("green chilli", 0.08, "g"),
    ("turmeric", 0.3, "g"),
    ("chilli powder", 0.35, "g"),
    ("coriander powder", 0.25, "g"),
    ("coriander leaves", 0.1, "g"),
    ("cumin", 0.5, "g"),
    ("garam masala", 0.8, "g"),
    ("mustard seeds", 0.2, "g"),
    ("curry leaves", 0.3, "g"),
    ("cardamom", 3.0, "g"),
    ("cloves", 1.2, "g"),
    ("cinnamon", 0.8, "g"),
    ("bay leaf", 0.5, "g"),
    ("egg", 6.0, "pcs"),
    ("chicken", 0.25, "g"),
    ("mutton", 0.75, "g"),
    ("fish", 0.4, "g"),
    ("toor dal", 0.13, "g"),
    ("moong dal", 0.12, "g"),
    ("urad dal", 0.13, "g"),
    ("chana dal", 0.09, "g"),
    ("coconut", 35.0, "pcs"),
    ("cashew", 1.0, "g"),
    ("tea", 0.5, "g"),
    ("coffee", 1.0, "g"),
    ("lemon", 5.0, "pcs"),
    ("water", 0.001, "ml"),
];

/// Where a resolved price came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    InventoryExact,
    InventoryPartial,
    ShoppingListExact,
    ShoppingListPartial,
    DefaultTable,
}

/// A unit price together with the unit it is quoted in
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPrice {
    pub unit_price: f64,
    /// Unit of the source row; recipe quantities are converted into it
    pub unit: Unit,
    pub source: PriceSource,
    /// Name of the row that supplied the price
    pub matched_name: String,
    /// Whether the price hit the cap
    pub capped: bool,
}

/// Resolves unit prices against one snapshot of inventory and shopping data
pub struct PriceResolver<'a> {
    data: &'a KitchenData,
    max_unit_price: f64,
}

impl<'a> PriceResolver<'a> {
    pub fn new(data: &'a KitchenData, policy: &CostPolicy) -> Self {
        Self {
            data,
            max_unit_price: policy.max_unit_price,
        }
    }

    /// Resolve the unit price of an ingredient, or `None` when no source has one
    pub fn resolve(&self, item_name: &str) -> Option<ResolvedPrice> {
        let query = normalize_name(item_name);
        if query.is_empty() {
            return None;
        }

        let hit = self
            .from_inventory(&query, true)
            .or_else(|| self.from_inventory(&query, false))
            .or_else(|| self.from_shopping_list(&query, true))
            .or_else(|| self.from_shopping_list(&query, false))
            .or_else(|| from_default_table(&query));

        match hit {
            Some(price) => {
                debug!(
                    "Resolved '{}' -> {:.4}/{} via {:?} ('{}')",
                    item_name, price.unit_price, price.unit, price.source, price.matched_name
                );
                Some(self.apply_cap(item_name, price))
            }
            None => {
                warn!("No price found for ingredient '{}'", item_name);
                None
            }
        }
    }

    /// Convenience wrapper returning only the numeric unit price
    pub fn resolve_unit_price(&self, item_name: &str) -> Option<f64> {
        self.resolve(item_name).map(|price| price.unit_price)
    }

    fn apply_cap(&self, item_name: &str, mut price: ResolvedPrice) -> ResolvedPrice {
        if price.unit_price > self.max_unit_price {
            warn!(
                "Unit price {:.2} for '{}' capped at {:.2}",
                price.unit_price, item_name, self.max_unit_price
            );
            price.unit_price = self.max_unit_price;
            price.capped = true;
        }
        price
    }

    fn from_inventory(&self, query: &str, exact: bool) -> Option<ResolvedPrice> {
        let source = if exact {
            PriceSource::InventoryExact
        } else {
            PriceSource::InventoryPartial
        };
        self.data
            .inventory
            .iter()
            .filter(|entry| names_match(query, &entry.item_name, exact))
            .find_map(|entry| {
                trace!("Inventory candidate '{}' for '{}'", entry.item_name, query);
                inventory_unit_price(entry)
                    .map(|price| resolved(price, &entry.unit, source, &entry.item_name))
            })
    }

    fn from_shopping_list(&self, query: &str, exact: bool) -> Option<ResolvedPrice> {
        let source = if exact {
            PriceSource::ShoppingListExact
        } else {
            PriceSource::ShoppingListPartial
        };
        self.data
            .shopping_list
            .iter()
            .filter(|entry| names_match(query, &entry.item_name, exact))
            .find_map(|entry| {
                trace!("Shopping-list candidate '{}' for '{}'", entry.item_name, query);
                shopping_unit_price(entry)
                    .map(|price| resolved(price, &entry.unit, source, &entry.item_name))
            })
    }
}

fn resolved(unit_price: f64, unit: &str, source: PriceSource, matched_name: &str) -> ResolvedPrice {
    ResolvedPrice {
        unit_price,
        unit: Unit::parse(unit),
        source,
        matched_name: matched_name.to_string(),
        capped: false,
    }
}

/// Exact or substring (either direction) match on normalised names
fn names_match(query: &str, candidate: &str, exact: bool) -> bool {
    let candidate = normalize_name(candidate);
    if exact {
        return candidate == query;
    }
    if candidate.len() < MIN_PARTIAL_LEN || query.len() < MIN_PARTIAL_LEN {
        return false;
    }
    candidate.contains(query) || query.contains(&candidate)
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Unit price of an inventory row: `avg_price`, else `price_per_unit`
///
/// A `price_per_unit` above the lot threshold on a row holding more than one
/// unit is read as the price of the whole lot and divided by the quantity.
pub fn inventory_unit_price(entry: &InventoryEntry) -> Option<f64> {
    if let Some(avg) = positive(entry.avg_price) {
        return Some(avg);
    }
    let price = positive(entry.price_per_unit)?;
    match entry.quantity {
        Some(quantity) if price > LOT_PRICE_THRESHOLD && quantity > 1.0 => Some(price / quantity),
        _ => Some(price),
    }
}

/// Unit price of a shopping-list row: `avg_price`, `current_price`, then `last_price / quantity`
pub fn shopping_unit_price(entry: &ShoppingListEntry) -> Option<f64> {
    if let Some(avg) = positive(entry.avg_price) {
        return Some(avg);
    }
    if let Some(current) = positive(entry.current_price) {
        return Some(current);
    }
    let last = positive(entry.last_price)?;
    match positive(entry.quantity) {
        Some(quantity) => positive(Some(last / quantity)),
        None => Some(last),
    }
}

/// Whether `key` appears in `query` as whole words; a trailing plural "s" or "es" is allowed
fn contains_words(query: &str, key: &str) -> bool {
    let words: Vec<&str> = query.split(' ').collect();
    let key_words: Vec<&str> = key.split(' ').collect();
    words.windows(key_words.len()).any(|window| {
        window.iter().zip(&key_words).all(|(word, key_word)| {
            word.strip_prefix(key_word)
                .is_some_and(|rest| matches!(rest, "" | "s" | "es"))
        })
    })
}

/// Longest default-table key found as whole words in the query
fn from_default_table(query: &str) -> Option<ResolvedPrice> {
    DEFAULT_PRICES
        .iter()
        .filter(|(name, _, _)| contains_words(query, name))
        .max_by_key(|(name, _, _)| name.len())
        .map(|(name, price, unit)| resolved(*price, unit, PriceSource::DefaultTable, name))
}
