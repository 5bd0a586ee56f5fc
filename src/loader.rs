//! # Data Loader
//!
//! Reads one [`KitchenData`] snapshot from a directory of CSV exports. Each table
//! lives in its own file; a missing file is an empty table and an unparsable row
//! is skipped, so a partly populated kitchen still costs what it can.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::Path;

use crate::kitchen_data::KitchenData;

pub const CATALOG_FILE: &str = "items.csv";
pub const INVENTORY_FILE: &str = "inventory.csv";
pub const SHOPPING_LIST_FILE: &str = "shopping_list.csv";
pub const RECIPES_FILE: &str = "recipes.csv";
pub const RECIPE_INGREDIENTS_FILE: &str = "recipe_ingredients.csv";
pub const PACKING_MATERIALS_FILE: &str = "recipe_packing_materials.csv";

/// Load every table found under `data_dir`
pub fn load_kitchen_data(data_dir: &Path) -> Result<KitchenData> {
    info!("Loading kitchen data from {}", data_dir.display());

    if !data_dir.is_dir() {
        warn!(
            "Data directory {} does not exist, using an empty snapshot",
            data_dir.display()
        );
        return Ok(KitchenData::default());
    }

    let data = KitchenData {
        catalog: load_table(&data_dir.join(CATALOG_FILE))?,
        inventory: load_table(&data_dir.join(INVENTORY_FILE))?,
        shopping_list: load_table(&data_dir.join(SHOPPING_LIST_FILE))?,
        recipes: load_table(&data_dir.join(RECIPES_FILE))?,
        recipe_ingredients: load_table(&data_dir.join(RECIPE_INGREDIENTS_FILE))?,
        packing_materials: load_table(&data_dir.join(PACKING_MATERIALS_FILE))?,
    };

    info!(
        "Loaded {} recipes, {} ingredient lines, {} inventory rows",
        data.recipes.len(),
        data.recipe_ingredients.len(),
        data.inventory.len()
    );
    Ok(data)
}

/// Deserialize every valid row of one CSV table
pub fn load_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        warn!("{} not found, treating table as empty", path.display());
        return Ok(Vec::new());
    }

    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let mut rows = Vec::new();
    for (index, row) in reader.deserialize::<T>().enumerate() {
        match row {
            Ok(row) => rows.push(row),
            // header is line 1
            Err(e) => warn!("Skipping {} line {}: {}", path.display(), index + 2, e),
        }
    }

    info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}
