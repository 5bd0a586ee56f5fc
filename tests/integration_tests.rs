//! # Integration Tests
//!
//! End-to-end tests that load a small kitchen from CSV files on disk and run
//! every calculator through the costing service.

use kitchen_costing::availability::{AvailabilityReason, MISSING_INGREDIENTS_FILE};
use kitchen_costing::costing_config::{CostingConfig, ELECTRICITY_SETTINGS_FILE};
use kitchen_costing::costing_service::{CostingService, Outcome};
use kitchen_costing::kitchen_data::{InventoryEntry, KitchenData};
use kitchen_costing::loader::{
    load_kitchen_data, CATALOG_FILE, INVENTORY_FILE, RECIPES_FILE, RECIPE_INGREDIENTS_FILE,
};
use kitchen_costing::pricing::{PricingBook, ProfitStatus, PRICING_FILE};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_kitchen(dir: &Path) {
    fs::write(
        dir.join(RECIPES_FILE),
        "recipe_id,recipe_name,prep_time,cook_time\n\
         1,Plain Rice,0,20\n\
         2,Salted Rice,0,20\n\
         3,Saffron Rice,0,20\n",
    )
    .unwrap();
    fs::write(
        dir.join(RECIPE_INGREDIENTS_FILE),
        "recipe_id,item_name,quantity,unit\n\
         1,Rice,100,g\n\
         2,Rice,100,g\n\
         2,Salt,5,g\n\
         3,Rice,100,g\n\
         3,Saffron,0.2,g\n",
    )
    .unwrap();
    fs::write(
        dir.join(INVENTORY_FILE),
        "item_name,quantity,unit,price_per_unit,avg_price\nRice,5000,g,,0.05\n",
    )
    .unwrap();
    fs::write(
        dir.join(CATALOG_FILE),
        "name,category\nRice,Grains\nSalt,Spices\nSaffron,\n",
    )
    .unwrap();
}

fn load_kitchen() -> (TempDir, KitchenData) {
    let dir = TempDir::new().unwrap();
    write_kitchen(dir.path());
    let data = load_kitchen_data(dir.path()).unwrap();
    (dir, data)
}

#[test]
fn test_reference_recipe_from_csv() {
    let (_dir, data) = load_kitchen();
    let config = CostingConfig::default();
    let service = CostingService::new(&data, &config);

    let breakdown = service.cost(1).ready().expect("Plain Rice should be costed");
    assert!((breakdown.ingredient_cost - 5.0).abs() < 1e-9);
    assert_eq!(breakdown.making_cost, breakdown.ingredient_cost);
    assert_eq!(breakdown.packaging_cost, 5.0);
    assert_eq!(breakdown.electricity_cost, 0.5);
    assert!((breakdown.gas_cost - 6.07).abs() < 1e-9);
    assert_eq!(breakdown.other_charges, 2.0);
    assert!((breakdown.total_cost - 27.11).abs() < 0.005);
    assert!((breakdown.total_cost - (breakdown.subtotal() + breakdown.overhead_cost)).abs() < 1e-9);
}

#[test]
fn test_unpriced_ingredient_blocks_cost_until_priced() {
    let (_dir, mut data) = load_kitchen();
    let config = CostingConfig::default();

    {
        let service = CostingService::new(&data, &config);
        match service.cost(3) {
            Outcome::MissingIngredients { ingredients, .. } => {
                assert_eq!(ingredients, vec!["Saffron".to_string()]);
            }
            other => panic!("expected missing ingredients, got {other:?}"),
        }
    }

    data.inventory
        .push(InventoryEntry::new("Saffron", 10.0, "g").with_avg_price(250.0));
    let service = CostingService::new(&data, &config);
    let breakdown = service.cost(3).ready().expect("Saffron Rice should now be costed");
    assert!((breakdown.ingredient_cost - 55.0).abs() < 1e-9);
}

#[test]
fn test_appliance_mapping_from_config_dir() {
    let (_dir, data) = load_kitchen();
    let config_dir = TempDir::new().unwrap();
    fs::write(
        config_dir.path().join(ELECTRICITY_SETTINGS_FILE),
        r#"{"recipe_appliance_mapping": {"Plain Rice": "induction"}}"#,
    )
    .unwrap();
    let config = CostingConfig::load(config_dir.path());
    let service = CostingService::new(&data, &config);

    let breakdown = service.cost(1).ready().unwrap();
    assert_eq!(breakdown.appliance.as_deref(), Some("induction"));
    assert!((breakdown.electricity_cost - 5.33).abs() < 1e-9);

    let unmapped = service.cost(2).ready().unwrap();
    assert_eq!(unmapped.electricity_cost, 0.5);
}

#[test]
fn test_validator_asymmetric_policy() {
    let (_dir, data) = load_kitchen();
    let config = CostingConfig::default();
    let service = CostingService::new(&data, &config);

    let salted = service.validate(2).ready().unwrap();
    assert_eq!(salted.missing_names(), vec!["Salt".to_string()]);
    assert_eq!(
        salted.missing[0].reason,
        AvailabilityReason::BasicIngredientMissingFromInventory
    );

    let saffron = service.validate(3).ready().unwrap();
    assert!(saffron.is_complete());
    let check = saffron
        .found
        .iter()
        .find(|check| check.ingredient_name == "Saffron")
        .unwrap();
    assert_eq!(check.reason, AvailabilityReason::InCatalogCanBePurchased);
}

#[test]
fn test_scan_writes_report_keyed_by_recipe() {
    let (dir, data) = load_kitchen();
    let config = CostingConfig::default();
    let service = CostingService::new(&data, &config);

    let scan = service.scan_missing_ingredients();
    assert_eq!(scan.recipes_checked, 3);
    assert_eq!(scan.recipes.len(), 1);

    let path = dir.path().join(MISSING_INGREDIENTS_FILE);
    scan.save(&path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let record = &json["recipes"]["recipe_2"];
    assert_eq!(record["recipe_name"], "Salted Rice");
    assert_eq!(record["total_ingredients"], 2);
    assert_eq!(record["available_ingredients"], 1);
    assert_eq!(
        record["missing_ingredients"][0]["reason"],
        "basic_ingredient_missing_from_inventory"
    );
}

#[test]
fn test_pricing_book_round_trip_and_profit() {
    let (dir, data) = load_kitchen();
    let config = CostingConfig::default();
    let path = dir.path().join(PRICING_FILE);

    let mut book = PricingBook::load(&path).unwrap();
    assert!(book.records().is_empty());
    book.upsert("Plain Rice", Some(45.0), Some(40.0));
    book.save(&path).unwrap();

    let book = PricingBook::load(&path).unwrap();
    let service = CostingService::new(&data, &config);
    let priced = service.price(1, &book).ready().unwrap();

    assert_eq!(priced.pricing.our_pricing, Some(45.0));
    assert_eq!(priced.pricing.others_pricing, Some(40.0));
    let profit = priced.pricing.profit.unwrap();
    assert!((profit - (45.0 - priced.breakdown.total_cost)).abs() < 1e-9);
    assert_eq!(priced.pricing.status, Some(ProfitStatus::Good));
    assert!(priced.pricing.suggested_price.is_none());

    let unpriced = service.price(2, &book).ready().unwrap();
    assert!(unpriced.pricing.profit.is_none());
    assert!(unpriced.pricing.suggested_price.is_some());
}

#[test]
fn test_scale_factor_one_matches_cost() {
    let (_dir, data) = load_kitchen();
    let config = CostingConfig::default();
    let service = CostingService::new(&data, &config);

    let single = service.cost(1).ready().unwrap();
    let scaled = service.scale(1, 1.0).ready().unwrap();
    assert_eq!(scaled.cost_per_unit, single.total_cost);

    let batch = service.scale(1, 12.0).ready().unwrap();
    assert!(batch.cost_per_unit < single.total_cost);
}

#[test]
fn test_summary_over_loaded_kitchen() {
    let (_dir, data) = load_kitchen();
    let config = CostingConfig::default();
    let service = CostingService::new(&data, &config);
    let mut book = PricingBook::default();
    book.upsert("Plain Rice", Some(60.0), None);
    book.upsert("Salted Rice", Some(30.0), None);

    let summary = service.summarize(&book);
    assert_eq!(summary.rows.len(), 3);
    assert_eq!(summary.recipes_costed, 2);
    assert_eq!(summary.recipes_missing_ingredients, 1);
    assert_eq!(summary.most_profitable.as_deref(), Some("Plain Rice"));
    assert_eq!(summary.least_profitable.as_deref(), Some("Salted Rice"));
}
