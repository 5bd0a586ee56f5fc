//! Plain-text rendering of calculation results for the terminal

use crate::availability::{IngredientCheck, MissingIngredientsReport, RecipeAvailability};
use crate::cost_aggregator::{CostBreakdown, CostComponent};
use crate::costing_service::{Outcome, PortfolioSummary, PricedRecipe};
use crate::localization::LocalizationManager;
use crate::pricing::{PriceBasis, PricingResult};
use crate::scaling::ScaledCostBreakdown;

/// Format a currency amount
pub fn format_amount(amount: f64) -> String {
    format!("₹{:.2}", amount)
}

/// Format an optional amount, showing "N/A" when absent
pub fn format_optional_amount(amount: Option<f64>, l10n: &LocalizationManager) -> String {
    match amount {
        Some(amount) => format_amount(amount),
        None => l10n.get_message("not-available", None),
    }
}

fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Render an outcome, or the sentinel text when it is not ready
pub fn format_outcome<T>(
    outcome: &Outcome<T>,
    recipe_label: &str,
    l10n: &LocalizationManager,
    render: impl Fn(&T, &LocalizationManager) -> String,
) -> String {
    match outcome {
        Outcome::Ready(value) => render(value, l10n),
        Outcome::MissingIngredients {
            recipe,
            ingredients,
        } => format!(
            "{}\n{}\n",
            l10n.get_message("missing-ingredients", None),
            l10n.get_message_with_args(
                "missing-ingredients-list",
                &[("recipe", recipe), ("ingredients", &ingredients.join(", "))],
            )
        ),
        Outcome::Unavailable { reason } => format!(
            "{}\n{}\n",
            l10n.get_message("not-available", None),
            l10n.get_message_with_args(
                "recipe-unavailable",
                &[("recipe", recipe_label), ("reason", reason)],
            )
        ),
    }
}

fn component_label(
    component: CostComponent,
    overhead_rate: f64,
    l10n: &LocalizationManager,
) -> String {
    match component {
        CostComponent::Overhead => l10n.get_message_with_args(
            component.message_key(),
            &[("rate", &format!("{:.0}", overhead_rate * 100.0))],
        ),
        _ => l10n.get_message(component.message_key(), None),
    }
}

/// Render a cost breakdown with component shares and ingredient lines
pub fn format_breakdown(breakdown: &CostBreakdown, l10n: &LocalizationManager) -> String {
    let mut result = String::new();
    result.push_str(&l10n.get_message_with_args(
        "breakdown-title",
        &[("recipe", &breakdown.recipe_name)],
    ));
    result.push('\n');

    for (component, share) in breakdown.component_shares() {
        result.push_str(&format!(
            "  {:<24} {:>12}  ({} {})\n",
            component_label(component, breakdown.overhead_rate, l10n),
            format_amount(breakdown.component(component)),
            format_percent(share),
            l10n.get_message("breakdown-share", None),
        ));
    }
    result.push_str(&format!(
        "  {:<24} {:>12}\n",
        l10n.get_message("breakdown-total", None),
        format_amount(breakdown.total_cost)
    ));

    if let Some(appliance) = &breakdown.appliance {
        result.push_str(&format!(
            "  {}\n",
            l10n.get_message_with_args("breakdown-appliance", &[("appliance", appliance)])
        ));
    }

    if !breakdown.lines.is_empty() {
        result.push_str(&format!("\n{}\n", l10n.get_message("breakdown-lines", None)));
        for line in &breakdown.lines {
            let mut text = l10n.get_message_with_args(
                "breakdown-line",
                &[
                    ("ingredient", &line.ingredient_name),
                    ("quantity", &format!("{}", line.quantity)),
                    ("unit", &line.unit),
                    ("price", &format!("{:.4}", line.unit_price)),
                    ("price_unit", &line.price_unit),
                    ("cost", &format_amount(line.cost)),
                ],
            );
            if line.price_capped {
                text.push(' ');
                text.push_str(&l10n.get_message("breakdown-capped", None));
            }
            result.push_str(&format!("  - {}\n", text));
        }
    }

    result
}

fn basis_label(basis: PriceBasis, l10n: &LocalizationManager) -> String {
    let key = match basis {
        PriceBasis::Configured => "pricing-basis-configured",
        PriceBasis::CompetitorAnchored => "pricing-basis-competitor",
        PriceBasis::MarginAnchored => "pricing-basis-margin",
    };
    l10n.get_message(key, None)
}

/// Render pricing; profit rows show "N/A" when no selling price is configured
pub fn format_pricing(pricing: &PricingResult, l10n: &LocalizationManager) -> String {
    let na = l10n.get_message("not-available", None);
    let row = |key: &str, value: String| {
        format!("  {:<26} {}\n", l10n.get_message(key, None), value)
    };

    let mut result = String::new();
    result.push_str(&l10n.get_message_with_args(
        "pricing-title",
        &[("recipe", &pricing.recipe_name)],
    ));
    result.push('\n');
    result.push_str(&row("breakdown-total", format_amount(pricing.total_cost)));
    result.push_str(&row("pricing-our", format_optional_amount(pricing.our_pricing, l10n)));
    result.push_str(&row(
        "pricing-others",
        format_optional_amount(pricing.others_pricing, l10n),
    ));
    result.push_str(&row(
        "pricing-selling",
        format!(
            "{} ({})",
            format_amount(pricing.selling_price),
            basis_label(pricing.price_basis, l10n)
        ),
    ));
    if let Some(suggested) = pricing.suggested_price {
        result.push_str(&row("pricing-suggested", format_amount(suggested)));
    }
    result.push_str(&row("pricing-profit", format_optional_amount(pricing.profit, l10n)));
    result.push_str(&row(
        "pricing-profit-percentage",
        pricing
            .profit_percentage
            .map(format_percent)
            .unwrap_or_else(|| na.clone()),
    ));
    result.push_str(&row(
        "pricing-status",
        pricing
            .status
            .map(|status| l10n.get_message(status.message_key(), None))
            .unwrap_or_else(|| na.clone()),
    ));
    result.push_str(&row(
        "pricing-minimum",
        format_amount(pricing.minimum_profitable_price),
    ));

    let tax_label = l10n.get_message_with_args(
        "pricing-tax",
        &[
            ("gst", &format_amount(pricing.tax.gst_amount)),
            ("sgst", &format_amount(pricing.tax.sgst_amount)),
        ],
    );
    result.push_str(&format!(
        "  {:<26} {}\n",
        tax_label,
        format_amount(pricing.tax.price_with_tax)
    ));

    if !pricing.discount_tiers.is_empty() {
        result.push_str(&format!("\n{}\n", l10n.get_message("pricing-discounts", None)));
        for tier in &pricing.discount_tiers {
            let mut text = l10n.get_message_with_args(
                "pricing-discount-tier",
                &[
                    ("discount", &format!("{:.0}", tier.discount_percent)),
                    ("price", &format_amount(tier.price)),
                    ("profit", &format_amount(tier.profit)),
                ],
            );
            if !tier.profitable {
                text.push_str(&format!(" [{}]", l10n.get_message("pricing-unprofitable", None)));
            }
            result.push_str(&format!("  - {}\n", text));
        }
    }

    result
}

/// Render a breakdown followed by its pricing
pub fn format_priced_recipe(priced: &PricedRecipe, l10n: &LocalizationManager) -> String {
    format!(
        "{}\n{}",
        format_breakdown(&priced.breakdown, l10n),
        format_pricing(&priced.pricing, l10n)
    )
}

/// Render a batch cost next to the single-unit cost
pub fn format_scaled(scaled: &ScaledCostBreakdown, l10n: &LocalizationManager) -> String {
    let row = |key: &str, value: String| {
        format!("  {:<24} {}\n", l10n.get_message(key, None), value)
    };

    let mut result = l10n.get_message_with_args(
        "scale-title",
        &[
            ("factor", &format!("{}", scaled.factor)),
            ("recipe", &scaled.scaled.recipe_name),
        ],
    );
    result.push('\n');
    for component in CostComponent::ALL {
        result.push_str(&format!(
            "  {:<24} {:>12}\n",
            component_label(component, scaled.scaled.overhead_rate, l10n),
            format_amount(scaled.scaled.component(component)),
        ));
    }
    result.push_str(&row("scale-batch-total", format_amount(scaled.scaled.total_cost)));
    result.push_str(&row("scale-single", format_amount(scaled.single_unit.total_cost)));
    result.push_str(&row("scale-per-unit", format_amount(scaled.cost_per_unit)));
    result.push_str(&row(
        "scale-savings",
        format!(
            "{} ({})",
            format_amount(scaled.savings_per_unit),
            format_percent(scaled.savings_percentage)
        ),
    ));
    if scaled.bulk_discount_applied {
        result.push_str(&format!("  {}\n", l10n.get_message("scale-bulk-applied", None)));
    }
    result
}

fn format_check(check: &IngredientCheck, l10n: &LocalizationManager) -> String {
    format!(
        "  - {} ({})\n",
        check.ingredient_name,
        l10n.get_message(check.reason.message_key(), None)
    )
}

/// Render the availability of one recipe
pub fn format_availability(
    availability: &RecipeAvailability,
    l10n: &LocalizationManager,
) -> String {
    let mut result = l10n.get_message_with_args(
        "validate-title",
        &[("recipe", &availability.recipe_name)],
    );
    result.push('\n');

    if availability.is_complete() {
        result.push_str(&format!("  {}\n", l10n.get_message("validate-complete", None)));
    } else {
        result.push_str(&format!("{}:\n", l10n.get_message("validate-missing", None)));
        for check in &availability.missing {
            result.push_str(&format_check(check, l10n));
        }
    }

    if !availability.found.is_empty() {
        result.push_str(&format!("{}:\n", l10n.get_message("validate-found", None)));
        for check in &availability.found {
            result.push_str(&format_check(check, l10n));
        }
    }
    result
}

/// Render a full availability scan
pub fn format_scan(report: &MissingIngredientsReport, l10n: &LocalizationManager) -> String {
    let mut result = l10n.get_message_with_args(
        "scan-summary",
        &[
            ("checked", &report.recipes_checked.to_string()),
            ("incomplete", &report.recipes.len().to_string()),
        ],
    );
    result.push('\n');

    for record in report.recipes.values() {
        let names: Vec<&str> = record
            .missing_ingredients
            .iter()
            .map(|check| check.ingredient_name.as_str())
            .collect();
        result.push_str(&format!(
            "  - {} ({}/{}): {}\n",
            record.recipe_name,
            record.available_ingredients,
            record.total_ingredients,
            names.join(", ")
        ));
    }
    result
}

/// Render the portfolio summary table
pub fn format_summary(summary: &PortfolioSummary, l10n: &LocalizationManager) -> String {
    let na = l10n.get_message("not-available", None);
    let missing = l10n.get_message("missing-ingredients", None);

    let mut result = l10n.get_message("summary-title", None);
    result.push('\n');

    for row in &summary.rows {
        let cost = match row.total_cost {
            Some(cost) => format_amount(cost),
            None if !row.missing_ingredients.is_empty() => missing.clone(),
            None => na.clone(),
        };
        let margin = row
            .profit_percentage
            .map(format_percent)
            .unwrap_or_else(|| na.clone());
        let status = row
            .status
            .map(|status| l10n.get_message(status.message_key(), None))
            .unwrap_or_else(|| na.clone());
        result.push_str(&format!(
            "  {:<28} {:>20} {:>12} {:>10} {}\n",
            row.recipe_name,
            cost,
            format_optional_amount(row.selling_price, l10n),
            margin,
            status
        ));
    }

    result.push('\n');
    result.push_str(&l10n.get_message_with_args(
        "summary-costed",
        &[
            ("count", &summary.recipes_costed.to_string()),
            ("total", &summary.rows.len().to_string()),
        ],
    ));
    result.push('\n');
    result.push_str(&l10n.get_message_with_args(
        "summary-missing",
        &[("count", &summary.recipes_missing_ingredients.to_string())],
    ));
    result.push('\n');
    result.push_str(&format!(
        "{}: {}\n",
        l10n.get_message("summary-average", None),
        summary
            .average_profit_percentage
            .map(format_percent)
            .unwrap_or_else(|| na.clone())
    ));
    result.push_str(&format!(
        "{}: {}\n",
        l10n.get_message("summary-most", None),
        summary.most_profitable.as_deref().unwrap_or(&na)
    ));
    result.push_str(&format!(
        "{}: {}\n",
        l10n.get_message("summary-least", None),
        summary.least_profitable.as_deref().unwrap_or(&na)
    ));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing_config::CostingConfig;
    use crate::pricing::{PricingBook, PricingCalculator};

    fn l10n() -> LocalizationManager {
        LocalizationManager::new().unwrap()
    }

    #[test]
    fn test_missing_ingredients_sentinel() {
        let outcome: Outcome<CostBreakdown> = Outcome::MissingIngredients {
            recipe: "Saffron Milk".to_string(),
            ingredients: vec!["Saffron".to_string()],
        };
        let text = format_outcome(&outcome, "Saffron Milk", &l10n(), format_breakdown);
        assert!(text.starts_with("Missing Ingredients"));
        assert!(text.contains("Saffron"));
    }

    #[test]
    fn test_unavailable_sentinel() {
        let outcome: Outcome<CostBreakdown> = Outcome::Unavailable {
            reason: "Recipe not found: 9".to_string(),
        };
        let text = format_outcome(&outcome, "9", &l10n(), format_breakdown);
        assert!(text.starts_with("N/A"));
    }

    #[test]
    fn test_pricing_shows_selling_price_and_basis() {
        let config = CostingConfig::default();
        let mut book = PricingBook::default();
        book.upsert("Masala Dosa", Some(80.0), None);
        let calculator = PricingCalculator::new(&config, &book);

        let text = format_pricing(&calculator.price("Masala Dosa", 40.0), &l10n());
        assert!(text.contains("Selling price"));
        assert!(text.contains("₹80.00 (configured)"));
        assert!(!text.contains("Suggested price"));

        let text = format_pricing(&calculator.price("Idli", 20.0), &l10n());
        assert!(text.contains("Selling price"));
        assert!(text.contains("Suggested price"));
    }

    #[test]
    fn test_optional_amount() {
        let l10n = l10n();
        assert_eq!(format_optional_amount(Some(12.346), &l10n), "₹12.35");
        assert_eq!(format_optional_amount(None, &l10n), "N/A");
    }
}
