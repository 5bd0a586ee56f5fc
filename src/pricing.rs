//! # Pricing Module
//!
//! The pricing book is the CSV of configured selling prices keyed by recipe
//! name. The pricing calculator combines a recipe's total cost with that book to
//! derive profit, margin, discount tiers, tax and a status bucket.
//!
//! Profit and profit percentage exist only when a selling price is configured;
//! a suggested price never produces a profit figure.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use crate::costing_config::{CostingConfig, SellingStrategy, StatusThresholds};
use crate::costing_errors::CostingResult;
use crate::kitchen_data::{lenient_f64, normalize_name};
use crate::persistence::write_csv_atomic;

/// Default file name of the pricing book
pub const PRICING_FILE: &str = "recipe_pricing.csv";

/// One row of the pricing book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRecord {
    pub recipe_name: String,
    /// Competitor reference price
    #[serde(default, deserialize_with = "lenient_f64")]
    pub others_pricing: Option<f64>,
    /// Configured selling price
    #[serde(default, deserialize_with = "lenient_f64")]
    pub our_pricing: Option<f64>,
    /// Minutes
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cooking_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub other_charges: Option<f64>,
}

impl PricingRecord {
    pub fn new(recipe_name: &str) -> Self {
        Self {
            recipe_name: recipe_name.to_string(),
            others_pricing: None,
            our_pricing: None,
            cooking_time: None,
            other_charges: None,
        }
    }
}

/// In-memory pricing book
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingBook {
    records: Vec<PricingRecord>,
}

/// Change to one stored price when editing a pricing record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceEdit {
    Keep,
    Set(f64),
    Clear,
}

impl PriceEdit {
    /// Build from a command-line value and its clear flag; clearing wins
    pub fn from_flags(value: Option<f64>, clear: bool) -> Self {
        match (value, clear) {
            (_, true) => PriceEdit::Clear,
            (Some(price), false) => PriceEdit::Set(price),
            (None, false) => PriceEdit::Keep,
        }
    }

    fn apply(self, current: Option<f64>) -> Option<f64> {
        match self {
            PriceEdit::Keep => current,
            PriceEdit::Set(price) => Some(price),
            PriceEdit::Clear => None,
        }
    }
}

impl PricingBook {
    pub fn new(records: Vec<PricingRecord>) -> Self {
        Self { records }
    }

    /// Load the pricing book; a missing file yields an empty book
    pub fn load(path: &Path) -> CostingResult<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Pricing file {} not found, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
        let mut records = Vec::new();
        for (index, row) in reader.deserialize::<PricingRecord>().enumerate() {
            match row {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping pricing row {}: {}", index + 1, e),
            }
        }

        info!("Loaded {} pricing records from {}", records.len(), path.display());
        Ok(Self { records })
    }

    /// Rewrite the whole pricing file
    pub fn save(&self, path: &Path) -> CostingResult<()> {
        write_csv_atomic(path, &self.records)?;
        info!("Saved {} pricing records to {}", self.records.len(), path.display());
        Ok(())
    }

    pub fn records(&self) -> &[PricingRecord] {
        &self.records
    }

    /// Look up a record by recipe name, ignoring case
    pub fn get(&self, recipe_name: &str) -> Option<&PricingRecord> {
        let wanted = normalize_name(recipe_name);
        self.records
            .iter()
            .find(|record| normalize_name(&record.recipe_name) == wanted)
    }

    /// Set the selling and competitor prices of a recipe, adding it if absent
    pub fn upsert(
        &mut self,
        recipe_name: &str,
        our_pricing: Option<f64>,
        others_pricing: Option<f64>,
    ) -> &PricingRecord {
        let wanted = normalize_name(recipe_name);
        let index = match self
            .records
            .iter()
            .position(|record| normalize_name(&record.recipe_name) == wanted)
        {
            Some(index) => index,
            None => {
                self.records.push(PricingRecord::new(recipe_name));
                self.records.len() - 1
            }
        };

        let record = &mut self.records[index];
        record.our_pricing = our_pricing;
        record.others_pricing = others_pricing;
        debug!(
            "Pricing for '{}' set to ours={:?} others={:?}",
            record.recipe_name, our_pricing, others_pricing
        );
        &self.records[index]
    }

    /// Apply edits to the stored prices of a recipe, adding it if absent
    pub fn edit(
        &mut self,
        recipe_name: &str,
        ours: PriceEdit,
        others: PriceEdit,
    ) -> &PricingRecord {
        let existing = self.get(recipe_name);
        let our_pricing = ours.apply(existing.and_then(|record| record.our_pricing));
        let others_pricing = others.apply(existing.and_then(|record| record.others_pricing));
        self.upsert(recipe_name, our_pricing, others_pricing)
    }

    /// Record the cooking time and other charges used when costing a recipe
    pub fn annotate(&mut self, recipe_name: &str, cooking_time: Option<f64>, other_charges: f64) {
        let wanted = normalize_name(recipe_name);
        if let Some(record) = self
            .records
            .iter_mut()
            .find(|record| normalize_name(&record.recipe_name) == wanted)
        {
            record.cooking_time = cooking_time;
            record.other_charges = Some(other_charges);
        }
    }
}

/// Profit bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitStatus {
    Excellent,
    Good,
    Average,
    Loss,
}

impl ProfitStatus {
    /// Classify a profit percentage; thresholds are exclusive lower bounds
    pub fn classify(profit_percentage: f64, thresholds: &StatusThresholds) -> Self {
        if profit_percentage > thresholds.excellent {
            ProfitStatus::Excellent
        } else if profit_percentage > thresholds.good {
            ProfitStatus::Good
        } else if profit_percentage > thresholds.average {
            ProfitStatus::Average
        } else {
            ProfitStatus::Loss
        }
    }

    pub fn message_key(&self) -> &'static str {
        match self {
            ProfitStatus::Excellent => "status-excellent",
            ProfitStatus::Good => "status-good",
            ProfitStatus::Average => "status-average",
            ProfitStatus::Loss => "status-loss",
        }
    }
}

/// How the selling price was arrived at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    Configured,
    CompetitorAnchored,
    MarginAnchored,
}

/// Price after a fixed discount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountTier {
    pub discount_percent: f64,
    pub price: f64,
    pub profit: f64,
    /// Price is at or above the minimum profitable price
    pub profitable: bool,
}

/// GST and SGST on the selling price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub gst_amount: f64,
    pub sgst_amount: f64,
    pub price_with_tax: f64,
}

/// Pricing of one recipe at a given total cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub recipe_name: String,
    pub total_cost: f64,
    pub our_pricing: Option<f64>,
    pub others_pricing: Option<f64>,
    /// Present only when no selling price is configured
    pub suggested_price: Option<f64>,
    pub selling_price: f64,
    pub price_basis: PriceBasis,
    pub margin_anchored_price: f64,
    pub competitor_anchored_price: Option<f64>,
    pub profit: Option<f64>,
    pub profit_percentage: Option<f64>,
    pub status: Option<ProfitStatus>,
    pub minimum_profitable_price: f64,
    pub discount_tiers: Vec<DiscountTier>,
    pub tax: TaxBreakdown,
}

/// Profit as a percentage of cost; zero when cost is not positive
pub fn profit_percentage(profit: f64, total_cost: f64) -> f64 {
    if total_cost > 0.0 {
        profit / total_cost * 100.0
    } else {
        0.0
    }
}

/// Derives selling price and profit metrics from the pricing book
pub struct PricingCalculator<'a> {
    config: &'a CostingConfig,
    book: &'a PricingBook,
}

impl<'a> PricingCalculator<'a> {
    pub fn new(config: &'a CostingConfig, book: &'a PricingBook) -> Self {
        Self { config, book }
    }

    pub fn price(&self, recipe_name: &str, total_cost: f64) -> PricingResult {
        let policy = &self.config.policy;
        let record = self.book.get(recipe_name);
        let our_pricing = record
            .and_then(|r| r.our_pricing)
            .filter(|p| p.is_finite() && *p > 0.0);
        let others_pricing = record
            .and_then(|r| r.others_pricing)
            .filter(|p| p.is_finite() && *p > 0.0);

        let margin_anchored_price = total_cost * (1.0 + policy.target_margin_percent / 100.0);
        let competitor_anchored_price = others_pricing.map(|p| p * policy.competitor_markup);

        let (selling_price, price_basis) = match (our_pricing, policy.selling_strategy) {
            (Some(price), _) => (price, PriceBasis::Configured),
            (None, SellingStrategy::CompetitorAnchored) => match competitor_anchored_price {
                Some(price) => (price, PriceBasis::CompetitorAnchored),
                None => (margin_anchored_price, PriceBasis::MarginAnchored),
            },
            (None, SellingStrategy::MarginAnchored) => {
                (margin_anchored_price, PriceBasis::MarginAnchored)
            }
        };
        let suggested_price = our_pricing.is_none().then_some(selling_price);

        let profit = our_pricing.map(|price| price - total_cost);
        let profit_pct = profit.map(|p| profit_percentage(p, total_cost));
        let status = profit_pct.map(|pct| ProfitStatus::classify(pct, &policy.status_thresholds));

        let minimum_profitable_price = total_cost * policy.minimum_profit_factor;
        let discount_tiers = policy
            .discount_tiers_percent
            .iter()
            .map(|discount| {
                let price = selling_price * (1.0 - discount / 100.0);
                DiscountTier {
                    discount_percent: *discount,
                    price,
                    profit: price - total_cost,
                    profitable: price >= minimum_profitable_price,
                }
            })
            .collect();

        let gst_amount = selling_price * self.config.tax.gst_rate / 100.0;
        let sgst_amount = selling_price * self.config.tax.sgst_rate / 100.0;

        debug!(
            "Priced '{}': cost {:.2}, selling {:.2} ({:?}), profit {:?}",
            recipe_name, total_cost, selling_price, price_basis, profit
        );

        PricingResult {
            recipe_name: recipe_name.to_string(),
            total_cost,
            our_pricing,
            others_pricing,
            suggested_price,
            selling_price,
            price_basis,
            margin_anchored_price,
            competitor_anchored_price,
            profit,
            profit_percentage: profit_pct,
            status,
            minimum_profitable_price,
            discount_tiers,
            tax: TaxBreakdown {
                gst_amount,
                sgst_amount,
                price_with_tax: selling_price + gst_amount + sgst_amount,
            },
        }
    }
}
