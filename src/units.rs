//! # Unit Conversion Module
//!
//! This module defines the measurement units that appear in recipe lines, inventory
//! and shopping-list rows, and converts quantities between them.
//!
//! ## Core Concepts
//!
//! - **Unit**: a parsed measurement unit (tsp, g, ml, pieces, ...)
//! - **Dimension**: volume, weight or count
//! - **Conversion table**: static, bidirectional multipliers between unit pairs
//!
//! Conversion is best effort. When no table entry exists, volume and weight units
//! go through their base unit (ml or g, bridged at 1 ml = 1 g for liquids), and
//! anything else falls back to a 1:1 ratio with a warning. [`convert`] never fails.
//!
//! ## Usage
//!
//! ```rust
//! use kitchen_costing::units::convert;
//!
//! assert_eq!(convert(2.0, "kg", "g"), 2000.0);
//! assert_eq!(convert(3.0, "tbsp", "tbsp"), 3.0);
//! ```

use lazy_static::lazy_static;
use log::{debug, trace, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Measurement units understood by the costing engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    // Volume units
    /// Teaspoons
    Teaspoons,
    /// Tablespoons
    Tablespoons,
    /// Cups
    Cups,
    /// Milliliters
    Milliliters,
    /// Liters
    Liters,

    // Weight units
    /// Milligrams
    Milligrams,
    /// Grams
    Grams,
    /// Kilograms
    Kilograms,

    // Count/piece units
    /// Individual pieces/items
    Pieces,
    /// Dozen
    Dozen,
    /// Leaves (curry leaves, bay leaves)
    Leaves,
    /// Cloves (for garlic)
    Cloves,
    /// Pinches (very small amounts)
    Pinches,

    /// Anything else, kept verbatim (lowercased)
    Other(String),
}

/// Physical dimension of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Volume,
    Weight,
    Count,
    Unknown,
}

lazy_static! {
    static ref UNIT_ALIASES: Vec<(Regex, Unit)> = vec![
        (alias(r"tsp|teaspoons?"), Unit::Teaspoons),
        (alias(r"tbsp|tbs|tablespoons?"), Unit::Tablespoons),
        (alias(r"cups?|tasses?"), Unit::Cups),
        (alias(r"ml|millilit(?:er|re)s?|cc"), Unit::Milliliters),
        (alias(r"l|lit(?:er|re)s?|ltrs?|lt"), Unit::Liters),
        (alias(r"mg|milligram(?:me)?s?"), Unit::Milligrams),
        (alias(r"g|gm|gms|grams?|grammes?|gr"), Unit::Grams),
        (alias(r"kg|kgs|kilo(?:gram(?:me)?)?s?"), Unit::Kilograms),
        (alias(r"pcs?|pieces?|nos?|units?|each|ea"), Unit::Pieces),
        (alias(r"dozens?|dz"), Unit::Dozen),
        (alias(r"lea(?:f|ves)|feuilles?"), Unit::Leaves),
        (alias(r"cloves?|gousses?"), Unit::Cloves),
        (alias(r"pinch(?:es)?|pinc[ée]es?"), Unit::Pinches),
    ];

    /// Static conversion multipliers; inverse directions are derived on lookup
    static ref CONVERSION_TABLE: HashMap<(Unit, Unit), f64> = {
        let pairs = [
            // volume <-> volume
            (Unit::Milliliters, Unit::Liters, 0.001),
            (Unit::Teaspoons, Unit::Milliliters, 5.0),
            (Unit::Tablespoons, Unit::Milliliters, 15.0),
            (Unit::Teaspoons, Unit::Tablespoons, 1.0 / 3.0),
            (Unit::Cups, Unit::Milliliters, 240.0),
            (Unit::Cups, Unit::Liters, 0.24),
            // weight <-> weight
            (Unit::Grams, Unit::Kilograms, 0.001),
            (Unit::Milligrams, Unit::Grams, 0.001),
            (Unit::Milligrams, Unit::Kilograms, 0.000_001),
            // count <-> count
            (Unit::Dozen, Unit::Pieces, 12.0),
            // heuristic cross conversions to weight
            (Unit::Teaspoons, Unit::Grams, 5.0),
            (Unit::Tablespoons, Unit::Grams, 15.0),
            (Unit::Cups, Unit::Grams, 240.0),
            (Unit::Pieces, Unit::Grams, 50.0),
            (Unit::Leaves, Unit::Grams, 0.5),
            (Unit::Cloves, Unit::Grams, 5.0),
            (Unit::Pinches, Unit::Grams, 0.5),
            (Unit::Teaspoons, Unit::Kilograms, 0.005),
            (Unit::Tablespoons, Unit::Kilograms, 0.015),
            (Unit::Pieces, Unit::Kilograms, 0.05),
            // liquids: 1 ml weighs 1 g
            (Unit::Milliliters, Unit::Grams, 1.0),
            (Unit::Milliliters, Unit::Kilograms, 0.001),
            (Unit::Liters, Unit::Grams, 1000.0),
            (Unit::Liters, Unit::Kilograms, 1.0),
        ];

        let mut table = HashMap::new();
        for (from, to, factor) in pairs {
            table.insert((from, to), factor);
        }
        table
    };
}

fn alias(pattern: &str) -> Regex {
    Regex::new(&format!(r"(?i)^(?:{pattern})\.?$")).expect("Unit alias pattern should be valid")
}

impl Unit {
    /// Parse a unit string such as "Tbsp.", "kgs" or "pieces"
    ///
    /// Unknown strings become [`Unit::Other`] so that identical unknown units
    /// still compare equal.
    pub fn parse(raw: &str) -> Self {
        let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        for (pattern, unit) in UNIT_ALIASES.iter() {
            if pattern.is_match(&cleaned) {
                trace!("Parsed unit '{}' as {:?}", raw, unit);
                return unit.clone();
            }
        }
        Unit::Other(cleaned.to_lowercase())
    }

    /// Get a short display name for the unit
    pub fn display_name(&self) -> &str {
        match self {
            Unit::Teaspoons => "tsp",
            Unit::Tablespoons => "tbsp",
            Unit::Cups => "cup",
            Unit::Milliliters => "ml",
            Unit::Liters => "l",
            Unit::Milligrams => "mg",
            Unit::Grams => "g",
            Unit::Kilograms => "kg",
            Unit::Pieces => "pcs",
            Unit::Dozen => "dozen",
            Unit::Leaves => "leaves",
            Unit::Cloves => "cloves",
            Unit::Pinches => "pinch",
            Unit::Other(name) => name,
        }
    }

    /// Classify the unit by dimension
    pub fn dimension(&self) -> Dimension {
        if self.is_volume() {
            Dimension::Volume
        } else if self.is_weight() {
            Dimension::Weight
        } else if self.is_count() {
            Dimension::Count
        } else {
            Dimension::Unknown
        }
    }

    /// Check if this is a volume unit
    pub fn is_volume(&self) -> bool {
        matches!(
            self,
            Unit::Teaspoons | Unit::Tablespoons | Unit::Cups | Unit::Milliliters | Unit::Liters
        )
    }

    /// Check if this is a weight unit
    pub fn is_weight(&self) -> bool {
        matches!(self, Unit::Milligrams | Unit::Grams | Unit::Kilograms)
    }

    /// Check if this is a count unit
    pub fn is_count(&self) -> bool {
        matches!(
            self,
            Unit::Pieces | Unit::Dozen | Unit::Leaves | Unit::Cloves | Unit::Pinches
        )
    }

    /// Size of the unit in its dimension's base unit (ml or g)
    fn base_factor(&self) -> Option<f64> {
        match self {
            Unit::Teaspoons => Some(5.0),
            Unit::Tablespoons => Some(15.0),
            Unit::Cups => Some(240.0),
            Unit::Milliliters => Some(1.0),
            Unit::Liters => Some(1000.0),
            Unit::Milligrams => Some(0.001),
            Unit::Grams => Some(1.0),
            Unit::Kilograms => Some(1000.0),
            _ => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Look up the multiplier for `from -> to` in the static table
pub fn table_factor(from: &Unit, to: &Unit) -> Option<f64> {
    if let Some(factor) = CONVERSION_TABLE.get(&(from.clone(), to.clone())) {
        return Some(*factor);
    }
    CONVERSION_TABLE
        .get(&(to.clone(), from.clone()))
        .filter(|factor| **factor != 0.0)
        .map(|factor| 1.0 / factor)
}

/// Convert a quantity between two parsed units
///
/// Same unit returns the quantity unchanged. Table pairs use their fixed
/// multiplier. Volume and weight pairs missing from the table go through ml/g,
/// at a 1:1 density across dimensions. Everything else is returned unchanged
/// with a warning.
pub fn convert_units(quantity: f64, from: &Unit, to: &Unit) -> f64 {
    if from == to {
        return quantity;
    }

    if let Some(factor) = table_factor(from, to) {
        trace!("Converting {} {} -> {} with factor {}", quantity, from, to, factor);
        return quantity * factor;
    }

    // Volume and weight units bridge through ml/g; across dimensions this is
    // the liquid approximation 1 ml = 1 g
    if let (Some(from_base), Some(to_base)) = (from.base_factor(), to.base_factor()) {
        if from.dimension() != to.dimension() {
            debug!(
                "Approximating {} -> {} at liquid density (1 ml = 1 g)",
                from, to
            );
        }
        return quantity * from_base / to_base;
    }

    warn!(
        "No conversion from '{}' to '{}', assuming 1:1 for quantity {}",
        from, to, quantity
    );
    quantity
}

/// Convert a quantity between two unit strings
///
/// Unit strings are compared case-insensitively; see [`convert_units`] for the
/// fallback rules.
pub fn convert(quantity: f64, from_unit: &str, to_unit: &str) -> f64 {
    if from_unit.trim().eq_ignore_ascii_case(to_unit.trim()) {
        return quantity;
    }
    convert_units(quantity, &Unit::parse(from_unit), &Unit::parse(to_unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(Unit::parse("Tbsp."), Unit::Tablespoons);
        assert_eq!(Unit::parse("teaspoons"), Unit::Teaspoons);
        assert_eq!(Unit::parse("KG"), Unit::Kilograms);
        assert_eq!(Unit::parse(" gms "), Unit::Grams);
        assert_eq!(Unit::parse("Litres"), Unit::Liters);
        assert_eq!(Unit::parse("pcs"), Unit::Pieces);
        assert_eq!(Unit::parse("leaves"), Unit::Leaves);
        assert_eq!(Unit::parse("Bunch"), Unit::Other("bunch".to_string()));
    }

    #[test]
    fn test_unit_properties() {
        assert!(Unit::Milliliters.is_volume());
        assert!(!Unit::Milliliters.is_weight());
        assert!(Unit::Kilograms.is_weight());
        assert!(Unit::Leaves.is_count());
        assert_eq!(Unit::Other("bunch".into()).dimension(), Dimension::Unknown);
    }

    #[test]
    fn test_reflexive_conversion() {
        for unit in ["g", "ml", "pcs", "bunch", "", "Tbsp"] {
            assert_eq!(convert(12.5, unit, unit), 12.5);
        }
        assert_eq!(convert(7.0, "KG", "kg"), 7.0);
    }

    #[test]
    fn test_table_conversions() {
        assert!(approx(convert(1.5, "kg", "g"), 1500.0));
        assert!(approx(convert(250.0, "ml", "l"), 0.25));
        assert!(approx(convert(2.0, "tsp", "g"), 10.0));
        assert!(approx(convert(4.0, "leaves", "g"), 2.0));
        assert!(approx(convert(2.0, "dozen", "pcs"), 24.0));
    }

    #[test]
    fn test_table_round_trips() {
        let pairs = [
            ("g", "kg"),
            ("ml", "l"),
            ("tsp", "tbsp"),
            ("tbsp", "g"),
            ("pcs", "g"),
            ("l", "kg"),
            ("cup", "ml"),
        ];
        for (a, b) in pairs {
            let back = convert(convert(42.0, a, b), b, a);
            assert!(approx(back, 42.0), "{a} -> {b} -> {a} gave {back}");
        }
    }

    #[test]
    fn test_volume_weight_fallback() {
        // cup -> kg is not a table pair; bridged through ml and g
        assert!(approx(convert(1.0, "cup", "kg"), 0.24));
        assert!(approx(convert(1.0, "cup", "tbsp"), 16.0));
    }

    #[test]
    fn test_unknown_units_fall_back_to_identity() {
        assert_eq!(convert(3.0, "bunch", "g"), 3.0);
        assert_eq!(convert(3.0, "pcs", "ml"), 3.0);
    }
}
