//! # Costing Error Types Module
//!
//! This module defines the error taxonomy used by the calculators. Missing price
//! data, bad input and persistence failures are distinct variants so callers can
//! tell "cost unknown" apart from "something broke".

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the costing calculators and their persistence layer
#[derive(Error, Debug)]
pub enum CostingError {
    /// The recipe id or name is not present in the snapshot
    #[error("Recipe not found: {0}")]
    RecipeNotFound(String),

    /// At least one ingredient line has no resolvable unit price
    #[error("Missing prices for recipe '{recipe}': {}", .ingredients.join(", "))]
    MissingPrices {
        recipe: String,
        ingredients: Vec<String>,
    },

    /// Scale factors must be finite and positive
    #[error("Invalid scale factor: {0}")]
    InvalidScaleFactor(f64),

    /// A configuration file was rejected
    #[error("Configuration error in {file}: {message}")]
    Config { file: String, message: String },

    /// Writing an output artifact failed
    #[error("Failed to persist {}: {message}", .path.display())]
    Persistence { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CostingError {
    /// Whether this error means "price data is incomplete" rather than a failure
    pub fn is_missing_data(&self) -> bool {
        matches!(self, CostingError::MissingPrices { .. })
    }

    /// Names of the ingredients without a price, if this is a missing-price error
    pub fn missing_ingredients(&self) -> &[String] {
        match self {
            CostingError::MissingPrices { ingredients, .. } => ingredients,
            _ => &[],
        }
    }
}

pub type CostingResult<T> = Result<T, CostingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_prices_display() {
        let err = CostingError::MissingPrices {
            recipe: "Biryani".to_string(),
            ingredients: vec!["Saffron".to_string(), "Mace".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Missing prices for recipe 'Biryani': Saffron, Mace"
        );
        assert!(err.is_missing_data());
        assert_eq!(err.missing_ingredients().len(), 2);
    }

    #[test]
    fn test_other_errors_are_not_missing_data() {
        let err = CostingError::RecipeNotFound("42".to_string());
        assert!(!err.is_missing_data());
        assert!(err.missing_ingredients().is_empty());
    }
}
