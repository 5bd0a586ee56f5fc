//! # Localization Tests
//!
//! This module contains unit tests for the localization functionality,
//! testing message retrieval, language fallback and argument formatting.

use kitchen_costing::cost_aggregator::CostComponent;
use kitchen_costing::localization::LocalizationManager;
use kitchen_costing::pricing::ProfitStatus;
use std::collections::HashMap;

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_localization() -> LocalizationManager {
        LocalizationManager::new().expect("Failed to create localization manager")
    }

    #[test]
    fn test_get_message_existing_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("missing-ingredients", "en", None);
        assert_eq!(message, "Missing Ingredients");
    }

    #[test]
    fn test_get_message_nonexistent_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("nonexistent-key", "en", None);
        assert!(message.starts_with("Missing translation:"));
    }

    #[test]
    fn test_get_message_unsupported_language() {
        let manager = setup_localization();

        // Falls back to English
        let message = manager.get_message_in_language("not-available", "unsupported", None);
        assert_eq!(message, "N/A");
    }

    #[test]
    fn test_get_message_with_args() {
        let manager = setup_localization();

        let mut args = HashMap::new();
        args.insert("recipe", "Masala Dosa");
        args.insert("ingredients", "Saffron, Truffle");

        let message =
            manager.get_message_in_language("missing-ingredients-list", "en", Some(&args));
        assert!(message.contains("Masala Dosa"));
        assert!(message.contains("Saffron, Truffle"));

        let message =
            manager.get_message_in_language("missing-ingredients-list", "fr", Some(&args));
        assert!(message.starts_with("Ingrédients manquants"));
        assert!(message.contains("Masala Dosa"));
    }

    #[test]
    fn test_every_label_is_translated() {
        let manager = setup_localization();
        let status_keys = [
            ProfitStatus::Excellent,
            ProfitStatus::Good,
            ProfitStatus::Average,
            ProfitStatus::Loss,
        ]
        .map(|status| status.message_key());
        let component_keys = CostComponent::ALL.map(|component| component.message_key());

        for key in status_keys.iter().chain(component_keys.iter()) {
            for language in ["en", "fr"] {
                let message = manager.get_message_in_language(key, language, None);
                assert!(
                    !message.starts_with("Missing translation"),
                    "{key} missing in {language}"
                );
            }
        }
    }

    #[test]
    fn test_french_differs_from_english() {
        let manager = setup_localization();

        let en = manager.get_message_in_language("summary-title", "en", None);
        let fr = manager.get_message_in_language("summary-title", "fr", None);
        assert_ne!(en, fr);
    }
}
