//! # Localization
//!
//! Fluent message bundles for every user-facing label. English and French
//! resources are compiled into the binary; English is the fallback for an
//! unknown language or a key a translation lacks.

use anyhow::{anyhow, Result};
use fluent_bundle::{FluentArgs, FluentBundle, FluentResource, FluentValue};
use log::{debug, warn};
use std::collections::HashMap;
use unic_langid::LanguageIdentifier;

pub const DEFAULT_LANGUAGE: &str = "en";

const RESOURCES: [(&str, &str); 2] = [
    ("en", include_str!("../locales/en/main.ftl")),
    ("fr", include_str!("../locales/fr/main.ftl")),
];

/// Localization manager holding one bundle per supported language
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
    language: String,
}

impl LocalizationManager {
    /// Create a manager speaking the default language
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();
        for (code, source) in RESOURCES {
            let locale: LanguageIdentifier = code.parse()?;
            bundles.insert(code.to_string(), Self::create_bundle(locale, source)?);
        }

        Ok(Self {
            bundles,
            language: DEFAULT_LANGUAGE.to_string(),
        })
    }

    /// Switch the language used by [`get_message`](Self::get_message)
    ///
    /// Unsupported languages keep the default.
    pub fn with_language(mut self, language: &str) -> Self {
        let code = language.trim().to_lowercase();
        if self.is_supported(&code) {
            self.language = code;
        } else {
            warn!("Unsupported language '{}', using {}", language, DEFAULT_LANGUAGE);
        }
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn is_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(language)
    }

    fn create_bundle(
        locale: LanguageIdentifier,
        source: &str,
    ) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new(vec![locale.clone()]);
        // Plain terminal output, no bidi isolation marks around arguments
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("Invalid {} resource: {:?}", locale, errors))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("Duplicate {} messages: {:?}", locale, errors))?;

        Ok(bundle)
    }

    /// Get a localized message in the current language
    pub fn get_message(&self, key: &str, args: Option<&HashMap<&str, &str>>) -> String {
        self.get_message_in_language(key, &self.language, args)
    }

    /// Get a localized message in a given language, falling back to English
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let fluent_args = args.map(|args| {
            FluentArgs::from_iter(args.iter().map(|(k, v)| (*k, FluentValue::from(*v))))
        });

        [language, DEFAULT_LANGUAGE]
            .iter()
            .filter_map(|code| self.bundles.get(*code))
            .find_map(|bundle| {
                let pattern = bundle.get_message(key)?.value()?;
                let mut value = String::new();
                let mut errors = Vec::new();
                bundle
                    .write_pattern(&mut value, pattern, fluent_args.as_ref(), &mut errors)
                    .ok()?;
                if !errors.is_empty() {
                    debug!("Formatting '{}' reported {:?}", key, errors);
                }
                Some(value)
            })
            .unwrap_or_else(|| format!("Missing translation: {}", key))
    }

    /// Get a localized message with simple string arguments
    pub fn get_message_with_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
        self.get_message(key, Some(&args_map))
    }
}
