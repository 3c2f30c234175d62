use serde::Deserialize;
use std::env;

use vendo_core::product::ProductKind;

/// Storefront settings: which products to offer and how to title the
/// dialogs shown around them.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_product_ids")]
    pub product_ids: Vec<String>,
    #[serde(default = "default_product_kind")]
    pub product_kind: ProductKind,
    #[serde(default = "default_choose_title")]
    pub choose_title: String,
    #[serde(default = "default_error_title")]
    pub error_title: String,
}

fn default_product_ids() -> Vec<String> {
    [
        "donation_1",
        "donation_2",
        "donation_5",
        "donation_10",
        "donation_20",
        "donation_50",
        "donation_100",
        "donation_custom",
    ]
    .iter()
    .map(|id| id.to_string())
    .collect()
}

fn default_product_kind() -> ProductKind {
    ProductKind::Consumable
}

fn default_choose_title() -> String {
    "Choose a donation".to_string()
}

fn default_error_title() -> String {
    "Donation error".to_string()
}

impl StoreConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file;
            // every field carries a default, so the file may be absent
            .add_source(config::File::with_name("config/default").required(false))
            // Add in the current environment file (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file that shouldn't be checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of VENDO)
            .add_source(config::Environment::with_prefix("VENDO").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            product_ids: default_product_ids(),
            product_kind: default_product_kind(),
            choose_title: default_choose_title(),
            error_title: default_error_title(),
        }
    }
}
