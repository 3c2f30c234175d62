use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductKind {
    Consumable,
    Subscription,
}

/// Store listing entry for a single purchasable product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDescriptor {
    pub product_id: String,
    pub title: String,
    pub description: String,
    pub kind: ProductKind,
    pub price_amount_micros: i64, // micro-units, 1_000_000 per whole currency unit
    pub price_currency_code: String,
    pub formatted_price: Option<String>,
}

impl ProductDescriptor {
    /// Minimal consumable descriptor priced in USD.
    pub fn new(product_id: String, title: String, price_amount_micros: i64) -> Self {
        Self {
            product_id,
            title,
            description: String::new(),
            kind: ProductKind::Consumable,
            price_amount_micros,
            price_currency_code: "USD".to_string(),
            formatted_price: None,
        }
    }
}
