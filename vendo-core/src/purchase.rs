use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A completed (not yet consumed) purchase as reported by the billing service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub product_id: String,
    pub purchase_token: String, // opaque receipt handle, required for consumption
    pub purchase_time: DateTime<Utc>,
    pub quantity: i32,
}

impl PurchaseRecord {
    pub fn new(product_id: String, purchase_token: String) -> Self {
        Self {
            product_id,
            purchase_token,
            purchase_time: Utc::now(),
            quantity: 1,
        }
    }
}
