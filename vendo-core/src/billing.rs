use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::product::{ProductDescriptor, ProductKind};
use crate::purchase::PurchaseRecord;
use crate::response::ResponseCode;

#[derive(Debug, Clone, thiserror::Error)]
pub enum BillingError {
    #[error("Billing request rejected: {}", .0.reason())]
    Rejected(ResponseCode),
    #[error("Billing service unreachable: {0}")]
    Transport(String),
}

impl BillingError {
    /// Result code carried by this failure, for callbacks and dialogs.
    pub fn code(&self) -> ResponseCode {
        match self {
            BillingError::Rejected(code) => *code,
            BillingError::Transport(_) => ResponseCode::ServiceUnavailable,
        }
    }
}

/// Unsolicited notifications pushed by the billing service.
#[derive(Debug, Clone)]
pub enum BillingEvent {
    /// One or more purchase flows finished. Purchases may be present even
    /// when the code reports a failure (e.g. flows resolved out of band).
    PurchasesUpdated {
        code: ResponseCode,
        purchases: Vec<PurchaseRecord>,
    },
    /// The service dropped the connection on its side.
    Disconnected,
}

#[async_trait]
pub trait BillingAdapter: Send + Sync {
    /// Establish the connection to the billing service
    async fn connect(&self) -> Result<(), BillingError>;

    /// Tear the connection down
    async fn disconnect(&self);

    /// Fetch listing details for the given product ids
    async fn list_products(
        &self,
        product_ids: &[String],
        kind: ProductKind,
    ) -> Result<Vec<ProductDescriptor>, BillingError>;

    /// Hand control to the service's own purchase UI; the outcome arrives
    /// later as a `PurchasesUpdated` event
    async fn launch_purchase_flow(&self, product: &ProductDescriptor);

    /// Mark a purchase as consumed so the product can be bought again
    async fn consume(&self, purchase_token: &str) -> Result<(), BillingError>;

    /// Look up past purchases that may still be outstanding
    async fn query_history(&self, kind: ProductKind)
        -> Result<Vec<PurchaseRecord>, BillingError>;

    /// Subscribe to unsolicited service notifications
    fn events(&self) -> broadcast::Receiver<BillingEvent>;
}
