use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use vendo_core::billing::{BillingAdapter, BillingError, BillingEvent};
use vendo_core::product::{ProductDescriptor, ProductKind};
use vendo_core::purchase::PurchaseRecord;
use vendo_core::response::ResponseCode;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// In-process billing service stand-in.
///
/// Purchases launched against it are approved immediately and delivered
/// through the event feed, the way a real service reports flows finishing.
/// Tests script failures one call at a time and read back the consumption
/// ledger; the demo storefront runs against it unchanged.
pub struct SandboxBilling {
    catalog: Vec<ProductDescriptor>,
    events_tx: broadcast::Sender<BillingEvent>,
    connected: AtomicBool,
    next_token: AtomicU64,
    outstanding: Mutex<Vec<PurchaseRecord>>,
    consumed: Mutex<Vec<String>>,
    connect_failure: Mutex<Option<ResponseCode>>,
    list_failure: Mutex<Option<ResponseCode>>,
    history_failure: Mutex<Option<ResponseCode>>,
    list_calls: AtomicUsize,
    history_calls: AtomicUsize,
    consume_calls: AtomicUsize,
}

impl SandboxBilling {
    pub fn new(catalog: Vec<ProductDescriptor>) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            catalog,
            events_tx,
            connected: AtomicBool::new(false),
            next_token: AtomicU64::new(0),
            outstanding: Mutex::new(Vec::new()),
            consumed: Mutex::new(Vec::new()),
            connect_failure: Mutex::new(None),
            list_failure: Mutex::new(None),
            history_failure: Mutex::new(None),
            list_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
            consume_calls: AtomicUsize::new(0),
        }
    }

    /// Sandbox loaded with the standard donation tiers plus one listing
    /// whose title carries no canonical price label.
    pub fn with_demo_catalog() -> Self {
        let tiers: [(&str, &str, i64); 8] = [
            ("donation_1", "Tiny tip ($1 USD)", 1_000_000),
            ("donation_2", "Small tip ($2 USD)", 2_000_000),
            ("donation_5", "Coffee ($5 USD)", 5_000_000),
            ("donation_10", "Lunch ($10 USD)", 10_000_000),
            ("donation_20", "Generous ($20 USD)", 20_000_000),
            ("donation_50", "Patron ($50 USD)", 50_000_000),
            ("donation_100", "Benefactor ($100 USD)", 100_000_000),
            ("donation_custom", "Buy the team pizza", 15_000_000),
        ];
        let catalog = tiers
            .iter()
            .map(|(id, title, micros)| {
                ProductDescriptor::new(id.to_string(), title.to_string(), *micros)
            })
            .collect();
        Self::new(catalog)
    }

    /// Make the next `connect` call fail with the given code.
    pub async fn fail_next_connect(&self, code: ResponseCode) {
        *self.connect_failure.lock().await = Some(code);
    }

    /// Make the next `list_products` call fail with the given code.
    pub async fn fail_next_list(&self, code: ResponseCode) {
        *self.list_failure.lock().await = Some(code);
    }

    /// Make the next `query_history` call fail with the given code.
    pub async fn fail_next_history(&self, code: ResponseCode) {
        *self.history_failure.lock().await = Some(code);
    }

    /// Register purchases the service already knows about, as if they were
    /// completed in an earlier session and never consumed.
    pub async fn seed_history(&self, records: Vec<PurchaseRecord>) {
        self.outstanding.lock().await.extend(records);
    }

    /// Drop the connection from the service side and notify subscribers.
    pub fn drop_connection(&self) {
        debug!("sandbox dropping billing connection");
        self.connected.store(false, Ordering::SeqCst);
        let _ = self.events_tx.send(BillingEvent::Disconnected);
    }

    /// Push a raw purchases-updated event. Records are not added to the
    /// outstanding ledger; call `seed_history` first when a later
    /// consumption of them should succeed.
    pub fn emit_purchases_updated(&self, code: ResponseCode, purchases: Vec<PurchaseRecord>) {
        let _ = self
            .events_tx
            .send(BillingEvent::PurchasesUpdated { code, purchases });
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub async fn outstanding_tokens(&self) -> Vec<String> {
        self.outstanding
            .lock()
            .await
            .iter()
            .map(|record| record.purchase_token.clone())
            .collect()
    }

    pub async fn consumed_tokens(&self) -> Vec<String> {
        self.consumed.lock().await.clone()
    }

    pub fn list_call_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn history_call_count(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn consume_call_count(&self) -> usize {
        self.consume_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BillingAdapter for SandboxBilling {
    async fn connect(&self) -> Result<(), BillingError> {
        if let Some(code) = self.connect_failure.lock().await.take() {
            return Err(BillingError::Rejected(code));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    async fn list_products(
        &self,
        product_ids: &[String],
        kind: ProductKind,
    ) -> Result<Vec<ProductDescriptor>, BillingError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(code) = self.list_failure.lock().await.take() {
            return Err(BillingError::Rejected(code));
        }
        if !self.is_connected() {
            return Err(BillingError::Rejected(ResponseCode::ServiceDisconnected));
        }
        Ok(self
            .catalog
            .iter()
            .filter(|product| product.kind == kind && product_ids.contains(&product.product_id))
            .cloned()
            .collect())
    }

    async fn launch_purchase_flow(&self, product: &ProductDescriptor) {
        if !self.is_connected() {
            self.emit_purchases_updated(ResponseCode::ServiceDisconnected, Vec::new());
            return;
        }
        let token = format!("sandbox-{}", self.next_token.fetch_add(1, Ordering::SeqCst) + 1);
        debug!(product = %product.product_id, %token, "sandbox approving purchase");
        let record = PurchaseRecord::new(product.product_id.clone(), token);
        self.outstanding.lock().await.push(record.clone());
        self.emit_purchases_updated(ResponseCode::Ok, vec![record]);
    }

    async fn consume(&self, purchase_token: &str) -> Result<(), BillingError> {
        self.consume_calls.fetch_add(1, Ordering::SeqCst);
        let mut outstanding = self.outstanding.lock().await;
        match outstanding
            .iter()
            .position(|record| record.purchase_token == purchase_token)
        {
            Some(index) => {
                outstanding.remove(index);
                self.consumed.lock().await.push(purchase_token.to_string());
                Ok(())
            }
            None => Err(BillingError::Rejected(ResponseCode::ItemNotOwned)),
        }
    }

    async fn query_history(
        &self,
        _kind: ProductKind,
    ) -> Result<Vec<PurchaseRecord>, BillingError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(code) = self.history_failure.lock().await.take() {
            return Err(BillingError::Rejected(code));
        }
        Ok(self.outstanding.lock().await.clone())
    }

    fn events(&self) -> broadcast::Receiver<BillingEvent> {
        self.events_tx.subscribe()
    }
}
