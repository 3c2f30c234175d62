use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use vendo_core::billing::{BillingAdapter, BillingError, BillingEvent};
use vendo_core::product::ProductDescriptor;
use vendo_core::response::ResponseCode;
use vendo_core::ui::{DialogPresenter, StatusListener};

use crate::config::StoreConfig;
use crate::connection::{ConnectionState, ConnectionTracker};
use crate::display::{self, DisplayItem};

/// Drives the purchase lifecycle against a billing backend: connection
/// handling, product presentation, purchase launch and consumption of
/// whatever purchases the service reports.
///
/// All products handled here are consumable, so every reported purchase
/// is consumed right away; fulfillment is acknowledgement only.
pub struct PurchaseOrchestrator {
    backend: Arc<dyn BillingAdapter>,
    listener: Option<Arc<dyn StatusListener>>,
    config: StoreConfig,
    connection: Arc<ConnectionTracker>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    session_id: Uuid,
}

impl PurchaseOrchestrator {
    pub fn new(backend: Arc<dyn BillingAdapter>, config: StoreConfig) -> Self {
        Self {
            backend,
            listener: None,
            config,
            connection: Arc::new(ConnectionTracker::new()),
            tasks: Mutex::new(Vec::new()),
            session_id: Uuid::new_v4(),
        }
    }

    /// Register a sink for connection status changes.
    pub fn with_status_listener(mut self, listener: Arc<dyn StatusListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub async fn state(&self) -> ConnectionState {
        self.connection.state().await
    }

    pub async fn is_ready(&self) -> bool {
        self.connection.is_ready().await
    }

    /// Connect to the billing service. On success the status listener is
    /// notified, service notifications start being handled, and purchase
    /// history is swept so purchases from earlier sessions get consumed.
    ///
    /// Ignored unless the orchestrator is currently disconnected; a failed
    /// attempt returns to disconnected so the caller may try again. A close
    /// landing while the connect is in flight wins; the late result is
    /// discarded either way.
    pub async fn open(&self) -> Result<(), BillingError> {
        if !self.connection.begin_connect().await {
            debug!(session = %self.session_id, "open ignored, not in a connectable state");
            return Ok(());
        }

        info!(session = %self.session_id, "connecting to billing service");
        match self.backend.connect().await {
            Ok(()) => {
                if !self.connection.mark_ready().await {
                    // Closed while the connect was in flight; tear the
                    // fresh connection back down and stay closed.
                    self.backend.disconnect().await;
                    return Ok(());
                }
                let events = self.backend.events();
                let handle = tokio::spawn(run_event_loop(
                    events,
                    Arc::clone(&self.backend),
                    Arc::clone(&self.connection),
                    self.listener.clone(),
                    self.session_id,
                ));
                {
                    let mut tasks = self.tasks.lock().await;
                    tasks.retain(|task| !task.is_finished());
                    tasks.push(handle);
                }
                if self.connection.is_closed().await {
                    // A close between mark_ready and the push above drains
                    // the task list too early; finish its teardown here and
                    // stay silent.
                    for task in self.tasks.lock().await.drain(..) {
                        task.abort();
                    }
                    self.backend.disconnect().await;
                    return Ok(());
                }
                self.notify_status(true, ResponseCode::Ok);
                self.sweep_history().await;
                Ok(())
            }
            Err(err) => {
                let code = err.code();
                if self.connection.mark_failed().await {
                    error!(session = %self.session_id, %code, "billing connection failed: {err}");
                    self.notify_status(false, code);
                } else {
                    // Closed while the connect was in flight; the failure
                    // is stale and nobody gets told about it.
                    debug!(session = %self.session_id, "late connect failure discarded");
                }
                Err(err)
            }
        }
    }

    /// Shut the orchestrator down. In-flight work is cancelled, the
    /// backend connection is released, and every later call becomes a
    /// no-op. Safe to call more than once.
    pub async fn close(&self) {
        let previous = self.connection.close().await;
        if previous == ConnectionState::Closed {
            return;
        }
        for task in self.tasks.lock().await.drain(..) {
            task.abort();
        }
        if previous == ConnectionState::Ready {
            self.backend.disconnect().await;
        }
        info!(session = %self.session_id, "purchase orchestrator closed");
    }

    /// Fetch the configured products and walk the user through picking
    /// one; a selection launches that product's purchase flow. Failures
    /// surface through the presenter's error dialog.
    pub async fn query_products(&self, ui: &dyn DialogPresenter) {
        if !self.connection.is_ready().await {
            debug!(session = %self.session_id, "product query ignored, connection not ready");
            return;
        }

        debug!(session = %self.session_id, ids = ?self.config.product_ids, "querying product details");
        match self
            .backend
            .list_products(&self.config.product_ids, self.config.product_kind)
            .await
        {
            Ok(descriptors) => {
                if !self.connection.is_ready().await {
                    return;
                }
                let items = DisplayItem::from_descriptors(descriptors);
                let labels = display::labels(&items);
                match ui.choose(&self.config.choose_title, &labels).await {
                    Some(index) => {
                        if let Some(item) = items.get(index) {
                            self.launch_purchase(item.descriptor()).await;
                        }
                    }
                    None => {
                        debug!(session = %self.session_id, "product choice cancelled")
                    }
                }
            }
            Err(err) => {
                if !self.connection.is_ready().await {
                    return;
                }
                let code = err.code();
                error!(session = %self.session_id, %code, "product query failed");
                let message = format!("Error {}: {}", code.code(), code.reason());
                ui.show_error(&self.config.error_title, &message).await;
            }
        }
    }

    /// Hand the given product to the service's purchase flow. The outcome
    /// comes back asynchronously as a purchases-updated notification.
    pub async fn launch_purchase(&self, product: &ProductDescriptor) {
        if !self.connection.is_ready().await {
            debug!(
                session = %self.session_id,
                product = %product.product_id,
                "purchase launch ignored, connection not ready"
            );
            return;
        }
        info!(session = %self.session_id, product = %product.product_id, "launching purchase flow");
        self.backend.launch_purchase_flow(product).await;
    }

    /// Consume whatever past purchases the service still holds. Runs on
    /// every successful connect so nothing stays stuck after a crash or
    /// an interrupted session.
    async fn sweep_history(&self) {
        debug!(session = %self.session_id, "sweeping purchase history");
        match self.backend.query_history(self.config.product_kind).await {
            Ok(records) => {
                for record in records {
                    if !self.connection.is_ready().await {
                        return;
                    }
                    consume_purchase(
                        self.backend.as_ref(),
                        self.session_id,
                        &record.purchase_token,
                    )
                    .await;
                }
            }
            Err(err) => {
                error!(session = %self.session_id, "purchase history query failed: {err}")
            }
        }
    }

    fn notify_status(&self, success: bool, code: ResponseCode) {
        if let Some(listener) = &self.listener {
            listener.connection_status(success, code);
        }
    }
}

/// Handles unsolicited service notifications for one connection. Runs
/// until the service drops the connection or the orchestrator closes.
async fn run_event_loop(
    mut events: broadcast::Receiver<BillingEvent>,
    backend: Arc<dyn BillingAdapter>,
    connection: Arc<ConnectionTracker>,
    listener: Option<Arc<dyn StatusListener>>,
    session_id: Uuid,
) {
    loop {
        match events.recv().await {
            Ok(BillingEvent::PurchasesUpdated { code, purchases }) => {
                if connection.is_closed().await {
                    break;
                }
                if code != ResponseCode::Ok {
                    error!(session = %session_id, %code, "purchase flow reported a failure");
                }
                // Consume everything reported, whatever the code says;
                // flows can resolve out of band and still deliver goods.
                debug!(session = %session_id, count = purchases.len(), "purchases updated");
                for purchase in &purchases {
                    consume_purchase(backend.as_ref(), session_id, &purchase.purchase_token).await;
                }
            }
            Ok(BillingEvent::Disconnected) => {
                if connection.mark_dropped().await {
                    warn!(session = %session_id, "billing service dropped the connection");
                    if let Some(listener) = &listener {
                        listener.connection_status(false, ResponseCode::ServiceDisconnected);
                    }
                }
                break;
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(session = %session_id, skipped, "billing event feed lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Acknowledge one purchase. The goods were granted out of band, so a
/// consumption failure is logged and otherwise dropped.
async fn consume_purchase(backend: &dyn BillingAdapter, session_id: Uuid, token: &str) {
    debug!(session = %session_id, %token, "consuming purchase");
    match backend.consume(token).await {
        Ok(()) => debug!(session = %session_id, %token, "purchase consumed"),
        Err(err) => error!(session = %session_id, %token, "purchase consumption failed: {err}"),
    }
}
