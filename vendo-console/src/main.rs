mod presenter;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use presenter::ConsolePresenter;
use vendo_checkout::{PurchaseOrchestrator, SandboxBilling, StoreConfig};
use vendo_core::response::ResponseCode;
use vendo_core::ui::StatusListener;

/// Prints connection changes for the person at the terminal.
struct ConsoleStatus;

impl StatusListener for ConsoleStatus {
    fn connection_status(&self, success: bool, code: ResponseCode) {
        if success {
            println!("Connected to the sandbox billing service.");
        } else {
            println!("Billing connection problem: {}", code.reason());
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vendo_console=info,vendo_checkout=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StoreConfig::load().unwrap_or_else(|err| {
        tracing::warn!("Falling back to built-in store config: {err}");
        StoreConfig::default()
    });
    tracing::info!("Starting storefront with {} products", config.product_ids.len());

    let backend = Arc::new(SandboxBilling::with_demo_catalog());
    let orchestrator = PurchaseOrchestrator::new(backend.clone(), config)
        .with_status_listener(Arc::new(ConsoleStatus));

    if let Err(err) = orchestrator.open().await {
        eprintln!("Could not reach the billing service: {err}");
        return;
    }

    let ui = ConsolePresenter;
    loop {
        println!("\n[s]hop   [l]edger   [q]uit");
        let Some(line) = presenter::read_line().await else {
            break;
        };
        match line.trim() {
            "s" | "shop" => orchestrator.query_products(&ui).await,
            "l" | "ledger" => {
                println!("Consumed purchases: {:?}", backend.consumed_tokens().await);
                println!(
                    "Outstanding purchases: {:?}",
                    backend.outstanding_tokens().await
                );
            }
            "q" | "quit" => break,
            "" => {}
            other => println!("Unknown command: {other}"),
        }
    }

    orchestrator.close().await;
    println!("Bye.");
}
