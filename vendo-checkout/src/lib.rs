pub mod config;
pub mod connection;
pub mod display;
pub mod orchestrator;
pub mod sandbox;

pub use config::StoreConfig;
pub use connection::{ConnectionState, ConnectionTracker};
pub use display::DisplayItem;
pub use orchestrator::PurchaseOrchestrator;
pub use sandbox::SandboxBilling;
