pub mod billing;
pub mod product;
pub mod purchase;
pub mod response;
pub mod ui;

pub use billing::{BillingAdapter, BillingError, BillingEvent};
pub use product::{ProductDescriptor, ProductKind};
pub use purchase::PurchaseRecord;
pub use response::ResponseCode;
pub use ui::{DialogPresenter, StatusListener};
