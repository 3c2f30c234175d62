use async_trait::async_trait;

use crate::response::ResponseCode;

/// Host-provided dialog surface for purchase interactions.
#[async_trait]
pub trait DialogPresenter: Send + Sync {
    /// Present a cancellable single-choice list and return the index the
    /// user picked, or `None` on cancel
    async fn choose(&self, title: &str, labels: &[String]) -> Option<usize>;

    /// Show a dismissable error message
    async fn show_error(&self, title: &str, message: &str);
}

/// Host-provided sink for billing connection status changes.
pub trait StatusListener: Send + Sync {
    fn connection_status(&self, success: bool, code: ResponseCode);
}
