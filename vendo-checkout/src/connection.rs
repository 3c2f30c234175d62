use tokio::sync::Mutex;

/// Lifecycle of the link to the billing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Ready,
    Closed,
}

/// Tracks the billing connection lifecycle and enforces its transitions.
///
/// Transition methods return whether the transition applied, so callers
/// racing against `close` can discard work that finished too late.
#[derive(Debug)]
pub struct ConnectionTracker {
    state: Mutex<ConnectionState>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ConnectionState::Disconnected),
        }
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.lock().await
    }

    pub async fn is_ready(&self) -> bool {
        self.state().await == ConnectionState::Ready
    }

    pub async fn is_closed(&self) -> bool {
        self.state().await == ConnectionState::Closed
    }

    /// Transition: Disconnected → Connecting
    pub(crate) async fn begin_connect(&self) -> bool {
        self.transition(ConnectionState::Disconnected, ConnectionState::Connecting)
            .await
    }

    /// Transition: Connecting → Ready
    pub(crate) async fn mark_ready(&self) -> bool {
        self.transition(ConnectionState::Connecting, ConnectionState::Ready)
            .await
    }

    /// Transition: Connecting → Disconnected (connection attempt failed)
    pub(crate) async fn mark_failed(&self) -> bool {
        self.transition(ConnectionState::Connecting, ConnectionState::Disconnected)
            .await
    }

    /// Transition: Ready → Disconnected (service dropped the connection)
    pub(crate) async fn mark_dropped(&self) -> bool {
        self.transition(ConnectionState::Ready, ConnectionState::Disconnected)
            .await
    }

    /// Transition: any → Closed. Returns the state that was replaced so the
    /// caller knows whether a live connection needs tearing down.
    pub(crate) async fn close(&self) -> ConnectionState {
        let mut state = self.state.lock().await;
        std::mem::replace(&mut *state, ConnectionState::Closed)
    }

    async fn transition(&self, from: ConnectionState, to: ConnectionState) -> bool {
        let mut state = self.state.lock().await;
        if *state == from {
            *state = to;
            true
        } else {
            false
        }
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connection_lifecycle() {
        let tracker = ConnectionTracker::new();
        assert_eq!(tracker.state().await, ConnectionState::Disconnected);

        // Disconnected → Connecting → Ready
        assert!(tracker.begin_connect().await);
        assert_eq!(tracker.state().await, ConnectionState::Connecting);
        assert!(tracker.mark_ready().await);
        assert!(tracker.is_ready().await);

        // Ready → Closed
        assert_eq!(tracker.close().await, ConnectionState::Ready);
        assert!(tracker.is_closed().await);
    }

    #[tokio::test]
    async fn test_invalid_transitions_are_rejected() {
        let tracker = ConnectionTracker::new();

        // Cannot go Ready or drop without connecting first
        assert!(!tracker.mark_ready().await);
        assert!(!tracker.mark_dropped().await);
        assert_eq!(tracker.state().await, ConnectionState::Disconnected);

        // Double connect attempt is rejected
        assert!(tracker.begin_connect().await);
        assert!(!tracker.begin_connect().await);
    }

    #[tokio::test]
    async fn test_failed_connect_returns_to_disconnected() {
        let tracker = ConnectionTracker::new();
        assert!(tracker.begin_connect().await);
        assert!(tracker.mark_failed().await);
        assert_eq!(tracker.state().await, ConnectionState::Disconnected);

        // A fresh attempt is allowed after a failure
        assert!(tracker.begin_connect().await);
    }

    #[tokio::test]
    async fn test_service_drop_allows_reconnect() {
        let tracker = ConnectionTracker::new();
        assert!(tracker.begin_connect().await);
        assert!(tracker.mark_ready().await);
        assert!(tracker.mark_dropped().await);
        assert_eq!(tracker.state().await, ConnectionState::Disconnected);
        assert!(tracker.begin_connect().await);
    }

    #[tokio::test]
    async fn test_closed_is_terminal() {
        let tracker = ConnectionTracker::new();
        assert_eq!(tracker.close().await, ConnectionState::Disconnected);

        // Closing twice reports the terminal state back
        assert_eq!(tracker.close().await, ConnectionState::Closed);

        assert!(!tracker.begin_connect().await);
        assert!(!tracker.mark_ready().await);
        assert!(!tracker.mark_dropped().await);
        assert!(tracker.is_closed().await);
    }
}
