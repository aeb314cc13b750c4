/// Notification delivery for access requests
///
/// When someone without an account asks for access, the on-duty
/// administrators should hear about it. This module defines the
/// contract for that delivery and ships two implementations:
///
/// - [`LogNotifier`]: writes a structured log line (the default)
/// - [`MockNotifier`]: records notifications in memory for tests
///
/// # Delivery Contract
///
/// Implementations must:
/// 1. Implement the `Notifier` trait (async)
/// 2. Be cheap enough to call inline from a request handler
/// 3. Treat delivery as best-effort; the caller logs failures and
///    still accepts the request
///
/// # Example
///
/// ```
/// use fielddesk_shared::notify::{MockNotifier, Notifier};
/// use fielddesk_shared::models::access_request::AccessRequest;
///
/// # async fn example(request: &AccessRequest) -> anyhow::Result<()> {
/// let notifier = MockNotifier::new();
/// notifier.access_request_received(request).await?;
/// assert_eq!(notifier.received().len(), 1);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use std::sync::Mutex;

use crate::models::access_request::AccessRequest;

/// Contract for delivering access-request notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Adapter name (for logging)
    fn name(&self) -> &str;

    /// Called after a new access request has been stored
    async fn access_request_received(&self, request: &AccessRequest) -> anyhow::Result<()>;
}

/// Notifier that writes a structured log line per request
///
/// Stands in for a mail or chat integration. Administrators watching
/// the service logs see new requests as they arrive.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn access_request_received(&self, request: &AccessRequest) -> anyhow::Result<()> {
        tracing::info!(
            request_id = request.id,
            full_name = %request.full_name,
            email = %request.email,
            location = %request.location,
            "new access request received"
        );
        Ok(())
    }
}

/// Notifier that records every notification in memory
///
/// Used by tests to assert that a handler triggered delivery without
/// touching any external system.
#[derive(Debug, Default)]
pub struct MockNotifier {
    received: Mutex<Vec<AccessRequest>>,
    /// When set, deliveries fail with this message
    fail_with: Mutex<Option<String>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far
    pub fn received(&self) -> Vec<AccessRequest> {
        self.received
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Makes every subsequent delivery fail with the given message
    pub fn fail_with(&self, message: &str) {
        if let Ok(mut guard) = self.fail_with.lock() {
            *guard = Some(message.to_string());
        }
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn access_request_received(&self, request: &AccessRequest) -> anyhow::Result<()> {
        if let Ok(guard) = self.fail_with.lock() {
            if let Some(message) = guard.as_ref() {
                anyhow::bail!("{message}");
            }
        }
        if let Ok(mut guard) = self.received.lock() {
            guard.push(request.clone());
        }
        Ok(())
    }
}
