//! User-facing error notifications.

use std::sync::{Mutex, PoisonError};

/// Channel for messages shown to the shopper. Fire-and-forget.
pub trait NotificationSink: Send + Sync {
    fn report_error(&self, message: &str);
}

/// Emits notifications as `warn` events on the `shoecart::notify` target
/// and records them as Sentry breadcrumbs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn report_error(&self, message: &str) {
        tracing::warn!(target: "shoecart::notify", "{message}");
        crate::error::add_breadcrumb("cart", message, None);
    }
}

/// Keeps every reported message, in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages reported so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the recorded messages.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl NotificationSink for RecordingNotifier {
    fn report_error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

impl<T: NotificationSink + ?Sized> NotificationSink for std::sync::Arc<T> {
    fn report_error(&self, message: &str) {
        (**self).report_error(message);
    }
}
