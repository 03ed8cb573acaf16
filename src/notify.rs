//! Notification sink for storefront feedback.

use mockall::automock;
use tracing::{info, warn};

/// Fire-and-forget user feedback; the storefront renders these as toasts.
#[automock]
pub trait Notifier: Send + Sync {
    /// Raise a success message.
    fn notify_success(&self, message: &str);

    /// Raise an error message.
    fn notify_error(&self, message: &str);
}

/// A [`Notifier`] that logs instead of displaying; the headless default.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_success(&self, message: &str) {
        info!(%message, "notification");
    }

    fn notify_error(&self, message: &str) {
        warn!(%message, "notification");
    }
}
