//! User-facing notification seam.
//!
//! Layer failures never crash the toggle protocol; they surface through a
//! [`Notifier`] as an auto-dismissing message owned by the UI collaborator.

use tracing::warn;

/// Receiver of user-facing, non-fatal notifications.
pub trait Notifier: Send + Sync {
    /// Surfaces an error message to the user.
    fn error(&self, message: &str);
}

/// Notifier that routes messages to the tracing log.
///
/// The default for headless operation and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        warn!(message, "user notification");
    }
}
