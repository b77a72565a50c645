//! Password-reset delivery seam
//!
//! SMTP delivery is an external collaborator; the service only needs a
//! place to hand the raw reset token. The default implementation logs
//! the reset link, which doubles as the development workflow.

use tracing::info;

/// Delivers a password-reset link to an account holder
pub trait ResetNotifier: Send + Sync {
    fn send_reset(&self, email: &str, name: &str, reset_url: &str);
}

/// Logs reset links instead of emailing them
pub struct LogNotifier;

impl ResetNotifier for LogNotifier {
    fn send_reset(&self, email: &str, name: &str, reset_url: &str) {
        info!(
            "Password reset requested for {} ({}): {}",
            name, email, reset_url
        );
    }
}
