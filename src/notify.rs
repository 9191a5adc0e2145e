//! Outbound notifications.
//!
//! No real mail transport is wired up; `LogNotifier` records what would
//! have been sent. Mail-server settings from the configuration file are
//! carried along so a future transport can pick them up.

use crate::config::MailConfig;
use crate::error::Result;

pub trait Notifier: Send + Sync {
    fn notify(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Notifier that logs messages instead of delivering them.
pub struct LogNotifier {
    mail: Option<MailConfig>,
}

impl LogNotifier {
    #[must_use]
    pub fn new(mail: Option<MailConfig>) -> Self {
        Self { mail }
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let from = self
            .mail
            .as_ref()
            .map_or("certdesk@localhost", |m| m.from_address.as_str());

        tracing::info!(%to, %from, %subject, "notification (not delivered): {body}");
        Ok(())
    }
}
