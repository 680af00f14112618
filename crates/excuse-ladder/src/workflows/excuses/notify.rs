use serde::{Deserialize, Serialize};
use tracing::warn;

/// Outbound message emitted by handlers and dossier observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

impl Notice {
    pub fn new(
        to: impl Into<String>,
        from: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            from: from.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Trait describing outbound notification hooks (e.g., SMTP or chat adapters).
pub trait NotificationPort: Send + Sync {
    fn send(&self, notice: &Notice) -> Result<(), NotifyError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("recipient '{0}' rejected the notice")]
    Rejected(String),
}

/// Best-effort delivery: failures are logged and swallowed.
pub(crate) fn deliver(port: &dyn NotificationPort, notice: &Notice) {
    if let Err(error) = port.send(notice) {
        warn!(
            to = %notice.to,
            subject = %notice.subject,
            %error,
            "notice delivery failed"
        );
    }
}
