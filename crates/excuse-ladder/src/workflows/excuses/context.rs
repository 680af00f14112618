use std::fmt;
use std::sync::Arc;

use super::notify::{deliver, Notice, NotificationPort};
use super::registry::AuditRegistry;
use crate::config::LadderConfig;

/// Collaborators shared by every handler of a ladder.
#[derive(Clone)]
pub struct LadderContext {
    notifier: Arc<dyn NotificationPort>,
    registry: Arc<AuditRegistry>,
    addresses: LadderConfig,
}

impl LadderContext {
    pub fn new(
        notifier: Arc<dyn NotificationPort>,
        registry: Arc<AuditRegistry>,
        addresses: LadderConfig,
    ) -> Self {
        Self {
            notifier,
            registry,
            addresses,
        }
    }

    pub fn registry(&self) -> &Arc<AuditRegistry> {
        &self.registry
    }

    pub fn addresses(&self) -> &LadderConfig {
        &self.addresses
    }

    pub(crate) fn notifier(&self) -> &Arc<dyn NotificationPort> {
        &self.notifier
    }

    pub(crate) fn notify(&self, notice: Notice) {
        deliver(self.notifier.as_ref(), &notice);
    }
}

impl fmt::Debug for LadderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LadderContext")
            .field("registry", &self.registry)
            .field("addresses", &self.addresses)
            .finish_non_exhaustive()
    }
}
