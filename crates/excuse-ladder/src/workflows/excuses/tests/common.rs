use std::sync::{Arc, Mutex};

use crate::config::{LadderConfig, LadderRoster};
use crate::workflows::excuses::{
    AuditRegistry, Category, DossierEntry, DossierObserver, EmployeeRef, EscalationChain, Excuse,
    LadderContext, Notice, NotificationPort, NotifyError,
};

pub(super) fn employee(id: u32) -> EmployeeRef {
    EmployeeRef::new(
        id,
        format!("Employee {id}"),
        format!("employee{id}@excuses.example"),
    )
}

pub(super) fn excuse(id: u32, category: Category) -> Excuse {
    Excuse::new(
        employee(id),
        category,
        format!("{} excuse filed by employee {id}", category.label()),
    )
}

pub(super) fn roster() -> LadderRoster {
    LadderRoster::default()
}

pub(super) fn addresses() -> LadderConfig {
    LadderConfig::default()
}

pub(super) fn context(notifier: Arc<dyn NotificationPort>) -> (LadderContext, Arc<AuditRegistry>) {
    let registry = Arc::new(AuditRegistry::new());
    let context = LadderContext::new(notifier, registry.clone(), addresses());
    (context, registry)
}

pub(super) fn build_chain() -> (EscalationChain, Arc<MemoryNotifier>, Arc<AuditRegistry>) {
    let notifier = Arc::new(MemoryNotifier::default());
    let (context, registry) = context(notifier.clone());
    let chain = EscalationChain::standard(context, &roster());
    (chain, notifier, registry)
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl MemoryNotifier {
    pub(super) fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }

    pub(super) fn subjects(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .map(|notice| notice.subject)
            .collect()
    }

    pub(super) fn addressed_to(&self, address: &str) -> Vec<Notice> {
        self.notices()
            .into_iter()
            .filter(|notice| notice.to == address)
            .collect()
    }
}

impl NotificationPort for MemoryNotifier {
    fn send(&self, notice: &Notice) -> Result<(), NotifyError> {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice.clone());
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl NotificationPort for FailingNotifier {
    fn send(&self, _notice: &Notice) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp relay offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct RecordingObserver {
    entries: Mutex<Vec<DossierEntry>>,
}

impl RecordingObserver {
    pub(super) fn entries(&self) -> Vec<DossierEntry> {
        self.entries.lock().expect("observer mutex poisoned").clone()
    }
}

impl DossierObserver for RecordingObserver {
    fn update(&self, entry: &DossierEntry) {
        self.entries
            .lock()
            .expect("observer mutex poisoned")
            .push(entry.clone());
    }
}
