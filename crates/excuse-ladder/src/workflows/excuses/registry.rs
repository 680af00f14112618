use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::domain::{AuthoritySet, Category, EmployeeId, EmployeeRef, Excuse};

/// Archived record of a top-authority ruling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DossierEntry {
    employee: EmployeeRef,
    excuse: Excuse,
    employee_id: EmployeeId,
    recorded_at: DateTime<Utc>,
}

impl DossierEntry {
    fn from_excuse(excuse: &Excuse) -> Self {
        Self {
            employee: excuse.employee().clone(),
            excuse: excuse.clone(),
            employee_id: excuse.employee().id,
            recorded_at: Utc::now(),
        }
    }

    pub fn employee(&self) -> &EmployeeRef {
        &self.employee
    }

    pub fn excuse(&self) -> &Excuse {
        &self.excuse
    }

    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Receives every dossier entry the registry records.
pub trait DossierObserver: Send + Sync {
    fn update(&self, entry: &DossierEntry);
}

/// Registry error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("there are no dossier entries to clear")]
    NothingToClear,
}

/// Subject holding the dossier entries and the observers notified of new ones.
#[derive(Default)]
pub struct AuditRegistry {
    entries: RwLock<Vec<DossierEntry>>,
    observers: RwLock<Vec<Arc<dyn DossierObserver>>>,
}

impl AuditRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recording rule: the ruling authority must hold the implausible flag
    /// and accept the excuse's category.
    pub fn should_record(excuse: &Excuse, authority: &AuthoritySet) -> bool {
        authority.implausible && excuse.category().accepted_by(authority)
    }

    /// Record the ruling when the recording rule holds, then publish the new entry.
    pub fn report_ruling(&self, excuse: &Excuse, authority: &AuthoritySet) -> Option<DossierEntry> {
        if !Self::should_record(excuse, authority) {
            debug!(
                employee = %excuse.employee().id,
                category = %excuse.category(),
                "ruling does not warrant a dossier entry"
            );
            return None;
        }

        let entry = DossierEntry::from_excuse(excuse);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());

        info!(
            employee = %entry.employee_id(),
            name = %entry.employee().name,
            "dossier entry recorded"
        );

        self.publish(&entry);
        Some(entry)
    }

    pub fn entries(&self) -> Vec<DossierEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn entries_for(&self, employee: EmployeeId) -> Vec<DossierEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.employee_id == employee)
            .cloned()
            .collect()
    }

    pub fn entries_with_category(&self, category: Category) -> Vec<DossierEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.excuse.category() == category)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry present at call time and return how many there were.
    pub fn clear_entries(&self) -> Result<usize, RegistryError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.is_empty() {
            return Err(RegistryError::NothingToClear);
        }
        let removed = entries.len();
        entries.clear();
        info!(removed, "dossier entries cleared");
        Ok(removed)
    }

    /// Returns `false` when the observer was already subscribed.
    pub fn subscribe(&self, observer: Arc<dyn DossierObserver>) -> bool {
        let mut observers = self
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if observers
            .iter()
            .any(|existing| same_observer(existing, &observer))
        {
            return false;
        }
        observers.push(observer);
        true
    }

    /// Returns `false` when the observer was not subscribed.
    pub fn unsubscribe(&self, observer: &Arc<dyn DossierObserver>) -> bool {
        let mut observers = self
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|existing| !same_observer(existing, observer));
        observers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn publish(&self, entry: &DossierEntry) {
        // Observers may (un)subscribe while being notified, so deliver to a copy.
        let snapshot: Vec<Arc<dyn DossierObserver>> = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for observer in snapshot {
            observer.update(entry);
        }
    }
}

impl fmt::Debug for AuditRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditRegistry")
            .field("entries", &self.len())
            .field("observers", &self.subscriber_count())
            .finish()
    }
}

fn same_observer(a: &Arc<dyn DossierObserver>, b: &Arc<dyn DossierObserver>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
