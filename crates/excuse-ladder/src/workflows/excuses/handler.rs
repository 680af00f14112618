use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::chain::ChainError;
use super::context::LadderContext;
use super::domain::{AuthoritySet, Capability, EmployeeRef, Excuse, ModerateRoutines};
use super::mode::Mode;
use super::notify::{deliver, Notice, NotificationPort};
use super::registry::{AuditRegistry, DossierEntry, DossierObserver};

/// Lookup handle for a handler inside a chain. Keys are trimmed and
/// lowercased, so `"NightDesk"` and `" nightdesk "` name the same handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HandlerKey(String);

impl HandlerKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(key.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The four standard positions of the ladder, lowest authority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rung {
    Reception,
    AreaSupervision,
    HumanResources,
    Executive,
}

impl Rung {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Reception,
            Self::AreaSupervision,
            Self::HumanResources,
            Self::Executive,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Reception => "receptionist",
            Self::AreaSupervision => "supervisor",
            Self::HumanResources => "hr_manager",
            Self::Executive => "ceo",
        }
    }

    pub const fn capability(self) -> Capability {
        match self {
            Self::Reception => Capability::Minor,
            Self::AreaSupervision => Capability::Moderate,
            Self::HumanResources => Capability::Complex,
            Self::Executive => Capability::Implausible,
        }
    }

    pub const fn authority(self) -> AuthoritySet {
        AuthoritySet::only(self.capability())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Routine {
    Rung(Rung),
    AdHoc,
    Fallback,
}

/// One rung of the escalation ladder.
///
/// Authority and ruling routine are fixed at construction; only the mode can
/// be reassigned afterwards.
pub struct DecisionMaker {
    key: HandlerKey,
    name: String,
    address: String,
    authority: AuthoritySet,
    routine: Routine,
    mode: RwLock<Mode>,
    relay: Option<RelaySubscription>,
}

impl DecisionMaker {
    pub fn for_rung(rung: Rung, staff: &EmployeeRef, context: &LadderContext) -> Self {
        Self::assemble(
            HandlerKey::new(rung.key()),
            staff,
            rung.authority(),
            Routine::Rung(rung),
            context,
        )
    }

    /// A flexible handler placed outside the standard ladder.
    pub fn ad_hoc<I>(
        key: HandlerKey,
        staff: &EmployeeRef,
        capabilities: I,
        context: &LadderContext,
    ) -> Result<Self, ChainError>
    where
        I: IntoIterator<Item = Capability>,
    {
        let authority = AuthoritySet::from_capabilities(capabilities);
        if authority.is_empty() {
            return Err(ChainError::EmptyAuthority(key));
        }
        Ok(Self::assemble(
            key,
            staff,
            authority,
            Routine::AdHoc,
            context,
        ))
    }

    pub(crate) fn fallback() -> Self {
        Self {
            key: HandlerKey::new("default"),
            name: "Default handler".to_string(),
            address: String::new(),
            authority: AuthoritySet::none(),
            routine: Routine::Fallback,
            mode: RwLock::new(Mode::Direct),
            relay: None,
        }
    }

    fn assemble(
        key: HandlerKey,
        staff: &EmployeeRef,
        authority: AuthoritySet,
        routine: Routine,
        context: &LadderContext,
    ) -> Self {
        let relay = authority.implausible.then(|| {
            RelaySubscription::register(
                ExecutiveRelay {
                    name: staff.name.clone(),
                    address: staff.email.clone(),
                    broadcast_address: context.addresses().executive_broadcast_address.clone(),
                    notifier: Arc::clone(context.notifier()),
                },
                context.registry(),
            )
        });

        Self {
            key,
            name: staff.name.clone(),
            address: staff.email.clone(),
            authority,
            routine,
            mode: RwLock::new(Mode::default()),
            relay,
        }
    }

    pub fn key(&self) -> &HandlerKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn authority(&self) -> &AuthoritySet {
        &self.authority
    }

    pub fn rung(&self) -> Option<Rung> {
        match self.routine {
            Routine::Rung(rung) => Some(rung),
            Routine::AdHoc | Routine::Fallback => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.routine == Routine::Fallback
    }

    /// Whether this handler keeps a relay subscribed to the audit registry.
    pub fn relays_dossier_entries(&self) -> bool {
        self.relay.is_some()
    }

    pub fn mode(&self) -> Mode {
        *self.mode.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_mode(&self, mode: Mode) {
        let mut current = self.mode.write().unwrap_or_else(PoisonError::into_inner);
        let previous = *current;
        if previous != mode {
            info!(handler = %self.key, from = %previous, to = %mode, "handling mode changed");
        }
        *current = mode;
    }

    pub fn view(&self) -> HandlerView {
        HandlerView {
            key: self.key.clone(),
            name: self.name.clone(),
            address: self.address.clone(),
            mode: self.mode(),
            capabilities: self.authority.capabilities(),
        }
    }

    /// Dispose of `excuse` with this handler's fixed routine.
    pub(crate) fn rule(&self, excuse: &mut Excuse, context: &LadderContext) {
        excuse.mark_ruled();
        let employee = excuse.employee();

        match self.routine {
            Routine::Rung(Rung::Reception) => context.notify(Notice::new(
                employee.email.as_str(),
                self.address.as_str(),
                "Excuse accepted",
                "Your absence has been excused.",
            )),
            Routine::Rung(Rung::AreaSupervision) => {
                let desk = SupervisorDesk {
                    handler: self,
                    context,
                };
                excuse.category().route_to(&desk, excuse);
            }
            Routine::Rung(Rung::HumanResources) => {
                info!(
                    handler = %self.key,
                    employee = %employee.id,
                    description = %excuse.description(),
                    "human resources reviewing complex excuse"
                );
                context.notify(Notice::new(
                    employee.email.as_str(),
                    self.address.as_str(),
                    "Excuse reviewed by human resources",
                    format!("{} reviewed your excuse and accepted it.", self.name),
                ));
            }
            Routine::Rung(Rung::Executive) => {
                context.notify(Notice::new(
                    employee.email.as_str(),
                    self.address.as_str(),
                    "CEO response",
                    "Approved for creativity.",
                ));
                context.registry().report_ruling(excuse, &self.authority);
            }
            Routine::AdHoc => {
                info!(
                    handler = %self.key,
                    employee = %employee.id,
                    category = %excuse.category(),
                    "ad-hoc handler processing excuse"
                );
                context.notify(Notice::new(
                    employee.email.as_str(),
                    self.address.as_str(),
                    "Excuse processed",
                    format!(
                        "Your {} excuse was processed by {}.",
                        excuse.category(),
                        self.name
                    ),
                ));
                context.registry().report_ruling(excuse, &self.authority);
            }
            // Accepts nothing, so the chain never asks it to rule.
            Routine::Fallback => {}
        }
    }
}

impl fmt::Debug for DecisionMaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionMaker")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("authority", &self.authority)
            .field("mode", &self.mode())
            .finish_non_exhaustive()
    }
}

/// Serializable snapshot of a handler for directory listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerView {
    pub key: HandlerKey,
    pub name: String,
    pub address: String,
    pub mode: Mode,
    pub capabilities: Vec<Capability>,
}

struct SupervisorDesk<'a> {
    handler: &'a DecisionMaker,
    context: &'a LadderContext,
}

impl ModerateRoutines for SupervisorDesk<'_> {
    fn generic_moderate(&self, excuse: &Excuse) {
        self.context.notify(Notice::new(
            excuse.employee().email.as_str(),
            self.handler.address(),
            "Moderate excuse reviewed",
            format!("{} accepted your excuse.", self.handler.name()),
        ));
    }

    fn electrical_issue(&self, excuse: &Excuse) {
        self.context.notify(Notice::new(
            self.context.addresses().facilities_address.as_str(),
            self.handler.address(),
            "Power outage check",
            format!(
                "Please confirm whether a power outage affected {} (employee {}).",
                excuse.employee().name,
                excuse.employee().id
            ),
        ));
    }

    fn family_issue(&self, excuse: &Excuse) {
        self.context.notify(Notice::new(
            excuse.employee().email.as_str(),
            self.handler.address(),
            "Family matter",
            "Your excuse was accepted. We hope everything is all right at home.",
        ));
    }
}

/// Observer a top-authority handler registers so it hears about every new
/// dossier entry, including ones it did not rule on itself.
struct ExecutiveRelay {
    name: String,
    address: String,
    broadcast_address: String,
    notifier: Arc<dyn NotificationPort>,
}

impl DossierObserver for ExecutiveRelay {
    fn update(&self, entry: &DossierEntry) {
        info!(
            executive = %self.name,
            employee = %entry.employee_id(),
            "relaying new dossier entry to peer executives"
        );
        deliver(
            self.notifier.as_ref(),
            &Notice::new(
                self.broadcast_address.as_str(),
                self.address.as_str(),
                "New dossier entry",
                format!(
                    "A dossier entry was recorded for {} (employee {}).",
                    entry.employee().name,
                    entry.employee_id()
                ),
            ),
        );
    }
}

/// Keeps a relay subscribed for as long as its handler lives.
struct RelaySubscription {
    observer: Arc<dyn DossierObserver>,
    registry: Arc<AuditRegistry>,
}

impl RelaySubscription {
    fn register(relay: ExecutiveRelay, registry: &Arc<AuditRegistry>) -> Self {
        let observer: Arc<dyn DossierObserver> = Arc::new(relay);
        registry.subscribe(Arc::clone(&observer));
        Self {
            observer,
            registry: Arc::clone(registry),
        }
    }
}

impl Drop for RelaySubscription {
    fn drop(&mut self) {
        self.registry.unsubscribe(&self.observer);
    }
}
