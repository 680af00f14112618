//! Excuse adjudication: the escalation ladder, per-handler handling modes, and
//! the audit registry that archives top-authority rulings.
//!
//! An excuse enters at [`EscalationChain::dispose`] and walks the ladder until
//! a handler whose authority accepts its category, and whose mode lets it,
//! rules on it. Rulings by a handler holding implausible authority on an
//! implausible excuse become [`DossierEntry`] records in the [`AuditRegistry`].

pub mod chain;
mod context;
pub mod domain;
pub mod handler;
pub mod mode;
pub mod notify;
pub mod registry;

#[cfg(test)]
mod tests;

pub use chain::{ChainError, Disposition, EscalationChain, EscalationChainBuilder};
pub use context::LadderContext;
pub use domain::{
    AuthoritySet, Capability, Category, EmployeeId, EmployeeRef, Excuse, ModerateRoutines,
    ParseError,
};
pub use handler::{DecisionMaker, HandlerKey, HandlerView, Rung};
pub use mode::Mode;
pub use notify::{Notice, NotificationPort, NotifyError};
pub use registry::{AuditRegistry, DossierEntry, DossierObserver, RegistryError};
