use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::context::LadderContext;
use super::domain::{Capability, EmployeeId, EmployeeRef, Excuse, ParseError};
use super::handler::{DecisionMaker, HandlerKey, HandlerView, Rung};
use super::mode::{Mode, Step};
use super::registry::AuditRegistry;
use crate::config::LadderRoster;

/// Result of walking an excuse down the ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Disposition {
    Ruled { key: HandlerKey, name: String },
    Dropped,
}

impl Disposition {
    pub fn ruled_by(&self) -> Option<&HandlerKey> {
        match self {
            Disposition::Ruled { key, .. } => Some(key),
            Disposition::Dropped => None,
        }
    }
}

/// Misconfiguration or misuse of the ladder.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("excuse for employee {0} was already ruled on")]
    AlreadyRuled(EmployeeId),
    #[error("no handler registered under '{0}'")]
    UnknownHandler(HandlerKey),
    #[error("handler key '{0}' is used more than once")]
    DuplicateHandler(HandlerKey),
    #[error("ad-hoc handler '{0}' needs at least one capability")]
    EmptyAuthority(HandlerKey),
    #[error("no handler can rule on {0} excuses")]
    NoHandlerWithCapability(Capability),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Ordered handlers ending in a terminal node that accepts nothing.
#[derive(Debug)]
pub struct EscalationChain {
    handlers: Vec<DecisionMaker>,
    context: LadderContext,
}

impl EscalationChain {
    /// Receptionist, supervisor, HR manager and CEO, in that order.
    pub fn standard(context: LadderContext, roster: &LadderRoster) -> Self {
        let handlers = Rung::ordered()
            .into_iter()
            .map(|rung| DecisionMaker::for_rung(rung, staff_for(roster, rung), &context))
            .collect();
        Self::link(handlers, context)
    }

    pub fn builder(context: LadderContext) -> EscalationChainBuilder {
        EscalationChainBuilder {
            context,
            handlers: Vec::new(),
        }
    }

    fn link(mut handlers: Vec<DecisionMaker>, context: LadderContext) -> Self {
        handlers.push(DecisionMaker::fallback());
        Self { handlers, context }
    }

    /// Walk the ladder until one handler rules or the terminal node is reached.
    pub fn dispose(&self, excuse: &mut Excuse) -> Result<Disposition, ChainError> {
        if excuse.is_ruled() {
            return Err(ChainError::AlreadyRuled(excuse.employee().id));
        }

        for handler in &self.handlers {
            if !excuse.category().accepted_by(handler.authority()) {
                debug!(
                    handler = %handler.key(),
                    category = %excuse.category(),
                    "outside authority, forwarding"
                );
                continue;
            }

            match handler.mode().resolve(handler, excuse, &self.context) {
                Step::Rule => {
                    handler.rule(excuse, &self.context);
                    info!(
                        handler = %handler.key(),
                        employee = %excuse.employee().id,
                        category = %excuse.category(),
                        "excuse ruled"
                    );
                    return Ok(Disposition::Ruled {
                        key: handler.key().clone(),
                        name: handler.name().to_string(),
                    });
                }
                Step::Forward => continue,
            }
        }

        warn!(
            employee = %excuse.employee().id,
            category = %excuse.category(),
            "no handler ruled on the excuse, dropping it"
        );
        Ok(Disposition::Dropped)
    }

    pub fn handler(&self, key: &HandlerKey) -> Result<&DecisionMaker, ChainError> {
        self.staffed()
            .find(|handler| handler.key() == key)
            .ok_or_else(|| ChainError::UnknownHandler(key.clone()))
    }

    pub fn set_mode(&self, key: &HandlerKey, mode: Mode) -> Result<(), ChainError> {
        self.handler(key)?.set_mode(mode);
        Ok(())
    }

    pub fn set_mode_by_label(&self, key: &str, mode: &str) -> Result<(), ChainError> {
        let mode: Mode = mode.parse()?;
        self.set_mode(&HandlerKey::new(key), mode)
    }

    /// Every handler except the terminal node, in chain order.
    pub fn handlers(&self) -> Vec<HandlerView> {
        self.staffed().map(DecisionMaker::view).collect()
    }

    pub fn handlers_with_capability(
        &self,
        capability: Capability,
    ) -> Result<Vec<HandlerView>, ChainError> {
        let matching: Vec<HandlerView> = self
            .staffed()
            .filter(|handler| handler.authority().grants(capability))
            .map(DecisionMaker::view)
            .collect();

        if matching.is_empty() {
            return Err(ChainError::NoHandlerWithCapability(capability));
        }
        Ok(matching)
    }

    pub fn registry(&self) -> &Arc<AuditRegistry> {
        self.context.registry()
    }

    /// Number of staffed handlers, not counting the terminal node.
    pub fn len(&self) -> usize {
        self.handlers.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn staffed(&self) -> impl Iterator<Item = &DecisionMaker> {
        self.handlers.iter().filter(|handler| !handler.is_fallback())
    }
}

/// Assembles a chain with ad-hoc handlers placed anywhere along the ladder.
#[derive(Debug)]
pub struct EscalationChainBuilder {
    context: LadderContext,
    handlers: Vec<DecisionMaker>,
}

impl EscalationChainBuilder {
    pub fn rung(mut self, rung: Rung, staff: &EmployeeRef) -> Self {
        let handler = DecisionMaker::for_rung(rung, staff, &self.context);
        self.handlers.push(handler);
        self
    }

    pub fn ad_hoc<I>(
        mut self,
        key: impl AsRef<str>,
        staff: &EmployeeRef,
        capabilities: I,
    ) -> Result<Self, ChainError>
    where
        I: IntoIterator<Item = Capability>,
    {
        let handler =
            DecisionMaker::ad_hoc(HandlerKey::new(key), staff, capabilities, &self.context)?;
        self.handlers.push(handler);
        Ok(self)
    }

    pub fn build(self) -> Result<EscalationChain, ChainError> {
        if let Some(duplicate) = first_duplicate(&self.handlers) {
            return Err(ChainError::DuplicateHandler(duplicate));
        }
        Ok(EscalationChain::link(self.handlers, self.context))
    }
}

fn first_duplicate(handlers: &[DecisionMaker]) -> Option<HandlerKey> {
    let mut seen = HashSet::new();
    handlers
        .iter()
        .map(DecisionMaker::key)
        .find(|key| !seen.insert(*key))
        .cloned()
}

fn staff_for(roster: &LadderRoster, rung: Rung) -> &EmployeeRef {
    match rung {
        Rung::Reception => &roster.receptionist,
        Rung::AreaSupervision => &roster.supervisor,
        Rung::HumanResources => &roster.hr_manager,
        Rung::Executive => &roster.ceo,
    }
}
