use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::context::LadderContext;
use super::domain::{normalize, Excuse, ParseError};
use super::handler::DecisionMaker;
use super::notify::Notice;

/// Per-handler strategy deciding whether a capable handler actually rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Direct,
    DirectWithNotice,
    Delegate,
}

/// Outcome of consulting a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Rule,
    Forward,
}

impl Mode {
    pub const fn ordered() -> [Self; 3] {
        [Self::Direct, Self::DirectWithNotice, Self::Delegate]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::DirectWithNotice => "direct_with_notice",
            Self::Delegate => "delegate",
        }
    }

    /// Only consulted once `handler` is known to accept the excuse's category.
    pub(crate) fn resolve(
        self,
        handler: &DecisionMaker,
        excuse: &Excuse,
        context: &LadderContext,
    ) -> Step {
        match self {
            Self::Direct => Step::Rule,
            Self::DirectWithNotice => {
                context.notify(Notice::new(
                    context.addresses().oversight_address.as_str(),
                    handler.address(),
                    "Ruling under oversight",
                    format!(
                        "{} is about to rule on the excuse filed by {} (employee {})",
                        handler.name(),
                        excuse.employee().name,
                        excuse.employee().id
                    ),
                ));
                Step::Rule
            }
            Self::Delegate => {
                debug!(handler = %handler.key(), "delegating despite holding authority");
                Step::Forward
            }
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(value);
        Self::ordered()
            .into_iter()
            .find(|mode| mode.label() == normalized)
            .ok_or_else(|| ParseError::UnknownMode(value.trim().to_string()))
    }
}
