use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Payroll number identifying an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(pub u32);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully resolved employee reference supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRef {
    pub id: EmployeeId,
    pub name: String,
    pub email: String,
}

impl EmployeeRef {
    pub fn new(id: u32, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: EmployeeId(id),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Severity classification of an excuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Minor,
    ModerateElectrical,
    ModerateFamily,
    Complex,
    Implausible,
}

impl Category {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Minor,
            Self::ModerateElectrical,
            Self::ModerateFamily,
            Self::Complex,
            Self::Implausible,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::ModerateElectrical => "moderate_electrical",
            Self::ModerateFamily => "moderate_family",
            Self::Complex => "complex",
            Self::Implausible => "implausible",
        }
    }

    /// Whether a handler holding `authority` may rule on this category.
    pub const fn accepted_by(self, authority: &AuthoritySet) -> bool {
        match self {
            Self::Minor => authority.minor,
            Self::ModerateElectrical | Self::ModerateFamily => authority.moderate,
            Self::Complex => authority.complex,
            Self::Implausible => authority.implausible,
        }
    }

    /// Let the category pick which of the moderate desk's routines handles `excuse`.
    pub fn route_to<D>(self, desk: &D, excuse: &Excuse)
    where
        D: ModerateRoutines + ?Sized,
    {
        match self {
            Self::ModerateElectrical => desk.electrical_issue(excuse),
            Self::ModerateFamily => desk.family_issue(excuse),
            Self::Minor | Self::Complex | Self::Implausible => desk.generic_moderate(excuse),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(value);
        Self::ordered()
            .into_iter()
            .find(|category| category.label() == normalized)
            .ok_or_else(|| ParseError::UnknownCategory(value.trim().to_string()))
    }
}

/// Routines offered by the moderate-authority desk to [`Category::route_to`].
pub trait ModerateRoutines {
    fn generic_moderate(&self, excuse: &Excuse);
    fn electrical_issue(&self, excuse: &Excuse);
    fn family_issue(&self, excuse: &Excuse);
}

/// One authority flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Minor,
    Moderate,
    Complex,
    Implausible,
}

impl Capability {
    pub const fn ordered() -> [Self; 4] {
        [Self::Minor, Self::Moderate, Self::Complex, Self::Implausible]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
            Self::Implausible => "implausible",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Capability {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(value);
        Self::ordered()
            .into_iter()
            .find(|capability| capability.label() == normalized)
            .ok_or_else(|| ParseError::UnknownCapability(value.trim().to_string()))
    }
}

/// Which categories a handler may rule on.
///
/// Standard rungs hold exactly one flag, the terminal node none, and ad-hoc
/// handlers any non-empty combination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthoritySet {
    pub minor: bool,
    pub moderate: bool,
    pub complex: bool,
    pub implausible: bool,
}

impl AuthoritySet {
    pub const fn none() -> Self {
        Self {
            minor: false,
            moderate: false,
            complex: false,
            implausible: false,
        }
    }

    pub const fn only(capability: Capability) -> Self {
        Self::none().with(capability)
    }

    pub const fn with(mut self, capability: Capability) -> Self {
        match capability {
            Capability::Minor => self.minor = true,
            Capability::Moderate => self.moderate = true,
            Capability::Complex => self.complex = true,
            Capability::Implausible => self.implausible = true,
        }
        self
    }

    pub fn from_capabilities<I>(capabilities: I) -> Self
    where
        I: IntoIterator<Item = Capability>,
    {
        capabilities
            .into_iter()
            .fold(Self::none(), |authority, capability| authority.with(capability))
    }

    pub const fn grants(&self, capability: Capability) -> bool {
        match capability {
            Capability::Minor => self.minor,
            Capability::Moderate => self.moderate,
            Capability::Complex => self.complex,
            Capability::Implausible => self.implausible,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::none()
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ordered()
            .into_iter()
            .filter(|capability| self.grants(*capability))
            .collect()
    }
}

/// An absence justification submitted for adjudication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Excuse {
    employee: EmployeeRef,
    category: Category,
    description: String,
    ruled: bool,
}

impl Excuse {
    pub fn new(employee: EmployeeRef, category: Category, description: impl Into<String>) -> Self {
        Self {
            employee,
            category,
            description: description.into(),
            ruled: false,
        }
    }

    pub fn employee(&self) -> &EmployeeRef {
        &self.employee
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_ruled(&self) -> bool {
        self.ruled
    }

    pub(crate) fn mark_ruled(&mut self) {
        self.ruled = true;
    }
}

/// Text that does not name a known category, capability or mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown excuse category '{0}'")]
    UnknownCategory(String),
    #[error("unknown capability '{0}'")]
    UnknownCapability(String),
    #[error("unknown handling mode '{0}'")]
    UnknownMode(String),
}

pub(crate) fn normalize(value: &str) -> String {
    value.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}
