//! Account status registry entity and the account lifecycle state machine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{MAX_STATUS_NAME_LENGTH, STATUS_ACTIVE, STATUS_INACTIVE, STATUS_SUSPENDED};
use crate::error::{DomainError, DomainResult};

/// Storage-assigned status identifier
pub type StatusId = i64;

/// A named account status record held by the status registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: StatusId,
    pub name: String,
}

impl Status {
    /// Lifecycle state this record names, if it names one
    pub fn account_status(&self) -> Option<AccountStatus> {
        self.name.parse().ok()
    }
}

/// Status creation data
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewStatus {
    #[validate(length(min = 1, max = MAX_STATUS_NAME_LENGTH))]
    pub name: String,
}

impl NewStatus {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Check field bounds before the record reaches storage
    pub fn check(&self) -> DomainResult<()> {
        self.validate()?;
        Ok(())
    }
}

/// Lifecycle state carried by every account.
///
/// Persisted as its registry name (`ACTIVO`, `INACTIVO`, `SUSPENDIDO`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountStatus {
    #[default]
    #[serde(rename = "ACTIVO")]
    Active,
    #[serde(rename = "INACTIVO")]
    Inactive,
    #[serde(rename = "SUSPENDIDO")]
    Suspended,
}

impl AccountStatus {
    /// Registry name of this state
    pub fn name(&self) -> &'static str {
        match self {
            AccountStatus::Active => STATUS_ACTIVE,
            AccountStatus::Inactive => STATUS_INACTIVE,
            AccountStatus::Suspended => STATUS_SUSPENDED,
        }
    }

    /// Check whether the lifecycle allows moving from `self` to `target`
    pub fn can_transition_to(&self, target: AccountStatus) -> bool {
        use AccountStatus::*;

        matches!(
            (self, target),
            (Active, Inactive)
                | (Active, Suspended)
                | (Inactive, Active)
                | (Suspended, Active)
                | (Suspended, Inactive)
        )
    }

    /// Validate a transition, returning the new state
    pub fn transition_to(self, target: AccountStatus) -> DomainResult<AccountStatus> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(DomainError::InvalidTransition {
                from: self,
                to: target,
            })
        }
    }
}

impl FromStr for AccountStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_ACTIVE => Ok(AccountStatus::Active),
            STATUS_INACTIVE => Ok(AccountStatus::Inactive),
            STATUS_SUSPENDED => Ok(AccountStatus::Suspended),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
