//! Role registry entity.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::MAX_ROLE_NAME_LENGTH;
use crate::error::DomainResult;

/// Storage-assigned role identifier
pub type RoleId = i64;

/// A role a user account may hold.
///
/// Names are not unique; lookups by name resolve to the first-created match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

/// Role creation data
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewRole {
    #[validate(length(min = 1, max = MAX_ROLE_NAME_LENGTH))]
    pub name: String,
}

impl NewRole {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Check field bounds before the record reaches storage
    pub fn check(&self) -> DomainResult<()> {
        self.validate()?;
        Ok(())
    }
}
