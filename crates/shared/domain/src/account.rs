//! Account view: a user together with its resolved role and status records.

use serde::Serialize;

use crate::role::Role;
use crate::status::Status;
use crate::user::User;

/// A user record plus its associated role and status.
///
/// `role` and `status` are `None` when the reference does not resolve
/// in the registries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub user: User,
    pub role: Option<Role>,
    pub status: Option<Status>,
}
