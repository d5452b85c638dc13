//! Domain layer - Account entities, lifecycle rules and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Storage and transport live in the service crates.

pub mod account;
pub mod constants;
pub mod error;
pub mod referral;
pub mod role;
pub mod status;
pub mod user;

pub use account::Account;
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use referral::{generate_referral_code, ReferralCredit};
pub use role::{NewRole, Role, RoleId};
pub use status::{AccountStatus, NewStatus, Status, StatusId};
pub use user::{is_loyalty_email, NewUser, PointsChange, User, UserDraft, UserId, UserUpdate};
