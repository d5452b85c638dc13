//! Repository layer for data access.
//!
//! Each entity has a storage trait with a SeaORM implementation; the
//! in-memory store implements all three for tests and embedding.

pub mod entities;
mod memory;
mod role_repository;
mod status_repository;
mod transaction;
mod user_repository;

pub use memory::InMemoryStore;
pub use role_repository::{RoleRepository, RoleStore};
pub use status_repository::{StatusRepository, StatusStore};
pub use user_repository::{
    UserRepository, UserStore, EMAIL_UNIQUE_INDEX, NATIONAL_ID_UNIQUE_INDEX,
    REFERRAL_CODE_UNIQUE_INDEX,
};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use role_repository::MockRoleRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use status_repository::MockStatusRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
