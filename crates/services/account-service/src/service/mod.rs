//! Service layer - account use cases.

mod account_directory;
mod container;
mod role_registry;
mod status_registry;

pub use account_directory::{AccountDirectory, AccountManager};
pub use container::Services;
pub use role_registry::{RoleManager, RoleRegistry};
pub use status_registry::{StatusManager, StatusRegistry};
