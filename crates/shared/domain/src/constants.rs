//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Roles
// =============================================================================

/// Platform administrator
pub const ROLE_ADMIN: &str = "ADMIN";

/// Property owner
pub const ROLE_OWNER: &str = "PROPIETARIO";

/// Tenant, the role given to self-registered accounts
pub const ROLE_TENANT: &str = "ARRIENDATARIO";

/// Role assigned at registration when the draft names none
pub const DEFAULT_ROLE_NAME: &str = ROLE_TENANT;

/// Roles created by master-data seeding, in id order
pub const SEED_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_OWNER, ROLE_TENANT];

// =============================================================================
// Statuses
// =============================================================================

pub const STATUS_ACTIVE: &str = "ACTIVO";
pub const STATUS_INACTIVE: &str = "INACTIVO";
pub const STATUS_SUSPENDED: &str = "SUSPENDIDO";

/// Statuses created by master-data seeding, in id order
pub const SEED_STATUSES: &[&str] = &[STATUS_ACTIVE, STATUS_INACTIVE, STATUS_SUSPENDED];

// =============================================================================
// Field limits
// =============================================================================

pub const MAX_ROLE_NAME_LENGTH: u64 = 60;
pub const MAX_STATUS_NAME_LENGTH: u64 = 20;
pub const MAX_PERSON_NAME_LENGTH: u64 = 60;
pub const MAX_EMAIL_LENGTH: u64 = 200;
pub const MAX_NATIONAL_ID_LENGTH: u64 = 10;
pub const MAX_PHONE_LENGTH: u64 = 12;
pub const MAX_PASSWORD_HASH_LENGTH: u64 = 100;
pub const MAX_REFERRAL_CODE_LENGTH: u64 = 20;

// =============================================================================
// Registration rules
// =============================================================================

/// Minimum age in whole years to open an account
pub const MINIMUM_AGE_YEARS: u32 = 18;

/// Email domain that grants the institutional loyalty flag
pub const LOYALTY_EMAIL_DOMAIN: &str = "@duoc.cl";

/// Points balance of a freshly registered account
pub const INITIAL_LOYALTY_POINTS: u32 = 0;

/// Points credited to the referrer when a referred account registers
pub const REFERRAL_REWARD_POINTS: u32 = 100;

// =============================================================================
// Referral codes
// =============================================================================

/// Length of generated referral codes
pub const REFERRAL_CODE_LENGTH: usize = 9;

/// Alphabet generated referral codes are drawn from
pub const REFERRAL_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Attempts before giving up on finding an unused referral code
pub const MAX_REFERRAL_CODE_ATTEMPTS: usize = 10;
