//! User account entity and related types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{
    INITIAL_LOYALTY_POINTS, LOYALTY_EMAIL_DOMAIN, MAX_EMAIL_LENGTH, MAX_NATIONAL_ID_LENGTH,
    MAX_PASSWORD_HASH_LENGTH, MAX_PERSON_NAME_LENGTH, MAX_PHONE_LENGTH, MAX_REFERRAL_CODE_LENGTH,
    MINIMUM_AGE_YEARS,
};
use crate::error::{DomainError, DomainResult};
use crate::role::RoleId;
use crate::status::AccountStatus;

/// Storage-assigned user identifier
pub type UserId = i64;

/// Check whether an email address earns the institutional loyalty flag
pub fn is_loyalty_email(email: &str) -> bool {
    email.to_lowercase().ends_with(LOYALTY_EMAIL_DOMAIN)
}

/// User account entity.
///
/// `email`, `national_id` and `referral_code` are unique across all users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub email: String,
    pub national_id: String,
    pub phone: String,
    pub loyalty_flag: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub loyalty_points: u32,
    pub referral_code: String,
    pub role_id: Option<RoleId>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Refresh the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Apply a profile update. Returns true when the email changed.
    ///
    /// Uniqueness of a new email is the caller's concern; the loyalty flag
    /// follows the email.
    pub fn apply_update(&mut self, update: UserUpdate) -> bool {
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(middle_name) = update.middle_name {
            self.middle_name = middle_name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }

        let email_changed = match update.email {
            Some(email) if email != self.email => {
                self.loyalty_flag = is_loyalty_email(&email);
                self.email = email;
                true
            }
            _ => false,
        };

        self.touch();
        email_changed
    }

    /// Assign a role (existence is checked by the caller)
    pub fn assign_role(&mut self, role_id: RoleId) {
        self.role_id = Some(role_id);
        self.touch();
    }

    /// Move the account through its lifecycle
    pub fn change_status(&mut self, target: AccountStatus) -> DomainResult<()> {
        self.status = self.status.transition_to(target)?;
        self.touch();
        Ok(())
    }

    /// Apply a points change, keeping the balance non-negative
    pub fn apply_points(&mut self, change: PointsChange) -> DomainResult<()> {
        self.loyalty_points = change.apply_to(self.loyalty_points)?;
        self.touch();
        Ok(())
    }
}

/// A change to a loyalty points balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsChange {
    Credit(u32),
    Redeem(u32),
}

impl PointsChange {
    /// Compute the new balance
    pub fn apply_to(self, balance: u32) -> DomainResult<u32> {
        match self {
            PointsChange::Credit(points) => balance
                .checked_add(points)
                .ok_or_else(|| DomainError::validation("Loyalty points balance overflow")),
            PointsChange::Redeem(points) => {
                balance
                    .checked_sub(points)
                    .ok_or(DomainError::InsufficientPoints {
                        balance,
                        requested: points,
                    })
            }
        }
    }
}

/// Candidate account submitted for registration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserDraft {
    #[validate(length(min = 1, max = MAX_PERSON_NAME_LENGTH))]
    pub first_name: String,
    #[validate(length(min = 1, max = MAX_PERSON_NAME_LENGTH))]
    pub middle_name: String,
    #[validate(length(min = 1, max = MAX_PERSON_NAME_LENGTH))]
    pub last_name: String,
    pub birth_date: NaiveDate,
    #[validate(email, length(min = 1, max = MAX_EMAIL_LENGTH))]
    pub email: String,
    #[validate(length(min = 1, max = MAX_NATIONAL_ID_LENGTH))]
    pub national_id: String,
    #[validate(length(min = 1, max = MAX_PHONE_LENGTH))]
    pub phone: String,
    /// Already hashed by the caller; stored opaquely
    #[validate(length(min = 1, max = MAX_PASSWORD_HASH_LENGTH))]
    pub password_hash: String,
    /// Caller-chosen referral code; generated when absent
    #[validate(length(min = 1, max = MAX_REFERRAL_CODE_LENGTH))]
    pub referral_code: Option<String>,
    /// Referral code of the account that referred this one
    pub referred_by: Option<String>,
    pub role_id: Option<RoleId>,
}

impl UserDraft {
    /// Check field presence, bounds and the minimum age as of `today`
    pub fn check(&self, today: NaiveDate) -> DomainResult<()> {
        self.validate()?;
        require_non_blank(&[
            ("first_name", Some(&self.first_name)),
            ("middle_name", Some(&self.middle_name)),
            ("last_name", Some(&self.last_name)),
            ("national_id", Some(&self.national_id)),
            ("phone", Some(&self.phone)),
            ("password_hash", Some(&self.password_hash)),
            ("referral_code", self.referral_code.as_ref()),
        ])?;

        let age = today.years_since(self.birth_date).ok_or_else(|| {
            DomainError::validation("birth_date: must not be in the future")
        })?;
        if age < MINIMUM_AGE_YEARS {
            return Err(DomainError::validation(format!(
                "birth_date: must be at least {} years old to register",
                MINIMUM_AGE_YEARS
            )));
        }

        Ok(())
    }

    /// Build the storage record, with defaults for a fresh account
    pub fn into_new_user(
        self,
        referral_code: String,
        role_id: Option<RoleId>,
        now: DateTime<Utc>,
    ) -> NewUser {
        NewUser {
            loyalty_flag: is_loyalty_email(&self.email),
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            birth_date: self.birth_date,
            email: self.email,
            national_id: self.national_id,
            phone: self.phone,
            password_hash: self.password_hash,
            loyalty_points: INITIAL_LOYALTY_POINTS,
            referral_code,
            role_id,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Fully resolved account record awaiting an identifier from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub email: String,
    pub national_id: String,
    pub phone: String,
    pub loyalty_flag: bool,
    pub password_hash: String,
    pub loyalty_points: u32,
    pub referral_code: String,
    pub role_id: Option<RoleId>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewUser {
    /// Attach the storage-assigned identifier
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            birth_date: self.birth_date,
            email: self.email,
            national_id: self.national_id,
            phone: self.phone,
            loyalty_flag: self.loyalty_flag,
            password_hash: self.password_hash,
            loyalty_points: self.loyalty_points,
            referral_code: self.referral_code,
            role_id: self.role_id,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Profile update data. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 1, max = MAX_PERSON_NAME_LENGTH))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = MAX_PERSON_NAME_LENGTH))]
    pub middle_name: Option<String>,
    #[validate(length(min = 1, max = MAX_PERSON_NAME_LENGTH))]
    pub last_name: Option<String>,
    #[validate(email, length(min = 1, max = MAX_EMAIL_LENGTH))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = MAX_PHONE_LENGTH))]
    pub phone: Option<String>,
}

impl UserUpdate {
    pub fn check(&self) -> DomainResult<()> {
        self.validate()?;
        require_non_blank(&[
            ("first_name", self.first_name.as_ref()),
            ("middle_name", self.middle_name.as_ref()),
            ("last_name", self.last_name.as_ref()),
            ("phone", self.phone.as_ref()),
        ])
    }
}

/// Reject present values made only of whitespace
fn require_non_blank(fields: &[(&str, Option<&String>)]) -> DomainResult<()> {
    for &(field, value) in fields {
        if value.is_some_and(|v| v.trim().is_empty()) {
            return Err(DomainError::validation(format!(
                "{}: must not be blank",
                field
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> UserDraft {
        UserDraft {
            first_name: "Juan".to_string(),
            middle_name: "Carlos".to_string(),
            last_name: "Perez".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1995, 5, 15).unwrap(),
            email: "juan.perez@email.com".to_string(),
            national_id: "12345678-9".to_string(),
            phone: "+56912345678".to_string(),
            password_hash: "hashed".to_string(),
            referral_code: None,
            referred_by: None,
            role_id: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(draft().check(today()).is_ok());
    }

    #[test]
    fn test_oversized_national_id_rejected() {
        let mut d = draft();
        d.national_id = "123456789-01".to_string();
        assert!(matches!(d.check(today()), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_missing_first_name_rejected() {
        let mut d = draft();
        d.first_name = String::new();
        assert!(matches!(d.check(today()), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_blank_fields_rejected() {
        let mut d = draft();
        d.phone = "   ".to_string();
        assert!(matches!(d.check(today()), Err(DomainError::Validation(ref m)) if m.starts_with("phone")));

        let mut d = draft();
        d.national_id = " \t ".to_string();
        assert!(d.check(today()).is_err());

        let update = UserUpdate {
            last_name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(update.check().is_err());
        assert!(UserUpdate::default().check().is_ok());
    }

    #[test]
    fn test_malformed_email_rejected() {
        let mut d = draft();
        d.email = "not-an-email".to_string();
        assert!(d.check(today()).is_err());
    }

    #[test]
    fn test_oversized_referral_code_rejected() {
        let mut d = draft();
        d.referral_code = Some("X".repeat(21));
        assert!(d.check(today()).is_err());
    }

    #[test]
    fn test_underage_rejected() {
        let mut d = draft();
        d.birth_date = NaiveDate::from_ymd_opt(2006, 6, 2).unwrap();
        assert!(matches!(d.check(today()), Err(DomainError::Validation(_))));

        d.birth_date = NaiveDate::from_ymd_opt(2006, 6, 1).unwrap();
        assert!(d.check(today()).is_ok());
    }

    #[test]
    fn test_future_birth_date_rejected() {
        let mut d = draft();
        d.birth_date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert!(d.check(today()).is_err());
    }

    #[test]
    fn test_new_user_defaults() {
        let now = Utc::now();
        let user = draft()
            .into_new_user("ABC123XYZ".to_string(), Some(3), now)
            .with_id(7);

        assert_eq!(user.id, 7);
        assert_eq!(user.loyalty_points, 0);
        assert!(!user.loyalty_flag);
        assert_eq!(user.status, AccountStatus::Active);
        assert_eq!(user.created_at, now);
        assert_eq!(user.updated_at, now);
    }

    #[test]
    fn test_loyalty_flag_from_institutional_email() {
        let mut d = draft();
        d.email = "Alumno@DUOC.cl".to_string();
        let user = d.into_new_user("CODE".to_string(), None, Utc::now());
        assert!(user.loyalty_flag);
    }

    #[test]
    fn test_update_email_recomputes_loyalty_flag() {
        let mut user = draft()
            .into_new_user("CODE".to_string(), None, Utc::now())
            .with_id(1);
        let before = user.updated_at;

        let changed = user.apply_update(UserUpdate {
            email: Some("juan@duoc.cl".to_string()),
            ..Default::default()
        });

        assert!(changed);
        assert!(user.loyalty_flag);
        assert!(user.updated_at >= before);
    }

    #[test]
    fn test_update_same_email_is_not_a_change() {
        let mut user = draft()
            .into_new_user("CODE".to_string(), None, Utc::now())
            .with_id(1);

        let changed = user.apply_update(UserUpdate {
            email: Some("juan.perez@email.com".to_string()),
            phone: Some("987654321".to_string()),
            ..Default::default()
        });

        assert!(!changed);
        assert_eq!(user.phone, "987654321");
    }

    #[test]
    fn test_redeem_more_than_balance_rejected() {
        let err = PointsChange::Redeem(50).apply_to(20).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientPoints {
                balance: 20,
                requested: 50
            }
        );
    }

    #[test]
    fn test_credit_and_redeem() {
        let balance = PointsChange::Credit(100).apply_to(0).unwrap();
        assert_eq!(balance, 100);
        assert_eq!(PointsChange::Redeem(100).apply_to(balance).unwrap(), 0);
        assert!(PointsChange::Credit(1).apply_to(u32::MAX).is_err());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = draft()
            .into_new_user("CODE".to_string(), None, Utc::now())
            .with_id(1);
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["status"], "ACTIVO");
    }
}
