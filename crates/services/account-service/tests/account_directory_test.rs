//! Account directory tests over the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use account_service_lib::repository::UserRepository;
use account_service_lib::seed::seed_master_data;
use account_service_lib::service::Services;
use account_service_lib::InMemoryStore;
use common::{AppError, AppResult};
use domain::{
    AccountStatus, NewUser, PointsChange, ReferralCredit, RoleId, User, UserDraft, UserId,
    UserUpdate, REFERRAL_REWARD_POINTS,
};

fn draft(email: &str, national_id: &str) -> UserDraft {
    UserDraft {
        first_name: "Juan".to_string(),
        middle_name: "Carlos".to_string(),
        last_name: "Perez".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 3, 10).unwrap(),
        email: email.to_string(),
        national_id: national_id.to_string(),
        phone: "+56912345678".to_string(),
        password_hash: "hashed".to_string(),
        referral_code: None,
        referred_by: None,
        role_id: None,
    }
}

async fn seeded() -> Services {
    let services = Services::in_memory(InMemoryStore::new());
    seed_master_data(services.roles().as_ref(), services.statuses().as_ref())
        .await
        .unwrap();
    services
}

#[tokio::test]
async fn test_register_then_get_by_id() {
    let services = seeded().await;
    let accounts = services.accounts();

    let user = accounts
        .register(draft("juan.perez@email.com", "12345678-9"))
        .await
        .unwrap();

    let fetched = accounts.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched, user);
    assert_eq!(fetched.status, AccountStatus::Active);
    assert_eq!(fetched.loyalty_points, 0);

    let tenant = services.roles().get_by_name("ARRIENDATARIO").await.unwrap();
    assert_eq!(fetched.role_id, Some(tenant.id));
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let services = seeded().await;
    let accounts = services.accounts();

    accounts
        .register(draft("juan.perez@email.com", "12345678-9"))
        .await
        .unwrap();
    let err = accounts
        .register(draft("juan.perez@email.com", "98765432-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DuplicateEmail(_)));
    assert_eq!(accounts.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_national_id_rejected() {
    let services = seeded().await;
    let accounts = services.accounts();

    accounts
        .register(draft("a@email.com", "12345678-9"))
        .await
        .unwrap();
    let err = accounts
        .register(draft("b@email.com", "12345678-9"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DuplicateNationalId(_)));
    let all = accounts.list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].email, "a@email.com");
}

#[tokio::test]
async fn test_unknown_role_rejected() {
    let services = seeded().await;
    let accounts = services.accounts();

    let mut d = draft("a@email.com", "12345678-9");
    d.role_id = Some(999);
    let err = accounts.register(d).await.unwrap_err();

    assert!(matches!(err, AppError::UnknownRole(999)));
    assert!(accounts.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_all_is_stable() {
    let services = seeded().await;
    let accounts = services.accounts();

    for i in 0..3 {
        accounts
            .register(draft(&format!("user{}@email.com", i), &format!("1000000{}-1", i)))
            .await
            .unwrap();
    }

    let first = accounts.list_all().await.unwrap();
    let second = accounts.list_all().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[tokio::test]
async fn test_supplied_referral_code_kept_and_unique() {
    let services = seeded().await;
    let accounts = services.accounts();

    let mut d = draft("a@email.com", "11111111-1");
    d.referral_code = Some("FRIEND2024".to_string());
    let user = accounts.register(d).await.unwrap();
    assert_eq!(user.referral_code, "FRIEND2024");

    let mut d = draft("b@email.com", "22222222-2");
    d.referral_code = Some("FRIEND2024".to_string());
    let err = accounts.register(d).await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateReferralCode(_)));

    let found = accounts.get_by_referral_code("FRIEND2024").await.unwrap();
    assert_eq!(found.id, user.id);
}

#[tokio::test]
async fn test_referral_credits_referrer() {
    let services = seeded().await;
    let accounts = services.accounts();

    let referrer = accounts
        .register(draft("a@email.com", "11111111-1"))
        .await
        .unwrap();

    let mut d = draft("b@email.com", "22222222-2");
    d.referred_by = Some(referrer.referral_code.clone());
    let referred = accounts.register(d).await.unwrap();

    assert_eq!(referred.loyalty_points, 0);
    let referrer = accounts.get_by_id(referrer.id).await.unwrap();
    assert_eq!(referrer.loyalty_points, REFERRAL_REWARD_POINTS);
}

#[tokio::test]
async fn test_unknown_referral_code_rejected() {
    let services = seeded().await;
    let accounts = services.accounts();

    let mut d = draft("a@email.com", "11111111-1");
    d.referred_by = Some("NOPE".to_string());
    let err = accounts.register(d).await.unwrap_err();

    assert!(matches!(err, AppError::UnknownReferralCode(_)));
    assert!(accounts.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_loyalty_flag_follows_email_domain() {
    let services = seeded().await;
    let accounts = services.accounts();

    let member = accounts
        .register(draft("alumno@DUOC.CL", "11111111-1"))
        .await
        .unwrap();
    accounts
        .register(draft("other@email.com", "22222222-2"))
        .await
        .unwrap();

    assert!(member.loyalty_flag);
    let members = accounts.list_loyalty_members().await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, member.id);

    // Changing the email away from the domain drops the flag
    let update = UserUpdate {
        email: Some("alumno@email.com".to_string()),
        ..Default::default()
    };
    let updated = accounts.update_profile(member.id, update).await.unwrap();
    assert!(!updated.loyalty_flag);
    assert!(accounts.list_loyalty_members().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_profile_rejects_taken_email() {
    let services = seeded().await;
    let accounts = services.accounts();

    accounts
        .register(draft("a@email.com", "11111111-1"))
        .await
        .unwrap();
    let b = accounts
        .register(draft("b@email.com", "22222222-2"))
        .await
        .unwrap();

    let update = UserUpdate {
        email: Some("a@email.com".to_string()),
        ..Default::default()
    };
    let err = accounts.update_profile(b.id, update).await.unwrap_err();

    assert!(matches!(err, AppError::DuplicateEmail(_)));
    assert_eq!(accounts.get_by_id(b.id).await.unwrap().email, "b@email.com");
}

#[tokio::test]
async fn test_status_lifecycle() {
    let services = seeded().await;
    let accounts = services.accounts();

    let user = accounts
        .register(draft("a@email.com", "11111111-1"))
        .await
        .unwrap();

    let user = accounts
        .change_status(user.id, AccountStatus::Suspended)
        .await
        .unwrap();
    assert_eq!(user.status, AccountStatus::Suspended);

    let user = accounts
        .change_status(user.id, AccountStatus::Inactive)
        .await
        .unwrap();
    assert_eq!(user.status, AccountStatus::Inactive);

    let err = accounts
        .change_status(user.id, AccountStatus::Suspended)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    let account = accounts.get_account(user.id).await.unwrap();
    assert_eq!(account.status.map(|s| s.name), Some("INACTIVO".to_string()));
}

#[tokio::test]
async fn test_points_credit_and_redeem() {
    let services = seeded().await;
    let accounts = services.accounts();

    let user = accounts
        .register(draft("a@email.com", "11111111-1"))
        .await
        .unwrap();

    let user = accounts.credit_points(user.id, 250).await.unwrap();
    assert_eq!(user.loyalty_points, 250);

    let user = accounts.redeem_points(user.id, 200).await.unwrap();
    assert_eq!(user.loyalty_points, 50);

    let err = accounts.redeem_points(user.id, 51).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::InsufficientPoints {
            balance: 50,
            requested: 51
        }
    ));
    assert_eq!(accounts.get_by_id(user.id).await.unwrap().loyalty_points, 50);
}

#[tokio::test]
async fn test_change_role_and_list_by_role() {
    let services = seeded().await;
    let accounts = services.accounts();
    let owner = services.roles().get_by_name("PROPIETARIO").await.unwrap();

    let user = accounts
        .register(draft("a@email.com", "11111111-1"))
        .await
        .unwrap();
    accounts.change_role(user.id, owner.id).await.unwrap();

    let owners = accounts.list_by_role(owner.id).await.unwrap();
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0].id, user.id);

    let err = accounts.change_role(user.id, 999).await.unwrap_err();
    assert!(matches!(err, AppError::UnknownRole(999)));
    let err = accounts.list_by_role(999).await.unwrap_err();
    assert!(matches!(err, AppError::UnknownRole(999)));
}

#[tokio::test]
async fn test_lookups_and_exists() {
    let services = seeded().await;
    let accounts = services.accounts();

    let user = accounts
        .register(draft("a@email.com", "11111111-1"))
        .await
        .unwrap();

    assert_eq!(accounts.get_by_email("a@email.com").await.unwrap().id, user.id);
    assert_eq!(
        accounts.get_by_national_id("11111111-1").await.unwrap().id,
        user.id
    );
    assert!(accounts.exists(user.id).await.unwrap());
    assert!(!accounts.exists(user.id + 1).await.unwrap());
    assert!(matches!(
        accounts.get_by_email("missing@email.com").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_concurrent_registration_with_same_email() {
    let services = seeded().await;
    let accounts = services.accounts();

    let mut handles = Vec::new();
    for i in 0..8 {
        let accounts = Arc::clone(&accounts);
        handles.push(tokio::spawn(async move {
            accounts
                .register(draft("same@email.com", &format!("2000000{}-1", i)))
                .await
        }));
    }

    let mut registered = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => registered += 1,
            Err(err) => assert!(matches!(err, AppError::DuplicateEmail(_))),
        }
    }

    assert_eq!(registered, 1);
    assert_eq!(accounts.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_with_explicit_role() {
    let services = Services::in_memory(InMemoryStore::new());
    let admin = services.roles().create("ADMIN".to_string()).await.unwrap();
    let accounts = services.accounts();

    let mut d = draft("admin@email.com", "11111111-1");
    d.role_id = Some(admin.id);
    let user = accounts.register(d).await.unwrap();

    assert_eq!(user.role_id, Some(admin.id));
    let account = accounts.get_account(user.id).await.unwrap();
    assert_eq!(account.role.map(|r| r.name), Some("ADMIN".to_string()));
}

/// User store whose profile writes stall before reaching the shared tables
struct SlowProfileWrites {
    inner: InMemoryStore,
}

#[async_trait]
impl UserRepository for SlowProfileWrites {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        UserRepository::find_by_id(&self.inner, id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.inner.find_by_email(email).await
    }

    async fn find_by_national_id(&self, national_id: &str) -> AppResult<Option<User>> {
        self.inner.find_by_national_id(national_id).await
    }

    async fn find_by_referral_code(&self, code: &str) -> AppResult<Option<User>> {
        self.inner.find_by_referral_code(code).await
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        UserRepository::list(&self.inner).await
    }

    async fn list_by_role(&self, role_id: RoleId) -> AppResult<Vec<User>> {
        self.inner.list_by_role(role_id).await
    }

    async fn list_loyalty_members(&self) -> AppResult<Vec<User>> {
        self.inner.list_loyalty_members().await
    }

    async fn insert(&self, user: NewUser, referral: Option<ReferralCredit>) -> AppResult<User> {
        UserRepository::insert(&self.inner, user, referral).await
    }

    async fn update_profile(&self, id: UserId, update: UserUpdate) -> AppResult<User> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.inner.update_profile(id, update).await
    }

    async fn set_role(&self, id: UserId, role_id: RoleId) -> AppResult<User> {
        self.inner.set_role(id, role_id).await
    }

    async fn change_status(&self, id: UserId, target: AccountStatus) -> AppResult<User> {
        self.inner.change_status(id, target).await
    }

    async fn adjust_points(&self, id: UserId, change: PointsChange) -> AppResult<User> {
        self.inner.adjust_points(id, change).await
    }

    async fn exists(&self, id: UserId) -> AppResult<bool> {
        self.inner.exists(id).await
    }
}

#[tokio::test]
async fn test_profile_update_does_not_revert_concurrent_status_change() {
    let store = InMemoryStore::new();
    let services = Services::new(
        Arc::new(SlowProfileWrites {
            inner: store.clone(),
        }),
        Arc::new(store.clone()),
        Arc::new(store),
    );
    let accounts = services.accounts();

    let user = accounts
        .register(draft("a@email.com", "11111111-1"))
        .await
        .unwrap();
    let id = user.id;

    let profile = {
        let accounts = Arc::clone(&accounts);
        tokio::spawn(async move {
            let update = UserUpdate {
                phone: Some("999".to_string()),
                ..Default::default()
            };
            accounts.update_profile(id, update).await
        })
    };

    // Let the profile update start before suspending
    tokio::time::sleep(Duration::from_millis(10)).await;
    let suspended = accounts
        .change_status(id, AccountStatus::Suspended)
        .await
        .unwrap();
    assert_eq!(suspended.status, AccountStatus::Suspended);

    let updated = profile.await.unwrap().unwrap();
    assert_eq!(updated.status, AccountStatus::Suspended);

    let stored = accounts.get_by_id(id).await.unwrap();
    assert_eq!(stored.status, AccountStatus::Suspended);
    assert_eq!(stored.phone, "999");
}

#[tokio::test]
async fn test_concurrent_status_changes_checked_one_at_a_time() {
    let services = seeded().await;
    let accounts = services.accounts();

    let user = accounts
        .register(draft("a@email.com", "11111111-1"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let accounts = Arc::clone(&accounts);
        let id = user.id;
        handles.push(tokio::spawn(async move {
            accounts.change_status(id, AccountStatus::Inactive).await
        }));
    }

    let mut changed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => changed += 1,
            Err(err) => assert!(matches!(
                err,
                AppError::InvalidTransition {
                    from: AccountStatus::Inactive,
                    to: AccountStatus::Inactive
                }
            )),
        }
    }

    assert_eq!(changed, 1);
    let stored = accounts.get_by_id(user.id).await.unwrap();
    assert_eq!(stored.status, AccountStatus::Inactive);
}
