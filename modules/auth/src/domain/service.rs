use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{Credentials, NewUser, User};
use crate::domain::error::DomainError;
use crate::domain::password;
use crate::domain::repo::{RepoError, UserRecord, UsersRepository};
use crate::domain::validate;

/// Role assigned to every account; the service is single-tenant.
pub const DEFAULT_ROLE: &str = "owner";

/// Domain service with the account rules.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
}

impl Service {
    pub fn new(repo: Arc<dyn UsersRepository>) -> Self {
        Self { repo }
    }

    #[instrument(
        name = "auth.service.register",
        skip(self, new_user),
        fields(email = %new_user.email)
    )]
    pub async fn register(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Registering new user");

        let violations = validate::validate_registration(&new_user);
        if !violations.is_empty() {
            return Err(DomainError::validation(violations));
        }

        let email = new_user.email.trim().to_lowercase();
        let password_hash = password::hash_password(&new_user.password)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name.trim().to_string(),
            email,
            role: DEFAULT_ROLE.to_string(),
            created_at: now,
            updated_at: now,
        };

        // No pre-check on the email: the unique index decides, so exactly one
        // of two concurrent registrations for the same address wins.
        let record = UserRecord {
            user: user.clone(),
            password_hash,
        };
        match self.repo.insert(record).await {
            Ok(()) => {}
            Err(RepoError::DuplicateEmail) => {
                return Err(DomainError::email_already_exists(user.email));
            }
            Err(RepoError::Other(e)) => return Err(DomainError::database(e.to_string())),
        }

        info!("Successfully registered user with id={}", user.id);
        Ok(user)
    }

    #[instrument(
        name = "auth.service.login",
        skip(self, credentials),
        fields(email = %credentials.email)
    )]
    pub async fn login(&self, credentials: Credentials) -> Result<User, DomainError> {
        debug!("Attempting login");

        let violations = validate::validate_login(&credentials);
        if !violations.is_empty() {
            return Err(DomainError::validation(violations));
        }

        let email = credentials.email.trim().to_lowercase();
        let record = self
            .repo
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(DomainError::auth_failed)?;

        // Unknown email and wrong password produce the same error.
        if !password::verify_password(&credentials.password, &record.password_hash)? {
            return Err(DomainError::auth_failed());
        }

        info!(user_id = %record.user.id, "Login succeeded");
        Ok(record.user)
    }

    #[instrument(name = "auth.service.current_user", skip(self), fields(user_id = %id))]
    pub async fn current_user(&self, id: Uuid) -> Result<User, DomainError> {
        debug!("Loading current user");

        let user = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::user_not_found(id))?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory repo with the same duplicate-email behavior as the real one.
    #[derive(Default)]
    struct MemRepo {
        rows: Mutex<Vec<UserRecord>>,
    }

    #[async_trait]
    impl UsersRepository for MemRepo {
        async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|r| r.user.id == id).map(|r| r.user.clone()))
        }

        async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|r| r.user.email == email).cloned())
        }

        async fn insert(&self, rec: UserRecord) -> Result<(), RepoError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|r| r.user.email == rec.user.email) {
                return Err(RepoError::DuplicateEmail);
            }
            rows.push(rec);
            Ok(())
        }
    }

    fn service() -> Service {
        Service::new(Arc::new(MemRepo::default()))
    }

    fn signup(name: &str, email: &str, password: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_normalizes_and_assigns_defaults() {
        let svc = service();
        let user = svc
            .register(signup("  Alice  ", "Alice@Example.COM", "secret1"))
            .await
            .unwrap();

        assert_eq!(user.name, "Alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.role, DEFAULT_ROLE);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email_case_insensitively() {
        let svc = service();
        svc.register(signup("Alice", "alice@example.com", "secret1"))
            .await
            .unwrap();

        let err = svc
            .register(signup("Other", "ALICE@example.com", "secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EmailAlreadyExists { .. }));
    }

    #[tokio::test]
    async fn register_collects_violations() {
        let svc = service();
        let err = svc.register(signup("", "nope", "123")).await.unwrap_err();
        match err {
            DomainError::Validation { violations } => assert_eq!(violations.len(), 3),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn login_roundtrip() {
        let svc = service();
        let registered = svc
            .register(signup("Alice", "alice@example.com", "secret1"))
            .await
            .unwrap();

        let user = svc
            .login(Credentials {
                email: "ALICE@example.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(user.id, registered.id);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let svc = service();
        svc.register(signup("Alice", "alice@example.com", "secret1"))
            .await
            .unwrap();

        let wrong_password = svc
            .login(Credentials {
                email: "alice@example.com".to_string(),
                password: "bad-guess".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_email = svc
            .login(Credentials {
                email: "nobody@example.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, DomainError::AuthFailed));
        assert!(matches!(unknown_email, DomainError::AuthFailed));
    }

    #[tokio::test]
    async fn current_user_reports_missing_subject() {
        let svc = service();
        let err = svc.current_user(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::UserNotFound { .. }));
    }
}
