use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{AuthUser, Session, SessionToken};
use crate::domain::credentials;
use crate::domain::error::DomainError;
use crate::domain::model::{Account, SessionRecord};
use crate::domain::repo::AccountsRepository;

/// Configuration for the identity provider.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub min_password_length: usize,
    pub session_ttl: Duration,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            min_password_length: 6,
            session_ttl: Duration::days(7),
        }
    }
}

/// Email/password identity provider issuing opaque bearer sessions.
#[derive(Clone)]
pub struct IdentityService {
    repo: Arc<dyn AccountsRepository>,
    config: IdentityConfig,
}

impl IdentityService {
    pub fn new(repo: Arc<dyn AccountsRepository>, config: IdentityConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// Create an account and issue a session for it.
    #[instrument(name = "roster.identity.register", skip(self, password), fields(email = %email))]
    pub async fn register(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        let account = self.create_account(email, password).await?;
        self.issue_session(&account).await
    }

    #[instrument(name = "roster.identity.login", skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        let email = credentials::normalize_email(email);
        if !credentials::is_valid_email(&email) {
            return Err(DomainError::invalid_email(email));
        }

        let account = self
            .repo
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        let Some(account) = account else {
            debug!("unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        if !verify_blocking(password, &account.password_hash).await {
            debug!(uid = %account.uid, "password mismatch");
            return Err(DomainError::InvalidCredentials);
        }

        let session = self.issue_session(&account).await?;
        info!(uid = %account.uid, "signed in");
        Ok(session)
    }

    /// Ending an unknown or already ended session is not an error.
    #[instrument(name = "roster.identity.logout", skip_all)]
    pub async fn logout(&self, token: &str) -> Result<(), DomainError> {
        let removed = self
            .repo
            .delete_session(&credentials::token_digest(token))
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!(removed, "session ended");
        Ok(())
    }

    /// Resolve a bearer token to its user. Expired sessions are removed.
    pub async fn authenticate(&self, token: &str) -> Result<AuthUser, DomainError> {
        let digest = credentials::token_digest(token);
        let record = self
            .repo
            .find_session(&digest)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or(DomainError::Unauthenticated)?;

        if record.is_expired(Utc::now()) {
            self.repo
                .delete_session(&digest)
                .await
                .map_err(|e| DomainError::database(e.to_string()))?;
            debug!(uid = %record.uid, "session expired");
            return Err(DomainError::Unauthenticated);
        }

        let account = self
            .repo
            .find_by_uid(record.uid)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or(DomainError::Unauthenticated)?;

        Ok(AuthUser {
            uid: account.uid,
            email: account.email,
        })
    }

    /// Return the account for `email`, creating it when missing. The
    /// password of an existing account is left untouched.
    #[instrument(name = "roster.identity.ensure_account", skip(self, password), fields(email = %email))]
    pub async fn ensure_account(&self, email: &str, password: &str) -> Result<AuthUser, DomainError> {
        let normalized = credentials::normalize_email(email);
        let existing = self
            .repo
            .find_by_email(&normalized)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        let account = match existing {
            Some(account) => account,
            None => self.create_account(email, password).await?,
        };
        Ok(AuthUser {
            uid: account.uid,
            email: account.email,
        })
    }

    pub async fn purge_expired_sessions(&self) -> Result<u64, DomainError> {
        let purged = self
            .repo
            .delete_expired_sessions(Utc::now())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if purged > 0 {
            info!(purged, "expired sessions removed");
        }
        Ok(purged)
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<Account, DomainError> {
        let email = credentials::normalize_email(email);
        if !credentials::is_valid_email(&email) {
            return Err(DomainError::invalid_email(email));
        }
        if password.chars().count() < self.config.min_password_length {
            return Err(DomainError::weak_password(self.config.min_password_length));
        }

        if self
            .repo
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .is_some()
        {
            return Err(DomainError::email_in_use(email));
        }

        let password_hash = hash_blocking(password).await?;
        let account = Account {
            uid: Uuid::new_v4(),
            email,
            password_hash,
            created_at: Utc::now(),
        };
        let inserted = self
            .repo
            .insert(account.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !inserted {
            debug!("email taken by a concurrent registration");
            return Err(DomainError::email_in_use(account.email));
        }

        info!(uid = %account.uid, "account created");
        Ok(account)
    }

    async fn issue_session(&self, account: &Account) -> Result<Session, DomainError> {
        let raw = credentials::new_session_token();
        let now = Utc::now();
        let record = SessionRecord {
            token_hash: credentials::token_digest(&raw),
            uid: account.uid,
            created_at: now,
            expires_at: now + self.config.session_ttl,
        };
        self.repo
            .insert_session(record.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(Session {
            user: AuthUser {
                uid: account.uid,
                email: account.email.clone(),
            },
            token: SessionToken::new(raw),
            expires_at: record.expires_at,
        })
    }
}

// Argon2 runs on the blocking pool.
async fn hash_blocking(password: &str) -> Result<String, DomainError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || credentials::hash_password(&password))
        .await
        .map_err(|e| DomainError::database(e.to_string()))?
        .map_err(|e| DomainError::database(e.to_string()))
}

async fn verify_blocking(password: &str, hash: &str) -> bool {
    let password = password.to_owned();
    let hash = hash.to_owned();
    match tokio::task::spawn_blocking(move || credentials::verify_password(&password, &hash)).await
    {
        Ok(ok) => ok,
        Err(e) => {
            warn!(error = %e, "password verification task failed");
            false
        }
    }
}
