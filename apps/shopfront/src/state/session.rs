//! # Session State
//!
//! Who is signed in, and the guards commands use before touching the backend.

use tracing::debug;

use shopfront_core::pricing::DiscountState;
use shopfront_core::{CoreError, SessionUser};
use shopfront_db::SessionRepository;

use crate::error::AppResult;

/// Identity and discount keys in local storage.
#[derive(Debug, Clone)]
pub struct Session {
    repo: SessionRepository,
}

impl Session {
    pub fn new(repo: SessionRepository) -> Self {
        Session { repo }
    }

    /// Raw access for writes (login, logout, discount refresh).
    pub fn store(&self) -> &SessionRepository {
        &self.repo
    }

    /// The stored user, if any.
    pub async fn user(&self) -> AppResult<Option<SessionUser>> {
        Ok(self.repo.user().await?)
    }

    /// The stored user, or `MissingIdentity`.
    pub async fn require_user(&self) -> AppResult<SessionUser> {
        Ok(self.repo.user().await?.ok_or(CoreError::MissingIdentity)?)
    }

    /// The stored email, or `MissingIdentity`.
    pub async fn require_email(&self) -> AppResult<String> {
        match self.repo.email().await? {
            Some(email) if !email.trim().is_empty() => Ok(email),
            _ => {
                debug!("No stored email");
                Err(CoreError::MissingIdentity.into())
            }
        }
    }

    /// The stored user when it has the admin role.
    ///
    /// No user is `MissingIdentity`; a non-admin is `AdminOnly`.
    pub async fn require_admin(&self) -> AppResult<SessionUser> {
        let user = self.require_user().await?;

        if !user.role.is_admin() {
            debug!(email = %user.email, role = %user.role, "Admin check failed");
            return Err(CoreError::AdminOnly.into());
        }

        Ok(user)
    }

    /// Current pricing inputs.
    pub async fn discount_state(&self) -> AppResult<DiscountState> {
        Ok(self.repo.discount_state().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use shopfront_core::Role;
    use shopfront_db::{Database, DbConfig};

    async fn session() -> Session {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Session::new(db.session())
    }

    fn user(role: Role) -> SessionUser {
        SessionUser {
            name: "Ana".to_string(),
            role,
            email: "ana@shop.test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_require_email() {
        let session = session().await;
        assert_eq!(
            session.require_email().await.unwrap_err().code,
            ErrorCode::ValidationError
        );

        session.store().set_email("ana@shop.test").await.unwrap();
        assert_eq!(session.require_email().await.unwrap(), "ana@shop.test");
    }

    #[tokio::test]
    async fn test_require_admin() {
        let session = session().await;
        assert_eq!(
            session.require_admin().await.unwrap_err().code,
            ErrorCode::ValidationError
        );

        session.store().set_user(&user(Role::User)).await.unwrap();
        assert_eq!(session.require_admin().await.unwrap_err().code, ErrorCode::Forbidden);

        session.store().set_user(&user(Role::Admin)).await.unwrap();
        assert_eq!(session.require_admin().await.unwrap().email, "ana@shop.test");
    }
}
