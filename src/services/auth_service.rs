//! Authentication service - registration, login and the JWT token pair.
//!
//! Access and refresh tokens are signed with separate secrets. Both carry the
//! ids of the pair (`aid`, `rid`) so that logout and refresh can revoke the
//! whole pair through the cache.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, TOKEN_TYPE_BEARER};
use crate::domain::password::DUMMY_HASH;
use crate::domain::{Password, User, UserResponse};
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, UnitOfWork};

/// JWT claims payload, shared by access and refresh tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub email: String,
    pub role: String,
    /// Access token id
    pub aid: Uuid,
    /// Refresh token id
    pub rid: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Tokens plus the authenticated user, returned by register/login/refresh
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    pub refresh_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds
    #[schema(example = 900)]
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn register(&self, name: String, email: String, password: String) -> AppResult<AuthResponse>;

    async fn login(&self, email: String, password: String) -> AppResult<AuthResponse>;

    /// Exchange a refresh token for a new pair; the old pair is revoked.
    async fn refresh(&self, refresh_token: String) -> AppResult<AuthResponse>;

    /// Revoke both tokens of the pair `claims` belongs to.
    async fn logout(&self, claims: Claims) -> AppResult<()>;

    /// Validate an access token and reject revoked ones.
    async fn authenticate(&self, access_token: String) -> AppResult<Claims>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Option<Arc<Cache>>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, cache: Option<Arc<Cache>>, config: Config) -> Self {
        Self { uow, cache, config }
    }

    fn issue_tokens(&self, user: User) -> AppResult<AuthResponse> {
        let now = Utc::now();
        let access_expires_at = now + Duration::seconds(self.config.access_token_ttl_seconds);
        let refresh_expires_at = now + Duration::seconds(self.config.refresh_token_ttl_seconds);

        let mut claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.to_string(),
            aid: Uuid::new_v4(),
            rid: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: access_expires_at.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.access_secret_bytes()),
        )?;

        claims.exp = refresh_expires_at.timestamp();
        let refresh_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.refresh_secret_bytes()),
        )?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.access_token_ttl_seconds,
            expires_at: access_expires_at,
        })
    }

    async fn is_revoked(&self, token_id: Uuid) -> bool {
        let Some(cache) = &self.cache else {
            return false;
        };
        match cache.is_token_revoked(token_id).await {
            Ok(revoked) => revoked,
            Err(e) => {
                tracing::warn!(error = %e, "Revocation lookup failed; treating token as valid");
                false
            }
        }
    }

    async fn revoke(&self, token_id: Uuid, expires_at: i64) {
        let Some(cache) = &self.cache else {
            return;
        };
        let ttl = (expires_at - Utc::now().timestamp()).max(1) as u64;
        if let Err(e) = cache.revoke_token(token_id, ttl).await {
            tracing::warn!(error = %e, token_id = %token_id, "Failed to revoke token");
        }
    }

    async fn revoke_pair(&self, claims: &Claims) {
        let refresh_expires_at = claims.iat + self.config.refresh_token_ttl_seconds;
        let access_expires_at = claims.iat + self.config.access_token_ttl_seconds;
        self.revoke(claims.aid, access_expires_at).await;
        self.revoke(claims.rid, refresh_expires_at).await;
    }
}

fn decode_claims(token: &str, secret: &[u8]) -> AppResult<Claims> {
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &Validation::default())?;
    Ok(data.claims)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, name: String, email: String, password: String) -> AppResult<AuthResponse> {
        let email = normalize_email(&email);
        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = self
            .uow
            .users()
            .create(email, password_hash, name.trim().to_string())
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        self.issue_tokens(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthResponse> {
        let user = self.uow.users().find_by_email(&normalize_email(&email)).await?;

        // Verify against a dummy hash for unknown emails so both paths cost
        // one Argon2 verification.
        let hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| DUMMY_HASH.to_string());
        let password_valid = Password::from_hash(hash).verify(&password);

        match user {
            Some(user) if password_valid => self.issue_tokens(user),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    async fn refresh(&self, refresh_token: String) -> AppResult<AuthResponse> {
        let claims = decode_claims(&refresh_token, self.config.refresh_secret_bytes())
            .map_err(|_| AppError::Unauthorized)?;

        if self.is_revoked(claims.rid).await {
            return Err(AppError::Unauthorized);
        }

        let user = self
            .uow
            .users()
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        self.revoke_pair(&claims).await;
        self.issue_tokens(user)
    }

    async fn logout(&self, claims: Claims) -> AppResult<()> {
        self.revoke_pair(&claims).await;
        tracing::info!(user_id = claims.sub, "User logged out");
        Ok(())
    }

    async fn authenticate(&self, access_token: String) -> AppResult<Claims> {
        let claims = decode_claims(&access_token, self.config.access_secret_bytes())?;
        if self.is_revoked(claims.aid).await {
            return Err(AppError::Unauthorized);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infra::MockUserRepository;
    use crate::services::test_support::TestUnitOfWork;
    use mockall::predicate::eq;

    fn user_with_password(password: &str) -> User {
        let now = Utc::now();
        User {
            id: 7,
            email: "learner@example.com".to_string(),
            password_hash: Password::new(password).unwrap().into_string(),
            name: "Learner".to_string(),
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(users: MockUserRepository) -> Authenticator<TestUnitOfWork> {
        let uow = TestUnitOfWork::builder().users(users).build();
        Authenticator::new(Arc::new(uow), None, Config::default())
    }

    #[tokio::test]
    async fn test_register_rejects_existing_email() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .with(eq("learner@example.com"))
            .returning(|_| Ok(Some(user_with_password("secret1"))));
        users.expect_create().never();

        let result = service(users)
            .register(
                "Learner".to_string(),
                " Learner@Example.com ".to_string(),
                "secret1".to_string(),
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users.expect_create().never();

        let result = service(users)
            .register("Learner".to_string(), "a@example.com".to_string(), "123".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_pair() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(user_with_password("secret1"))));

        let auth = service(users);
        let response = auth
            .login("learner@example.com".to_string(), "secret1".to_string())
            .await
            .unwrap();

        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.user.id, 7);
        assert_eq!(response.expires_in, Config::default().access_token_ttl_seconds);

        let claims = auth.authenticate(response.access_token.clone()).await.unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, "user");
        assert!(claims.exp > claims.iat);

        // A refresh token is not accepted where an access token is expected.
        assert!(auth.authenticate(response.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(user_with_password("secret1"))));

        let result = service(users)
            .login("learner@example.com".to_string(), "wrong-password".to_string())
            .await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));

        let result = service(users)
            .login("nobody@example.com".to_string(), "secret1".to_string())
            .await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_refresh_rotates_pair() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(user_with_password("secret1"))));
        users
            .expect_find_by_id()
            .with(eq(7))
            .returning(|_| Ok(Some(user_with_password("secret1"))));

        let auth = service(users);
        let first = auth
            .login("learner@example.com".to_string(), "secret1".to_string())
            .await
            .unwrap();

        let second = auth.refresh(first.refresh_token).await.unwrap();
        assert_ne!(second.access_token, first.access_token);

        let result = auth.refresh(first.access_token).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
