use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        claims::Claims,
        dto::{AuthResponse, PublicUser},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::UserStore,
        repo_types::User,
    },
    error::ApiError,
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Registration, login and token handling over the user store.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<UserStore>,
    keys: JwtKeys,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        AuthService::new(state.users.clone(), JwtKeys::from_ref(state))
    }
}

/// Returns the trimmed email and the untouched password, or a validation error
/// if either side is absent or blank.
fn required_credentials(
    email: Option<String>,
    password: Option<String>,
) -> Result<(String, String), ApiError> {
    let email = email.map(|e| e.trim().to_string()).unwrap_or_default();
    let password = password.unwrap_or_default();
    if email.is_empty() || password.trim().is_empty() {
        return Err(ApiError::Validation("Email and password are required".into()));
    }
    Ok((email, password))
}

impl AuthService {
    pub fn new(users: Arc<UserStore>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    pub async fn register(
        &self,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<AuthResponse, ApiError> {
        let (email, password) = required_credentials(email, password)?;

        // Cheap early exit before hashing; `insert` re-checks under its lock.
        if self.users.find_by_email(&email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(ApiError::Conflict("User already exists".into()));
        }

        let hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        // Sign first so a signing failure leaves nothing persisted.
        let user = User::new(&email, hash);
        let token = self.issue_token(&user)?;
        let user = self.users.insert(user).await?;
        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(AuthResponse {
            token,
            user: PublicUser::from(&user),
        })
    }

    pub async fn login(
        &self,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<AuthResponse, ApiError> {
        let (email, password) = required_credentials(email, password)?;

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::Auth(INVALID_CREDENTIALS.into()));
        };

        let hash = user.password_hash.clone();
        let ok = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .unwrap_or_else(|e| {
                error!(error = %e, user_id = %user.id, "stored hash unreadable");
                false
            });

        if !ok {
            warn!(user_id = %user.id, "login invalid password");
            return Err(ApiError::Auth(INVALID_CREDENTIALS.into()));
        }

        info!(user_id = %user.id, email = %user.email, "user logged in");
        self.respond(&user)
    }

    pub fn issue_token(&self, user: &User) -> Result<String, ApiError> {
        self.keys.sign(user).map_err(|e| {
            error!(error = %e, "jwt sign failed");
            ApiError::Internal(e.to_string())
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, ApiError> {
        self.keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::Auth("Invalid or expired token".into())
        })
    }

    pub async fn current_user(&self, id: Uuid) -> Result<PublicUser, ApiError> {
        match self.users.find_by_id(id).await? {
            Some(user) => Ok(PublicUser::from(&user)),
            None => {
                warn!(user_id = %id, "token refers to unknown user");
                Err(ApiError::NotFound("User not found".into()))
            }
        }
    }

    fn respond(&self, user: &User) -> Result<AuthResponse, ApiError> {
        Ok(AuthResponse {
            token: self.issue_token(user)?,
            user: PublicUser::from(user),
        })
    }
}
