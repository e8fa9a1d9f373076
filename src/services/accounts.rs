use std::sync::Arc;
use validator::Validate;

use crate::auth::{hash_password, verify_password, LoginRequest, RegisterRequest, TokenService};
use crate::error::AppError;
use crate::models::{NewUser, User, UserSummary};
use crate::store::UserStore;

/// Registers accounts and authenticates logins.
pub struct AccountService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
    bcrypt_cost: u32,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self {
            users,
            tokens,
            bcrypt_cost,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Creates an account. The password is hashed before it goes anywhere near storage,
    /// and a taken username or email comes back from the store as `AppError::Conflict`.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AppError> {
        request.validate()?;

        let cost = self.bcrypt_cost;
        let password = request.password;
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password(&password, cost))
                .await
                .map_err(|e| AppError::InternalServerError(format!("Hashing task failed: {}", e)))??;

        let user = self
            .users
            .insert(NewUser {
                username: request.username,
                email: request.email,
                password_hash,
            })
            .await
            .map_err(|e| {
                if let AppError::Conflict(_) = e {
                    log::warn!("Registration rejected: username or email already taken");
                }
                e
            })?;

        log::info!("Registered user {} (id {})", user.username, user.id);
        Ok(user)
    }

    /// Checks the credentials and issues a bearer token for the account's username.
    ///
    /// An unknown email and a wrong password are both 401s, with different messages.
    pub async fn login(&self, request: LoginRequest) -> Result<(String, UserSummary), AppError> {
        request.validate()?;

        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| {
                log::warn!("Login failed: no account for the given email");
                AppError::Unauthorized("Account not found".into())
            })?;

        let password = request.password;
        let password_hash = user.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
                .await
                .map_err(|e| AppError::InternalServerError(format!("Verify task failed: {}", e)))??;

        if !matches {
            log::warn!("Login failed: wrong password for user {}", user.id);
            return Err(AppError::Unauthorized("Invalid password".into()));
        }

        let token = self.tokens.issue(&user.username)?;
        log::info!("User {} logged in", user.id);
        Ok((token, UserSummary::from(user)))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.users.find_by_username(username).await
    }
}
