use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::sync::Arc;
use tracing::{info, warn};
use trek_core::repository::UserRepository;
use trek_core::{StoreError, User};

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Username and password are required")]
    MissingFields,
    #[error("Username already exists")]
    UsernameTaken,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Registration and login over the credential store.
pub struct CredentialService {
    users: Arc<dyn UserRepository>,
}

impl CredentialService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<i64, CredentialError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(CredentialError::MissingFields);
        }

        let password_hash = hash_password(password)?;

        match self.users.create_user(username, &password_hash).await {
            Ok(id) => {
                info!("Registered user {} ({})", username, id);
                Ok(id)
            }
            Err(StoreError::Conflict) => Err(CredentialError::UsernameTaken),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, CredentialError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(CredentialError::MissingFields);
        }

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(CredentialError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            warn!("Failed login for {}", username);
            return Err(CredentialError::InvalidCredentials);
        }

        Ok(user)
    }
}

/// Argon2id with a fresh random salt, rendered as a PHC string.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hashing(e.to_string()))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
