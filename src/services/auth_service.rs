use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    db::DbPool,
    dto::auth::{Claims, RegisterInput},
    error::{AppError, AppResult},
    models::{User, prefixed_id},
};

pub async fn fetch_user(pool: &DbPool, id: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn fetch_by_username(pool: &DbPool, username: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    let argon2 = Argon2::default();
    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub enum LoginOutcome {
    Success(User),
    Disabled,
    InvalidCredentials,
}

/// The password is checked before the active flag, so a disabled account
/// responds the same whether or not the password was right.
pub async fn authenticate(
    pool: &DbPool,
    username: &str,
    password: &str,
) -> AppResult<LoginOutcome> {
    let user = match fetch_by_username(pool, username).await? {
        Some(u) => u,
        None => return Ok(LoginOutcome::InvalidCredentials),
    };
    if !verify_password(&user.password_hash, password)? {
        return Ok(LoginOutcome::InvalidCredentials);
    }
    if !user.is_active {
        return Ok(LoginOutcome::Disabled);
    }
    Ok(LoginOutcome::Success(user))
}

/// Issues a signed session token carrying a fresh CSRF secret.
pub fn issue_session(config: &AppConfig, user: &User) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::seconds(config.session_ttl_secs))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.clone(),
        username: user.username.clone(),
        full_name: user.full_name.clone(),
        role: user.role.clone(),
        csrf: Uuid::new_v4().simple().to_string(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;
    Ok(token)
}

pub enum RegisterOutcome {
    Created(User),
    UsernameTaken,
    EmailTaken,
}

pub async fn register_user(pool: &DbPool, input: RegisterInput) -> AppResult<RegisterOutcome> {
    let username_taken: Option<(String,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = $1")
            .bind(input.username.as_str())
            .fetch_optional(pool)
            .await?;
    if username_taken.is_some() {
        return Ok(RegisterOutcome::UsernameTaken);
    }

    let email_taken: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(input.email.as_str())
        .fetch_optional(pool)
        .await?;
    if email_taken.is_some() {
        return Ok(RegisterOutcome::EmailTaken);
    }

    let password_hash = hash_password(&input.password)?;
    let id = prefixed_id("user");

    let user: User = sqlx::query_as(
        "INSERT INTO users (id, username, email, password_hash, full_name, role) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(id)
    .bind(input.username.as_str())
    .bind(input.email.as_str())
    .bind(password_hash)
    .bind(input.full_name.as_str())
    .bind(input.role.as_str())
    .fetch_one(pool)
    .await?;

    Ok(RegisterOutcome::Created(user))
}
