//! Authentication handlers
//!
//! Every outcome redirects home; results are reported as flash notices.

use axum::{extract::State, response::Response, Form};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use serde::Deserialize;

use crate::{AppState, AppError, AppResult};
use crate::middleware::session::{login_redirect, logout_redirect, redirect_with_flash, Flash, Visitor};
use crate::models::{CreateUser, User, USERNAME_CONSTRAINT};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Create an account and log it in
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let username = form.name.trim();
    let email = form.email.trim();

    if username.is_empty() || email.is_empty() || form.password.is_empty() {
        return Ok(redirect_with_flash(Flash::MissingFields, &state.config));
    }

    // Check if email already exists
    if User::find_by_email(&state.pool, email).await?.is_some() {
        return Ok(redirect_with_flash(Flash::EmailTaken, &state.config));
    }

    if User::find_by_username(&state.pool, username).await?.is_some() {
        return Ok(redirect_with_flash(Flash::UsernameTaken, &state.config));
    }

    // Hash password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(form.password.as_bytes(), &salt)
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .to_string();

    let created = User::create(
        &state.pool,
        CreateUser {
            username: username.to_string(),
            email: email.to_string(),
        },
        password_hash,
    ).await;

    let user = match created {
        Ok(user) => user,
        // Lost a race with a concurrent signup
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Ok(redirect_with_flash(duplicate_account_flash(e.constraint()), &state.config));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("New user registered: {} ({})", user.username, user.id);

    login_redirect(&user, Flash::SignupWelcome, &state.config)
}

/// Notice for a unique violation on `users`
fn duplicate_account_flash(constraint: Option<&str>) -> Flash {
    match constraint {
        Some(USERNAME_CONSTRAINT) => Flash::UsernameTaken,
        _ => Flash::EmailTaken,
    }
}

/// Email + password login
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let Some(user) = User::find_by_email(&state.pool, form.email.trim()).await? else {
        return Ok(redirect_with_flash(Flash::UnknownEmail, &state.config));
    };

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::InternalError("Invalid password hash".to_string()))?;

    let verified = Argon2::default()
        .verify_password(form.password.as_bytes(), &parsed_hash)
        .is_ok();

    if !verified || !user.is_active {
        tracing::warn!("Failed login for {}", user.email);
        return Ok(redirect_with_flash(Flash::WrongPassword, &state.config));
    }

    // Update last login
    User::update_last_login(&state.pool, user.id).await?;

    tracing::info!("User logged in: {} ({})", user.username, user.id);

    login_redirect(&user, Flash::LoginWelcome, &state.config)
}

pub async fn logout(
    State(state): State<AppState>,
    visitor: Visitor,
) -> Response {
    if let Some(user) = &visitor.user {
        tracing::info!("User logged out: {} ({})", user.username, user.user_id);
    }

    logout_redirect(Flash::LoggedOut, &state.config)
}
