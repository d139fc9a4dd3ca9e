//! # Account Handlers
//!
//! Admin registration behind a shared registration key, cookie-based login,
//! logout, and a session probe.

use axum::{
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, RepositoryError, forbidden, is_unique_violation, unauthorized};
use crate::handlers::types::{SuccessResponse, UserResponse};
use crate::models::user::Role;
use crate::password::{hash_password, verify_password};
use crate::repositories::{UserRepository, user::NewUser};
use crate::server::AppState;
use crate::validation::{FieldErrors, RegistrationFields, RegistrationInput, normalize_email};

const DUPLICATE_EMAIL: &str = "User with this email already exists";
const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserResponse,
    pub expires_at: DateTime<Utc>,
}

/// Identity carried by the current session cookie
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: SessionUser,
    pub expires_at: DateTime<Utc>,
}

fn duplicate_email() -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", DUPLICATE_EMAIL)
}

fn admin_key_matches(expected: Option<&str>, supplied: Option<&str>) -> bool {
    match (expected.filter(|key| !key.is_empty()), supplied) {
        (Some(expected), Some(supplied)) => expected.as_bytes().ct_eq(supplied.as_bytes()).into(),
        _ => false,
    }
}

fn timestamp(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or_default()
}

/// Create an admin account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegistrationInput,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Missing or invalid fields, or email taken", body = ApiError),
        (status = 403, description = "Invalid admin key", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationInput>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(input) = payload?;
    let fields = RegistrationFields::require(&input)?;

    if !admin_key_matches(
        state.config.admin_registration_key.as_deref(),
        input.admin_key.as_deref(),
    ) {
        tracing::warn!(email = %fields.email, "Registration refused: invalid admin key");
        return Err(forbidden(Some("Invalid admin key")));
    }
    fields.check_rules()?;

    let users = UserRepository::new(&state.db);
    if users.find_by_email(&fields.email).await?.is_some() {
        return Err(duplicate_email());
    }

    let password = fields.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(anyhow::Error::from)?
        .map_err(anyhow::Error::from)?;

    let user = match users
        .create(NewUser {
            name: fields.name,
            email: fields.email,
            password_hash,
            role: Role::Admin,
        })
        .await
    {
        Ok(user) => user,
        Err(RepositoryError::Database(err)) if is_unique_violation(&err) => {
            return Err(duplicate_email());
        }
        Err(err) => return Err(err.into()),
    };
    tracing::info!(user_id = %user.id, "Admin account registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully".to_string(),
            user: user.into(),
        }),
    ))
}

/// Sign in and receive the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; `admin_token` cookie set", body = LoginResponse),
        (status = 400, description = "Missing fields", body = ApiError),
        (status = 401, description = "Invalid email or password", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(input) = payload?;

    let mut errors = FieldErrors::default();
    let email = errors.require("email", input.email.as_deref());
    let password = match input.password {
        Some(password) if !password.is_empty() => Some(password),
        _ => {
            errors.missing("password");
            None
        }
    };
    let (Some(email), Some(password)) = (email, password) else {
        return Err(errors.into_error().into());
    };

    let Some(user) = UserRepository::new(&state.db)
        .find_by_email(&normalize_email(&email))
        .await?
    else {
        return Err(unauthorized(Some(INVALID_CREDENTIALS)));
    };

    let stored_hash = user.password.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(anyhow::Error::from)?;
    if !verified {
        tracing::info!(user_id = %user.id, "Login rejected");
        return Err(unauthorized(Some(INVALID_CREDENTIALS)));
    }

    let claims = state.sessions.claims_for(&user, Utc::now());
    let token = state
        .sessions
        .sign(&claims)
        .map_err(anyhow::Error::from)?;
    tracing::info!(user_id = %user.id, "Signed in");

    let body = LoginResponse {
        user: user.into(),
        expires_at: timestamp(claims.exp),
    };
    Ok((
        [(SET_COOKIE, state.sessions.set_cookie(&token))],
        Json(body),
    )
        .into_response())
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Signed out", body = SuccessResponse)
    ),
    tag = "auth"
)]
pub async fn logout(State(state): State<AppState>) -> Response {
    (
        [(SET_COOKIE, state.sessions.clear_cookie())],
        Json(SuccessResponse::ok()),
    )
        .into_response()
}

/// Current session, if the cookie is present and valid
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Active session", body = SessionResponse),
        (status = 401, description = "No valid session", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, ApiError> {
    let claims = match state.sessions.from_headers(&headers) {
        Some(Ok(claims)) => claims,
        Some(Err(err)) => {
            tracing::debug!(error = %err, "Session cookie rejected");
            return Err(unauthorized(Some("Session expired or invalid")));
        }
        None => return Err(unauthorized(None)),
    };

    Ok(Json(SessionResponse {
        expires_at: timestamp(claims.exp),
        user: SessionUser {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            role: claims.role,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_key_requires_configured_and_equal_key() {
        assert!(admin_key_matches(Some("s3cret"), Some("s3cret")));
        assert!(!admin_key_matches(Some("s3cret"), Some("s3cre")));
        assert!(!admin_key_matches(Some("s3cret"), None));
        assert!(!admin_key_matches(None, Some("anything")));
        assert!(!admin_key_matches(Some(""), Some("")));
    }
}
