//! Signed admin sessions carried in the `admin_token` cookie.

use axum::http::{HeaderMap, HeaderValue, header::COOKIE};
use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::{Error as JwtError, ErrorKind},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::user::{self, Role};

pub const SESSION_COOKIE: &str = "admin_token";

/// Claims signed into the session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session token has expired")]
    Expired,
    #[error("session token is invalid: {0}")]
    Invalid(String),
    #[error("failed to sign session token: {0}")]
    Signing(String),
}

impl From<JwtError> for SessionError {
    fn from(error: JwtError) -> Self {
        match error.kind() {
            ErrorKind::ExpiredSignature => SessionError::Expired,
            _ => SessionError::Invalid(error.to_string()),
        }
    }
}

/// Signing material and cookie policy derived from configuration.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
    secure_cookie: bool,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("ttl_seconds", &self.ttl_seconds)
            .field("secure_cookie", &self.secure_cookie)
            .finish_non_exhaustive()
    }
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl_seconds: i64, secure_cookie: bool) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds,
            secure_cookie,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.session_secret.as_bytes(),
            config.session_ttl_seconds,
            !config.is_local_profile(),
        )
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Claims for a freshly authenticated user.
    pub fn claims_for(&self, user: &user::Model, now: DateTime<Utc>) -> Claims {
        let iat = now.timestamp();
        Claims {
            sub: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role(),
            iat,
            exp: iat + self.ttl_seconds,
        }
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, SessionError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|err| SessionError::Signing(err.to_string()))
    }

    /// Verify signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, SessionError> {
        Ok(decode::<Claims>(token, &self.decoding, &self.validation)?.claims)
    }

    /// Read and verify the session cookie, if any.
    pub fn from_headers(&self, headers: &HeaderMap) -> Option<Result<Claims, SessionError>> {
        session_token(headers).map(|token| self.verify(token))
    }

    pub fn set_cookie(&self, token: &str) -> HeaderValue {
        self.cookie_header(token, self.ttl_seconds)
    }

    pub fn clear_cookie(&self) -> HeaderValue {
        self.cookie_header("", 0)
    }

    fn cookie_header(&self, value: &str, max_age: i64) -> HeaderValue {
        let mut cookie = format!(
            "{SESSION_COOKIE}={value}; HttpOnly; SameSite=Strict; Path=/; Max-Age={max_age}"
        );
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        // JWTs are base64url plus dots, always a valid header value.
        HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
    }
}

/// Raw `admin_token` value from the `Cookie` header(s).
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
