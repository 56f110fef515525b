use crate::config::AuthSettings;
use crate::models::ErrorResponse;
use crate::routes::matching::AppState;
use actix_web::{dev::Payload, error::ResponseError, http::StatusCode, web, FromRequest, HttpRequest, HttpResponse};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use thiserror::Error;

/// Errors returned by the admin guard
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Role '{0}' may not run matching")]
    Forbidden(String),

    #[error("Authentication is not configured")]
    Misconfigured,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: "unauthorized".to_string(),
            message: self.to_string(),
            status_code: self.status_code().as_u16(),
        })
    }
}

/// Token claims issued by the account service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

/// HS256 verification settings for the admin guard
#[derive(Clone)]
pub struct AuthConfig {
    key: Option<DecodingKey>,
    required_role: String,
}

impl AuthConfig {
    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self {
            key: settings
                .jwt_secret
                .as_deref()
                .map(|secret| DecodingKey::from_secret(secret.as_bytes())),
            required_role: settings.required_role.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// Validate an `Authorization` header value
    ///
    /// Returns the token subject, or `None` when auth is disabled.
    pub fn authorize(&self, header: Option<&str>) -> Result<Option<String>, AuthError> {
        let Some(key) = &self.key else {
            return Ok(None);
        };

        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let data = decode::<Claims>(token, key, &Validation::new(Algorithm::HS256))?;
        if data.claims.role != self.required_role {
            return Err(AuthError::Forbidden(data.claims.role));
        }

        Ok(Some(data.claims.sub))
    }
}

/// Extractor that admits only admin callers
#[derive(Debug, Clone)]
pub struct AdminGuard {
    pub subject: Option<String>,
}

impl FromRequest for AdminGuard {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<AppState>>() {
            Some(state) => {
                let header = req
                    .headers()
                    .get(actix_web::http::header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok());
                state.auth.authorize(header).map(|subject| AdminGuard { subject })
            }
            None => Err(AuthError::Misconfigured),
        };
        ready(result)
    }
}
