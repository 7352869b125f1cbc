use crate::utilities::errors::AppError;
use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::utilities::config::Config;

/// Claims issued by the identity provider for a signed-in user.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// The authenticated identity behind a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            uid: claims.sub,
            email: claims.email,
            display_name: claims.name,
            photo_url: claims.picture,
        }
    }
}

pub fn require_principal(principal: Option<&Principal>) -> Result<&Principal, AppError> {
    principal.ok_or(AppError::AuthRequiredError)
}

pub fn create_token(
    config: &Config,
    principal: &Principal,
    expires_in: Duration,
) -> Result<String, AppError> {
    let now = Utc::now();

    let claims = Claims {
        sub: principal.uid.clone(),
        email: principal.email.clone(),
        name: principal.display_name.clone(),
        picture: principal.photo_url.clone(),
        iat: now.timestamp(),
        exp: (now + expires_in).timestamp(),
    };

    let encoding_key = EncodingKey::from_secret(config.jwt_secret_key.as_bytes());
    let encoded_token = encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)?;
    Ok(encoded_token)
}

pub fn verify_token(config: &Config, token: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_key.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(token_data.claims)
}

/// Optional principal for the current request.
///
/// A missing or unusable token never rejects the request; operations that
/// need an identity turn `None` into `AppError::AuthRequiredError`.
#[derive(Clone, Debug, Default)]
pub struct Session(pub Option<Principal>);

impl Session {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

fn query_token(parts: &Parts) -> Option<String> {
    let query = parts.uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "access_token")
        .map(|(_, value)| value.into_owned())
}

impl<S> FromRequestParts<S> for Session
where
    Config: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
            Ok(TypedHeader(Authorization(bearer))) => Some(bearer.token().to_string()),
            Err(_) => query_token(parts),
        };

        let Some(token) = token else {
            return Ok(Session(None));
        };

        let config = Config::from_ref(state);
        match verify_token(&config, &token) {
            Ok(claims) => Ok(Session(Some(claims.into()))),
            Err(e) => {
                tracing::debug!("Ignoring unusable access token: {}", e);
                Ok(Session(None))
            }
        }
    }
}
