//! Bearer token authentication.

use super::types::{AuthnError, Claims};
use crate::authorizer::UserInfo;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// Encode claims into an HS256 token.
pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validates HS256 bearer tokens and maps their claims to a user.
#[derive(Clone)]
pub struct TokenAuthenticator {
    key: DecodingKey,
    validation: Validation,
}

impl TokenAuthenticator {
    pub fn new(secret: &str, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Decode and validate a token.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthnError> {
        Ok(decode::<Claims>(token, &self.key, &self.validation)?.claims)
    }

    /// Authenticate a token.
    pub fn authenticate(&self, token: &str) -> Result<UserInfo, AuthnError> {
        let claims = self.decode(token)?;
        if claims.sub.is_empty() {
            return Err(AuthnError::MissingSubject);
        }

        Ok(UserInfo {
            name: claims.sub,
            uid: claims.uid.unwrap_or_default(),
            groups: claims.groups,
            extra: claims.extra,
        })
    }
}
