use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ClientError, Result},
    users::UserId,
};

/// Claims carried by a PastForward session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// The signed-in user, handed to the controller explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub token: Option<String>,
}

impl Session {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            token: None,
        }
    }

    /// Reads the session owner from a bearer token.
    ///
    /// With a `secret` the signature and expiry are checked. Without one the
    /// claims are only decoded; the API still rejects a forged token.
    pub fn from_token(token: &str, secret: Option<&str>) -> Result<Self> {
        let data = match secret {
            Some(secret) => decode::<Claims>(
                token,
                &DecodingKey::from_secret(secret.as_ref()),
                &Validation::default(),
            ),
            None => {
                let mut validation = Validation::default();
                validation.insecure_disable_signature_validation();
                validation.validate_exp = false;
                validation.validate_aud = false;
                validation.required_spec_claims.clear();
                decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            }
        }
        .map_err(|e| ClientError::Session(e.to_string()))?;

        if data.claims.sub.trim().is_empty() {
            return Err(ClientError::Session("token has no subject".to_string()));
        }

        Ok(Self {
            user_id: UserId::from(data.claims.sub),
            token: Some(token.to_string()),
        })
    }

    pub fn is_self(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}
