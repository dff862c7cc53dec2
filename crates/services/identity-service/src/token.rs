//! Bearer token verification.
//!
//! Tokens are issued elsewhere; this service only validates them and maps
//! their claims onto a [`Principal`].

use std::collections::BTreeMap;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use common::{AppError, AppResult, JwtConfig};
use domain::{Claim, Principal, MIN_JWT_SECRET_LENGTH};

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Role membership; accepts a single string or an array
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub role: Vec<String>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Any other claims carried by the token
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TokenClaims {
    /// Map verified claims onto a principal.
    ///
    /// Extra claims are kept when they are strings or arrays of strings;
    /// other shapes are dropped.
    pub fn into_principal(self) -> Principal {
        let mut principal = Principal::new(self.sub).with_roles(self.role);
        if let Some(user_name) = self.username {
            principal = principal.with_user_name(user_name);
        }

        for (name, value) in self.extra {
            match value {
                serde_json::Value::String(s) => {
                    principal = principal.with_claim(Claim::new(name, s));
                }
                serde_json::Value::Array(items) => {
                    for item in items {
                        if let serde_json::Value::String(s) = item {
                            principal = principal.with_claim(Claim::new(name.clone(), s));
                        }
                    }
                }
                _ => {}
            }
        }

        principal
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(role) => vec![role],
        OneOrMany::Many(roles) => roles,
    })
}

/// HS256 bearer token verifier.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Build a verifier from configuration.
    ///
    /// # Errors
    /// Returns an internal error if the secret is shorter than the minimum.
    pub fn new(config: &JwtConfig) -> AppResult<Self> {
        if config.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::internal(format!(
                "JWT secret must be at least {} characters",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        })
    }

    /// Verify a token and extract the principal.
    pub fn verify(&self, token: &str) -> AppResult<Principal> {
        let token_data = decode::<TokenClaims>(token, &self.key, &self.validation)?;
        Ok(token_data.claims.into_principal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test-secret-key-for-testing-only-32chars";

    fn config(issuer: Option<&str>) -> JwtConfig {
        JwtConfig {
            secret: SECRET.to_string(),
            issuer: issuer.map(str::to_string),
            audience: None,
        }
    }

    fn config_with_audience(audience: &str) -> JwtConfig {
        JwtConfig {
            audience: Some(audience.to_string()),
            ..config(None)
        }
    }

    fn token_with_audience(audience: &str) -> String {
        sign(json!({
            "sub": Uuid::new_v4(),
            "aud": audience,
            "role": "Admin",
            "exp": Utc::now().timestamp() + 3600,
        }))
    }

    fn sign(payload: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &payload,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = JwtConfig {
            secret: "short".to_string(),
            issuer: None,
            audience: None,
        };
        assert!(TokenVerifier::new(&config).is_err());
    }

    #[test]
    fn test_single_role_string() {
        let id = Uuid::new_v4();
        let token = sign(json!({
            "sub": id,
            "username": "alice",
            "role": "Admin",
            "exp": Utc::now().timestamp() + 3600,
        }));

        let principal = TokenVerifier::new(&config(None)).unwrap().verify(&token).unwrap();

        assert_eq!(principal.id(), id);
        assert_eq!(principal.user_name(), Some("alice"));
        assert!(principal.is_in_role("Admin"));
    }

    #[test]
    fn test_role_array_and_extra_claims() {
        let token = sign(json!({
            "sub": Uuid::new_v4(),
            "role": ["User", "Editor"],
            "scope": ["openid", "profile"],
            "locale": "en-GB",
            "count": 3,
            "exp": Utc::now().timestamp() + 3600,
        }));

        let principal = TokenVerifier::new(&config(None)).unwrap().verify(&token).unwrap();

        assert_eq!(principal.roles().len(), 2);
        assert!(!principal.is_in_role("Admin"));
        assert_eq!(principal.find_claim("locale"), Some("en-GB"));
        assert_eq!(
            principal.claims().iter().filter(|c| c.name == "scope").count(),
            2
        );
        assert_eq!(principal.find_claim("count"), None);
    }

    #[test]
    fn test_missing_role_claim_means_no_roles() {
        let token = sign(json!({
            "sub": Uuid::new_v4(),
            "exp": Utc::now().timestamp() + 3600,
        }));

        let principal = TokenVerifier::new(&config(None)).unwrap().verify(&token).unwrap();
        assert!(principal.roles().is_empty());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = sign(json!({
            "sub": Uuid::new_v4(),
            "exp": Utc::now().timestamp() - 3600,
        }));

        let result = TokenVerifier::new(&config(None)).unwrap().verify(&token);
        assert!(matches!(result, Err(AppError::Jwt(_))));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let token = sign(json!({
            "sub": Uuid::new_v4(),
            "iss": "someone-else",
            "exp": Utc::now().timestamp() + 3600,
        }));

        let verifier = TokenVerifier::new(&config(Some("identity-provider"))).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let token = encode(
            &Header::default(),
            &json!({ "sub": Uuid::new_v4(), "exp": Utc::now().timestamp() + 3600 }),
            &EncodingKey::from_secret(b"another-secret-key-that-is-32-chars-long"),
        )
        .unwrap();

        let result = TokenVerifier::new(&config(None)).unwrap().verify(&token);
        assert!(result.is_err());
    }

    #[test]
    fn test_audience_ignored_when_not_configured() {
        let token = token_with_audience("resource_server");

        let principal = TokenVerifier::new(&config(None)).unwrap().verify(&token).unwrap();
        assert!(principal.is_in_role("Admin"));
        assert_eq!(principal.find_claim("aud"), Some("resource_server"));
    }

    #[test]
    fn test_matching_audience_accepted() {
        let token = token_with_audience("resource_server");

        let verifier = TokenVerifier::new(&config_with_audience("resource_server")).unwrap();
        assert!(verifier.verify(&token).is_ok());
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let token = token_with_audience("another_api");

        let verifier = TokenVerifier::new(&config_with_audience("resource_server")).unwrap();
        assert!(matches!(verifier.verify(&token), Err(AppError::Jwt(_))));
    }
}
