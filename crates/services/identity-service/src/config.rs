//! Identity service configuration.

use std::env;

use common::{DatabaseConfig, JwtConfig, ServiceConfig};
use domain::{PasswordPolicy, MIN_JWT_SECRET_LENGTH};

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("JWT_SECRET must be at least {} characters", MIN_JWT_SECRET_LENGTH)]
    SecretTooShort,
}

/// Account created at startup when it does not exist yet.
#[derive(Debug, Clone)]
pub struct SeedAccount {
    pub user_name: String,
    pub password: String,
    pub email: String,
}

/// Identity service configuration.
#[derive(Debug, Clone)]
pub struct IdentityServiceConfig {
    pub service: ServiceConfig,
    /// `None` selects the in-memory account store
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub password_policy: PasswordPolicy,
    pub seed: Option<SeedAccount>,
}

impl IdentityServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service = ServiceConfig {
            service_name: "identity-service".to_string(),
            host: lookup("IDENTITY_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "IDENTITY_PORT", 5000)?,
        };

        let database = match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
                ..DatabaseConfig::default()
            }),
            None => None,
        };

        let secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort);
        }
        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").filter(|iss| !iss.is_empty()),
            audience: lookup("JWT_AUDIENCE").filter(|aud| !aud.is_empty()),
        };

        let defaults = PasswordPolicy::default();
        let password_policy = PasswordPolicy {
            required_length: parse_or(
                &lookup,
                "PASSWORD_REQUIRED_LENGTH",
                defaults.required_length,
            )?,
            required_unique_chars: parse_or(
                &lookup,
                "PASSWORD_REQUIRED_UNIQUE_CHARS",
                defaults.required_unique_chars,
            )?,
            require_non_alphanumeric: flag_or(
                &lookup,
                "PASSWORD_REQUIRE_NON_ALPHANUMERIC",
                defaults.require_non_alphanumeric,
            )?,
            require_digit: flag_or(&lookup, "PASSWORD_REQUIRE_DIGIT", defaults.require_digit)?,
            require_lowercase: flag_or(
                &lookup,
                "PASSWORD_REQUIRE_LOWERCASE",
                defaults.require_lowercase,
            )?,
            require_uppercase: flag_or(
                &lookup,
                "PASSWORD_REQUIRE_UPPERCASE",
                defaults.require_uppercase,
            )?,
        };

        let seed = match (
            lookup("IDENTITY_SEED_USER_NAME"),
            lookup("IDENTITY_SEED_PASSWORD"),
        ) {
            (Some(user_name), Some(password)) => Some(SeedAccount {
                user_name,
                password,
                email: lookup("IDENTITY_SEED_EMAIL").unwrap_or_default(),
            }),
            _ => None,
        };

        Ok(Self {
            service,
            database,
            jwt,
            password_policy,
            seed,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn flag_or<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { key, value }),
        },
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-for-testing-only-32chars";

    fn load(vars: &[(&str, &str)]) -> Result<IdentityServiceConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        IdentityServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("JWT_SECRET", SECRET)]).unwrap();

        assert_eq!(config.service.bind_address(), "0.0.0.0:5000");
        assert!(config.database.is_none());
        assert!(config.jwt.issuer.is_none());
        assert!(config.jwt.audience.is_none());
        assert_eq!(config.password_policy, PasswordPolicy::default());
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_missing_secret() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
    }

    #[test]
    fn test_short_secret() {
        assert!(matches!(
            load(&[("JWT_SECRET", "too-short")]),
            Err(ConfigError::SecretTooShort)
        ));
    }

    #[test]
    fn test_database_and_policy_overrides() {
        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("DATABASE_URL", "postgres://localhost/identity"),
            ("JWT_AUDIENCE", "resource_server"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("PASSWORD_REQUIRED_LENGTH", "12"),
            ("PASSWORD_REQUIRE_NON_ALPHANUMERIC", "false"),
            ("PASSWORD_REQUIRED_UNIQUE_CHARS", "3"),
        ])
        .unwrap();

        let database = config.database.unwrap();
        assert_eq!(database.url, "postgres://localhost/identity");
        assert_eq!(database.max_connections, 4);
        assert_eq!(config.jwt.audience.as_deref(), Some("resource_server"));
        assert_eq!(config.password_policy.required_length, 12);
        assert_eq!(config.password_policy.required_unique_chars, 3);
        assert!(!config.password_policy.require_non_alphanumeric);
        assert!(config.password_policy.require_digit);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            load(&[("JWT_SECRET", SECRET), ("IDENTITY_PORT", "not-a-port")]),
            Err(ConfigError::Invalid { key: "IDENTITY_PORT", .. })
        ));
        assert!(matches!(
            load(&[("JWT_SECRET", SECRET), ("PASSWORD_REQUIRE_DIGIT", "maybe")]),
            Err(ConfigError::Invalid { key: "PASSWORD_REQUIRE_DIGIT", .. })
        ));
    }

    #[test]
    fn test_seed_requires_name_and_password() {
        let partial = load(&[("JWT_SECRET", SECRET), ("IDENTITY_SEED_USER_NAME", "admin")])
            .unwrap();
        assert!(partial.seed.is_none());

        let full = load(&[
            ("JWT_SECRET", SECRET),
            ("IDENTITY_SEED_USER_NAME", "admin"),
            ("IDENTITY_SEED_PASSWORD", "Admin-Pass1"),
        ])
        .unwrap();
        let seed = full.seed.unwrap();
        assert_eq!(seed.user_name, "admin");
        assert_eq!(seed.email, "");
    }
}
