use database::services::AccountPolicy;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("environment variable {name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime configuration, read from the environment and `.env`
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub run_migrations: bool,
    pub policy: AccountPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = dotenvy::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = dotenvy::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let run_migrations = flag("RUN_MIGRATIONS", true)?;

        let defaults = AccountPolicy::default();
        let password_cost = match dotenvy::var("PASSWORD_HASH_COST") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "PASSWORD_HASH_COST",
                value,
            })?,
            Err(_) => defaults.password_cost,
        };

        let policy = AccountPolicy {
            default_password: dotenvy::var("PROVISIONED_ACCOUNT_PASSWORD")
                .ok()
                .filter(|password| !password.is_empty()),
            fallback_to_student: flag(
                "PROVISIONING_FALLBACK_TO_STUDENT",
                defaults.fallback_to_student,
            )?,
            password_cost,
        };

        Ok(Self {
            database_url,
            bind_addr,
            run_migrations,
            policy,
        })
    }
}

fn flag(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match dotenvy::var(name) {
        Ok(value) => parse_flag(&value).ok_or(ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" Yes "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
