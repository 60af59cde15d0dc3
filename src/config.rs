use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_JWT_SECRET: &str = "dev_secret_change_me";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_TTL_DAYS: i64 = 7;
pub const MAX_TTL_DAYS: i64 = 3650;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub users_file: PathBuf,
    pub cors_origin: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process env.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match var("PORT") {
            Some(v) => v
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("invalid PORT {v:?}: {e}"))?,
            None => 3000,
        };

        let secret = var("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure development secret");
            DEFAULT_JWT_SECRET.into()
        });

        let ttl_days = match var("JWT_TTL_DAYS") {
            Some(v) => v
                .parse::<i64>()
                .ok()
                .filter(|d| (1..=MAX_TTL_DAYS).contains(d))
                .ok_or_else(|| {
                    anyhow::anyhow!("invalid JWT_TTL_DAYS {v:?}: expected 1..={MAX_TTL_DAYS}")
                })?,
            None => DEFAULT_TTL_DAYS,
        };

        Ok(Self {
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            users_file: var("USERS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/users.json")),
            cors_origin: var("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.into()),
            jwt: JwtConfig { secret, ttl_days },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.jwt.secret, DEFAULT_JWT_SECRET);
        assert_eq!(cfg.jwt.ttl_days, 7);
        assert_eq!(cfg.users_file, PathBuf::from("data/users.json"));
        assert_eq!(cfg.cors_origin, DEFAULT_CORS_ORIGIN);
    }

    #[test]
    fn values_are_read_from_lookup() {
        let cfg = config_from(&[
            ("PORT", "8081"),
            ("APP_HOST", "127.0.0.1"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_TTL_DAYS", "30"),
            ("USERS_FILE", "/tmp/u.json"),
            ("CORS_ORIGIN", "https://app.example.com"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.jwt.secret, "s3cret");
        assert_eq!(cfg.jwt.ttl_days, 30);
        assert_eq!(cfg.users_file, PathBuf::from("/tmp/u.json"));
        assert_eq!(cfg.cors_origin, "https://app.example.com");
    }

    #[test]
    fn invalid_port_is_rejected() {
        for bad in ["abc", "70000", "-1", ""] {
            let err = config_from(&[("PORT", bad)]).unwrap_err();
            assert!(err.to_string().contains("invalid PORT"), "accepted {bad:?}");
        }
    }

    #[test]
    fn ttl_outside_range_is_rejected() {
        for bad in ["0", "-3", "3651", "200000000000000", "soon"] {
            let err = config_from(&[("JWT_TTL_DAYS", bad)]).unwrap_err();
            assert!(err.to_string().contains("JWT_TTL_DAYS"), "accepted {bad:?}");
        }
        assert_eq!(
            config_from(&[("JWT_TTL_DAYS", "3650")]).unwrap().jwt.ttl_days,
            MAX_TTL_DAYS
        );
    }
}
