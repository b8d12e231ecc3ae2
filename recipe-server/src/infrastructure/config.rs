use serde::Deserialize;

/// Ten years. Larger values overflow token expiry arithmetic.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AdminAccount {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    pub admin: Option<AdminAccount>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".into());
        let port = lookup("PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;
        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let db_max_connections = lookup("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "20".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid DB_MAX_CONNECTIONS: {}", e))?;
        let jwt_secret =
            lookup("JWT_SECRET").ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set"))?;
        let token_ttl_hours: i64 = lookup("TOKEN_TTL_HOURS")
            .unwrap_or_else(|| "24".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid TOKEN_TTL_HOURS: {}", e))?;
        if token_ttl_hours <= 0 {
            anyhow::bail!("TOKEN_TTL_HOURS must be positive");
        }
        if token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            anyhow::bail!("TOKEN_TTL_HOURS must be at most {}", MAX_TOKEN_TTL_HOURS);
        }
        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminAccount { email, password }),
            (None, None) => None,
            _ => anyhow::bail!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            host,
            port,
            database_url,
            db_max_connections,
            jwt_secret,
            token_ttl_hours,
            cors_origins,
            admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("DATABASE_URL", "postgres://db"), ("JWT_SECRET", "s")]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_max_connections, 20);
        assert_eq!(config.token_ttl_hours, 24);
        assert!(config.cors_origins.is_empty());
        assert!(config.admin.is_none());
    }

    #[test]
    fn secrets_are_required() {
        assert!(load(&[("JWT_SECRET", "s")]).is_err());
        assert!(load(&[("DATABASE_URL", "postgres://db")]).is_err());
    }

    #[test]
    fn parses_lists_and_admin() {
        let config = load(&[
            ("DATABASE_URL", "postgres://db"),
            ("JWT_SECRET", "s"),
            ("PORT", "9000"),
            ("CORS_ORIGINS", "http://a.test, ,http://b.test"),
            ("ADMIN_EMAIL", "root@example.com"),
            ("ADMIN_PASSWORD", "hunter22"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(
            config.admin,
            Some(AdminAccount {
                email: "root@example.com".into(),
                password: "hunter22".into(),
            })
        );
    }

    #[test]
    fn rejects_bad_numbers_and_half_admin() {
        let base = [("DATABASE_URL", "postgres://db"), ("JWT_SECRET", "s")];
        assert!(load(&[base[0], base[1], ("PORT", "eighty")]).is_err());
        assert!(load(&[base[0], base[1], ("TOKEN_TTL_HOURS", "0")]).is_err());
        assert!(load(&[base[0], base[1], ("ADMIN_EMAIL", "root@example.com")]).is_err());
    }

    #[test]
    fn token_ttl_is_bounded() {
        let base = [("DATABASE_URL", "postgres://db"), ("JWT_SECRET", "s")];
        let max = MAX_TOKEN_TTL_HOURS.to_string();
        let config = load(&[base[0], base[1], ("TOKEN_TTL_HOURS", max.as_str())]).unwrap();
        assert_eq!(config.token_ttl_hours, MAX_TOKEN_TTL_HOURS);

        let over = (MAX_TOKEN_TTL_HOURS + 1).to_string();
        assert!(load(&[base[0], base[1], ("TOKEN_TTL_HOURS", over.as_str())]).is_err());
        let err = load(&[base[0], base[1], ("TOKEN_TTL_HOURS", "9223372036854775807")])
            .unwrap_err();
        assert!(err.to_string().contains("at most"));
    }
}
