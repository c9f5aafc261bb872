use serde::Deserialize;

use crate::view::ViewConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub cors_origin: String,
    #[serde(default)]
    pub view: ViewConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let defaults = ViewConfig::default();
        let level = |key: &str, default: i64| -> Result<i64, anyhow::Error> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|e| anyhow::anyhow!("{} must be an integer: {}", key, e)),
                None => Ok(default),
            }
        };

        Ok(Self {
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(21547),
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:stageboard.db".into()),
            cors_origin: lookup("CORS_ORIGIN")
                .unwrap_or_else(|| "http://localhost:21548,http://127.0.0.1:21548".into()),
            view: ViewConfig {
                high_importance_level: level("HIGH_IMPORTANCE_LEVEL", defaults.high_importance_level)?,
                urgent_importance_level: level("URGENT_IMPORTANCE_LEVEL", defaults.urgent_importance_level)?,
                urgent_due_window_days: level("URGENT_DUE_WINDOW_DAYS", defaults.urgent_due_window_days)?,
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 21547,
            database_url: "sqlite:stageboard.db".into(),
            cors_origin: "http://localhost:21548,http://127.0.0.1:21548".into(),
            view: ViewConfig::default(),
        }
    }
}
