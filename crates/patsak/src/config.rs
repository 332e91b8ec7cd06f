//! Runtime configuration, loaded from `PATSAK_`-prefixed environment
//! variables: a `Default` plus an `from_env` that overlays present
//! environment variables, scoped to what this runtime actually owns — one
//! backend connection, one schema, per-RelVar quota overrides, and the
//! watchdog timeout.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// PostgreSQL connection URI for the single owned connection.
    #[serde(default = "default_db_uri")]
    pub db_uri: String,

    /// Schema this runtime's `Meta` mirrors and mutates.
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Maximum RelVar/attribute name length. Overrides
    /// `patsak_catalog::MAX_NAME_LEN` when set.
    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,

    /// Maximum attributes per RelVar. Overrides
    /// `patsak_catalog::MAX_ATTR_COUNT` when set.
    #[serde(default = "default_max_attr_count")]
    pub max_attr_count: usize,

    /// Maximum RelVars per schema. Overrides
    /// `patsak_catalog::MAX_REL_VAR_COUNT` when set.
    #[serde(default = "default_max_rel_var_count")]
    pub max_rel_var_count: usize,

    /// Seconds a work unit may run before the watchdog trips its
    /// `CancelToken`.
    #[serde(default = "default_watchdog_timeout_secs")]
    pub watchdog_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_uri: default_db_uri(),
            schema: default_schema(),
            max_name_len: default_max_name_len(),
            max_attr_count: default_max_attr_count(),
            max_rel_var_count: default_max_rel_var_count(),
            watchdog_timeout_secs: default_watchdog_timeout_secs(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(uri) = std::env::var("PATSAK_DB_URI") {
            config.db_uri = uri;
        }
        if let Ok(uri) = std::env::var("DATABASE_URL") {
            config.db_uri = uri;
        }
        if let Ok(schema) = std::env::var("PATSAK_SCHEMA") {
            config.schema = schema;
        }
        if let Ok(n) = std::env::var("PATSAK_MAX_NAME_LEN") {
            if let Ok(n) = n.parse() {
                config.max_name_len = n;
            }
        }
        if let Ok(n) = std::env::var("PATSAK_MAX_ATTR_COUNT") {
            if let Ok(n) = n.parse() {
                config.max_attr_count = n;
            }
        }
        if let Ok(n) = std::env::var("PATSAK_MAX_REL_VAR_COUNT") {
            if let Ok(n) = n.parse() {
                config.max_rel_var_count = n;
            }
        }
        if let Ok(secs) = std::env::var("PATSAK_WATCHDOG_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.watchdog_timeout_secs = secs;
            }
        }

        config
    }
}

fn default_db_uri() -> String {
    "postgresql://localhost/postgres".to_string()
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_max_name_len() -> usize {
    patsak_catalog::MAX_NAME_LEN
}

fn default_max_attr_count() -> usize {
    patsak_catalog::MAX_ATTR_COUNT
}

fn default_max_rel_var_count() -> usize {
    patsak_catalog::MAX_REL_VAR_COUNT
}

fn default_watchdog_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_catalog_quota_constants() {
        let config = Config::default();
        assert_eq!(config.max_name_len, patsak_catalog::MAX_NAME_LEN);
        assert_eq!(config.max_attr_count, patsak_catalog::MAX_ATTR_COUNT);
        assert_eq!(config.schema, "public");
    }
}
