use std::{env, str::FromStr};

use super::env::{AppConfig, ConfigError, DirectoryConfig, LoggingConfig, ServerConfig};

const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server = ServerConfig {
            host: var("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&var, "SERVER_PORT", 3000)?,
            max_body_bytes: parse_or(&var, "MAX_UPLOAD_BYTES", DEFAULT_MAX_BODY_BYTES)?,
        };

        let directories = DirectoryConfig {
            logs_dir: var("LOGS_DIR").unwrap_or_else(|| "logs".to_string()),
            data_dir: var("DATA_DIR").unwrap_or_else(|| "data".to_string()),
            bad_urls_filename: var("BAD_URLS_FILENAME")
                .unwrap_or_else(|| "bad_urls.json".to_string()),
            members_filename: var("MEMBERS_FILENAME")
                .unwrap_or_else(|| "members.json".to_string()),
        };

        let logging = LoggingConfig {
            level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        let skip_instance_guard = var("SKIP_INSTANCE_GUARD")
            .map(|v| v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            server,
            directories,
            logging,
            skip_instance_guard,
        })
    }
}

fn parse_or<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
