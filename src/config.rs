use serde::{Deserialize, Serialize};

use std::{env, fs, path::Path, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    pub store: StoreConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    Postgres { database_dsn: String },
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum AuthConfig {
    Firebase {
        project_id: String,
        #[serde(with = "humantime_serde", default = "default_key_fetch_timeout")]
        key_fetch_timeout: Duration,
    },
    SharedSecret {
        secret: String,
    },
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

const fn default_key_fetch_timeout() -> Duration {
    Duration::from_secs(10)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error(
        "config file not found and environment variables are incomplete. \
         Tried: '{path}', 'config.yaml', 'config.example.yaml', and NOTES_* variables. Error: {reason}"
    )]
    NotFound { path: String, reason: String },
}

/// Flat variables read when no config file exists, e.g. `NOTES_PG_DSN`.
#[derive(Debug, Deserialize)]
struct EnvConfig {
    listen_addr: Option<String>,
    pg_dsn: Option<String>,
    firebase_project_id: Option<String>,
    #[serde(default, with = "humantime_serde")]
    key_fetch_timeout: Option<Duration>,
    jwt_secret: Option<String>,
}

impl TryFrom<EnvConfig> for Config {
    type Error = String;

    fn try_from(env: EnvConfig) -> Result<Self, Self::Error> {
        let store = env.pg_dsn.map_or(StoreConfig::Memory, |database_dsn| {
            StoreConfig::Postgres { database_dsn }
        });

        let auth = match (env.firebase_project_id, env.jwt_secret) {
            (Some(project_id), _) => AuthConfig::Firebase {
                project_id,
                key_fetch_timeout: env
                    .key_fetch_timeout
                    .unwrap_or_else(default_key_fetch_timeout),
            },
            (None, Some(secret)) => AuthConfig::SharedSecret { secret },
            (None, None) => {
                return Err(
                    "either NOTES_FIREBASE_PROJECT_ID or NOTES_JWT_SECRET must be set".to_string(),
                );
            }
        };

        Ok(Self {
            listen_addr: env.listen_addr.unwrap_or_else(default_listen_addr),
            store,
            auth,
        })
    }
}

fn load_from_env() -> Result<Config, String> {
    envy::prefixed("NOTES_")
        .from_env::<EnvConfig>()
        .map_err(|e| e.to_string())?
        .try_into()
}

fn read_file(path: &str) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;

    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}

pub fn load_config() -> Result<Config, ConfigError> {
    // Retrieve env variable
    let config_path =
        env::var("NOTES_SERVER_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        return read_file(&config_path);
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return read_file("config.yaml");
    }

    // Fallback to config.example.yaml
    if Path::new("config.example.yaml").exists() {
        tracing::warn!(
            "Config file '{}' and 'config.yaml' not found, falling back to 'config.example.yaml'\
             \n This file should not be used and should be replaced with actual data",
            config_path
        );
        return read_file("config.example.yaml");
    }

    // Fallback to environment variables
    tracing::info!(
        "No config file found, attempting to load configuration from environment variables"
    );
    load_from_env()
        .inspect(|_| tracing::info!("Successfully loaded configuration from environment variables"))
        .map_err(|reason| ConfigError::NotFound {
            path: config_path,
            reason,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_postgres_and_firebase() {
        let cfg: Config = serde_yaml::from_str(
            "listen_addr: 127.0.0.1:9000\n\
             store:\n  backend: postgres\n  database_dsn: host=db user=notes\n\
             auth:\n  provider: firebase\n  project_id: my-app\n  key_fetch_timeout: 3s\n",
        )
        .unwrap();

        assert_eq!(cfg.listen_addr, "127.0.0.1:9000");
        assert!(matches!(
            cfg.store,
            StoreConfig::Postgres { ref database_dsn } if database_dsn == "host=db user=notes"
        ));
        assert!(matches!(
            cfg.auth,
            AuthConfig::Firebase { ref project_id, key_fetch_timeout }
                if project_id == "my-app" && key_fetch_timeout == Duration::from_secs(3)
        ));
    }

    #[test]
    fn defaults_apply() {
        let cfg: Config = serde_yaml::from_str(
            "store:\n  backend: memory\n\
             auth:\n  provider: firebase\n  project_id: my-app\n",
        )
        .unwrap();

        assert_eq!(cfg.listen_addr, "0.0.0.0:8000");
        assert!(matches!(cfg.store, StoreConfig::Memory));
        assert!(matches!(
            cfg.auth,
            AuthConfig::Firebase { key_fetch_timeout, .. } if key_fetch_timeout == Duration::from_secs(10)
        ));
    }

    #[test]
    fn shared_secret_provider() {
        let cfg: Config = serde_yaml::from_str(
            "store:\n  backend: memory\nauth:\n  provider: shared_secret\n  secret: hunter2\n",
        )
        .unwrap();

        assert!(matches!(cfg.auth, AuthConfig::SharedSecret { ref secret } if secret == "hunter2"));
    }

    #[test]
    fn env_config_requires_an_auth_provider() {
        let env = EnvConfig {
            listen_addr: None,
            pg_dsn: None,
            firebase_project_id: None,
            key_fetch_timeout: None,
            jwt_secret: None,
        };

        assert!(Config::try_from(env).is_err());
    }

    #[test]
    fn env_config_prefers_firebase_and_postgres() {
        let env = EnvConfig {
            listen_addr: Some("127.0.0.1:1".to_string()),
            pg_dsn: Some("host=db".to_string()),
            firebase_project_id: Some("p".to_string()),
            key_fetch_timeout: None,
            jwt_secret: Some("s".to_string()),
        };

        let cfg = Config::try_from(env).unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:1");
        assert!(matches!(cfg.store, StoreConfig::Postgres { .. }));
        assert!(matches!(cfg.auth, AuthConfig::Firebase { .. }));
    }
}
