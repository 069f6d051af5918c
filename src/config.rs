use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the config file for the server.
pub const CONFIG_ENV: &str = "TODO_CONFIG";

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Which document store backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Sqlite => write!(f, "sqlite"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend: {}", other)),
        }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Document store backend
    pub store: ConfigValue<StoreBackend>,
    /// Path to the SQLite database
    pub database_path: ConfigValue<PathBuf>,
    /// Collection holding todo documents
    pub collection: ConfigValue<String>,
    /// Port the HTTP server listens on
    pub port: ConfigValue<u16>,
    /// Per-request deadline for the HTTP server
    pub request_timeout_secs: ConfigValue<u64>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    store: Option<StoreBackend>,
    database_path: Option<PathBuf>,
    collection: Option<String>,
    port: Option<u16>,
    request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::defaults();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            config.apply_file(path)?;
        }

        // Apply environment variable overrides
        config.apply_env(|name| std::env::var(name).ok())?;

        Ok(config)
    }

    fn defaults() -> Self {
        Self {
            store: ConfigValue::new(StoreBackend::Sqlite, ConfigSource::Default),
            database_path: ConfigValue::new(
                Self::default_data_dir().join("todo.db"),
                ConfigSource::Default,
            ),
            collection: ConfigValue::new("Todo".to_string(), ConfigSource::Default),
            port: ConfigValue::new(8080, ConfigSource::Default),
            request_timeout_secs: ConfigValue::new(30, ConfigSource::Default),
            config_file: None,
        }
    }

    fn apply_file(&mut self, path: PathBuf) -> Result<(), ConfigError> {
        let contents =
            std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError(path.clone(), e))?;
        let file_config: ConfigFile = serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

        if let Some(store) = file_config.store {
            self.store = ConfigValue::new(store, ConfigSource::File);
        }
        if let Some(db_path) = file_config.database_path {
            // Resolve relative paths against config file's directory
            let resolved_path = if db_path.is_relative() {
                path.parent().map(|p| p.join(&db_path)).unwrap_or(db_path)
            } else {
                db_path
            };
            self.database_path = ConfigValue::new(resolved_path, ConfigSource::File);
        }
        if let Some(collection) = file_config.collection {
            self.collection = ConfigValue::new(collection, ConfigSource::File);
        }
        if let Some(port) = file_config.port {
            self.port = ConfigValue::new(port, ConfigSource::File);
        }
        if let Some(secs) = file_config.request_timeout_secs {
            self.request_timeout_secs = ConfigValue::new(secs, ConfigSource::File);
        }

        self.config_file = Some(path);
        Ok(())
    }

    /// Apply `TODO_*` overrides, reading variables through `lookup`.
    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(store) = lookup("TODO_STORE") {
            let backend = store
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("TODO_STORE", store.clone()))?;
            self.store = ConfigValue::new(backend, ConfigSource::Environment);
        }
        if let Some(db_path) = lookup("TODO_DATABASE_PATH") {
            self.database_path =
                ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Some(collection) = lookup("TODO_COLLECTION") {
            self.collection = ConfigValue::new(collection, ConfigSource::Environment);
        }
        if let Some(port) = lookup("TODO_PORT") {
            let port = port
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("TODO_PORT", port.clone()))?;
            self.port = ConfigValue::new(port, ConfigSource::Environment);
        }
        if let Some(secs) = lookup("TODO_REQUEST_TIMEOUT_SECS") {
            let secs = secs
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("TODO_REQUEST_TIMEOUT_SECS", secs.clone()))?;
            self.request_timeout_secs = ConfigValue::new(secs, ConfigSource::Environment);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.value)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/todo-api/
    /// - macOS: ~/Library/Application Support/todo-api/
    /// - Windows: %APPDATA%/todo-api/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("todo-api")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/todo-api/
    /// - macOS: ~/Library/Application Support/todo-api/
    /// - Windows: %APPDATA%/todo-api/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("todo-api")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {}", .0.display(), .1)]
    ReadError(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{}': {}", .0.display(), .1)]
    ParseError(PathBuf, #[source] serde_yaml::Error),

    #[error("Invalid value for {0}: '{1}'")]
    InvalidEnv(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::tempdir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::defaults();
        assert_eq!(config.store.value, StoreBackend::Sqlite);
        assert!(config
            .database_path
            .value
            .to_string_lossy()
            .contains("todo.db"));
        assert_eq!(config.database_path.source, ConfigSource::Default);
        assert_eq!(config.collection.value, "Todo");
        assert_eq!(config.port.value, 8080);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_path: /custom/path/db.sqlite").unwrap();
        writeln!(file, "collection: Tasks").unwrap();
        writeln!(file, "port: 9000").unwrap();
        writeln!(file, "store: memory").unwrap();

        let mut config = Config::defaults();
        config.apply_file(config_path.clone()).unwrap();

        assert_eq!(
            config.database_path.value,
            PathBuf::from("/custom/path/db.sqlite")
        );
        assert_eq!(config.database_path.source, ConfigSource::File);
        assert_eq!(config.collection.value, "Tasks");
        assert_eq!(config.port.value, 9000);
        assert_eq!(config.store.value, StoreBackend::Memory);
        assert_eq!(config.request_timeout_secs.source, ConfigSource::Default);
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_database_path_resolved_against_config_dir() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "database_path: data/todo.db\n").unwrap();

        let mut config = Config::defaults();
        config.apply_file(config_path).unwrap();

        assert_eq!(
            config.database_path.value,
            temp_dir.path().join("data/todo.db")
        );
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "collection: fromfile\nport: 9000\n").unwrap();

        let mut config = Config::defaults();
        config.apply_file(config_path).unwrap();
        config
            .apply_env(env(&[
                ("TODO_COLLECTION", "fromenv"),
                ("TODO_REQUEST_TIMEOUT_SECS", "5"),
            ]))
            .unwrap();

        assert_eq!(config.collection.value, "fromenv");
        assert_eq!(config.collection.source, ConfigSource::Environment);
        assert_eq!(config.port.value, 9000);
        assert_eq!(config.port.source, ConfigSource::File);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = Config::defaults();
        let err = config
            .apply_env(env(&[("TODO_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv("TODO_PORT", _)));

        let err = config
            .apply_env(env(&[("TODO_STORE", "mongo")]))
            .unwrap_err();
        assert!(err.to_string().contains("TODO_STORE"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "mongo_user: admin\n").unwrap();

        let mut config = Config::defaults();
        assert!(matches!(
            config.apply_file(config_path),
            Err(ConfigError::ParseError(_, _))
        ));
    }
}
