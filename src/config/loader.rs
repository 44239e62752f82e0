//! Layered configuration loader
//!
//! Sources are applied in order, later ones winning:
//! 1. `default.toml` (required)
//! 2. `{environment}.toml` (optional)
//! 3. `local.toml` (optional)
//! 4. `PLANET_*` environment variables
//!
//! A single file can replace steps 1-3 via `PLANET_CONFIG_FILE` or `--config`.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

const CONFIG_DIR_ENV: &str = "PLANET_CONFIG_DIR";

const CONFIG_FILE_ENV: &str = "PLANET_CONFIG_FILE";

/// Conventional variable accepted when `database.url` is left empty
const DATABASE_URL_ENV: &str = "DATABASE_URL";

const DEFAULT_CONFIG_DIR: &str = "config";

const ENV_PREFIX: &str = "PLANET";

/// Separator for nested keys, e.g. `PLANET_SERVER__PORT` -> `server.port`
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    /// When set, layered loading is skipped
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Creates a loader from `PLANET_CONFIG_DIR`, `PLANET_CONFIG_FILE` and `PLANET_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Fails when both `PLANET_CONFIG_DIR` and `PLANET_CONFIG_FILE` are set.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from);
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_dir.is_some() && config_file.is_some() {
            return Err(ConfigError::mutual_exclusivity(
                "PLANET_CONFIG_DIR and PLANET_CONFIG_FILE cannot both be set. \
                 Use PLANET_CONFIG_DIR for layered configuration or \
                 PLANET_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self {
            config_dir: config_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Loads a single file instead of the layered directory.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Selects the environment overlay, overriding `PLANET_APP_ENV`.
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Loads, applies the `DATABASE_URL` fallback and validates.
    ///
    /// # Errors
    ///
    /// Returns an error when `default.toml` (or the single file) is missing,
    /// when parsing fails, or when validation rejects the result.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings = self.load_unvalidated()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads and applies the `DATABASE_URL` fallback without validating, so
    /// callers can layer further overrides first.
    pub fn load_unvalidated(&self) -> Result<Settings, ConfigError> {
        let mut settings: Settings = self.build_config()?.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        if settings.database.url.trim().is_empty()
            && let Ok(url) = std::env::var(DATABASE_URL_ENV)
        {
            settings.database.url = url;
        }

        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match &self.config_file {
            Some(config_file) => Self::add_file_source(builder, config_file, true)?,
            None => self.build_layered_config(builder)?,
        };

        Self::add_env_source(builder).build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let builder = Self::add_file_source(builder, &self.config_dir.join("default.toml"), true)?;

        let env_path = self
            .config_dir
            .join(format!("{}.toml", self.environment.as_str()));
        let builder = Self::add_file_source(builder, &env_path, false)?;

        Self::add_file_source(builder, &self.config_dir.join("local.toml"), false)
    }

    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.is_file() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        let name = path.to_str().ok_or_else(|| {
            ConfigError::ParseError(format!("Non UTF-8 configuration path: {}", path.display()))
        })?;

        Ok(builder.add_source(File::new(name, FileFormat::Toml).required(required)))
    }

    fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Tests mutate process environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const MANAGED_VARS: &[&str] = &[
        CONFIG_DIR_ENV,
        CONFIG_FILE_ENV,
        AppEnvironment::ENV_VAR,
        DATABASE_URL_ENV,
        "PLANET_SERVER__PORT",
        "PLANET_DATABASE__URL",
    ];

    const BASE_CONFIG: &str = r#"
[application]
name = "planet-service"
version = "1.0.0"

[server]
host = "127.0.0.1"
port = 5000

[database]
url = "postgres://localhost/planets"

[logger]
level = "info"
"#;

    /// Clears the managed variables and restores them on drop.
    struct EnvGuard {
        saved: Vec<(&'static str, Option<String>)>,
    }

    impl EnvGuard {
        fn clean() -> Self {
            let saved = MANAGED_VARS
                .iter()
                .map(|key| (*key, std::env::var(key).ok()))
                .collect();
            for key in MANAGED_VARS {
                unsafe { std::env::remove_var(key) };
            }
            Self { saved }
        }

        fn set(&self, key: &str, value: &str) {
            unsafe { std::env::set_var(key, value) };
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.saved {
                unsafe {
                    match value {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    fn config_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    fn loader_for(dir: &TempDir, env: &EnvGuard) -> ConfigLoader {
        env.set(CONFIG_DIR_ENV, dir.path().to_str().unwrap());
        ConfigLoader::new().unwrap()
    }

    #[test]
    fn test_defaults_without_env() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _env = EnvGuard::clean();

        let loader = ConfigLoader::new().unwrap();
        assert_eq!(loader.config_dir(), Path::new("config"));
        assert!(loader.config_file.is_none());
        assert_eq!(loader.environment(), AppEnvironment::Development);
    }

    #[test]
    fn test_dir_and_file_are_mutually_exclusive() {
        let _lock = ENV_LOCK.lock().unwrap();
        let env = EnvGuard::clean();
        env.set(CONFIG_DIR_ENV, "/etc/planet");
        env.set(CONFIG_FILE_ENV, "/etc/planet/service.toml");

        match ConfigLoader::new() {
            Err(ConfigError::MutualExclusivityError(msg)) => {
                assert!(msg.contains("PLANET_CONFIG_DIR"));
                assert!(msg.contains("PLANET_CONFIG_FILE"));
            }
            other => panic!("Expected MutualExclusivityError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_default_toml() {
        let _lock = ENV_LOCK.lock().unwrap();
        let env = EnvGuard::clean();
        let dir = config_dir(&[]);

        match loader_for(&dir, &env).load() {
            Err(ConfigError::FileNotFound(msg)) => assert!(msg.contains("default.toml")),
            other => panic!("Expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_layered_precedence() {
        let _lock = ENV_LOCK.lock().unwrap();
        let env = EnvGuard::clean();
        let dir = config_dir(&[
            ("default.toml", BASE_CONFIG),
            (
                "production.toml",
                "[server]\nhost = \"0.0.0.0\"\nport = 8080\n\n[database]\nmax_connections = 50\n",
            ),
            ("local.toml", "[server]\nport = 9000\n"),
        ]);
        env.set(AppEnvironment::ENV_VAR, "production");
        env.set("PLANET_DATABASE__URL", "postgres://override/planets");

        let settings = loader_for(&dir, &env).load().unwrap();

        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.database.max_connections, 50);
        assert_eq!(settings.database.url, "postgres://override/planets");
        assert_eq!(settings.application.name, "planet-service");
    }

    #[test]
    fn test_env_var_overrides_files() {
        let _lock = ENV_LOCK.lock().unwrap();
        let env = EnvGuard::clean();
        let dir = config_dir(&[("default.toml", BASE_CONFIG), ("local.toml", "[server]\nport = 9000\n")]);
        env.set("PLANET_SERVER__PORT", "4000");

        let settings = loader_for(&dir, &env).load().unwrap();
        assert_eq!(settings.server.port, 4000);
    }

    #[test]
    fn test_missing_overlays_are_optional() {
        let _lock = ENV_LOCK.lock().unwrap();
        let env = EnvGuard::clean();
        let dir = config_dir(&[("default.toml", BASE_CONFIG)]);

        let loader = loader_for(&dir, &env).with_environment(AppEnvironment::Staging);
        assert_eq!(loader.environment(), AppEnvironment::Staging);
        assert_eq!(loader.load().unwrap().server.port, 5000);
    }

    #[test]
    fn test_database_url_fallback() {
        let _lock = ENV_LOCK.lock().unwrap();
        let env = EnvGuard::clean();
        let dir = config_dir(&[("default.toml", "[database]\nurl = \"\"\n")]);
        env.set(DATABASE_URL_ENV, "postgres://fallback/planets");

        let settings = loader_for(&dir, &env).load().unwrap();
        assert_eq!(settings.database.url, "postgres://fallback/planets");
    }

    #[test]
    fn test_configured_url_beats_database_url() {
        let _lock = ENV_LOCK.lock().unwrap();
        let env = EnvGuard::clean();
        let dir = config_dir(&[("default.toml", BASE_CONFIG)]);
        env.set(DATABASE_URL_ENV, "postgres://fallback/planets");

        let settings = loader_for(&dir, &env).load().unwrap();
        assert_eq!(settings.database.url, "postgres://localhost/planets");
    }

    #[test]
    fn test_missing_database_url_fails_validation() {
        let _lock = ENV_LOCK.lock().unwrap();
        let env = EnvGuard::clean();
        let dir = config_dir(&[("default.toml", "[server]\nport = 5000\n")]);

        let err = loader_for(&dir, &env).load().unwrap_err();
        assert_eq!(err.field(), Some("database.url"));
    }

    #[test]
    fn test_single_file_mode_skips_layers() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _env = EnvGuard::clean();
        let dir = config_dir(&[
            ("default.toml", "this is not toml ["),
            ("single.toml", BASE_CONFIG),
        ]);

        let settings = ConfigLoader::new()
            .unwrap()
            .with_config_file(dir.path().join("single.toml"))
            .load()
            .unwrap();
        assert_eq!(settings.application.version, "1.0.0");
    }

    #[test]
    fn test_single_file_missing() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _env = EnvGuard::clean();
        let dir = config_dir(&[]);

        let err = ConfigLoader::new()
            .unwrap()
            .with_config_file(dir.path().join("absent.toml"))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
