use crate::models::AppConfig;
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// File name of the application configuration inside the config directory
pub const CONFIG_FILE_NAME: &str = "Bookfinder Config.yaml";

/// Configuration manager for loading and saving the YAML configuration file.
///
/// Manages `Bookfinder Config.yaml` inside the configuration directory: catalog
/// endpoint and timeout, seed query and debounce, and logging settings.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing the configuration file (e.g., "Bookfinder Data")
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        // Create config directory if it doesn't exist
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load and validate the configuration file.
    ///
    /// # Returns
    /// The loaded AppConfig, or defaults if the file doesn't exist
    pub fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                self.config_path
            );
            return Ok(AppConfig::default());
        }

        let file_contents = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let config: AppConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        validate(&config).with_context(|| format!("Invalid config: {}", self.config_path))?;

        tracing::info!("Loaded config from {}", self.config_path);
        Ok(config)
    }

    /// Save the configuration file.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Load the configuration, writing the defaults out first if no file exists yet.
    pub fn load_or_init(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            self.save_config(&AppConfig::default())?;
        }
        self.load_config()
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the configuration file path.
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}

/// Reject settings the client can't work with
pub fn validate(config: &AppConfig) -> Result<()> {
    let base_url = config.catalog.base_url.trim();
    if base_url.is_empty() {
        bail!("catalog.base_url must not be empty");
    }
    reqwest::Url::parse(base_url)
        .with_context(|| format!("catalog.base_url is not a valid URL: {}", base_url))?;

    if config.catalog.request_timeout_secs == 0 {
        bail!("catalog.request_timeout_secs must be greater than zero");
    }

    if config.catalog.max_results == Some(0) {
        bail!("catalog.max_results must be greater than zero when set");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(&config_path).unwrap();
        (manager, temp_dir)
    }

    #[test]
    fn test_create_config_manager() {
        let (manager, _temp_dir) = create_test_config_manager();
        assert!(manager.config_path().ends_with(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();
        let config = manager.load_config().unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(!manager.config_path().exists());
    }

    #[test]
    fn test_load_save_config() {
        let (manager, _temp_dir) = create_test_config_manager();

        let mut config = AppConfig::default();
        config.search.seed_query = "medieval poetry".to_string();
        config.search.debounce_ms = 250;
        manager.save_config(&config).unwrap();

        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.search.seed_query, "medieval poetry");
        assert_eq!(loaded.search.debounce_ms, 250);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = AppConfig::default();
        config.catalog.request_timeout_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = AppConfig::default();
        config.catalog.base_url = "::not a url".to_string();
        assert!(validate(&config).is_err());

        config.catalog.base_url = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_defaults() {
        assert!(validate(&AppConfig::default()).is_ok());
    }
}
