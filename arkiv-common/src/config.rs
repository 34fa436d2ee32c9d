//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable consulted for the root folder
pub const ROOT_ENV_VAR: &str = "ARKIV_ROOT";

/// Name of the per-root service settings file
pub const SERVICE_CONFIG_FILE: &str = "arkiv.toml";

/// Root folder resolution in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    env_var_name: String,
    use_config_file: bool,
}

impl RootFolderResolver {
    /// Resolver reading `ARKIV_ROOT` and the user/system config file
    pub fn new() -> Self {
        Self {
            cli_arg: None,
            env_var_name: ROOT_ENV_VAR.to_string(),
            use_config_file: true,
        }
    }

    /// Root folder given on the command line
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Read a different environment variable
    pub fn with_env_var(mut self, name: &str) -> Self {
        self.env_var_name = name.to_string();
        self
    }

    /// Skip the user/system config file lookup
    pub fn without_config_file(mut self) -> Self {
        self.use_config_file = false;
        self
    }

    /// Resolve the root folder
    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(&self.env_var_name) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if self.use_config_file {
            if let Some(root_folder) = root_folder_from_config_file() {
                return root_folder;
            }
        }

        // Priority 4: OS-dependent compiled default
        default_root_folder()
    }
}

impl Default for RootFolderResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn root_folder_from_config_file() -> Option<PathBuf> {
    let config_path = config_file_path().ok()?;
    let toml_content = std::fs::read_to_string(&config_path).ok()?;
    match toml::from_str::<toml::Value>(&toml_content) {
        Ok(config) => config
            .get("root_folder")
            .and_then(|v| v.as_str())
            .map(PathBuf::from),
        Err(e) => {
            warn!("Ignoring unparseable config file {}: {}", config_path.display(), e);
            None
        }
    }
}

/// Get default configuration file path for the platform
fn config_file_path() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("arkiv").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/arkiv/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/arkiv (or /var/lib/arkiv for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("arkiv"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/arkiv"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("arkiv"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/arkiv"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("arkiv"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\arkiv"))
    } else {
        PathBuf::from("./arkiv_data")
    }
}

/// Service settings read from `<root>/arkiv.toml`
///
/// Every key is optional; missing keys fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Interface the HTTP server binds to
    pub bind_addr: String,
    /// HTTP port
    pub port: u16,
    /// Database file name, relative to the root folder
    pub database_file: String,
    /// Window size used when a listing request gives no limit
    pub default_page_limit: u32,
    /// Largest window a listing request may ask for
    pub max_page_limit: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 5740,
            database_file: "arkiv.db".to_string(),
            default_page_limit: 20,
            max_page_limit: 100,
        }
    }
}

impl ServiceConfig {
    /// Load settings from the root folder.
    ///
    /// A missing file is not an error: defaults are used and a message is logged.
    pub fn load(root_folder: &Path) -> Result<Self> {
        let path = root_folder.join(SERVICE_CONFIG_FILE);
        if !path.exists() {
            info!("No {} in {}, using defaults", SERVICE_CONFIG_FILE, root_folder.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded service config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_page_limit == 0 {
            return Err(Error::Config("max_page_limit must be positive".to_string()));
        }
        if self.default_page_limit == 0 || self.default_page_limit > self.max_page_limit {
            return Err(Error::Config(format!(
                "default_page_limit must be between 1 and max_page_limit ({})",
                self.max_page_limit
            )));
        }
        if self.database_file.is_empty() {
            return Err(Error::Config("database_file must not be empty".to_string()));
        }
        Ok(())
    }

    /// Absolute database path under the root folder
    pub fn database_path(&self, root_folder: &Path) -> PathBuf {
        root_folder.join(&self.database_file)
    }

    /// `host:port` string for the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
