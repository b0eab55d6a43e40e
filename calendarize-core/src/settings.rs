//! Global calendarize configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{CalResult, CalendarizeError};

static DEFAULT_STORE_PATH: &str = "~/.local/share/calendarize/events.json";
static DEFAULT_USER_AGENT: &str = concat!("calendarize/", env!("CARGO_PKG_VERSION"));

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Configuration at ~/.config/calendarize/config.toml, overridable with
/// `CALENDARIZE_*` environment variables.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Where downloaded feeds are cached (system temp dir when unset)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP timeout for feed downloads; no timeout when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Containers searched by scoped queries; all containers when empty
    #[serde(default)]
    pub storage_pids: Vec<u64>,

    #[serde(default)]
    pub include_hidden: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            cache_dir: None,
            store_path: default_store_path(),
            user_agent: default_user_agent(),
            timeout_secs: None,
            storage_pids: Vec::new(),
            include_hidden: false,
        }
    }
}

impl Settings {
    pub fn load() -> CalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from an explicit file (which may be missing) plus the environment.
    pub fn load_from(path: &Path) -> CalResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("CALENDARIZE"))
            .build()
            .map_err(|e| CalendarizeError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalendarizeError::Config(e.to_string()))
    }

    pub fn config_path() -> CalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalendarizeError::Config("Could not determine config directory".into()))?
            .join("calendarize");

        Ok(config_dir.join("config.toml"))
    }

    pub fn cache_dir(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => expand(dir),
            None => std::env::temp_dir(),
        }
    }

    pub fn store_path(&self) -> PathBuf {
        expand(&self.store_path)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalResult<()> {
        let contents = format!(
            "\
# calendarize configuration

# Where downloaded feeds are cached (defaults to the system temp dir):
# cache_dir = \"/tmp\"

# Where imported events are stored:
# store_path = \"{}\"

# HTTP settings for feed downloads:
# user_agent = \"{}\"
# timeout_secs = 30

# Containers searched by `calendarize search` (all when empty):
# storage_pids = [5]
# include_hidden = false
",
            DEFAULT_STORE_PATH, DEFAULT_USER_AGENT
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalendarizeError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalendarizeError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
