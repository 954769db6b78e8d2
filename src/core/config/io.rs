use crate::core::config::data::{path_display, Config};
use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const CONFIG_FILE: &str = "config.toml";
pub const SYSTEM_PROMPT_FILE: &str = "system_prompt.txt";
pub const USER_PROMPT_FILE: &str = "user_prompt.txt";

/// Errors that can occur when loading or saving settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path_display(.path))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {}: {source}", path_display(.path))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write {}: {source}", path_display(.path))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine the configuration directory")]
    NoConfigDir,

    #[error("No {key} configured. Set it with `aireports set {key} <value>`")]
    Missing { key: &'static str },
}

impl Config {
    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        if !config_path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        write_atomic(config_path, &contents)
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let proj_dirs =
            ProjectDirs::from("org", "aireports", "aireports").ok_or(ConfigError::NoConfigDir)?;
        Ok(proj_dirs.config_dir().join(CONFIG_FILE))
    }

    pub fn read_system_prompt(config_path: &Path) -> Result<String, ConfigError> {
        read_prompt(&sibling(config_path, SYSTEM_PROMPT_FILE))
    }

    pub fn save_system_prompt(config_path: &Path, text: &str) -> Result<(), ConfigError> {
        write_atomic(&sibling(config_path, SYSTEM_PROMPT_FILE), text)
    }

    pub fn read_user_prompt(config_path: &Path) -> Result<String, ConfigError> {
        read_prompt(&sibling(config_path, USER_PROMPT_FILE))
    }

    pub fn save_user_prompt(config_path: &Path, text: &str) -> Result<(), ConfigError> {
        write_atomic(&sibling(config_path, USER_PROMPT_FILE), text)
    }
}

/// Prompt files live next to the config file.
fn sibling(config_path: &Path, name: &str) -> PathBuf {
    match config_path.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

fn read_prompt(path: &Path) -> Result<String, ConfigError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());

    if let Some(dir) = parent {
        fs::create_dir_all(dir).map_err(write_err)?;
    }

    let mut temp_file = match parent {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new(),
    }
    .map_err(write_err)?;

    temp_file.write_all(contents.as_bytes()).map_err(write_err)?;
    temp_file.as_file_mut().sync_all().map_err(write_err)?;
    temp_file
        .persist(path)
        .map_err(|err| write_err(err.error))?;
    Ok(())
}
