// ABOUTME: Home-relative path conventions for keys, known_hosts and the config file.
// ABOUTME: Reads HOME (falling back to USERPROFILE) once.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_IDENTITY: &str = ".ssh/id_rsa";
pub const DEFAULT_KNOWN_HOSTS: &str = ".ssh/known_hosts";
pub const CONFIG_FILENAME: &str = ".config/sshrun/config.yml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshPaths {
    home: PathBuf,
}

impl SshPaths {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Locate the home directory from the environment.
    pub fn from_env() -> Result<Self> {
        ["HOME", "USERPROFILE"]
            .iter()
            .filter_map(|var| std::env::var_os(var))
            .find(|value| !value.is_empty())
            .map(Self::new)
            .ok_or(Error::MissingHome)
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn identity(&self) -> PathBuf {
        self.home.join(DEFAULT_IDENTITY)
    }

    pub fn known_hosts(&self) -> PathBuf {
        self.home.join(DEFAULT_KNOWN_HOSTS)
    }

    pub fn config_file(&self) -> PathBuf {
        self.home.join(CONFIG_FILENAME)
    }

    /// Expand a leading `~/` to the home directory.
    pub fn expand(&self, path: &Path) -> PathBuf {
        match path.strip_prefix("~") {
            Ok(rest) => self.home.join(rest),
            Err(_) => path.to_path_buf(),
        }
    }
}
