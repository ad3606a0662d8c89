// ABOUTME: Configuration file parsing and merging with command-line overrides.
// ABOUTME: Produces the session parameters and credential selection for one run.

mod host;
mod paths;

pub use host::HostSpec;
pub use paths::{CONFIG_FILENAME, DEFAULT_IDENTITY, DEFAULT_KNOWN_HOSTS, SshPaths};

use crate::error::{Error, Result};
use crate::ssh::{CredentialSource, SessionConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 22;

/// Defaults read from `~/.config/sshrun/config.yml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub identity_file: Option<PathBuf>,

    #[serde(default)]
    pub known_hosts: Option<PathBuf>,

    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

/// Values given on the command line; each one wins over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: String,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub command: String,
    pub identity_file: Option<PathBuf>,
    pub known_hosts: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

/// Everything needed to run one session.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub session: SessionConfig,
    pub credential: CredentialSource,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(yaml)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config file under `paths`, or defaults if it doesn't exist.
    pub fn discover(paths: &SshPaths) -> Result<Self> {
        let path = paths.config_file();
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config file");
            Self::load(&path)
        } else {
            Ok(Config::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.port == Some(0) {
            return Err(Error::InvalidConfig("port must be between 1 and 65535".to_string()));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(Error::InvalidConfig("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Merge command-line overrides with this config.
    ///
    /// Precedence: override, then `user@host:port` parts of the host
    /// argument, then the config file, then built-in defaults.
    pub fn resolve(&self, overrides: Overrides, paths: &SshPaths) -> Result<RunPlan> {
        let spec = HostSpec::parse(&overrides.host).map_err(Error::InvalidConfig)?;

        let port = overrides
            .port
            .or(spec.port)
            .or(self.port)
            .unwrap_or(DEFAULT_PORT);
        if port == 0 {
            return Err(Error::InvalidConfig("port must be between 1 and 65535".to_string()));
        }

        let user = overrides
            .user
            .or(spec.user)
            .or_else(|| self.user.clone())
            .or_else(|| std::env::var("USER").ok())
            .filter(|u| !u.is_empty())
            .ok_or(Error::MissingUser)?;

        let identity = overrides
            .identity_file
            .or_else(|| self.identity_file.clone())
            .map(|p| paths.expand(&p))
            .unwrap_or_else(|| paths.identity());

        let known_hosts = overrides
            .known_hosts
            .or_else(|| self.known_hosts.clone())
            .map(|p| paths.expand(&p))
            .unwrap_or_else(|| paths.known_hosts());

        let mut session =
            SessionConfig::new(spec.host, user, overrides.command, known_hosts).port(port);
        if let Some(timeout) = overrides.timeout.or(self.timeout) {
            session = session.command_timeout(timeout);
        }

        Ok(RunPlan {
            session,
            credential: CredentialSource::from_password_or_key(
                overrides.password.as_deref(),
                identity,
            ),
        })
    }
}
