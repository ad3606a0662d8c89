// ABOUTME: Read-only known_hosts store and the host key verification rule.
// ABOUTME: Unknown or changed host keys are always rejected; nothing is ever learned.

use super::error::{Error, Result};
use russh::keys::known_hosts::check_known_hosts_path;
use russh::keys::ssh_key::PublicKey;
use std::path::{Path, PathBuf};

/// Why a presented host key was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostKeyRejection {
    #[error("host is not present in known_hosts")]
    Unknown,

    #[error("host key does not match known_hosts line {line}")]
    Changed { line: usize },

    #[error("known_hosts could not be checked: {0}")]
    Unreadable(String),
}

/// Trusted host keys, backed by a known_hosts file.
///
/// The file contents are parsed by `russh::keys`; this type only guarantees
/// the store was readable when loaded and decides the verdict.
#[derive(Debug, Clone)]
pub struct KnownHosts {
    path: PathBuf,
}

impl KnownHosts {
    /// Load the store, failing if the file cannot be read as text.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        std::fs::read_to_string(&path).map_err(|source| Error::HostKeyStoreLoad {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded known_hosts");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accept `key` only if it is recorded for `host:port`.
    pub fn verify(
        &self,
        host: &str,
        port: u16,
        key: &PublicKey,
    ) -> std::result::Result<(), HostKeyRejection> {
        match check_known_hosts_path(host, port, key, &self.path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(HostKeyRejection::Unknown),
            Err(russh::keys::Error::KeyChanged { line }) => Err(HostKeyRejection::Changed { line }),
            Err(e) => Err(HostKeyRejection::Unreadable(e.to_string())),
        }
    }
}
