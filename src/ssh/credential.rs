// ABOUTME: Credential resolution for SSH authentication.
// ABOUTME: Turns an explicit password or key-file selection into a usable credential.

use super::error::{Error, Result};
use russh::keys::decode_secret_key;
use russh::keys::ssh_key::PrivateKey;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What the caller wants to authenticate with.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Password(String),
    KeyFile(PathBuf),
}

impl CredentialSource {
    /// CLI convenience mapping: an empty password selects the key file.
    pub fn from_password_or_key(password: Option<&str>, key_path: impl Into<PathBuf>) -> Self {
        match password {
            Some(p) if !p.is_empty() => CredentialSource::Password(p.to_string()),
            _ => CredentialSource::KeyFile(key_path.into()),
        }
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Password(_) => f.write_str("Password(<redacted>)"),
            CredentialSource::KeyFile(path) => f.debug_tuple("KeyFile").field(path).finish(),
        }
    }
}

/// A password that never shows up in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Authentication material presented during connection setup.
#[derive(Clone)]
pub enum Credential {
    Password(Password),
    PrivateKey(Arc<PrivateKey>),
}

impl Credential {
    pub fn is_password(&self) -> bool {
        matches!(self, Credential::Password(_))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Password(p) => p.fmt(f),
            Credential::PrivateKey(key) => f
                .debug_struct("PrivateKey")
                .field("algorithm", &key.algorithm())
                .finish(),
        }
    }
}

/// Source of private key bytes.
pub trait KeyReader {
    fn read_key(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads keys from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsKeyReader;

impl KeyReader for FsKeyReader {
    fn read_key(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CredentialResolver<R = FsKeyReader> {
    reader: R,
}

impl CredentialResolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: KeyReader> CredentialResolver<R> {
    pub fn with_reader(reader: R) -> Self {
        Self { reader }
    }

    /// Produce exactly one credential for `source`.
    ///
    /// Only unencrypted keys are accepted; encrypted keys fail to parse.
    pub fn resolve(&self, source: &CredentialSource) -> Result<Credential> {
        match source {
            CredentialSource::Password(p) => Ok(Credential::Password(Password::new(p.as_str()))),
            CredentialSource::KeyFile(path) => {
                let bytes = self
                    .reader
                    .read_key(path)
                    .map_err(|source| Error::CredentialLoad {
                        path: path.clone(),
                        source,
                    })?;
                let key = parse_private_key(path, &bytes)?;
                tracing::debug!(path = %path.display(), algorithm = %key.algorithm(), "loaded private key");
                Ok(Credential::PrivateKey(Arc::new(key)))
            }
        }
    }
}

fn parse_private_key(path: &Path, bytes: &[u8]) -> Result<PrivateKey> {
    let text = std::str::from_utf8(bytes).map_err(|_| Error::CredentialParse {
        path: path.to_path_buf(),
        reason: "key file is not valid UTF-8".to_string(),
    })?;
    let key = decode_secret_key(text, None).map_err(|e| Error::CredentialParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if key.is_encrypted() {
        return Err(Error::CredentialParse {
            path: path.to_path_buf(),
            reason: "key is encrypted".to_string(),
        });
    }
    Ok(key)
}
