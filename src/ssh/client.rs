// ABOUTME: russh-backed transport for remote command sessions.
// ABOUTME: Handles connection, host key verification, authentication and command execution.

use super::credential::Credential;
use super::error::{Error, Result};
use super::known_hosts::{HostKeyRejection, KnownHosts};
use super::session::SessionConfig;
use super::transport::{CommandChannel, Connection, Transport};
use async_trait::async_trait;
use parking_lot::Mutex;
use russh::client::{self, Config, Handle, Msg};
use russh::keys::{PrivateKeyWithHashAlg, ssh_key};
use russh::{Channel, ChannelMsg, Disconnect};
use std::sync::Arc;

/// SSH client handler for russh.
pub(crate) struct SshHandler {
    host: String,
    port: u16,
    known_hosts: KnownHosts,
    /// Set when the presented host key was refused, so the dial error can say why.
    rejection: Arc<Mutex<Option<HostKeyRejection>>>,
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match self
            .known_hosts
            .verify(&self.host, self.port, server_public_key)
        {
            Ok(()) => Ok(true),
            Err(reason) => {
                tracing::warn!(
                    "rejecting host key for {}:{}: {}",
                    self.host,
                    self.port,
                    reason
                );
                *self.rejection.lock() = Some(reason);
                Ok(false)
            }
        }
    }
}

/// Dials real SSH connections with russh.
#[derive(Clone)]
pub struct RusshTransport {
    config: Arc<Config>,
}

impl Default for RusshTransport {
    fn default() -> Self {
        Self {
            config: Arc::new(Config::default()),
        }
    }
}

impl RusshTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for RusshTransport {
    type Connection = RusshConnection;

    async fn dial(
        &self,
        config: &SessionConfig,
        credential: &Credential,
        known_hosts: &KnownHosts,
    ) -> Result<RusshConnection> {
        let rejection = Arc::new(Mutex::new(None));
        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            known_hosts: known_hosts.clone(),
            rejection: Arc::clone(&rejection),
        };

        let mut handle = client::connect(
            Arc::clone(&self.config),
            (config.host.as_str(), config.port),
            handler,
        )
        .await
        .map_err(|e| match rejection.lock().take() {
            Some(reason) => Error::HostKeyRejected {
                host: config.host.clone(),
                port: config.port,
                reason,
            },
            None if is_connection_refused(&e) => Error::Dial(format!(
                "connection refused to {}:{}",
                config.host, config.port
            )),
            None => Error::Dial(format!("{}:{}: {}", config.host, config.port, e)),
        })?;

        authenticate(&mut handle, &config.user, credential).await?;

        Ok(RusshConnection { handle })
    }
}

fn is_connection_refused(e: &russh::Error) -> bool {
    matches!(e, russh::Error::IO(io) if io.kind() == std::io::ErrorKind::ConnectionRefused)
}

async fn authenticate(
    handle: &mut Handle<SshHandler>,
    user: &str,
    credential: &Credential,
) -> Result<()> {
    let result = match credential {
        Credential::Password(password) => {
            tracing::debug!(user, "authenticating with password");
            handle
                .authenticate_password(user, password.expose())
                .await
                .map_err(Error::Protocol)?
        }
        Credential::PrivateKey(key) => {
            tracing::debug!(user, "authenticating with private key");
            let hash_alg = handle
                .best_supported_rsa_hash()
                .await
                .map_err(Error::Protocol)?
                .flatten();

            handle
                .authenticate_publickey(user, PrivateKeyWithHashAlg::new(Arc::clone(key), hash_alg))
                .await
                .map_err(Error::Protocol)?
        }
    };

    if result.success() {
        Ok(())
    } else {
        Err(Error::AuthenticationFailed {
            user: user.to_string(),
        })
    }
}

/// An authenticated russh connection.
pub struct RusshConnection {
    handle: Handle<SshHandler>,
}

#[async_trait]
impl Connection for RusshConnection {
    type Channel = RusshChannel;

    async fn open_channel(&mut self) -> Result<RusshChannel> {
        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| Error::ChannelOpen(e.to_string()))?;
        Ok(RusshChannel { channel })
    }

    async fn close(self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(Error::Protocol)
    }
}

/// A russh session channel used for one `exec` request.
pub struct RusshChannel {
    channel: Channel<Msg>,
}

#[async_trait]
impl CommandChannel for RusshChannel {
    async fn exec(
        &mut self,
        command: &str,
        stdout: &mut Vec<u8>,
        stderr: &mut Vec<u8>,
    ) -> Result<u32> {
        self.channel
            .exec(true, command)
            .await
            .map_err(|e| Error::CommandExecution(format!("failed to exec command: {}", e)))?;

        let mut exit_status = None;
        let mut exit_signal = None;
        let mut got_eof = false;

        loop {
            match self.channel.wait().await {
                Some(ChannelMsg::Data { data }) => {
                    stdout.extend_from_slice(&data);
                }
                Some(ChannelMsg::ExtendedData { data, ext }) => {
                    // ext 1 is SSH_EXTENDED_DATA_STDERR
                    if ext == 1 {
                        stderr.extend_from_slice(&data);
                    }
                }
                Some(ChannelMsg::ExitStatus { exit_status: status }) => {
                    exit_status = Some(status);
                    if got_eof {
                        break;
                    }
                }
                Some(ChannelMsg::ExitSignal { signal_name, .. }) => {
                    exit_signal = Some(format!("{:?}", signal_name));
                    if got_eof {
                        break;
                    }
                }
                Some(ChannelMsg::Eof) => {
                    got_eof = true;
                    if exit_status.is_some() || exit_signal.is_some() {
                        break;
                    }
                }
                Some(ChannelMsg::Close) | None => break,
                Some(_) => {}
            }
        }

        match (exit_status, exit_signal) {
            (Some(status), _) => Ok(status),
            (None, Some(signal)) => Err(Error::CommandExecution(format!(
                "remote command terminated by signal {}",
                signal
            ))),
            // Closed without exit status: abnormal termination such as a dropped connection.
            (None, None) => Err(Error::ChannelClosed),
        }
    }

    async fn close(self) -> Result<()> {
        self.channel.close().await.map_err(Error::Protocol)
    }
}
