// ABOUTME: Remote command session, parameterized by its lifecycle state.
// ABOUTME: Transitions consume self; failures release what is open before returning.

use super::credential::{Credential, CredentialResolver, CredentialSource, KeyReader};
use super::error::{Error, Result};
use super::known_hosts::KnownHosts;
use super::state::{Authenticated, Closed, CommandComplete, Connected, Created, SessionOpen};
use super::transport::{CommandChannel, Connection, Transport};
use crate::diagnostics::{Diagnostics, Warning};
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Parameters for a single remote command run.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Remote host to connect to.
    pub host: String,
    /// SSH port (default: 22).
    pub port: u16,
    /// Username for authentication.
    pub user: String,
    /// Exact command line to execute.
    pub command: String,
    /// known_hosts file consulted for host key verification.
    pub known_hosts_path: PathBuf,
    /// Deadline for command execution. None waits indefinitely.
    pub command_timeout: Option<Duration>,
}

impl SessionConfig {
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        command: impl Into<String>,
        known_hosts_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: user.into(),
            command: command.into(),
            known_hosts_path: known_hosts_path.into(),
            command_timeout: None,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }
}

/// Buffered result of a completed remote command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// The command line that was executed.
    pub command: String,
    /// Exit status reported by the remote process.
    pub exit_status: u32,
    /// Everything the command wrote to stdout.
    pub stdout: Vec<u8>,
    /// Everything the command wrote to stderr.
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }

    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

/// A remote command session in state `S`.
///
/// A session runs exactly one command. `end()` yields `Session<Closed>`,
/// which offers no further transitions.
pub struct Session<S> {
    config: SessionConfig,
    state: S,
}

impl<S> fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = std::any::type_name::<S>();
        let state = state.split('<').next().unwrap_or(state);
        let state = state.rsplit("::").next().unwrap_or(state);
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("state", &state)
            .finish()
    }
}

impl<S> Session<S> {
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn command(&self) -> &str {
        &self.config.command
    }

    fn transition<T>(self, state: T) -> Session<T> {
        Session {
            config: self.config,
            state,
        }
    }
}

impl Session<Created> {
    pub fn new(config: SessionConfig) -> Self {
        Session {
            config,
            state: Created,
        }
    }

    /// Resolve the credential used to authenticate the connection.
    pub fn authenticate<R: KeyReader>(
        self,
        source: &CredentialSource,
        resolver: &CredentialResolver<R>,
    ) -> Result<Session<Authenticated>> {
        let credential = resolver.resolve(source)?;
        Ok(self.transition(Authenticated { credential }))
    }
}

impl Session<Authenticated> {
    pub fn credential(&self) -> &Credential {
        &self.state.credential
    }

    /// Load known_hosts and dial an authenticated connection.
    pub async fn connect<T: Transport>(
        self,
        transport: &T,
    ) -> Result<Session<Connected<T::Connection>>> {
        let known_hosts = KnownHosts::load(&self.config.known_hosts_path)?;
        let connection = transport
            .dial(&self.config, &self.state.credential, &known_hosts)
            .await?;

        tracing::info!(
            host = %self.config.host,
            port = self.config.port,
            user = %self.config.user,
            "SSH connected"
        );

        Ok(Session {
            config: self.config,
            state: Connected { connection },
        })
    }

    /// Connect, open a channel and run the command.
    pub async fn start<T: Transport>(
        self,
        transport: &T,
    ) -> Result<Session<CommandComplete<T::Connection>>> {
        self.connect(transport).await?.open_channel().await?.run().await
    }
}

impl<C: Connection> Session<Connected<C>> {
    /// Open the single command channel. The connection is closed on failure.
    pub async fn open_channel(self) -> Result<Session<SessionOpen<C>>> {
        let Session {
            config,
            state: Connected { mut connection },
        } = self;

        match connection.open_channel().await {
            Ok(channel) => {
                tracing::debug!("SSH session channel opened");
                Ok(Session {
                    config,
                    state: SessionOpen {
                        connection,
                        channel,
                    },
                })
            }
            Err(e) => {
                let mut diag = Diagnostics::default();
                close_connection(connection, &mut diag).await;
                Err(e)
            }
        }
    }
}

impl<C: Connection> Session<SessionOpen<C>> {
    /// Execute the command and buffer its output.
    ///
    /// A non-zero exit status is reported as `Error::RemoteExit`, separate
    /// from channel-level failures. Either way channel and connection are
    /// released before the error is returned.
    pub async fn run(self) -> Result<Session<CommandComplete<C>>> {
        let Session {
            config,
            state: SessionOpen {
                connection,
                mut channel,
            },
        } = self;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let result = exec_with_deadline(&mut channel, &config, &mut stdout, &mut stderr).await;

        let failure = match result {
            Ok(0) => None,
            Ok(status) => Some(Error::RemoteExit {
                status,
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            }),
            Err(e) => Some(e),
        };
        if let Some(err) = failure {
            tracing::debug!(error = %err, "command failed, releasing session");
            release(channel, connection).await;
            return Err(err);
        }

        tracing::info!(command = %config.command, "SSH session command completed");

        let output = CommandOutput {
            command: config.command.clone(),
            exit_status: 0,
            stdout,
            stderr,
        };
        Ok(Session {
            config,
            state: CommandComplete {
                connection,
                channel,
                output,
            },
        })
    }
}

impl<C: Connection> Session<CommandComplete<C>> {
    pub fn output(&self) -> &CommandOutput {
        &self.state.output
    }

    /// Close the channel, then the connection.
    pub async fn end(self) -> Session<Closed> {
        let Session {
            config,
            state:
                CommandComplete {
                    connection,
                    channel,
                    output,
                },
        } = self;

        let diagnostics = release(channel, connection).await;
        Session {
            config,
            state: Closed {
                output,
                diagnostics,
            },
        }
    }
}

impl Session<Closed> {
    pub fn output(&self) -> &CommandOutput {
        &self.state.output
    }

    /// Non-fatal warnings raised while releasing.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.state.diagnostics
    }

    pub fn into_output(self) -> CommandOutput {
        self.state.output
    }
}

/// Run the full lifecycle for one command.
pub async fn execute<T: Transport, R: KeyReader>(
    config: SessionConfig,
    source: &CredentialSource,
    resolver: &CredentialResolver<R>,
    transport: &T,
) -> Result<Session<Closed>> {
    let session = Session::new(config)
        .authenticate(source, resolver)?
        .start(transport)
        .await?;
    Ok(session.end().await)
}

async fn exec_with_deadline<Ch: CommandChannel>(
    channel: &mut Ch,
    config: &SessionConfig,
    stdout: &mut Vec<u8>,
    stderr: &mut Vec<u8>,
) -> Result<u32> {
    let exec = channel.exec(&config.command, stdout, stderr);
    match config.command_timeout {
        Some(timeout) => tokio::time::timeout(timeout, exec)
            .await
            .unwrap_or_else(|_| Err(Error::CommandTimeout(timeout))),
        None => exec.await,
    }
}

/// Close channel then connection. Both are always attempted.
async fn release<C: Connection>(channel: C::Channel, connection: C) -> Diagnostics {
    let mut diag = Diagnostics::default();

    if let Err(e) = channel.close().await {
        if !e.is_end_of_stream() {
            diag.warn(Warning::channel_close(format!(
                "failed to close channel: {}",
                e
            )));
        }
    }

    close_connection(connection, &mut diag).await;
    diag
}

async fn close_connection<C: Connection>(connection: C, diag: &mut Diagnostics) {
    if let Err(e) = connection.close().await {
        if !e.is_end_of_stream() {
            diag.warn(Warning::connection_close(format!(
                "failed to close connection: {}",
                e
            )));
        }
    }
}
