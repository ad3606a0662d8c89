// ABOUTME: Test support utilities.
// ABOUTME: Provides a scripted mock transport that journals every call, plus fixtures.

// Each test binary only uses some of these helpers, so allow dead_code.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use russh::keys::ssh_key::PublicKey;
use sshrun::ssh::{
    CommandChannel, Connection, Credential, Error, KnownHosts, Result, SessionConfig, Transport,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use tempfile::TempDir;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("sshrun=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

pub fn fixture_public_key(name: &str) -> PublicKey {
    let text = std::fs::read_to_string(fixture(name)).unwrap();
    PublicKey::from_openssh(text.trim()).unwrap()
}

/// Public half of the key every mock host presents by default.
pub fn host_key() -> PublicKey {
    fixture_public_key("id_ed25519.pub")
}

/// A temporary home directory with an `.ssh` directory.
pub struct TestHome {
    pub dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".ssh")).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn ssh_dir(&self) -> PathBuf {
        self.dir.path().join(".ssh")
    }

    pub fn known_hosts_path(&self) -> PathBuf {
        self.ssh_dir().join("known_hosts")
    }

    pub fn identity_path(&self) -> PathBuf {
        self.ssh_dir().join("id_rsa")
    }

    /// Trust `key` for `host` (port 22 entry form).
    pub fn trust(&self, host: &str, key: &PublicKey) -> &Self {
        self.append_known_host(host, key)
    }

    /// Trust `key` for `host:port` (bracketed entry form).
    pub fn trust_with_port(&self, host: &str, port: u16, key: &PublicKey) -> &Self {
        self.append_known_host(&format!("[{}]:{}", host, port), key)
    }

    fn append_known_host(&self, pattern: &str, key: &PublicKey) -> &Self {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.known_hosts_path())
            .unwrap();
        writeln!(file, "{} {}", pattern, key.to_openssh().unwrap()).unwrap();
        self
    }

    /// Install a fixture key as `~/.ssh/id_rsa`.
    pub fn install_identity(&self, fixture_name: &str) -> &Self {
        std::fs::copy(fixture(fixture_name), self.identity_path()).unwrap();
        self
    }

    pub fn session_config(&self, host: &str, command: &str) -> SessionConfig {
        SessionConfig::new(host, "alice", command, self.known_hosts_path())
    }
}

/// Calls observed by the mock transport, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Dial { host: String, port: u16, password: bool },
    OpenChannel,
    Exec(String),
    CloseChannel,
    CloseConnection,
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    fn record(&self, event: Event) {
        self.0.lock().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().clone()
    }

    pub fn dial_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Dial { .. }))
            .count()
    }
}

/// How a scripted close call behaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CloseBehavior {
    #[default]
    Ok,
    EndOfStream,
    Fail,
}

impl CloseBehavior {
    fn into_result(self, what: &str) -> Result<()> {
        match self {
            CloseBehavior::Ok => Ok(()),
            CloseBehavior::EndOfStream => Err(Error::Io(std::io::Error::from(
                std::io::ErrorKind::UnexpectedEof,
            ))),
            CloseBehavior::Fail => Err(Error::Io(std::io::Error::other(format!(
                "{} reset by peer",
                what
            )))),
        }
    }
}

/// What the fake remote host does.
#[derive(Debug, Clone)]
pub struct RemoteScript {
    pub host_key: PublicKey,
    pub refuse_connection: bool,
    pub reject_auth: bool,
    pub refuse_channel: bool,
    pub exec_error: bool,
    pub hang: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_status: u32,
    pub channel_close: CloseBehavior,
    pub connection_close: CloseBehavior,
}

impl Default for RemoteScript {
    fn default() -> Self {
        Self {
            host_key: host_key(),
            refuse_connection: false,
            reject_auth: false,
            refuse_channel: false,
            exec_error: false,
            hang: false,
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_status: 0,
            channel_close: CloseBehavior::Ok,
            connection_close: CloseBehavior::Ok,
        }
    }
}

impl RemoteScript {
    pub fn responding(stdout: &str, stderr: &str, exit_status: u32) -> Self {
        Self {
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
            exit_status,
            ..Default::default()
        }
    }
}

/// Transport double driven by a `RemoteScript`.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    pub script: RemoteScript,
    pub journal: Journal,
}

impl MockTransport {
    pub fn new(script: RemoteScript) -> Self {
        Self {
            script,
            journal: Journal::default(),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    type Connection = MockConnection;

    async fn dial(
        &self,
        config: &SessionConfig,
        credential: &Credential,
        known_hosts: &KnownHosts,
    ) -> Result<MockConnection> {
        self.journal.record(Event::Dial {
            host: config.host.clone(),
            port: config.port,
            password: credential.is_password(),
        });

        if self.script.refuse_connection {
            return Err(Error::Dial(format!(
                "connection refused to {}:{}",
                config.host, config.port
            )));
        }

        known_hosts
            .verify(&config.host, config.port, &self.script.host_key)
            .map_err(|reason| Error::HostKeyRejected {
                host: config.host.clone(),
                port: config.port,
                reason,
            })?;

        if self.script.reject_auth {
            return Err(Error::AuthenticationFailed {
                user: config.user.clone(),
            });
        }

        Ok(MockConnection {
            script: self.script.clone(),
            journal: self.journal.clone(),
        })
    }
}

pub struct MockConnection {
    script: RemoteScript,
    journal: Journal,
}

#[async_trait]
impl Connection for MockConnection {
    type Channel = MockChannel;

    async fn open_channel(&mut self) -> Result<MockChannel> {
        self.journal.record(Event::OpenChannel);
        if self.script.refuse_channel {
            return Err(Error::ChannelOpen("administratively prohibited".to_string()));
        }
        Ok(MockChannel {
            script: self.script.clone(),
            journal: self.journal.clone(),
        })
    }

    async fn close(self) -> Result<()> {
        self.journal.record(Event::CloseConnection);
        self.script.connection_close.into_result("connection")
    }
}

pub struct MockChannel {
    script: RemoteScript,
    journal: Journal,
}

#[async_trait]
impl CommandChannel for MockChannel {
    async fn exec(
        &mut self,
        command: &str,
        stdout: &mut Vec<u8>,
        stderr: &mut Vec<u8>,
    ) -> Result<u32> {
        self.journal.record(Event::Exec(command.to_string()));
        if self.script.exec_error {
            return Err(Error::CommandExecution("exec request denied".to_string()));
        }
        stdout.extend_from_slice(&self.script.stdout);
        stderr.extend_from_slice(&self.script.stderr);
        if self.script.hang {
            std::future::pending::<()>().await;
        }
        Ok(self.script.exit_status)
    }

    async fn close(self) -> Result<()> {
        self.journal.record(Event::CloseChannel);
        self.script.channel_close.into_result("channel")
    }
}
