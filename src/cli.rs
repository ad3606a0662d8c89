// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Maps flags onto configuration overrides for a single remote command.

use clap::Parser;
use sshrun::config::Overrides;
use sshrun::logging::Verbosity;
use sshrun::output::OutputMode;
use sshrun::presets::{self, Preset};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "sshrun")]
#[command(about = "Run one command on a remote host over SSH and print its output")]
#[command(version)]
pub struct Cli {
    /// Enable diagnostic logging to stderr
    #[arg(short, long)]
    pub debug: bool,

    /// Print only the remote command's output
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Remote host ([user@]host[:port])
    #[arg(long)]
    pub host: String,

    /// Remote port [default: 22]
    #[arg(
        short,
        long,
        visible_alias = "post",
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub port: Option<u16>,

    /// Remote user name
    #[arg(short, long)]
    pub user: Option<String>,

    /// Remote password; leave empty for SSH key login
    #[arg(long)]
    pub pass: Option<String>,

    /// Command to run on the remote host
    #[arg(short, long, default_value = presets::LS, conflicts_with = "preset")]
    pub cmd: String,

    /// Run a predefined command instead of --cmd
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,

    /// Private key file [default: ~/.ssh/id_rsa]
    #[arg(short, long, value_name = "FILE")]
    pub identity: Option<PathBuf>,

    /// known_hosts file [default: ~/.ssh/known_hosts]
    #[arg(long, value_name = "FILE")]
    pub known_hosts: Option<PathBuf>,

    /// Give up on the command after this many seconds
    #[arg(
        long,
        value_name = "SECONDS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,

    /// Config file [default: ~/.config/sshrun/config.yml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_debug_flag(self.debug)
    }

    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }

    pub fn command(&self) -> String {
        self.preset
            .map(|p| p.command().to_string())
            .unwrap_or_else(|| self.cmd.clone())
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.pass.clone(),
            command: self.command(),
            identity_file: self.identity.clone(),
            known_hosts: self.known_hosts.clone(),
            timeout: self.timeout.map(Duration::from_secs),
        }
    }
}
