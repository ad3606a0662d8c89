// ABOUTME: Predefined convenience commands.
// ABOUTME: Plain command strings selectable by name; nothing here is parsed.

use clap::ValueEnum;

pub const WHOAMI: &str = "whoami";
pub const PWD: &str = "pwd";
pub const LS: &str = "ls -Alh";
pub const DF: &str = "df -h";
pub const SHUTDOWN: &str = "sudo shutdown +1";
pub const REBOOT: &str = "sudo shutdown -r +1";

/// Named presets for the command to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Print the remote user name
    Whoami,
    /// Print the remote working directory
    Pwd,
    /// List the remote home directory
    Ls,
    /// Show remote disk usage
    Df,
    /// Shut the host down in one minute
    Shutdown,
    /// Reboot the host in one minute
    Reboot,
}

impl Preset {
    pub fn command(self) -> &'static str {
        match self {
            Preset::Whoami => WHOAMI,
            Preset::Pwd => PWD,
            Preset::Ls => LS,
            Preset::Df => DF,
            Preset::Shutdown => SHUTDOWN,
            Preset::Reboot => REBOOT,
        }
    }
}
