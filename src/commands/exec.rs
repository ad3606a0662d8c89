// ABOUTME: Exec command implementation.
// ABOUTME: Resolves configuration, runs the remote command and prints its output.

use crate::cli::Cli;
use sshrun::config::{Config, SshPaths};
use sshrun::error::Result;
use sshrun::output::Output;
use sshrun::ssh::{self, CredentialResolver, RusshTransport};

/// Run the command described by `cli` and print the result.
pub async fn exec_command(cli: &Cli, output: &mut Output) -> Result<()> {
    let paths = SshPaths::from_env()?;
    let config = match &cli.config {
        Some(path) => Config::load(&paths.expand(path))?,
        None => Config::discover(&paths)?,
    };
    let plan = config.resolve(cli.overrides(), &paths)?;

    tracing::debug!(
        host = %plan.session.host,
        port = plan.session.port,
        user = %plan.session.user,
        credential = ?plan.credential,
        "resolved session"
    );

    output.start_timer();
    let session = ssh::execute(
        plan.session,
        &plan.credential,
        &CredentialResolver::new(),
        &RusshTransport::new(),
    )
    .await?;

    output.report(session.output())?;
    Ok(())
}
