// ABOUTME: Entry point for the sshrun CLI application.
// ABOUTME: Parses arguments, runs the command and turns any error into an exit status.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use sshrun::logging;
use sshrun::output::Output;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    logging::init(cli.verbosity());

    let mut output = Output::new(cli.output_mode());
    if let Err(e) = commands::exec_command(&cli, &mut output).await {
        tracing::debug!(error = ?e, "sshrun failed");
        output.error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}
