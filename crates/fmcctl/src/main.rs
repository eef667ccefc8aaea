mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fmc_core::ManagedFmc;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a controller connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "fmcctl", &mut std::io::stdout());
            Ok(())
        }

        // Everything else talks to a controller
        cmd => {
            let connection = config::resolve_connection(&cli.global)?;
            tracing::debug!(
                profile = %connection.profile_name,
                url = %connection.config.url,
                token_max_age = %config::format_duration(connection.config.token_max_age),
                "connecting"
            );
            let mut fmc = ManagedFmc::new(connection.config)?;
            if let Some(grant) = connection.token {
                fmc.reach_with_token(grant).await;
            }

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &mut fmc, &cli.global).await
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn short_k_after_resolve_means_insecure() {
        let cli = Cli::try_parse_from([
            "fmcctl", "objects", "resolve", "-k", "--kind", "host", "web",
        ]);
        assert!(cli.is_ok_and(|cli| cli.global.insecure));
    }
}
