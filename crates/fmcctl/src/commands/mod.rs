//! Command dispatch: bridges CLI args -> orchestrator calls -> output formatting.

pub mod config_cmd;
pub mod deploy;
pub mod devices;
pub mod interfaces;
pub mod objects;
pub mod routes;
pub mod status;
pub mod util;

use fmc_core::ManagedFmc;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a controller-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    fmc: &mut ManagedFmc,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status(args) => status::handle(fmc, args, global).await,
        Command::Devices(args) => devices::handle(fmc, args, global).await,
        Command::Objects(args) => objects::handle(fmc, args, global).await,
        Command::Interfaces(args) => interfaces::handle(fmc, args, global).await,
        Command::Routes(args) => routes::handle(fmc, args, global).await,
        Command::Deploy(args) => deploy::handle(fmc, args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled without a controller connection".into(),
        }),
    }
}
