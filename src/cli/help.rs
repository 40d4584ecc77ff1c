//! CLI command-name contract for logging.

use crate::cli::parse::Commands;

/// Command name string recorded on the command span (e.g. "commit").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Init { .. } => "init",
        Commands::Add { .. } => "add",
        Commands::Rm { .. } => "rm",
        Commands::Commit { .. } => "commit",
        Commands::Log { .. } => "log",
        Commands::Status => "status",
    }
}

/// Commands that do not need an existing repository
pub fn creates_repository(command: &Commands) -> bool {
    matches!(command, Commands::Init { .. })
}
