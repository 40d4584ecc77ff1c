//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to the repository.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_add_result, format_commit_outcome, format_init_summary, format_log_json,
    format_log_text, format_remove_result, format_status_text,
};
pub use route::RunContext;
