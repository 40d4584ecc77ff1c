pub mod environment;
pub mod global_file;
pub mod repo_file;
