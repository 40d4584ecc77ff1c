//! CLI presentation: text and JSON formatters for command results.

use crate::commit::Commit;
use crate::error::{ApiError, StorageError};
use crate::repository::{CommitOutcome, Status};
use crate::tree::TreePath;
use crate::types::{hash_to_hex, Hash};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::Path;

pub fn format_init_summary(repo_dir: &Path) -> String {
    format!(
        "Initialized empty twig repository in {}",
        repo_dir.display()
    )
}

pub fn format_add_result(staged: &[TreePath]) -> String {
    match staged.len() {
        0 => "Nothing to stage".to_string(),
        1 => format!("Staged {}", staged[0]),
        n => format!("Staged {} files", n),
    }
}

pub fn format_remove_result(removed: &[TreePath]) -> String {
    removed
        .iter()
        .map(|path| format!("rm '{}'", path))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_commit_outcome(outcome: &CommitOutcome, comment: &str) -> String {
    match outcome {
        CommitOutcome::Committed { hash, branch, .. } => {
            format!("[{} {}] {}", branch, short_hash(hash), comment)
        }
        CommitOutcome::NothingToCommit => "nothing to commit".to_string(),
    }
}

fn short_hash(hash: &Hash) -> String {
    hash_to_hex(hash)[..12].to_string()
}

pub fn format_log_text(entries: &[(Hash, Commit)]) -> String {
    if entries.is_empty() {
        return "No commits yet".to_string();
    }
    entries
        .iter()
        .map(|(hash, commit)| {
            format!(
                "{} {}\nAuthor: {}\n\n    {}\n",
                "commit".yellow(),
                hash_to_hex(hash).yellow(),
                commit.author,
                commit.comment
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Serialize)]
struct LogEntry<'a> {
    hash: String,
    snapshot: String,
    parent: Option<String>,
    author: &'a str,
    comment: &'a str,
}

pub fn format_log_json(entries: &[(Hash, Commit)]) -> Result<String, ApiError> {
    let out: Vec<LogEntry<'_>> = entries
        .iter()
        .map(|(hash, commit)| LogEntry {
            hash: hash_to_hex(hash),
            snapshot: hash_to_hex(&commit.snapshot),
            parent: commit.parent.as_ref().map(hash_to_hex),
            author: &commit.author,
            comment: &commit.comment,
        })
        .collect();
    serde_json::to_string_pretty(&out)
        .map_err(|e| ApiError::Storage(StorageError::Serialization(e.to_string())))
}

pub fn format_status_text(status: &Status) -> String {
    let mut lines = Vec::new();
    match &status.branch {
        Some(branch) => lines.push(format!("On branch {}", branch.bold())),
        None => lines.push("No commits yet".to_string()),
    }

    let staged = &status.staged;
    if !staged.is_empty() {
        lines.push(String::new());
        lines.push("Changes to be committed:".to_string());
        for path in &staged.added {
            lines.push(format!("\t{}", format!("new file:   {}", path).green()));
        }
        for path in &staged.modified {
            lines.push(format!("\t{}", format!("modified:   {}", path).green()));
        }
        for path in &staged.deleted {
            lines.push(format!("\t{}", format!("deleted:    {}", path).green()));
        }
    }

    let unstaged = &status.unstaged;
    if !unstaged.is_empty() {
        lines.push(String::new());
        lines.push("Changes not staged for commit:".to_string());
        for path in unstaged.modified.keys() {
            lines.push(format!("\t{}", format!("modified:   {}", path).red()));
        }
        for path in &unstaged.deleted {
            lines.push(format!("\t{}", format!("deleted:    {}", path).red()));
        }
    }

    if !status.untracked.is_empty() {
        lines.push(String::new());
        lines.push("Untracked files:".to_string());
        for path in &status.untracked {
            lines.push(format!("\t{}", path.red()));
        }
    }

    if staged.is_empty() && unstaged.is_empty() && status.untracked.is_empty() {
        lines.push("nothing to commit, working tree clean".to_string());
    }
    lines.join("\n")
}
