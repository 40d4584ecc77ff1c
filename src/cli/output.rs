//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain/service errors to a string for CLI output.
///
/// Integrity failures are prefixed `fatal:`; everything else `error:`.
pub fn map_error(e: &ApiError) -> String {
    if e.is_unrecoverable() {
        format!("fatal: {}", e)
    } else {
        format!("error: {}", e)
    }
}
