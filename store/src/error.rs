use thiserror::Error;

/// Errors raised while turning a path string into a [`Path`](crate::Path).
///
/// A malformed path is a programmer error: the string was built by code, not
/// typed by a user, so callers are expected to fail fast on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("invalid path `{path}` at byte {position}: {reason}")]
    InvalidPath {
        path: String,
        position: usize,
        reason: &'static str,
    },
}

impl PathError {
    pub(crate) fn invalid(path: &str, position: usize, reason: &'static str) -> Self {
        PathError::InvalidPath {
            path: path.to_string(),
            position,
            reason,
        }
    }
}
