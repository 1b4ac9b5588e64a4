#![forbid(unsafe_code)]

//! Error types for registry operations.

use std::fmt;

use crate::path::PathError;
use crate::reactive::target::TargetId;

/// Errors returned by [`Registry`](crate::reactive::Registry) operations.
///
/// Removing a path or observer that is not registered is never an error;
/// those calls report an empty [`UnregisterResult`](crate::reactive::UnregisterResult).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    /// The target has no registrations and the registry is configured with
    /// [`UnknownTargetPolicy::Error`](crate::config::UnknownTargetPolicy::Error).
    UnknownTarget(TargetId),
    /// A path string could not be parsed.
    InvalidPath(PathError),
}

impl fmt::Display for WatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTarget(id) => write!(f, "target {id} is not being observed"),
            Self::InvalidPath(err) => write!(f, "invalid path: {err}"),
        }
    }
}

impl std::error::Error for WatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPath(err) => Some(err),
            Self::UnknownTarget(_) => None,
        }
    }
}

impl From<PathError> for WatchError {
    fn from(err: PathError) -> Self {
        Self::InvalidPath(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_unknown_target() {
        let err = WatchError::UnknownTarget(TargetId::from_raw(7));
        assert_eq!(err.to_string(), "target #7 is not being observed");
        assert!(err.source().is_none());
    }

    #[test]
    fn invalid_path_exposes_source() {
        let err = WatchError::from(PathError::Empty);
        assert_eq!(err.to_string(), "invalid path: path is empty");
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "path is empty");
    }
}
