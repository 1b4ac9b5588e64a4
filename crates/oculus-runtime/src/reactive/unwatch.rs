#![forbid(unsafe_code)]

//! Unwatch requests and the dispatch rule that selects between them.
//!
//! Callers either build an [`UnwatchRequest`] directly or hand the optional
//! arguments to [`unwatch`]:
//!
//! | `path` | `observer` | Effect |
//! |--------|------------|--------|
//! | `None` or `""` | ignored | every registration of the target is removed |
//! | `Some(p)` | `None` | every observer at `p` is removed |
//! | `Some(p)` | `Some(o)` | only `o` at `p` is removed |
//!
//! A whitespace-only path is *present* and fails to parse, so it surfaces as
//! [`WatchError::InvalidPath`] instead of silently widening to a full
//! teardown.

use std::fmt;

use crate::error::WatchError;
use crate::path::{IntoPath, Path};
use crate::reactive::observer::Observer;
use crate::reactive::registry::{Registry, UnregisterResult};
use crate::reactive::target::{TargetId, Watchable};

/// What to remove from a [`Registry`].
pub enum UnwatchRequest<'a, V> {
    /// Remove every path and observer of the target.
    All {
        /// Target to tear down.
        target: TargetId,
    },
    /// Remove observers at one path: all of them, or only `observer`.
    Path {
        /// Target owning the path.
        target: TargetId,
        /// Path whose observers are removed.
        path: Path,
        /// The one observer to remove; `None` removes every observer at `path`.
        observer: Option<&'a Observer<V>>,
    },
}

impl<'a, V> UnwatchRequest<'a, V> {
    /// Request removal of every registration of `target`.
    #[must_use]
    pub fn all<W: Watchable + ?Sized>(target: &W) -> Self {
        Self::All {
            target: target.target_id(),
        }
    }

    /// Request removal at `path`, optionally scoped to one observer.
    pub fn path<W: Watchable + ?Sized>(
        target: &W,
        path: impl IntoPath,
        observer: Option<&'a Observer<V>>,
    ) -> Result<Self, WatchError> {
        Ok(Self::Path {
            target: target.target_id(),
            path: path.into_path()?,
            observer,
        })
    }

    /// Build a request from optional arguments: an absent or empty path
    /// selects [`UnwatchRequest::All`] and ignores `observer`.
    pub fn from_parts<W: Watchable + ?Sized>(
        target: &W,
        path: Option<&str>,
        observer: Option<&'a Observer<V>>,
    ) -> Result<Self, WatchError> {
        match path {
            None | Some("") => Ok(Self::all(target)),
            Some(path) => Self::path(target, path, observer),
        }
    }

    /// The target this request applies to.
    #[must_use]
    pub fn target(&self) -> TargetId {
        match self {
            Self::All { target } | Self::Path { target, .. } => *target,
        }
    }
}

impl<V> fmt::Debug for UnwatchRequest<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All { target } => f.debug_struct("All").field("target", target).finish(),
            Self::Path {
                target,
                path,
                observer,
            } => f
                .debug_struct("Path")
                .field("target", target)
                .field("path", &path.to_string())
                .field("observer", &observer.map(Observer::id))
                .finish(),
        }
    }
}

impl<V> Registry<V> {
    /// Execute an [`UnwatchRequest`].
    pub fn unwatch(&mut self, request: UnwatchRequest<'_, V>) -> Result<UnregisterResult, WatchError> {
        match request {
            UnwatchRequest::All { target } => self.remove_target(target),
            UnwatchRequest::Path {
                target,
                path,
                observer,
            } => self.remove_path(target, &path, observer.map(Observer::id)),
        }
    }
}

/// Stop observing `target`.
///
/// Without a path every registration of the target is torn down. With a
/// path, observers at that path are removed: only `observer` when given,
/// otherwise all of them. Errors from the registry propagate unchanged.
pub fn unwatch<V, W>(
    registry: &mut Registry<V>,
    target: &W,
    path: Option<&str>,
    observer: Option<&Observer<V>>,
) -> Result<UnregisterResult, WatchError>
where
    W: Watchable + ?Sized,
{
    let request = UnwatchRequest::from_parts(target, path, observer)?;
    registry.unwatch(request)
}
