#![forbid(unsafe_code)]

//! The observation registry: which observers watch which path of which
//! target.
//!
//! # Design
//!
//! [`Registry<V>`] is an explicit owned structure, two levels deep:
//!
//! ```text
//! TargetId ──► Path ──► [Observer, Observer, ...]   (registration order)
//! ```
//!
//! All mutation goes through the registry's methods. There is no global
//! registry; callers own one and pass it by reference.
//!
//! # Invariants
//!
//! 1. A path entry exists only while it holds at least one observer.
//! 2. A target entry exists only while it holds at least one path entry.
//! 3. An observer id appears at most once per (target, path).
//! 4. Observers on a path are notified in registration order.
//! 5. Removing something that is not registered is a no-op, not an error.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Malformed path string | [`WatchError::InvalidPath`] |
//! | Unwatch on an untracked target, lenient policy | Empty [`UnregisterResult`] |
//! | Unwatch on an untracked target, strict policy | [`WatchError::UnknownTarget`] |
//! | Re-entrant `watch`/`unwatch` from an observer | Rejected by the borrow checker: `notify` holds `&self` |

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace, warn};

use crate::config::{RegistryConfig, UnknownTargetPolicy};
use crate::error::WatchError;
use crate::path::{IntoPath, Path};
use crate::reactive::observer::{Change, Observer, ObserverId};
use crate::reactive::target::{TargetId, Watchable};

/// Acknowledgement returned by every unregister operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnregisterResult {
    /// Path entries that were pruned.
    pub paths_removed: usize,
    /// Observer registrations that were removed.
    pub observers_removed: usize,
}

impl UnregisterResult {
    /// Whether the call removed nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.paths_removed == 0 && self.observers_removed == 0
    }

    fn absorb(&mut self, other: Self) {
        self.paths_removed += other.paths_removed;
        self.observers_removed += other.observers_removed;
    }
}

/// Per-target table of path → observers.
struct PathTable<V> {
    paths: BTreeMap<Path, Vec<Observer<V>>>,
}

impl<V> PathTable<V> {
    fn new() -> Self {
        Self {
            paths: BTreeMap::new(),
        }
    }

    fn observer_total(&self) -> usize {
        self.paths.values().map(Vec::len).sum()
    }
}

/// Owns every registration for a set of targets.
///
/// `V` is the value type delivered to observers in a [`Change`].
pub struct Registry<V> {
    config: RegistryConfig,
    targets: HashMap<TargetId, PathTable<V>>,
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for Registry<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("targets", &self.targets.len())
            .field(
                "observers",
                &self
                    .targets
                    .values()
                    .map(PathTable::observer_total)
                    .sum::<usize>(),
            )
            .finish()
    }
}

impl<V> Registry<V> {
    /// Create an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with a custom configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            targets: HashMap::new(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ── Registration ─────────────────────────────────────────────────────

    /// Register `observer` for changes at `path` on `target`.
    ///
    /// Returns `Ok(false)` if that observer was already registered on that
    /// path; the registration is not duplicated.
    pub fn watch<W>(
        &mut self,
        target: &W,
        path: impl IntoPath,
        observer: Observer<V>,
    ) -> Result<bool, WatchError>
    where
        W: Watchable + ?Sized,
    {
        let path = path.into_path()?;
        Ok(self.insert(target.target_id(), path, observer))
    }

    pub(crate) fn insert(&mut self, id: TargetId, path: Path, observer: Observer<V>) -> bool {
        let paths = &mut self.targets.entry(id).or_insert_with(PathTable::new).paths;
        if paths
            .get(&path)
            .is_some_and(|observers| observers.iter().any(|o| o.id() == observer.id()))
        {
            return false;
        }
        debug!(
            target_id = %id,
            path = %path,
            observer = %observer.id(),
            "observer registered"
        );
        paths.entry(path).or_default().push(observer);
        true
    }

    // ── Unregistration ───────────────────────────────────────────────────

    /// Remove every path and observer registered for `target`.
    ///
    /// A target with no registrations is a no-op under
    /// [`UnknownTargetPolicy::Ignore`] and an error under
    /// [`UnknownTargetPolicy::Error`].
    pub fn unregister_all<W>(&mut self, target: &W) -> Result<UnregisterResult, WatchError>
    where
        W: Watchable + ?Sized,
    {
        self.remove_target(target.target_id())
    }

    /// Tear down all observation state for `target`.
    ///
    /// Same as [`unregister_all`](Self::unregister_all).
    pub fn destroy<W>(&mut self, target: &W) -> Result<UnregisterResult, WatchError>
    where
        W: Watchable + ?Sized,
    {
        self.unregister_all(target)
    }

    /// Remove observers registered at `path` on `target`.
    ///
    /// With `observer == None` every observer on the path is removed; with
    /// `Some(o)` only `o` is removed and the rest of the path stays intact.
    /// An observer or path that is not registered is a no-op.
    pub fn unregister_path<W>(
        &mut self,
        target: &W,
        path: impl IntoPath,
        observer: Option<&Observer<V>>,
    ) -> Result<UnregisterResult, WatchError>
    where
        W: Watchable + ?Sized,
    {
        let path = path.into_path()?;
        self.remove_path(target.target_id(), &path, observer.map(Observer::id))
    }

    /// Drop every registration for every target.
    pub fn clear(&mut self) -> UnregisterResult {
        let mut result = UnregisterResult::default();
        for (_, table) in self.targets.drain() {
            result.absorb(UnregisterResult {
                paths_removed: table.paths.len(),
                observers_removed: table.observer_total(),
            });
        }
        debug!(
            paths = result.paths_removed,
            observers = result.observers_removed,
            "registry cleared"
        );
        result
    }

    pub(crate) fn remove_target(&mut self, id: TargetId) -> Result<UnregisterResult, WatchError> {
        let Some(table) = self.targets.remove(&id) else {
            return self.untracked(id);
        };
        let result = UnregisterResult {
            paths_removed: table.paths.len(),
            observers_removed: table.observer_total(),
        };
        debug!(
            target_id = %id,
            paths = result.paths_removed,
            observers = result.observers_removed,
            "target unobserved"
        );
        Ok(result)
    }

    pub(crate) fn remove_path(
        &mut self,
        id: TargetId,
        path: &Path,
        observer: Option<ObserverId>,
    ) -> Result<UnregisterResult, WatchError> {
        let Some(table) = self.targets.get_mut(&id) else {
            return self.untracked(id);
        };

        let mut result = UnregisterResult::default();
        match observer {
            None => {
                if let Some(removed) = table.paths.remove(path) {
                    result.paths_removed = 1;
                    result.observers_removed = removed.len();
                }
            }
            Some(observer_id) => {
                if let Some(observers) = table.paths.get_mut(path) {
                    let before = observers.len();
                    observers.retain(|o| o.id() != observer_id);
                    result.observers_removed = before - observers.len();
                    if observers.is_empty() {
                        table.paths.remove(path);
                        result.paths_removed = 1;
                    }
                }
            }
        }

        if table.paths.is_empty() {
            self.targets.remove(&id);
            debug!(target_id = %id, "last path removed, target pruned");
        }

        if result.is_noop() {
            trace!(target_id = %id, path = %path, "nothing registered at path");
        } else {
            debug!(
                target_id = %id,
                path = %path,
                observers = result.observers_removed,
                "path unobserved"
            );
        }
        Ok(result)
    }

    fn untracked(&self, id: TargetId) -> Result<UnregisterResult, WatchError> {
        match self.config.unknown_target {
            UnknownTargetPolicy::Ignore => {
                trace!(target_id = %id, "unwatch on untracked target ignored");
                Ok(UnregisterResult::default())
            }
            UnknownTargetPolicy::Error => {
                warn!(target_id = %id, "unwatch on untracked target rejected");
                Err(WatchError::UnknownTarget(id))
            }
        }
    }

    // ── Dispatch ─────────────────────────────────────────────────────────

    /// Invoke, in registration order, every observer at exactly `path` on
    /// `target`. Returns how many observers ran.
    ///
    /// The observer list is snapshotted before the first callback runs.
    pub fn notify<W>(&self, target: &W, path: impl IntoPath, value: &V) -> Result<usize, WatchError>
    where
        W: Watchable + ?Sized,
    {
        let path = path.into_path()?;
        Ok(self.dispatch(target.target_id(), &path, value))
    }

    pub(crate) fn dispatch(&self, id: TargetId, path: &Path, value: &V) -> usize {
        let observers: Vec<Observer<V>> = match self
            .targets
            .get(&id)
            .and_then(|table| table.paths.get(path))
        {
            Some(observers) => observers.clone(),
            None => return 0,
        };

        trace!(target_id = %id, path = %path, observers = observers.len(), "dispatching change");
        let change = Change {
            target: id,
            path,
            value,
        };
        for observer in &observers {
            observer.call(&change);
        }
        observers.len()
    }

    // ── Collaborator handle ──────────────────────────────────────────────

    /// The observable handle for `target`.
    ///
    /// Obtaining a handle does not create a registration record; records
    /// appear on the first [`Observed::observe`].
    pub fn convert<W>(&mut self, target: &W) -> Observed<'_, V>
    where
        W: Watchable + ?Sized,
    {
        Observed {
            id: target.target_id(),
            registry: self,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// Whether `target` has at least one registration.
    #[must_use]
    pub fn is_watched<W: Watchable + ?Sized>(&self, target: &W) -> bool {
        self.targets.contains_key(&target.target_id())
    }

    /// Number of targets with at least one registration.
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Whether the registry holds no registrations at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of watched paths on `target`.
    #[must_use]
    pub fn path_count<W: Watchable + ?Sized>(&self, target: &W) -> usize {
        self.targets
            .get(&target.target_id())
            .map_or(0, |table| table.paths.len())
    }

    /// Number of observers at `path` on `target`. Unparseable paths count as
    /// unwatched.
    #[must_use]
    pub fn observer_count<W: Watchable + ?Sized>(&self, target: &W, path: impl IntoPath) -> usize {
        let Ok(path) = path.into_path() else {
            return 0;
        };
        self.targets
            .get(&target.target_id())
            .and_then(|table| table.paths.get(&path))
            .map_or(0, Vec::len)
    }

    /// Watched paths on `target`, in path order.
    pub fn paths<W: Watchable + ?Sized>(&self, target: &W) -> impl Iterator<Item = &Path> + '_ {
        self.targets
            .get(&target.target_id())
            .into_iter()
            .flat_map(|table| table.paths.keys())
    }

    /// Plain-data view of the registry's shape.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        let mut targets: Vec<TargetSnapshot> = self
            .targets
            .iter()
            .map(|(id, table)| TargetSnapshot {
                target: *id,
                paths: table
                    .paths
                    .iter()
                    .map(|(path, observers)| PathSnapshot {
                        path: path.to_string(),
                        observers: observers.len(),
                    })
                    .collect(),
            })
            .collect();
        targets.sort_by_key(|t| t.target);
        RegistrySnapshot { targets }
    }
}

/// Observable handle for one target, borrowed from a [`Registry`].
pub struct Observed<'a, V> {
    id: TargetId,
    registry: &'a mut Registry<V>,
}

impl<V> Observed<'_, V> {
    /// The target this handle observes.
    #[must_use]
    pub fn id(&self) -> TargetId {
        self.id
    }

    /// Whether the target currently has any registration.
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        self.registry.targets.contains_key(&self.id)
    }

    /// Register `observer` at `path`.
    pub fn observe(&mut self, path: impl IntoPath, observer: Observer<V>) -> Result<bool, WatchError> {
        let path = path.into_path()?;
        Ok(self.registry.insert(self.id, path, observer))
    }

    /// Remove one observer (or all observers when `None`) at `path`.
    pub fn unobserve(
        &mut self,
        path: impl IntoPath,
        observer: Option<&Observer<V>>,
    ) -> Result<UnregisterResult, WatchError> {
        let path = path.into_path()?;
        self.registry
            .remove_path(self.id, &path, observer.map(Observer::id))
    }

    /// Dispatch a change at `path` to its observers.
    pub fn notify(&self, path: impl IntoPath, value: &V) -> Result<usize, WatchError> {
        let path = path.into_path()?;
        Ok(self.registry.dispatch(self.id, &path, value))
    }

    /// Watched paths, in path order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.registry.paths(&self.id)
    }

    /// Remove every registration for this target, consuming the handle.
    pub fn destroy(self) -> Result<UnregisterResult, WatchError> {
        self.registry.remove_target(self.id)
    }
}

impl<V> std::fmt::Debug for Observed<'_, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observed")
            .field("id", &self.id)
            .field("paths", &self.registry.path_count(&self.id))
            .finish()
    }
}

/// Observer count at one path.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathSnapshot {
    /// Canonical path string.
    pub path: String,
    /// Registered observers.
    pub observers: usize,
}

/// Watched paths of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetSnapshot {
    /// Target identity.
    pub target: TargetId,
    /// Paths in path order.
    pub paths: Vec<PathSnapshot>,
}

/// Shape of a registry at one instant, ordered by target id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegistrySnapshot {
    /// Targets with at least one registration.
    pub targets: Vec<TargetSnapshot>,
}
