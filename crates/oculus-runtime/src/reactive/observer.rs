#![forbid(unsafe_code)]

//! Observer callbacks and the change payload they receive.
//!
//! An [`Observer`] is a cloneable handle. Every clone shares the same
//! [`ObserverId`], and that id is how a specific observer is named when it
//! is removed again: closures have no usable equality of their own.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::path::Path;
use crate::reactive::target::TargetId;

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an [`Observer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObserverId(u64);

impl ObserverId {
    fn fresh() -> Self {
        Self(NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer#{}", self.0)
    }
}

/// A change delivered to an observer.
#[derive(Debug)]
pub struct Change<'a, V> {
    /// The target that changed.
    pub target: TargetId,
    /// The path that changed.
    pub path: &'a Path,
    /// The new value at `path`.
    pub value: &'a V,
}

type Callback<V> = Rc<dyn Fn(&Change<'_, V>)>;

/// A change callback with a stable identity.
pub struct Observer<V> {
    id: ObserverId,
    callback: Callback<V>,
}

impl<V: 'static> Observer<V> {
    /// Wrap a callback. Each call to `new` yields a distinct identity, even
    /// for identical closures.
    #[must_use]
    pub fn new(callback: impl Fn(&Change<'_, V>) + 'static) -> Self {
        Self {
            id: ObserverId::fresh(),
            callback: Rc::new(callback),
        }
    }
}

impl<V> Observer<V> {
    /// This observer's identity.
    #[must_use]
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Invoke the callback.
    pub fn call(&self, change: &Change<'_, V>) {
        (self.callback)(change);
    }
}

// Manual Clone: shares the callback and the identity.
impl<V> Clone for Observer<V> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<V> PartialEq for Observer<V> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<V> Eq for Observer<V> {}

impl<V> fmt::Debug for Observer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
