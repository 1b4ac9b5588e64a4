#![forbid(unsafe_code)]

//! Target identity.
//!
//! The registry keys everything by *identity*, never by value: two targets
//! holding equal data are still two targets. Identity is carried by a
//! [`TargetId`], and anything that can report one is [`Watchable`].
//!
//! [`Target<T>`] is the stock watchable: a shared handle whose clones all
//! refer to the same value and the same id.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of an observed target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetId(u64);

impl TargetId {
    /// Allocate a fresh id, distinct from every other id allocated in this
    /// process.
    #[must_use]
    pub fn fresh() -> Self {
        Self(NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap a raw id. Callers that mix raw and fresh ids are responsible for
    /// keeping them distinct.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Capability of being observed: the object can name its identity.
///
/// Implement this for your own types (typically by storing a
/// [`TargetId::fresh`] at construction) or use [`Target<T>`].
pub trait Watchable {
    /// The identity under which this object is registered.
    fn target_id(&self) -> TargetId;
}

impl Watchable for TargetId {
    fn target_id(&self) -> TargetId {
        *self
    }
}

impl<W: Watchable + ?Sized> Watchable for Rc<W> {
    fn target_id(&self) -> TargetId {
        (**self).target_id()
    }
}

struct TargetInner<T> {
    id: TargetId,
    value: RefCell<T>,
}

/// A shared, identity-carrying value.
///
/// Cloning a `Target` creates a new handle to the **same** value with the
/// same [`TargetId`]. Equality is identity equality.
pub struct Target<T> {
    inner: Rc<TargetInner<T>>,
}

impl<T> Target<T> {
    /// Wrap `value` in a new target with a fresh identity.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(TargetInner {
                id: TargetId::fresh(),
                value: RefCell::new(value),
            }),
        }
    }

    /// This target's identity.
    #[must_use]
    pub fn id(&self) -> TargetId {
        self.inner.id
    }

    /// Borrow the value.
    ///
    /// # Panics
    ///
    /// Panics if the value is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.inner.value.borrow()
    }

    /// Mutably borrow the value.
    ///
    /// # Panics
    ///
    /// Panics if the value is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.inner.value.borrow_mut()
    }

    /// Replace the value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        self.inner.value.replace(value)
    }

    /// Whether two handles refer to the same target.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> Target<T> {
    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }
}

// Manual Clone: shares the same Rc.
impl<T> Clone for Target<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for Target<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> Eq for Target<T> {}

impl<T: fmt::Debug> fmt::Debug for Target<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("id", &self.inner.id)
            .field("value", &self.inner.value)
            .finish()
    }
}

impl<T> Watchable for Target<T> {
    fn target_id(&self) -> TargetId {
        self.inner.id
    }
}
