#![forbid(unsafe_code)]

//! Change-observation registry.
//!
//! This module tracks which observers watch which path of which target and
//! tears those registrations down again:
//!
//! - [`Registry`]: owns target → path → observers and exposes registration,
//!   dispatch, and removal.
//! - [`Observed`]: the per-target handle returned by [`Registry::convert`].
//! - [`unwatch`] / [`UnwatchRequest`]: removal of all registrations of a
//!   target, or of one path, or of one observer at one path.
//! - [`Target`] / [`Watchable`]: identity-keyed targets.
//! - [`Observer`]: callbacks with a stable identity.
//!
//! # Architecture
//!
//! Targets are keyed by [`TargetId`], never by value. Observers are
//! `Rc`-backed, so a [`Registry`] is single-threaded (`!Send`) and callers
//! that share one across threads must serialize access themselves.
//!
//! # Invariants
//!
//! 1. Empty path entries and empty target entries never persist.
//! 2. Unwatching something that is not registered changes nothing.
//! 3. A removed observer is never invoked by a later dispatch.

pub mod observer;
pub mod registry;
pub mod target;
pub mod unwatch;

pub use observer::{Change, Observer, ObserverId};
pub use registry::{
    Observed, PathSnapshot, Registry, RegistrySnapshot, TargetSnapshot, UnregisterResult,
};
pub use target::{Target, TargetId, Watchable};
pub use unwatch::{UnwatchRequest, unwatch};
