#![forbid(unsafe_code)]

//! Path-scoped change observation for shared targets.
//!
//! ```
//! use oculus_runtime::{Change, Observer, Registry, Target, unwatch};
//!
//! let mut registry = Registry::new();
//! let form = Target::new(());
//! let on_name = Observer::new(|c: &Change<'_, String>| println!("{} -> {}", c.path, c.value));
//!
//! registry.watch(&form, "user.name", on_name.clone())?;
//! assert_eq!(registry.notify(&form, "user['name']", &"Ada".to_string())?, 1);
//!
//! unwatch(&mut registry, &form, Some("user.name"), Some(&on_name))?;
//! assert!(!registry.is_watched(&form));
//! # Ok::<(), oculus_runtime::WatchError>(())
//! ```

pub mod config;
pub mod error;
pub mod path;
pub mod reactive;

pub use config::{RegistryConfig, UnknownTargetPolicy};
pub use error::WatchError;
pub use path::{IntoPath, Path, PathError};
pub use reactive::{
    Change, Observed, Observer, ObserverId, Registry, RegistrySnapshot, Target, TargetId,
    UnregisterResult, UnwatchRequest, Watchable, unwatch,
};
