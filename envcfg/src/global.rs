//! Process-wide default registry
//!
//! Built on first use with [`Registry::new`]. Register custom converters during
//! startup, before the first populate call that needs them.

use crate::error::Error;
use crate::populate::{Record, Source};
use crate::registry::{Converter, Registry};
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

static DEFAULT: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::new()));

// A converter panic is caught inside the registry, so a poisoned lock can only
// come from a panic that left the registry unchanged.
fn read() -> RwLockReadGuard<'static, Registry> {
    DEFAULT.read().unwrap_or_else(PoisonError::into_inner)
}

fn write() -> RwLockWriteGuard<'static, Registry> {
    DEFAULT.write().unwrap_or_else(PoisonError::into_inner)
}

/// Register a converter on the default registry.
///
/// See [`Registry::register`].
pub fn register<Sig, C>(converter: C) -> Result<(), Error>
where
    C: Converter<Sig>,
{
    write().register(converter)
}

/// Register a slice-taking converter on the default registry.
///
/// See [`Registry::register_raw`].
pub fn register_raw<T, E, F>(converter: &'static str, arity: usize, f: F) -> Result<(), Error>
where
    T: std::any::Any,
    E: fmt::Display,
    F: Fn(&[&str]) -> Result<T, E> + Send + Sync + 'static,
{
    write().register_raw(converter, arity, f)
}

/// Register a JSON converter for `T` on the default registry.
pub fn register_json<T>() -> Result<(), Error>
where
    T: serde::de::DeserializeOwned + 'static,
{
    write().register_json::<T>()
}

/// Populate `record` from `source` using the default registry.
pub fn populate_from_map<R: Record>(source: &Source, record: &mut R) -> Result<(), Error> {
    read().populate_from_map(source, record)
}

/// Populate `record` from the process environment using the default registry.
pub fn populate_from_env<R: Record>(record: &mut R) -> Result<(), Error> {
    read().populate_from_env(record)
}
