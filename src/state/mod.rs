//! Per-screen state: the observable view state and form input values.
//!
//! - [`ViewStateStore`]: flat, observable key/value store mutated by `setState`.
//! - [`InputStore`]: current text of input fields, grouped by form.

pub mod input;
pub mod store;

pub use input::InputStore;
pub use store::{StateChange, SubscriptionId, ViewState, ViewStateStore};

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

// A panicking listener must not wedge the whole screen, so poisoned locks are
// recovered rather than propagated.

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read<T>(rw: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    rw.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(rw: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    rw.write().unwrap_or_else(PoisonError::into_inner)
}
