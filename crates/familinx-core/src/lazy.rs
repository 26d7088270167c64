//! Lazy Field
//!
//! A per-instance memoization slot. The first read runs the supplied
//! computation (normally one data store query) and caches the result;
//! later reads return the cached value until the slot is invalidated.
//!
//! Thread-safe via interior mutability using parking_lot::Mutex. The lock is
//! held while computing, so a value is computed at most once per cache
//! lifetime even when the owner is shared.

use parking_lot::Mutex;

/// A lazily computed, individually invalidatable value.
pub struct LazyField<T> {
    slot: Mutex<Option<T>>,
}

impl<T> Default for LazyField<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<T: Clone> LazyField<T> {
    /// Create an empty (not yet computed) field
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value, computing and caching it on first access.
    ///
    /// Errors from `compute` are returned to the caller and are not cached,
    /// so the next read retries the computation.
    pub fn get_or_try_init<E, F>(&self, compute: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let mut slot = self.slot.lock();
        if let Some(value) = slot.as_ref() {
            return Ok(value.clone());
        }

        let value = compute()?;
        *slot = Some(value.clone());
        Ok(value)
    }

    /// Store a value directly, short-circuiting future computation
    pub fn set(&self, value: T) {
        *self.slot.lock() = Some(value);
    }

    /// Drop the cached value.
    ///
    /// Returns true if a value was cached, false otherwise.
    pub fn invalidate(&self) -> bool {
        self.slot.lock().take().is_some()
    }

    /// Check whether a value is currently cached
    pub fn is_cached(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Get the cached value without computing it
    pub fn peek(&self) -> Option<T> {
        self.slot.lock().clone()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for LazyField<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.slot.try_lock() {
            Some(slot) => f.debug_tuple("LazyField").field(&*slot).finish(),
            None => f.write_str("LazyField(<computing>)"),
        }
    }
}
