//! Test store that can be taken offline between reads.

use std::sync::atomic::{AtomicBool, Ordering};

use super::{DataStore, SqliteStore, StoreError};
use crate::types::{FounderStats, Location, PersonId, Years};

/// An in-memory store whose queries fail while it is offline
pub(crate) struct SwitchableStore {
    inner: SqliteStore,
    offline: AtomicBool,
}

impl SwitchableStore {
    pub(crate) fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            offline: AtomicBool::new(false),
        }
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn online(&self) -> Result<&SqliteStore, StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionAborted,
                "store offline",
            )));
        }
        Ok(&self.inner)
    }
}

impl DataStore for SwitchableStore {
    fn age(&self, id: PersonId) -> Result<Option<i32>, StoreError> {
        self.online()?.age(id)
    }

    fn years(&self, id: PersonId) -> Result<Years, StoreError> {
        self.online()?.years(id)
    }

    fn gender_code(&self, id: PersonId) -> Result<Option<i64>, StoreError> {
        self.online()?.gender_code(id)
    }

    fn location(&self, id: PersonId) -> Result<Option<Location>, StoreError> {
        self.online()?.location(id)
    }

    fn parent_ids(&self, id: PersonId) -> Result<Vec<PersonId>, StoreError> {
        self.online()?.parent_ids(id)
    }

    fn child_ids(&self, id: PersonId) -> Result<Vec<PersonId>, StoreError> {
        self.online()?.child_ids(id)
    }

    fn founder_stats(&self, id: PersonId) -> Result<Option<FounderStats>, StoreError> {
        self.online()?.founder_stats(id)
    }
}
