//! Thread-safe handle around a [`LibraryService`].

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    error::LibraryResult,
    models::{ActivityEvent, Item, ItemStatus, Member, MemberId},
    service::LibraryService,
    snapshot::LibrarySnapshot,
};

/// Cloneable handle that serialises every operation behind one lock.
///
/// Each call holds the lock for its full duration, so the two halves of a
/// lend or return (ledger entry and member list) are never observed apart.
#[derive(Debug, Clone, Default)]
pub struct SharedLibrary {
    inner: Arc<Mutex<LibraryService>>,
}

impl SharedLibrary {
    /// Wrap an existing service.
    pub fn new(service: LibraryService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    /// Run a closure against the service while holding the lock.
    pub fn with<R>(&self, f: impl FnOnce(&LibraryService) -> R) -> R {
        f(&self.inner.lock())
    }

    /// See [`LibraryService::add_item`].
    pub fn add_item(&self, item: Item) -> LibraryResult<()> {
        self.inner.lock().add_item(item)
    }

    /// See [`LibraryService::remove_item`].
    pub fn remove_item(&self, item_id: &str) -> LibraryResult<Item> {
        self.inner.lock().remove_item(item_id)
    }

    /// See [`LibraryService::register_member`].
    pub fn register_member(
        &self,
        id: impl Into<MemberId>,
        name: impl Into<String>,
    ) -> LibraryResult<()> {
        self.inner.lock().register_member(id, name)
    }

    /// See [`LibraryService::unregister_member`].
    pub fn unregister_member(&self, id: impl Into<MemberId>) -> LibraryResult<Member> {
        self.inner.lock().unregister_member(id)
    }

    /// See [`LibraryService::lend`].
    pub fn lend(&self, member_id: impl Into<MemberId>, item_id: &str) -> LibraryResult<()> {
        self.inner.lock().lend(member_id, item_id)
    }

    /// See [`LibraryService::return_item`].
    pub fn return_item(&self, member_id: impl Into<MemberId>, item_id: &str) -> LibraryResult<()> {
        self.inner.lock().return_item(member_id, item_id)
    }

    /// Owned copies of the items on loan to a member.
    pub fn list_loans_of_member(&self, member_id: impl Into<MemberId>) -> LibraryResult<Vec<Item>> {
        let guard = self.inner.lock();
        let items = guard.list_loans_of_member(member_id)?;
        Ok(items.into_iter().cloned().collect())
    }

    /// Current borrower of the item.
    pub fn borrower_of(&self, item_id: &str) -> Option<MemberId> {
        self.inner.lock().borrower_of(item_id).cloned()
    }

    /// See [`LibraryService::item_status`].
    pub fn item_status(&self, item_id: &str) -> Option<ItemStatus> {
        self.inner.lock().item_status(item_id)
    }

    /// Copy of the activity log.
    pub fn history(&self) -> Vec<ActivityEvent> {
        self.inner.lock().history().to_vec()
    }

    /// See [`LibraryService::snapshot`].
    pub fn snapshot(&self) -> LibrarySnapshot {
        self.inner.lock().snapshot()
    }

    /// Unwrap the service when this is the last handle.
    pub fn into_inner(self) -> Result<LibraryService, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}
