//! Per-chat pagination sessions
//!
//! Sessions live in a bounded LRU cache keyed by chat. Each entry is its own
//! async mutex, so chats never contend with each other while events of one
//! chat are applied one at a time.
//!
//! A slot with a live guard (or a task waiting for one) is also pinned in a
//! side map. Eviction from the cache therefore never splits one chat into
//! two mutexes, and the pinned slot is written back to the cache when its
//! last user lets go.

use crate::config::BrowserSettings;
use crate::navigation::ChatIdentity;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// `None` until the chat sends the start command
type Slot = Arc<Mutex<Option<usize>>>;

struct Pinned {
    slot: Slot,
    users: usize,
}

/// Errors of session mutation
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// Navigation on a chat that never started (or was evicted)
    #[error("Session for chat {0} is not initialized")]
    Uninitialized(ChatIdentity),
}

/// Pagination cursor per chat
#[derive(Clone)]
pub struct SessionStore {
    slots: Cache<ChatIdentity, Slot>,
    pinned: Arc<DashMap<ChatIdentity, Pinned>>,
}

impl SessionStore {
    /// Creates a store holding at most `max_capacity` chats, dropping chats
    /// idle for longer than `idle`. The least recently used chat goes first.
    #[must_use]
    pub fn new(max_capacity: u64, idle: Duration) -> Self {
        let slots = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_idle(idle)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self {
            slots,
            pinned: Arc::new(DashMap::new()),
        }
    }

    /// Store sized from settings
    #[must_use]
    pub fn from_settings(settings: &BrowserSettings) -> Self {
        Self::new(settings.session_cache_capacity, settings.session_idle())
    }

    /// Exclusive access to one chat's session.
    ///
    /// Waits while another event of the same chat holds its guard.
    pub async fn acquire(&self, chat: ChatIdentity) -> SessionGuard {
        let lease = self.lease(chat);
        let page_index = lease.slot.clone().lock_owned().await;

        SessionGuard {
            chat,
            page_index,
            _lease: lease,
        }
    }

    fn lease(&self, chat: ChatIdentity) -> Lease {
        let slot = match self.pinned.entry(chat) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().users += 1;
                entry.get().slot.clone()
            }
            Entry::Vacant(entry) => {
                let slot = self
                    .slots
                    .get_with(chat, || Arc::new(Mutex::new(None)));
                entry.insert(Pinned {
                    slot: slot.clone(),
                    users: 1,
                });
                slot
            }
        };

        Lease {
            chat,
            slot,
            store: self.clone(),
        }
    }

    fn release(&self, chat: ChatIdentity, slot: &Slot) {
        if let Entry::Occupied(mut entry) = self.pinned.entry(chat) {
            entry.get_mut().users = entry.get().users.saturating_sub(1);
            if entry.get().users == 0 {
                entry.remove();
                let cached = self.slots.get(&chat);
                if !cached.is_some_and(|cached| Arc::ptr_eq(&cached, slot)) {
                    // Evicted while in use
                    self.slots.insert(chat, slot.clone());
                }
            }
        }
    }

    /// Current page, 0 for unknown chats. Never creates an entry.
    pub async fn get(&self, chat: ChatIdentity) -> usize {
        let slot = self
            .pinned
            .get(&chat)
            .map(|pinned| pinned.slot.clone())
            .or_else(|| self.slots.get(&chat));

        match slot {
            Some(slot) => slot.lock().await.unwrap_or(0),
            None => 0,
        }
    }

    /// Set the page to 0, creating the session if absent
    pub async fn reset(&self, chat: ChatIdentity) {
        self.acquire(chat).await.reset();
    }

    /// Advance one page
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Uninitialized` if the chat never started.
    pub async fn increment(&self, chat: ChatIdentity) -> Result<usize, SessionError> {
        self.acquire(chat).await.increment()
    }

    /// Go back one page, stopping at 0
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Uninitialized` if the chat never started.
    pub async fn decrement(&self, chat: ChatIdentity) -> Result<usize, SessionError> {
        self.acquire(chat).await.decrement()
    }

    /// Number of tracked chats (approximate until pending maintenance runs)
    #[must_use]
    pub fn len(&self) -> u64 {
        self.slots.entry_count()
    }

    /// No chats tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::from_settings(&BrowserSettings::default())
    }
}

/// Keeps a slot pinned from the start of `acquire` until its guard drops,
/// including while the acquiring task is still waiting for the lock.
struct Lease {
    chat: ChatIdentity,
    slot: Slot,
    store: SessionStore,
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.store.release(self.chat, &self.slot);
    }
}

/// Held for the whole handling of one event of one chat
pub struct SessionGuard {
    chat: ChatIdentity,
    // Declared before the lease: the lock is released before unpinning
    page_index: OwnedMutexGuard<Option<usize>>,
    _lease: Lease,
}

impl SessionGuard {
    /// Chat this guard belongs to
    #[must_use]
    pub const fn chat(&self) -> ChatIdentity {
        self.chat
    }

    /// Current page, 0 if not started
    #[must_use]
    pub fn page_index(&self) -> usize {
        (*self.page_index).unwrap_or(0)
    }

    /// Whether the chat has started browsing
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.page_index.is_some()
    }

    /// Back to page 0
    pub fn reset(&mut self) {
        *self.page_index = Some(0);
    }

    /// Advance one page, without an upper bound
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Uninitialized` if the chat never started.
    pub fn increment(&mut self) -> Result<usize, SessionError> {
        let chat = self.chat;
        let index = (*self.page_index)
            .as_mut()
            .ok_or(SessionError::Uninitialized(chat))?;
        *index = index.saturating_add(1);
        Ok(*index)
    }

    /// Go back one page, stopping at 0
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Uninitialized` if the chat never started.
    pub fn decrement(&mut self) -> Result<usize, SessionError> {
        let chat = self.chat;
        let index = (*self.page_index)
            .as_mut()
            .ok_or(SessionError::Uninitialized(chat))?;
        *index = index.saturating_sub(1);
        Ok(*index)
    }
}
