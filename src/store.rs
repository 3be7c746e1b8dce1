//! In-memory user store

use crate::models::User;

use arc_swap::ArcSwap;
use std::sync::Arc;

/// [crate::store::UserStore] holds the current set of user records.
///
/// The record set is replaced wholesale with an atomic pointer swap. Readers take a snapshot and
/// observe either the entire old set or the entire new set, never a mix of both.
#[derive(Debug)]
pub struct UserStore {
    users: ArcSwap<Vec<User>>,
}

impl UserStore {
    /// Returns an empty UserStore.
    pub fn new() -> Self {
        Self {
            users: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Returns the current record set.
    pub fn snapshot(&self) -> Arc<Vec<User>> {
        self.users.load_full()
    }

    /// Replace the record set.
    pub fn replace(&self, users: Vec<User>) {
        self.users.store(Arc::new(users));
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.users.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}
