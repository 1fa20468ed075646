use serde::{Deserialize, Serialize};

use crate::{Account, Book, Checkout};

/// A consistent copy of the whole store taken under one read lock.
///
/// Books and accounts are ordered by id and checkouts by (account, book), so
/// two snapshots of equivalent stores compare equal regardless of the order
/// in which the state was built up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    /// Every book in the catalog.
    pub books: Vec<Book>,

    /// Every account.
    pub accounts: Vec<Account>,

    /// Every live checkout.
    pub checkouts: Vec<Checkout>,
}

impl LibrarySnapshot {
    /// Total number of records the snapshot would replay as.
    pub fn record_count(&self) -> usize {
        self.books.len() + self.accounts.len() + self.checkouts.len()
    }
}
