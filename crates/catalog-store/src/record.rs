use serde::{Deserialize, Serialize};

use crate::{AccountId, BookId};

/// A title in the library catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier for the book.
    pub id: BookId,

    /// Title of the book, not required to be unique.
    pub name: String,

    /// Total physical copies owned by the library, checked out or not.
    pub count: i64,
}

impl Book {
    /// Creates a new book record.
    pub fn new(id: BookId, name: impl Into<String>, count: i64) -> Self {
        Self {
            id,
            name: name.into(),
            count,
        }
    }
}

/// A library membership account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier for the account.
    pub id: AccountId,

    /// Name of the account holder, not required to be unique.
    pub name: String,
}

impl Account {
    /// Creates a new account record.
    pub fn new(id: AccountId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A live checkout of one book by one account.
///
/// The (account, book) pair is the whole identity; there is at most one
/// live checkout per pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Checkout {
    pub account_id: AccountId,
    pub book_id: BookId,
}

impl Checkout {
    pub fn new(account_id: AccountId, book_id: BookId) -> Self {
        Self {
            account_id,
            book_id,
        }
    }

    /// Returns true if this checkout is for the given pair.
    pub fn matches(&self, account_id: AccountId, book_id: BookId) -> bool {
        self.account_id == account_id && self.book_id == book_id
    }
}
