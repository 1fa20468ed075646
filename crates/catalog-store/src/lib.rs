//! Library state store.
//!
//! Owns the catalog, the accounts and both checkout indices, and enforces
//! the lending invariants:
//! - a book's copy count never goes negative
//! - copies that are checked out cannot be removed
//! - an account holds at most four books, and never two copies of one book
//! - every checkout refers to an existing account and book

pub mod error;
pub mod memory;
pub mod record;
pub mod snapshot;
pub mod store;

pub use common::{AccountId, BookId, ErrorKind};
pub use error::{LibraryError, Result};
pub use memory::InMemoryLibrary;
pub use record::{Account, Book, Checkout};
pub use snapshot::LibrarySnapshot;
pub use store::{AccountVisitor, BookVisitor, LibraryStore, MAX_CHECKOUTS_PER_ACCOUNT};
