use async_trait::async_trait;

use crate::{Account, AccountId, Book, BookId, Checkout, LibrarySnapshot, Result};

/// Maximum number of books one account may hold at the same time.
pub const MAX_CHECKOUTS_PER_ACCOUNT: usize = 4;

/// Visitor invoked once per book while the store is read-locked.
pub type BookVisitor<'a> = dyn FnMut(&Book) + Send + 'a;

/// Visitor invoked once per account while the store is read-locked.
pub type AccountVisitor<'a> = dyn FnMut(&Account) + Send + 'a;

/// Core trait for library store implementations.
///
/// A library store owns the catalog, the accounts and the checkout indices,
/// and enforces every business invariant on mutation. All implementations
/// must be thread-safe (Send + Sync). Each operation is atomic on its own;
/// there is no transaction spanning several operations.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Adds a book to the catalog.
    ///
    /// Fails with `BookAlreadyExists` if the id is taken and with
    /// `InvalidArgument` if `count` is negative.
    async fn add_book(&self, id: BookId, name: String, count: i64) -> Result<()>;

    /// Adds copies of an existing book.
    async fn add_copies(&self, id: BookId, count: i64) -> Result<()>;

    /// Removes copies of an existing book.
    ///
    /// `count` must be non-negative, must not exceed the copies on record and
    /// must not exceed the copies that are not currently checked out.
    async fn remove_copies(&self, id: BookId, count: i64) -> Result<()>;

    /// Opens a new account.
    async fn create_account(&self, id: AccountId, name: String) -> Result<()>;

    /// Checks a book out to an account.
    ///
    /// Fails if either side does not exist, if the account already holds
    /// [`MAX_CHECKOUTS_PER_ACCOUNT`] books, or if it already holds this book.
    /// The number of free copies is not consulted.
    async fn checkout_book(&self, account_id: AccountId, book_id: BookId) -> Result<()>;

    /// Returns a checked-out book.
    async fn return_book(&self, account_id: AccountId, book_id: BookId) -> Result<()>;

    /// Returns an account by ID, or None if it doesn't exist.
    async fn lookup_account(&self, id: AccountId) -> Option<Account>;

    /// Returns a book by ID, or None if it doesn't exist.
    async fn lookup_book(&self, id: BookId) -> Option<Book>;

    /// Calls `visitor` for each book in the catalog.
    ///
    /// Callers must not rely on the iteration order.
    async fn for_each_book(&self, visitor: &mut BookVisitor<'_>);

    /// Calls `visitor` for each account.
    async fn for_each_account(&self, visitor: &mut AccountVisitor<'_>);

    /// Returns the live checkouts held by an account.
    ///
    /// Unknown ids yield an empty list.
    async fn checkouts_for_account(&self, id: AccountId) -> Vec<Checkout>;

    /// Returns the live checkouts of a book.
    async fn checkouts_for_book(&self, id: BookId) -> Vec<Checkout>;

    /// Copies the whole store under a single read lock.
    async fn snapshot(&self) -> LibrarySnapshot;
}
