use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    Account, AccountId, Book, BookId, Checkout, LibraryError, LibrarySnapshot, Result,
    store::{AccountVisitor, BookVisitor, LibraryStore, MAX_CHECKOUTS_PER_ACCOUNT},
};

/// Records and indices guarded by the store lock.
#[derive(Debug, Default)]
struct LibraryState {
    books: BTreeMap<BookId, Book>,
    accounts: BTreeMap<AccountId, Account>,

    // Both indices hold every live checkout exactly once. An account holds
    // at most four books, so a linear scan of its list is cheap.
    checkouts_by_account: HashMap<AccountId, Vec<Checkout>>,
    checkouts_by_book: HashMap<BookId, Vec<Checkout>>,
}

impl LibraryState {
    fn checked_out_count(&self, id: BookId) -> usize {
        self.checkouts_by_book.get(&id).map_or(0, Vec::len)
    }
}

/// Removes the pair's checkout from one index, dropping the entry once its
/// list is empty.
fn remove_from_index<K>(
    index: &mut HashMap<K, Vec<Checkout>>,
    key: K,
    account_id: AccountId,
    book_id: BookId,
) where
    K: std::hash::Hash + Eq,
{
    if let Some(list) = index.get_mut(&key) {
        list.retain(|c| !c.matches(account_id, book_id));
        if list.is_empty() {
            index.remove(&key);
        }
    }
}

/// In-memory library store.
///
/// All state lives behind one readers-writer lock. Clones share the same
/// state, so a clone can be handed to another task.
#[derive(Clone, Default)]
pub struct InMemoryLibrary {
    state: Arc<RwLock<LibraryState>>,
}

impl InMemoryLibrary {
    /// Creates a new empty library.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LibraryStore for InMemoryLibrary {
    async fn add_book(&self, id: BookId, name: String, count: i64) -> Result<()> {
        let mut state = self.state.write().await;

        if state.books.contains_key(&id) {
            return Err(LibraryError::BookAlreadyExists(id));
        }

        if count < 0 {
            return Err(LibraryError::InvalidArgument(
                "cannot add negative copies".to_string(),
            ));
        }

        state.books.insert(id, Book::new(id, name, count));

        tracing::debug!(book_id = %id, count, "book added");
        metrics::counter!("library_store_mutations_total", "op" => "add_book").increment(1);
        Ok(())
    }

    async fn add_copies(&self, id: BookId, count: i64) -> Result<()> {
        let mut state = self.state.write().await;

        let book = state
            .books
            .get_mut(&id)
            .ok_or(LibraryError::BookNotExist(id))?;

        if count < 0 {
            return Err(LibraryError::InvalidArgument(
                "cannot add negative copies".to_string(),
            ));
        }

        book.count = book.count.checked_add(count).ok_or_else(|| {
            LibraryError::InvalidArgument("cannot add more copies than can be counted".to_string())
        })?;

        tracing::debug!(book_id = %id, count, total = book.count, "copies added");
        metrics::counter!("library_store_mutations_total", "op" => "add_copies").increment(1);
        Ok(())
    }

    async fn remove_copies(&self, id: BookId, count: i64) -> Result<()> {
        let mut state = self.state.write().await;

        let checked_out = state.checked_out_count(id) as i64;
        let book = state
            .books
            .get_mut(&id)
            .ok_or(LibraryError::BookNotExist(id))?;

        if count < 0 {
            return Err(LibraryError::InvalidArgument(
                "cannot remove negative copies".to_string(),
            ));
        }

        if book.count < count {
            return Err(LibraryError::InvalidArgument(
                "cannot remove more copies than exist".to_string(),
            ));
        }

        let available = book.count - checked_out;
        if available < count {
            return Err(LibraryError::InsufficientAvailableCopies {
                book_id: id,
                book_name: book.name.clone(),
                available,
            });
        }

        book.count -= count;

        tracing::debug!(book_id = %id, count, total = book.count, "copies removed");
        metrics::counter!("library_store_mutations_total", "op" => "remove_copies").increment(1);
        Ok(())
    }

    async fn create_account(&self, id: AccountId, name: String) -> Result<()> {
        let mut state = self.state.write().await;

        if state.accounts.contains_key(&id) {
            return Err(LibraryError::AccountAlreadyExists(id));
        }

        state.accounts.insert(id, Account::new(id, name));

        tracing::debug!(account_id = %id, "account created");
        metrics::counter!("library_store_mutations_total", "op" => "create_account").increment(1);
        Ok(())
    }

    async fn checkout_book(&self, account_id: AccountId, book_id: BookId) -> Result<()> {
        let mut state = self.state.write().await;

        let account = state
            .accounts
            .get(&account_id)
            .ok_or(LibraryError::AccountNotExist(account_id))?;

        let book = state
            .books
            .get(&book_id)
            .ok_or(LibraryError::BookNotExist(book_id))?;

        let held = state
            .checkouts_by_account
            .get(&account_id)
            .map(Vec::as_slice)
            .unwrap_or_default();

        if held.len() >= MAX_CHECKOUTS_PER_ACCOUNT {
            return Err(LibraryError::CheckoutLimitExceeded {
                account_id,
                account_name: account.name.clone(),
                limit: MAX_CHECKOUTS_PER_ACCOUNT,
            });
        }

        if held.iter().any(|c| c.matches(account_id, book_id)) {
            return Err(LibraryError::DuplicateCheckout {
                account_id,
                account_name: account.name.clone(),
                book_id,
                book_name: book.name.clone(),
            });
        }

        let checkout = Checkout::new(account_id, book_id);
        state
            .checkouts_by_account
            .entry(account_id)
            .or_default()
            .push(checkout);
        state
            .checkouts_by_book
            .entry(book_id)
            .or_default()
            .push(checkout);

        tracing::debug!(%account_id, %book_id, "book checked out");
        metrics::counter!("library_store_mutations_total", "op" => "checkout_book").increment(1);
        Ok(())
    }

    async fn return_book(&self, account_id: AccountId, book_id: BookId) -> Result<()> {
        let mut state = self.state.write().await;

        if !state.accounts.contains_key(&account_id) {
            return Err(LibraryError::AccountNotExist(account_id));
        }

        if !state.books.contains_key(&book_id) {
            return Err(LibraryError::BookNotExist(book_id));
        }

        let held = state
            .checkouts_by_account
            .get(&account_id)
            .is_some_and(|list| list.iter().any(|c| c.matches(account_id, book_id)));

        if !held {
            return Err(LibraryError::CheckoutNotExist {
                account_id,
                book_id,
            });
        }

        remove_from_index(
            &mut state.checkouts_by_account,
            account_id,
            account_id,
            book_id,
        );
        remove_from_index(&mut state.checkouts_by_book, book_id, account_id, book_id);

        tracing::debug!(%account_id, %book_id, "book returned");
        metrics::counter!("library_store_mutations_total", "op" => "return_book").increment(1);
        Ok(())
    }

    async fn lookup_account(&self, id: AccountId) -> Option<Account> {
        self.state.read().await.accounts.get(&id).cloned()
    }

    async fn lookup_book(&self, id: BookId) -> Option<Book> {
        self.state.read().await.books.get(&id).cloned()
    }

    async fn for_each_book(&self, visitor: &mut BookVisitor<'_>) {
        let state = self.state.read().await;
        for book in state.books.values() {
            visitor(book);
        }
    }

    async fn for_each_account(&self, visitor: &mut AccountVisitor<'_>) {
        let state = self.state.read().await;
        for account in state.accounts.values() {
            visitor(account);
        }
    }

    async fn checkouts_for_account(&self, id: AccountId) -> Vec<Checkout> {
        let state = self.state.read().await;
        state
            .checkouts_by_account
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    async fn checkouts_for_book(&self, id: BookId) -> Vec<Checkout> {
        let state = self.state.read().await;
        state.checkouts_by_book.get(&id).cloned().unwrap_or_default()
    }

    async fn snapshot(&self) -> LibrarySnapshot {
        let state = self.state.read().await;

        let mut checkouts: Vec<_> = state
            .checkouts_by_account
            .values()
            .flatten()
            .copied()
            .collect();
        checkouts.sort();

        LibrarySnapshot {
            books: state.books.values().cloned().collect(),
            accounts: state.accounts.values().cloned().collect(),
            checkouts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ErrorKind;

    async fn library_with_dune() -> InMemoryLibrary {
        let library = InMemoryLibrary::new();
        library
            .add_book(BookId::new(1), "Dune".to_string(), 2)
            .await
            .unwrap();
        library
            .create_account(AccountId::new(10), "Ada".to_string())
            .await
            .unwrap();
        library
    }

    #[tokio::test]
    async fn add_book_then_lookup() {
        let library = InMemoryLibrary::new();
        library
            .add_book(BookId::new(1), "Dune".to_string(), 3)
            .await
            .unwrap();

        let book = library.lookup_book(BookId::new(1)).await.unwrap();
        assert_eq!(book.name, "Dune");
        assert_eq!(book.count, 3);
        assert_eq!(library.snapshot().await.books.len(), 1);
    }

    #[tokio::test]
    async fn add_book_with_taken_id_fails() {
        let library = library_with_dune().await;

        let result = library
            .add_book(BookId::new(1), "Emma".to_string(), -5)
            .await;
        assert_eq!(result, Err(LibraryError::BookAlreadyExists(BookId::new(1))));

        let book = library.lookup_book(BookId::new(1)).await.unwrap();
        assert_eq!(book.name, "Dune");
    }

    #[tokio::test]
    async fn add_book_negative_count_fails() {
        let library = InMemoryLibrary::new();
        let err = library
            .add_book(BookId::new(1), "Dune".to_string(), -1)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(library.lookup_book(BookId::new(1)).await.is_none());
    }

    #[tokio::test]
    async fn add_book_zero_copies_allowed() {
        let library = InMemoryLibrary::new();
        library
            .add_book(BookId::new(1), "Dune".to_string(), 0)
            .await
            .unwrap();
        assert_eq!(library.lookup_book(BookId::new(1)).await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn add_copies_increments_count() {
        let library = library_with_dune().await;
        library.add_copies(BookId::new(1), 3).await.unwrap();
        assert_eq!(library.lookup_book(BookId::new(1)).await.unwrap().count, 5);
    }

    #[tokio::test]
    async fn add_copies_unknown_book_fails() {
        let library = InMemoryLibrary::new();
        let result = library.add_copies(BookId::new(9), 1).await;
        assert_eq!(result, Err(LibraryError::BookNotExist(BookId::new(9))));
    }

    #[tokio::test]
    async fn add_copies_past_max_count_fails_without_change() {
        let library = InMemoryLibrary::new();
        library
            .add_book(BookId::new(1), "Dune".to_string(), i64::MAX)
            .await
            .unwrap();

        let err = library.add_copies(BookId::new(1), 1).await.unwrap_err();
        assert_eq!(
            err,
            LibraryError::InvalidArgument("cannot add more copies than can be counted".to_string())
        );
        assert_eq!(
            library.lookup_book(BookId::new(1)).await.unwrap().count,
            i64::MAX
        );

        library.add_copies(BookId::new(1), 0).await.unwrap();
    }

    #[tokio::test]
    async fn add_copies_negative_fails() {
        let library = library_with_dune().await;
        let err = library.add_copies(BookId::new(1), -1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(library.lookup_book(BookId::new(1)).await.unwrap().count, 2);
    }

    #[tokio::test]
    async fn remove_copies_more_than_exist_fails() {
        let library = library_with_dune().await;
        let err = library.remove_copies(BookId::new(1), 3).await.unwrap_err();
        assert_eq!(
            err,
            LibraryError::InvalidArgument("cannot remove more copies than exist".to_string())
        );
        assert_eq!(library.lookup_book(BookId::new(1)).await.unwrap().count, 2);
    }

    #[tokio::test]
    async fn remove_copies_negative_fails() {
        let library = library_with_dune().await;
        let err = library.remove_copies(BookId::new(1), -2).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn remove_copies_unknown_book_fails() {
        let library = InMemoryLibrary::new();
        let err = library.remove_copies(BookId::new(1), 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn remove_copies_respects_checked_out_copies() {
        let library = library_with_dune().await;
        library
            .checkout_book(AccountId::new(10), BookId::new(1))
            .await
            .unwrap();
        assert_eq!(library.checkouts_for_book(BookId::new(1)).await.len(), 1);

        let err = library.remove_copies(BookId::new(1), 2).await.unwrap_err();
        assert!(matches!(
            err,
            LibraryError::InsufficientAvailableCopies { available: 1, .. }
        ));
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);

        library.remove_copies(BookId::new(1), 1).await.unwrap();
        assert_eq!(library.lookup_book(BookId::new(1)).await.unwrap().count, 1);

        let err = library.remove_copies(BookId::new(1), 1).await.unwrap_err();
        assert!(matches!(
            err,
            LibraryError::InsufficientAvailableCopies { available: 0, .. }
        ));
        assert_eq!(
            err.to_string(),
            "cannot remove more copies of Dune (1) than are available to check out (0)"
        );
    }

    #[tokio::test]
    async fn create_account_with_taken_id_fails() {
        let library = library_with_dune().await;
        let result = library
            .create_account(AccountId::new(10), "Grace".to_string())
            .await;
        assert_eq!(
            result,
            Err(LibraryError::AccountAlreadyExists(AccountId::new(10)))
        );
        let account = library.lookup_account(AccountId::new(10)).await.unwrap();
        assert_eq!(account.name, "Ada");
    }

    #[tokio::test]
    async fn checkout_requires_account_then_book() {
        let library = InMemoryLibrary::new();
        let result = library
            .checkout_book(AccountId::new(10), BookId::new(1))
            .await;
        assert_eq!(
            result,
            Err(LibraryError::AccountNotExist(AccountId::new(10)))
        );

        library
            .create_account(AccountId::new(10), "Ada".to_string())
            .await
            .unwrap();
        let result = library
            .checkout_book(AccountId::new(10), BookId::new(1))
            .await;
        assert_eq!(result, Err(LibraryError::BookNotExist(BookId::new(1))));
    }

    #[tokio::test]
    async fn checkout_is_indexed_both_ways() {
        let library = library_with_dune().await;
        library
            .checkout_book(AccountId::new(10), BookId::new(1))
            .await
            .unwrap();

        let expected = vec![Checkout::new(AccountId::new(10), BookId::new(1))];
        assert_eq!(
            library.checkouts_for_account(AccountId::new(10)).await,
            expected
        );
        assert_eq!(library.checkouts_for_book(BookId::new(1)).await, expected);
    }

    #[tokio::test]
    async fn duplicate_checkout_fails() {
        let library = library_with_dune().await;
        library
            .checkout_book(AccountId::new(10), BookId::new(1))
            .await
            .unwrap();

        let err = library
            .checkout_book(AccountId::new(10), BookId::new(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateCheckout);
        assert_eq!(
            err.to_string(),
            "Ada (10) cannot checkout more than one copy of Dune (1)"
        );
        assert_eq!(library.checkouts_for_book(BookId::new(1)).await.len(), 1);
    }

    #[tokio::test]
    async fn fifth_checkout_exceeds_limit() {
        let library = InMemoryLibrary::new();
        library
            .create_account(AccountId::new(10), "Ada".to_string())
            .await
            .unwrap();
        for id in 1..=5 {
            library
                .add_book(BookId::new(id), format!("Book {id}"), 1)
                .await
                .unwrap();
        }
        for id in 1..=4 {
            library
                .checkout_book(AccountId::new(10), BookId::new(id))
                .await
                .unwrap();
        }

        let err = library
            .checkout_book(AccountId::new(10), BookId::new(5))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
        assert_eq!(
            err.to_string(),
            "Ada (10) cannot checkout more than 4 books at a time"
        );
        assert_eq!(
            library.checkouts_for_account(AccountId::new(10)).await.len(),
            4
        );
        assert!(library.checkouts_for_book(BookId::new(5)).await.is_empty());
    }

    // Checkout does not compare live checkouts against the copy count; only
    // remove_copies guards availability.
    #[tokio::test]
    async fn checkout_does_not_enforce_available_copies() {
        let library = InMemoryLibrary::new();
        library
            .add_book(BookId::new(1), "Dune".to_string(), 1)
            .await
            .unwrap();
        for id in [10, 11] {
            library
                .create_account(AccountId::new(id), format!("Reader {id}"))
                .await
                .unwrap();
            library
                .checkout_book(AccountId::new(id), BookId::new(1))
                .await
                .unwrap();
        }

        assert_eq!(library.checkouts_for_book(BookId::new(1)).await.len(), 2);
        assert_eq!(library.lookup_book(BookId::new(1)).await.unwrap().count, 1);
    }

    #[tokio::test]
    async fn return_restores_index_state() {
        let library = library_with_dune().await;
        let before = library.snapshot().await;

        library
            .checkout_book(AccountId::new(10), BookId::new(1))
            .await
            .unwrap();
        library
            .return_book(AccountId::new(10), BookId::new(1))
            .await
            .unwrap();

        assert_eq!(library.snapshot().await, before);
        assert!(
            library
                .checkouts_for_account(AccountId::new(10))
                .await
                .is_empty()
        );
        assert!(library.checkouts_for_book(BookId::new(1)).await.is_empty());

        let result = library
            .return_book(AccountId::new(10), BookId::new(1))
            .await;
        assert_eq!(
            result,
            Err(LibraryError::CheckoutNotExist {
                account_id: AccountId::new(10),
                book_id: BookId::new(1),
            })
        );
    }

    #[tokio::test]
    async fn return_only_removes_matching_checkout() {
        let library = library_with_dune().await;
        library
            .add_book(BookId::new(2), "Emma".to_string(), 1)
            .await
            .unwrap();
        library
            .create_account(AccountId::new(11), "Grace".to_string())
            .await
            .unwrap();
        library
            .checkout_book(AccountId::new(10), BookId::new(1))
            .await
            .unwrap();
        library
            .checkout_book(AccountId::new(10), BookId::new(2))
            .await
            .unwrap();
        library
            .checkout_book(AccountId::new(11), BookId::new(1))
            .await
            .unwrap();

        library
            .return_book(AccountId::new(10), BookId::new(1))
            .await
            .unwrap();

        assert_eq!(
            library.checkouts_for_account(AccountId::new(10)).await,
            vec![Checkout::new(AccountId::new(10), BookId::new(2))]
        );
        assert_eq!(
            library.checkouts_for_book(BookId::new(1)).await,
            vec![Checkout::new(AccountId::new(11), BookId::new(1))]
        );
    }

    #[tokio::test]
    async fn return_unknown_entities_fails() {
        let library = library_with_dune().await;
        let err = library
            .return_book(AccountId::new(99), BookId::new(1))
            .await
            .unwrap_err();
        assert_eq!(err, LibraryError::AccountNotExist(AccountId::new(99)));

        let err = library
            .return_book(AccountId::new(10), BookId::new(99))
            .await
            .unwrap_err();
        assert_eq!(err, LibraryError::BookNotExist(BookId::new(99)));
    }

    #[tokio::test]
    async fn lookups_of_unknown_ids_are_empty() {
        let library = InMemoryLibrary::new();
        assert!(library.lookup_book(BookId::new(1)).await.is_none());
        assert!(library.lookup_account(AccountId::new(1)).await.is_none());
        assert!(
            library
                .checkouts_for_account(AccountId::new(1))
                .await
                .is_empty()
        );
        assert!(library.checkouts_for_book(BookId::new(1)).await.is_empty());
    }

    #[tokio::test]
    async fn for_each_visits_every_record() {
        let library = library_with_dune().await;
        library
            .add_book(BookId::new(2), "Emma".to_string(), 1)
            .await
            .unwrap();

        let mut names = Vec::new();
        library
            .for_each_book(&mut |book: &Book| names.push(book.name.clone()))
            .await;
        names.sort();
        assert_eq!(names, vec!["Dune", "Emma"]);

        let mut accounts = Vec::new();
        library
            .for_each_account(&mut |account: &Account| accounts.push(account.clone()))
            .await;
        assert_eq!(accounts, vec![Account::new(AccountId::new(10), "Ada")]);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let library = InMemoryLibrary::new();
        let clone = library.clone();
        clone
            .add_book(BookId::new(1), "Dune".to_string(), 1)
            .await
            .unwrap();
        assert!(library.lookup_book(BookId::new(1)).await.is_some());
    }

    #[tokio::test]
    async fn concurrent_checkouts_respect_limit() {
        let library = InMemoryLibrary::new();
        library
            .create_account(AccountId::new(10), "Ada".to_string())
            .await
            .unwrap();
        for id in 1..=8 {
            library
                .add_book(BookId::new(id), format!("Book {id}"), 1)
                .await
                .unwrap();
        }

        let mut handles = Vec::new();
        for id in 1..=8 {
            let library = library.clone();
            handles.push(tokio::spawn(async move {
                library
                    .checkout_book(AccountId::new(10), BookId::new(id))
                    .await
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, MAX_CHECKOUTS_PER_ACCOUNT);
        assert_eq!(
            library.checkouts_for_account(AccountId::new(10)).await.len(),
            MAX_CHECKOUTS_PER_ACCOUNT
        );
        assert_eq!(
            library.snapshot().await.checkouts.len(),
            MAX_CHECKOUTS_PER_ACCOUNT
        );
    }
}
