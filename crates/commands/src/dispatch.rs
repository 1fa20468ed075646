//! Executes commands against a store and narrates the outcome.
//!
//! Most of this module is about producing the most useful message for each
//! failure: entities are named as `Name (ID)` whenever they can be looked up,
//! and only the bare id is shown when they cannot.

use catalog_store::{Account, AccountId, Book, BookId, LibraryError, LibraryStore};

use crate::command::{
    AddBook, AddCopies, CheckoutBook, Command, CreateAccount, RemoveCopies, ReturnBook,
};
use crate::error::ExecutionError;
use crate::report;

/// Outcome of executing a single command: the narration on success, or the
/// narration together with the store error on failure.
pub type ExecutionResult = std::result::Result<String, ExecutionError>;

impl Command {
    /// Executes the command against the store.
    ///
    /// The store error, if any, is returned unchanged inside the
    /// [`ExecutionError`], after the narration has been written.
    #[tracing::instrument(skip(self, store), fields(command = %self.name()))]
    pub async fn execute<S: LibraryStore>(&self, store: &S) -> ExecutionResult {
        let result = match self {
            Command::AddBook(args) => add_book(store, args).await,
            Command::AddCopies(args) => add_copies(store, args).await,
            Command::RemoveCopies(args) => remove_copies(store, args).await,
            Command::CreateAccount(args) => create_account(store, args).await,
            Command::CheckoutBook(args) => checkout_book(store, args).await,
            Command::ReturnBook(args) => return_book(store, args).await,
            Command::PrintCatalog => Ok(report::catalog(store).await),
            Command::PrintAccounts => Ok(report::accounts(store).await),
        };

        let outcome = match &result {
            Ok(_) => "ok",
            Err(err) => {
                tracing::debug!(error = %err.source, kind = %err.kind(), "command rejected");
                "rejected"
            }
        };
        metrics::counter!(
            "library_commands_total",
            "command" => self.name().as_str(),
            "outcome" => outcome
        )
        .increment(1);

        result
    }
}

/// Formats a book as `Name (ID)`, or `book (ID)` when it is unknown.
pub(crate) fn book_label(book: Option<&Book>, id: BookId) -> String {
    match book {
        Some(book) => format!("{} ({})", book.name, book.id),
        None => format!("book ({id})"),
    }
}

/// Formats an account as `Name (ID)`, or `account (ID)` when it is unknown.
pub(crate) fn account_label(account: Option<&Account>, id: AccountId) -> String {
    match account {
        Some(account) => format!("{} ({})", account.name, account.id),
        None => format!("account ({id})"),
    }
}

async fn add_book<S: LibraryStore>(store: &S, args: &AddBook) -> ExecutionResult {
    match store.add_book(args.id, args.name.clone(), args.count).await {
        Ok(()) => Ok(format!(
            "{} ({}) with {} copies added to the catalog",
            args.name, args.id, args.count
        )),
        Err(source) => Err(ExecutionError::new(
            format!(
                "{} ({}) could not be added to the catalog, {source}",
                args.name, args.id
            ),
            source,
        )),
    }
}

async fn add_copies<S: LibraryStore>(store: &S, args: &AddCopies) -> ExecutionResult {
    let result = match store.add_copies(args.id, args.count).await {
        Err(source @ LibraryError::BookNotExist(_)) => {
            return Err(ExecutionError::new(
                format!(
                    "could not add {} copies, book ({}) does not exist",
                    args.count, args.id
                ),
                source,
            ));
        }
        result => result,
    };

    let book = book_label(store.lookup_book(args.id).await.as_ref(), args.id);

    match result {
        Ok(()) => Ok(format!("{book} added {} copies", args.count)),
        Err(source) => Err(ExecutionError::new(
            format!("{book} could not add {} copies, {source}", args.count),
            source,
        )),
    }
}

async fn remove_copies<S: LibraryStore>(store: &S, args: &RemoveCopies) -> ExecutionResult {
    let result = match store.remove_copies(args.id, args.count).await {
        Err(source @ LibraryError::BookNotExist(_)) => {
            return Err(ExecutionError::new(
                format!(
                    "could not remove {} copies, book ({}) does not exist",
                    args.count, args.id
                ),
                source,
            ));
        }
        result => result,
    };

    let book = book_label(store.lookup_book(args.id).await.as_ref(), args.id);

    match result {
        Ok(()) => Ok(format!("{book} removed {} copies", args.count)),
        Err(source) => Err(ExecutionError::new(
            format!("{book} could not remove {} copies, {source}", args.count),
            source,
        )),
    }
}

async fn create_account<S: LibraryStore>(store: &S, args: &CreateAccount) -> ExecutionResult {
    match store.create_account(args.id, args.name.clone()).await {
        Ok(()) => Ok(format!("{} ({}) created account", args.name, args.id)),
        Err(source) => Err(ExecutionError::new(
            format!(
                "{} ({}) could not create account, {source}",
                args.name, args.id
            ),
            source,
        )),
    }
}

async fn checkout_book<S: LibraryStore>(store: &S, args: &CheckoutBook) -> ExecutionResult {
    let result = match store.checkout_book(args.account_id, args.book_id).await {
        Err(source @ LibraryError::AccountNotExist(_)) => {
            return Err(ExecutionError::new(
                format!(
                    "could not checkout book, account ({}) does not exist",
                    args.account_id
                ),
                source,
            ));
        }
        result => result,
    };

    let account = account_label(
        store.lookup_account(args.account_id).await.as_ref(),
        args.account_id,
    );

    let result = match result {
        Err(source @ LibraryError::BookNotExist(_)) => {
            return Err(ExecutionError::new(
                format!(
                    "{account} could not checkout book, book ({}) does not exist",
                    args.book_id
                ),
                source,
            ));
        }
        result => result,
    };

    let book = book_label(store.lookup_book(args.book_id).await.as_ref(), args.book_id);

    match result {
        Ok(()) => Ok(format!("{account} checked out {book}")),
        Err(source) => Err(ExecutionError::new(
            format!("{account} could not checkout {book}, {source}"),
            source,
        )),
    }
}

async fn return_book<S: LibraryStore>(store: &S, args: &ReturnBook) -> ExecutionResult {
    let result = match store.return_book(args.account_id, args.book_id).await {
        Err(source @ LibraryError::AccountNotExist(_)) => {
            return Err(ExecutionError::new(
                format!(
                    "could not return book, account ({}) does not exist",
                    args.account_id
                ),
                source,
            ));
        }
        result => result,
    };

    let account = account_label(
        store.lookup_account(args.account_id).await.as_ref(),
        args.account_id,
    );

    let result = match result {
        Err(source @ LibraryError::BookNotExist(_)) => {
            return Err(ExecutionError::new(
                format!(
                    "{account} could not return book, book ({}) does not exist",
                    args.book_id
                ),
                source,
            ));
        }
        result => result,
    };

    let book = book_label(store.lookup_book(args.book_id).await.as_ref(), args.book_id);

    match result {
        Ok(()) => Ok(format!("{account} returned {book}")),
        Err(source @ LibraryError::CheckoutNotExist { .. }) => Err(ExecutionError::new(
            format!("{account} could not return {book}, no checkout exists"),
            source,
        )),
        Err(source) => Err(ExecutionError::new(
            format!("{account} could not return {book}, {source}"),
            source,
        )),
    }
}
