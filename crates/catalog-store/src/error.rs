use common::{AccountId, BookId, ErrorKind};
use thiserror::Error;

/// Errors that can occur when mutating the library store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    /// A book with this id is already in the catalog.
    #[error("book already exists")]
    BookAlreadyExists(BookId),

    /// No book with this id is in the catalog.
    #[error("book does not exist")]
    BookNotExist(BookId),

    /// An account with this id is already open.
    #[error("account already exists")]
    AccountAlreadyExists(AccountId),

    /// No account with this id exists.
    #[error("account does not exist")]
    AccountNotExist(AccountId),

    /// The account does not currently hold the book.
    #[error("checkout does not exist")]
    CheckoutNotExist {
        account_id: AccountId,
        book_id: BookId,
    },

    /// A count argument was negative or exceeded the copies on record.
    #[error("{0}")]
    InvalidArgument(String),

    /// Removing the copies would take away copies that are checked out.
    #[error(
        "cannot remove more copies of {book_name} ({book_id}) than are available to check out ({available})"
    )]
    InsufficientAvailableCopies {
        book_id: BookId,
        book_name: String,
        available: i64,
    },

    /// The account already holds the maximum number of books.
    #[error("{account_name} ({account_id}) cannot checkout more than {limit} books at a time")]
    CheckoutLimitExceeded {
        account_id: AccountId,
        account_name: String,
        limit: usize,
    },

    /// The account already holds a copy of this book.
    #[error(
        "{account_name} ({account_id}) cannot checkout more than one copy of {book_name} ({book_id})"
    )]
    DuplicateCheckout {
        account_id: AccountId,
        account_name: String,
        book_id: BookId,
        book_name: String,
    },
}

impl LibraryError {
    /// Returns the coarse category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LibraryError::BookNotExist(_)
            | LibraryError::AccountNotExist(_)
            | LibraryError::CheckoutNotExist { .. } => ErrorKind::NotFound,
            LibraryError::BookAlreadyExists(_) | LibraryError::AccountAlreadyExists(_) => {
                ErrorKind::AlreadyExists
            }
            LibraryError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            LibraryError::InsufficientAvailableCopies { .. }
            | LibraryError::CheckoutLimitExceeded { .. } => ErrorKind::LimitExceeded,
            LibraryError::DuplicateCheckout { .. } => ErrorKind::DuplicateCheckout,
        }
    }
}

/// Result type for library store operations.
pub type Result<T> = std::result::Result<T, LibraryError>;
