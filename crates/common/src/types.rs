use serde::{Deserialize, Serialize};

/// Unique identifier for a book in the catalog.
///
/// Wraps the integer id used on the wire so book ids cannot be mixed up
/// with account ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(i64);

impl BookId {
    /// Creates a book ID from its integer value.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying integer.
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for BookId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<BookId> for i64 {
    fn from(id: BookId) -> Self {
        id.0
    }
}

/// Unique identifier for a library account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    /// Creates an account ID from its integer value.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying integer.
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for AccountId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<AccountId> for i64 {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

/// Coarse failure category shared by every error type in the workspace.
///
/// Callers branch on the kind rather than on concrete variants, e.g. to pick
/// an exit status or to decide whether an entity name can be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A book, account or checkout is absent.
    NotFound,
    /// A book or account id is already taken.
    AlreadyExists,
    /// Negative counts or removing more copies than exist.
    InvalidArgument,
    /// Checkout cap reached, or removal of copies that are checked out.
    LimitExceeded,
    /// The account already holds this book.
    DuplicateCheckout,
    /// The command record names no known command.
    UnknownCommand,
    /// The command record or its arguments have the wrong shape.
    MalformedPayload,
    /// Reading or writing a command log failed.
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::LimitExceeded => "limit exceeded",
            ErrorKind::DuplicateCheckout => "duplicate checkout",
            ErrorKind::UnknownCommand => "unknown command",
            ErrorKind::MalformedPayload => "malformed payload",
            ErrorKind::Io => "i/o",
        };
        f.write_str(s)
    }
}
