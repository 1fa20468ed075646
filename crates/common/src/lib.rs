//! Shared types for the library ledger crates.

mod types;

pub use types::{AccountId, BookId, ErrorKind};
