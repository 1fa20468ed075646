//! Command variants and their wire encoding.

use std::str::FromStr;

use catalog_store::{AccountId, BookId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CommandError, Result};

/// The fixed set of command names used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    AddBook,
    AddCopies,
    RemoveCopies,
    CreateAccount,
    CheckoutBook,
    ReturnBook,
    PrintCatalog,
    PrintAccounts,
}

impl CommandName {
    /// Every command name, in declaration order.
    pub const ALL: [CommandName; 8] = [
        CommandName::AddBook,
        CommandName::AddCopies,
        CommandName::RemoveCopies,
        CommandName::CreateAccount,
        CommandName::CheckoutBook,
        CommandName::ReturnBook,
        CommandName::PrintCatalog,
        CommandName::PrintAccounts,
    ];

    /// Returns the wire token for this command.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandName::AddBook => "ADD_BOOK",
            CommandName::AddCopies => "ADD_COPIES",
            CommandName::RemoveCopies => "REMOVE_COPIES",
            CommandName::CreateAccount => "CREATE_ACCOUNT",
            CommandName::CheckoutBook => "CHECKOUT_BOOK",
            CommandName::ReturnBook => "RETURN_BOOK",
            CommandName::PrintCatalog => "PRINT_CATALOG",
            CommandName::PrintAccounts => "PRINT_ACCOUNTS",
        }
    }
}

impl std::fmt::Display for CommandName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandName {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self> {
        CommandName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| CommandError::UnknownCommand(s.to_string()))
    }
}

/// Arguments for ADD_BOOK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddBook {
    pub id: BookId,
    pub name: String,
    pub count: i64,
}

impl AddBook {
    pub fn new(id: impl Into<BookId>, name: impl Into<String>, count: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            count,
        }
    }
}

/// Arguments for ADD_COPIES.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddCopies {
    pub id: BookId,
    pub count: i64,
}

impl AddCopies {
    pub fn new(id: impl Into<BookId>, count: i64) -> Self {
        Self {
            id: id.into(),
            count,
        }
    }
}

/// Arguments for REMOVE_COPIES.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveCopies {
    pub id: BookId,
    pub count: i64,
}

impl RemoveCopies {
    pub fn new(id: impl Into<BookId>, count: i64) -> Self {
        Self {
            id: id.into(),
            count,
        }
    }
}

/// Arguments for CREATE_ACCOUNT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccount {
    pub id: AccountId,
    pub name: String,
}

impl CreateAccount {
    pub fn new(id: impl Into<AccountId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Arguments for CHECKOUT_BOOK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBook {
    pub account_id: AccountId,
    pub book_id: BookId,
}

impl CheckoutBook {
    pub fn new(account_id: impl Into<AccountId>, book_id: impl Into<BookId>) -> Self {
        Self {
            account_id: account_id.into(),
            book_id: book_id.into(),
        }
    }
}

/// Arguments for RETURN_BOOK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnBook {
    pub account_id: AccountId,
    pub book_id: BookId,
}

impl ReturnBook {
    pub fn new(account_id: impl Into<AccountId>, book_id: impl Into<BookId>) -> Self {
        Self {
            account_id: account_id.into(),
            book_id: book_id.into(),
        }
    }
}

/// A single action against the library, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddBook(AddBook),
    AddCopies(AddCopies),
    RemoveCopies(RemoveCopies),
    CreateAccount(CreateAccount),
    CheckoutBook(CheckoutBook),
    ReturnBook(ReturnBook),
    PrintCatalog,
    PrintAccounts,
}

impl Command {
    /// Returns the wire name of this command.
    pub fn name(&self) -> CommandName {
        match self {
            Command::AddBook(_) => CommandName::AddBook,
            Command::AddCopies(_) => CommandName::AddCopies,
            Command::RemoveCopies(_) => CommandName::RemoveCopies,
            Command::CreateAccount(_) => CommandName::CreateAccount,
            Command::CheckoutBook(_) => CommandName::CheckoutBook,
            Command::ReturnBook(_) => CommandName::ReturnBook,
            Command::PrintCatalog => CommandName::PrintCatalog,
            Command::PrintAccounts => CommandName::PrintAccounts,
        }
    }

    /// Encodes the command as a single-line JSON record.
    ///
    /// Argument keys keep their declared order, so `AddBook::new(1, "Dune", 3)`
    /// encodes as
    ///
    /// ```json
    /// {"name":"ADD_BOOK","arguments":{"id":1,"name":"Dune","count":3}}
    /// ```
    pub fn encode(&self) -> Result<String> {
        let name = self.name().as_str();
        match self {
            Command::AddBook(args) => encode_record(name, args),
            Command::AddCopies(args) => encode_record(name, args),
            Command::RemoveCopies(args) => encode_record(name, args),
            Command::CreateAccount(args) => encode_record(name, args),
            Command::CheckoutBook(args) => encode_record(name, args),
            Command::ReturnBook(args) => encode_record(name, args),
            Command::PrintCatalog | Command::PrintAccounts => {
                encode_record(name, &NoArguments {})
            }
        }
    }

    /// Decodes a single JSON record.
    ///
    /// The name is resolved before the arguments are looked at, so an unknown
    /// command fails with `UnknownCommand` whatever its arguments hold.
    pub fn decode(record: &str) -> Result<Self> {
        let raw: RawCommand = serde_json::from_str(record).map_err(CommandError::InvalidRecord)?;
        Command::try_from(raw)
    }
}

impl TryFrom<RawCommand> for Command {
    type Error = CommandError;

    fn try_from(raw: RawCommand) -> Result<Self> {
        let name: CommandName = raw.name.parse()?;

        let command = match name {
            CommandName::AddBook => Command::AddBook(arguments(name, raw.arguments)?),
            CommandName::AddCopies => Command::AddCopies(arguments(name, raw.arguments)?),
            CommandName::RemoveCopies => Command::RemoveCopies(arguments(name, raw.arguments)?),
            CommandName::CreateAccount => Command::CreateAccount(arguments(name, raw.arguments)?),
            CommandName::CheckoutBook => Command::CheckoutBook(arguments(name, raw.arguments)?),
            CommandName::ReturnBook => Command::ReturnBook(arguments(name, raw.arguments)?),
            // Print commands take no arguments; whatever was sent is ignored.
            CommandName::PrintCatalog => Command::PrintCatalog,
            CommandName::PrintAccounts => Command::PrintAccounts,
        };

        Ok(command)
    }
}

impl From<AddBook> for Command {
    fn from(args: AddBook) -> Self {
        Command::AddBook(args)
    }
}

impl From<AddCopies> for Command {
    fn from(args: AddCopies) -> Self {
        Command::AddCopies(args)
    }
}

impl From<RemoveCopies> for Command {
    fn from(args: RemoveCopies) -> Self {
        Command::RemoveCopies(args)
    }
}

impl From<CreateAccount> for Command {
    fn from(args: CreateAccount) -> Self {
        Command::CreateAccount(args)
    }
}

impl From<CheckoutBook> for Command {
    fn from(args: CheckoutBook) -> Self {
        Command::CheckoutBook(args)
    }
}

impl From<ReturnBook> for Command {
    fn from(args: ReturnBook) -> Self {
        Command::ReturnBook(args)
    }
}

/// Outgoing command record, borrowing the typed arguments.
#[derive(Serialize)]
struct Envelope<'a, T> {
    name: &'a str,
    arguments: &'a T,
}

/// Arguments of the print commands; encodes as `{}`.
#[derive(Serialize)]
struct NoArguments {}

fn encode_record<T: Serialize>(name: &str, arguments: &T) -> Result<String> {
    serde_json::to_string(&Envelope { name, arguments }).map_err(CommandError::Encode)
}

/// A command record with its arguments not yet interpreted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCommand {
    /// Wire name of the command, e.g. `ADD_BOOK`.
    pub name: String,

    /// Command arguments; `{}` when absent.
    #[serde(default = "empty_arguments")]
    pub arguments: Value,
}

fn empty_arguments() -> Value {
    Value::Object(serde_json::Map::new())
}

fn arguments<T: DeserializeOwned>(command: CommandName, arguments: Value) -> Result<T> {
    serde_json::from_value(arguments)
        .map_err(|source| CommandError::MalformedPayload { command, source })
}
