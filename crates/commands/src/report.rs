//! Catalog and account reports for the print commands.
//!
//! Each report is rendered from one snapshot, so it reflects a single
//! instant even while other tasks mutate the store.

use std::collections::HashMap;

use catalog_store::{AccountId, Book, BookId, LibraryStore};

use crate::dispatch::book_label;

/// Renders every book with its copy count and number of live checkouts.
pub async fn catalog<S: LibraryStore>(store: &S) -> String {
    let snapshot = store.snapshot().await;

    let mut checked_out: HashMap<BookId, usize> = HashMap::new();
    for checkout in &snapshot.checkouts {
        *checked_out.entry(checkout.book_id).or_default() += 1;
    }

    let mut out = String::from("# Library Catalog\n");

    for book in &snapshot.books {
        let checked_out = checked_out.get(&book.id).copied().unwrap_or(0);

        out.push_str(&format!("## {} ({})\n", book.name, book.id));
        out.push_str(&format!("Copies: {}\n", book.count));
        out.push_str(&format!("Checked Out: {checked_out}\n"));
        out.push('\n');
    }

    out
}

/// Renders every account with the books it currently holds.
pub async fn accounts<S: LibraryStore>(store: &S) -> String {
    let snapshot = store.snapshot().await;

    let books: HashMap<BookId, &Book> = snapshot.books.iter().map(|b| (b.id, b)).collect();
    let mut held: HashMap<AccountId, Vec<BookId>> = HashMap::new();
    for checkout in &snapshot.checkouts {
        held.entry(checkout.account_id)
            .or_default()
            .push(checkout.book_id);
    }

    let mut out = String::from("# Accounts\n\n");

    for account in &snapshot.accounts {
        out.push_str(&format!("## {} ({})\n", account.name, account.id));
        out.push_str("Checked Out Books:\n");

        for book_id in held.get(&account.id).into_iter().flatten() {
            let book = books.get(book_id).copied();
            out.push_str(&format!("- {}\n", book_label(book, *book_id)));
        }

        out.push('\n');
    }

    out
}
