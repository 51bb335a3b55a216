//! Text rendering of snapshots for the terminal front end.

use crate::models::{Book, BookCollection, LoadState, UiSnapshot};
use std::fmt::Write;

/// Shown in the detail area until a book has been opened
pub const NO_SELECTION: &str = "No Book Selected";

/// Render the whole snapshot: search header, result grid, then the detail view
pub fn render_snapshot(snapshot: &UiSnapshot) -> String {
    let mut out = String::new();

    let status = if snapshot.is_loading { "  [loading...]" } else { "" };
    let _ = writeln!(out, "Search: \"{}\"{}", snapshot.query, status);

    match snapshot.list_state() {
        LoadState::Idle => {}
        LoadState::Loading => {
            let _ = writeln!(out, "  Searching...");
        }
        LoadState::Success(results) => render_results(&mut out, results),
        LoadState::Error(message) => {
            let _ = writeln!(out, "Error: {}", message);
        }
    }

    match snapshot.detail_state() {
        LoadState::Idle => {
            let _ = writeln!(out, "\n  {}", NO_SELECTION);
        }
        LoadState::Loading => {
            let _ = writeln!(out, "\n  Loading book...");
        }
        LoadState::Success(book) => {
            out.push('\n');
            out.push_str(&render_book(book));
        }
        LoadState::Error(message) => {
            let _ = writeln!(out, "\nError: {}", message);
            if let Some(book) = snapshot.selected_book.as_ref() {
                out.push('\n');
                out.push_str(&render_book(book));
            }
        }
    }

    out
}

fn render_results(out: &mut String, results: &BookCollection) {
    if results.is_empty() {
        let _ = writeln!(out, "  No books found.");
        return;
    }

    for (index, book) in results.items.iter().enumerate() {
        let marker = if book.selectable_id().is_some() { ' ' } else { '-' };
        let _ = writeln!(
            out,
            "{}{:>3}. {} ({})",
            marker,
            index + 1,
            book.card_title(),
            book.authors_display()
        );
    }

    if let Some(total) = results.total_items {
        if total as usize > results.len() {
            let _ = writeln!(out, "  showing {} of {} matches", results.len(), total);
        }
    }
}

/// Render the detail view of one book
pub fn render_book(book: &Book) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "== {} ==", book.title());
    let _ = writeln!(out, "by {}", book.authors_display());
    let _ = writeln!(out, "Published: {}", book.published_date());
    let _ = writeln!(out, "Type:      {}", book.print_type());
    let _ = writeln!(out, "Language:  {}", book.language());

    if let Some(pages) = book.page_count() {
        let _ = writeln!(out, "Pages:     {}", pages);
    }
    if let Some(rating) = book.average_rating() {
        let _ = writeln!(out, "Rating:    {:.1}", rating);
    }
    if let Some(url) = book.thumbnail_url() {
        let _ = writeln!(out, "Cover:     {}", url);
    }

    let _ = writeln!(out, "\n{}", book.description());
    out
}
