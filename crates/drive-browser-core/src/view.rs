//! File browser UI components
//!
//! Contains the prompt text, button labels and the keyboard layout of a page.

use crate::navigation::NavigationEvent;
use crate::pagination::Page;
use crate::transport::{Button, Keyboard};

// ─────────────────────────────────────────────────────────────────────────────
// Trait definition
// ─────────────────────────────────────────────────────────────────────────────

/// Texts of the file browser
pub trait BrowserView: Send + Sync {
    /// Prompt sent above the file buttons
    fn choose_file_prompt(&self) -> &str;

    /// Label of the "previous page" button
    fn previous_label(&self) -> &str;

    /// Label of the "next page" button
    fn next_label(&self) -> &str;
}

// ─────────────────────────────────────────────────────────────────────────────
// Default implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Default Russian-language implementation of `BrowserView`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBrowserView;

impl BrowserView for DefaultBrowserView {
    fn choose_file_prompt(&self) -> &str {
        "Выберите файл:"
    }

    fn previous_label(&self) -> &str {
        "⬅️ Назад"
    }

    fn next_label(&self) -> &str {
        "Вперед ➡️"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Keyboards
// ─────────────────────────────────────────────────────────────────────────────

/// One row per file, then a navigation row when there is somewhere to go.
#[must_use]
pub fn page_keyboard(view: &dyn BrowserView, page: &Page<'_>) -> Keyboard {
    let mut keyboard = Keyboard::default();

    for file in page.entries {
        let select = NavigationEvent::SelectFile(file.id.clone());
        keyboard.push_row(vec![Button::new(file.name.clone(), select.payload())]);
    }

    let mut navigation = Vec::with_capacity(2);
    if page.has_previous {
        navigation.push(Button::new(
            view.previous_label(),
            NavigationEvent::PreviousPage.payload(),
        ));
    }
    if page.has_next {
        navigation.push(Button::new(
            view.next_label(),
            NavigationEvent::NextPage.payload(),
        ));
    }
    keyboard.push_row(navigation);

    keyboard
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{paginate, PageSize};
    use crate::storage::FileEntry;

    fn files(n: usize) -> Vec<FileEntry> {
        (1..=n)
            .map(|i| FileEntry::new(format!("id{i}"), format!("file{i}")))
            .collect()
    }

    #[test]
    fn test_middle_page_has_both_arrows() {
        let all = files(25);
        let page = paginate(&all, 1, PageSize::default());
        let keyboard = page_keyboard(&DefaultBrowserView, &page);

        assert_eq!(keyboard.rows.len(), 11);
        assert_eq!(keyboard.rows[0], vec![Button::new("file11", "file_id11")]);
        let nav: Vec<&str> = keyboard.rows[10].iter().map(|b| b.payload.as_str()).collect();
        assert_eq!(nav, ["prev_page", "next_page"]);
    }

    #[test]
    fn test_first_page_has_only_next() {
        let all = files(11);
        let page = paginate(&all, 0, PageSize::default());
        let keyboard = page_keyboard(&DefaultBrowserView, &page);

        let last = keyboard.rows.last().cloned().unwrap_or_default();
        assert_eq!(last, vec![Button::new("Вперед ➡️", "next_page")]);
    }

    #[test]
    fn test_single_page_has_no_navigation_row() {
        let all = files(3);
        let page = paginate(&all, 0, PageSize::default());
        let keyboard = page_keyboard(&DefaultBrowserView, &page);

        assert_eq!(keyboard.rows.len(), 3);
        assert!(keyboard.buttons().all(|b| b.payload.starts_with("file_")));
    }

    #[test]
    fn test_page_past_the_end_has_only_previous() {
        let all = files(5);
        let page = paginate(&all, 3, PageSize::default());
        let keyboard = page_keyboard(&DefaultBrowserView, &page);

        assert_eq!(keyboard.rows, vec![vec![Button::new("⬅️ Назад", "prev_page")]]);
    }

    #[test]
    fn test_empty_list_renders_nothing() {
        let page = paginate(&[], 0, PageSize::default());
        assert!(page_keyboard(&DefaultBrowserView, &page).is_empty());
    }
}
