//! The two named views and their per-view state

use std::fmt;

use super::PageWindow;
use crate::models::{EmailRecord, PaginationSettings};

/// Which collection a view lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    All,
    Starred,
}

impl ViewKind {
    pub const BOTH: [ViewKind; 2] = [ViewKind::All, ViewKind::Starred];

    /// The view whose copies mirror this one's
    pub fn other(self) -> Self {
        match self {
            ViewKind::All => ViewKind::Starred,
            ViewKind::Starred => ViewKind::All,
        }
    }

    pub fn starred_only(self) -> bool {
        self == ViewKind::Starred
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKind::All => f.write_str("all"),
            ViewKind::Starred => f.write_str("starred"),
        }
    }
}

/// One independently paginated view
#[derive(Debug, Clone)]
pub struct EmailView {
    pub(crate) kind: ViewKind,
    pub(crate) window: PageWindow,
    pub(crate) settings: PaginationSettings,
    /// Select-all checkbox
    pub(crate) is_selected: bool,
    /// Read/unread toggle applied to the selection
    pub(crate) is_read: bool,
}

impl EmailView {
    pub(crate) fn new(kind: ViewKind, page_size: usize, sort_by: Option<Vec<String>>) -> Self {
        Self {
            kind,
            window: PageWindow::default(),
            settings: PaginationSettings::new(page_size, kind.starred_only()).with_sort_by(sort_by),
            is_selected: false,
            is_read: false,
        }
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn window(&self) -> &PageWindow {
        &self.window
    }

    pub fn current_page(&self) -> &[EmailRecord] {
        &self.window.current_page
    }

    pub fn next_page(&self) -> &[EmailRecord] {
        &self.window.next_page
    }

    pub fn settings(&self) -> &PaginationSettings {
        &self.settings
    }

    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    pub fn is_read(&self) -> bool {
        self.is_read
    }

    pub fn formatted_pagination(&self) -> String {
        self.settings.formatted_pagination()
    }

    /// Back to page 1 with nothing selected
    pub(crate) fn reset(&mut self) {
        self.settings.page = 1;
        self.is_selected = false;
        self.is_read = false;
        self.window = PageWindow::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starred_only_fixed_per_view() {
        assert!(!EmailView::new(ViewKind::All, 10, None).settings().starred_only);
        assert!(EmailView::new(ViewKind::Starred, 10, None).settings().starred_only);
    }

    #[test]
    fn test_other() {
        assert_eq!(ViewKind::All.other(), ViewKind::Starred);
        assert_eq!(ViewKind::Starred.other(), ViewKind::All);
    }

    #[test]
    fn test_reset() {
        let mut view = EmailView::new(ViewKind::All, 10, None);
        view.settings.page = 4;
        view.is_selected = true;
        view.is_read = true;
        view.window = PageWindow::from_batch(vec![EmailRecord::builder("1").build()], 10);

        view.reset();
        assert_eq!(view.settings().page, 1);
        assert!(!view.is_selected());
        assert!(!view.is_read());
        assert!(view.current_page().is_empty());
    }
}
