//! Visible page plus one page of prefetch

use crate::models::{EmailId, EmailRecord};

/// The records a view shows and the page after it
///
/// `next_page` holds records in the order the service returned them. When
/// records leave `current_page`, [`refill`](Self::refill) promotes from the
/// front of `next_page`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageWindow {
    pub current_page: Vec<EmailRecord>,
    pub next_page: Vec<EmailRecord>,
}

impl PageWindow {
    /// Split a double-page batch into the visible page and the prefetch buffer
    pub fn from_batch(mut emails: Vec<EmailRecord>, page_size: usize) -> Self {
        let next_page = if emails.len() > page_size {
            emails.split_off(page_size)
        } else {
            Vec::new()
        };
        Self {
            current_page: emails,
            next_page,
        }
    }

    /// Find a record on the visible page
    pub fn find(&self, id: &EmailId) -> Option<&EmailRecord> {
        self.current_page.iter().find(|e| &e.id == id)
    }

    pub fn find_mut(&mut self, id: &EmailId) -> Option<&mut EmailRecord> {
        self.current_page.iter_mut().find(|e| &e.id == id)
    }

    pub fn contains(&self, id: &EmailId) -> bool {
        self.find(id).is_some()
    }

    /// Apply `f` to every copy of `id` in the window, prefetched copies included
    pub fn for_each_copy<F>(&mut self, id: &EmailId, mut f: F)
    where
        F: FnMut(&mut EmailRecord),
    {
        self.current_page
            .iter_mut()
            .chain(self.next_page.iter_mut())
            .filter(|e| &e.id == id)
            .for_each(|e| f(e));
    }

    /// Remove matching records from the visible page, returning them in order
    pub fn remove_where<F>(&mut self, mut pred: F) -> Vec<EmailRecord>
    where
        F: FnMut(&EmailRecord) -> bool,
    {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.current_page)
            .into_iter()
            .partition(|e| pred(e));
        self.current_page = kept;
        removed
    }

    /// Drop records from the visible page and the prefetch buffer.
    /// Returns how many left the visible page.
    pub fn discard(&mut self, ids: &[EmailId]) -> usize {
        self.next_page.retain(|e| !ids.contains(&e.id));
        self.remove_where(|e| ids.contains(&e.id)).len()
    }

    /// Promote prefetched records until the page is full or the buffer is empty.
    /// Returns how many records moved.
    pub fn refill(&mut self, page_size: usize) -> usize {
        let missing = page_size.saturating_sub(self.current_page.len());
        let take = missing.min(self.next_page.len());
        self.current_page.extend(self.next_page.drain(..take));
        take
    }

    pub fn selected(&self) -> impl Iterator<Item = &EmailRecord> {
        self.current_page.iter().filter(|e| e.is_selected)
    }

    pub fn selected_ids(&self) -> Vec<EmailId> {
        self.selected().map(|e| e.id.clone()).collect()
    }

    /// Carry selection over from a previous window for records still shown
    pub(crate) fn keep_selection(&mut self, previous: &[EmailId]) {
        for email in &mut self.current_page {
            email.is_selected = previous.contains(&email.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emails(ids: &[&str]) -> Vec<EmailRecord> {
        ids.iter().map(|id| EmailRecord::builder(*id).build()).collect()
    }

    fn ids(list: &[EmailRecord]) -> Vec<&str> {
        list.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_from_batch_full_double_page() {
        let window = PageWindow::from_batch(emails(&["a", "b", "c", "d", "e", "f"]), 3);
        assert_eq!(ids(&window.current_page), vec!["a", "b", "c"]);
        assert_eq!(ids(&window.next_page), vec!["d", "e", "f"]);
    }

    #[test]
    fn test_from_batch_short() {
        let window = PageWindow::from_batch(emails(&["a", "b"]), 3);
        assert_eq!(window.current_page.len(), 2);
        assert!(window.next_page.is_empty());

        let window = PageWindow::from_batch(emails(&["a", "b", "c", "d"]), 3);
        assert_eq!(window.current_page.len(), 3);
        assert_eq!(ids(&window.next_page), vec!["d"]);
    }

    #[test]
    fn test_refill_fifo() {
        let mut window = PageWindow {
            current_page: emails(&["A", "B"]),
            next_page: emails(&["C", "D"]),
        };

        assert_eq!(window.refill(3), 1);
        assert_eq!(ids(&window.current_page), vec!["A", "B", "C"]);
        assert_eq!(ids(&window.next_page), vec!["D"]);
    }

    #[test]
    fn test_refill_exhausts_buffer() {
        let mut window = PageWindow {
            current_page: emails(&["A"]),
            next_page: emails(&["B"]),
        };

        assert_eq!(window.refill(3), 1);
        assert_eq!(ids(&window.current_page), vec!["A", "B"]);
        assert!(window.next_page.is_empty());
        assert_eq!(window.refill(3), 0);
    }

    #[test]
    fn test_refill_full_page_is_noop() {
        let mut window = PageWindow::from_batch(emails(&["a", "b", "c", "d"]), 2);
        assert_eq!(window.refill(2), 0);
        assert_eq!(ids(&window.next_page), vec!["c", "d"]);
    }

    #[test]
    fn test_remove_where_keeps_order() {
        let mut window = PageWindow::from_batch(emails(&["a", "b", "c", "d"]), 4);
        let removed = window.remove_where(|e| e.id.as_str() == "b" || e.id.as_str() == "d");
        assert_eq!(ids(&removed), vec!["b", "d"]);
        assert_eq!(ids(&window.current_page), vec!["a", "c"]);
    }

    #[test]
    fn test_discard_purges_prefetch() {
        let mut window = PageWindow::from_batch(emails(&["a", "b", "c", "d"]), 2);
        let removed = window.discard(&[EmailId::new("a"), EmailId::new("c")]);
        assert_eq!(removed, 1);
        assert_eq!(ids(&window.current_page), vec!["b"]);
        assert_eq!(ids(&window.next_page), vec!["d"]);

        window.refill(2);
        assert_eq!(ids(&window.current_page), vec!["b", "d"]);
    }

    #[test]
    fn test_for_each_copy_reaches_prefetch() {
        let mut window = PageWindow::from_batch(emails(&["a", "b", "c"]), 2);
        window.for_each_copy(&EmailId::new("c"), |e| e.is_read = true);
        assert!(window.next_page[0].is_read);
        assert!(window.current_page.iter().all(|e| !e.is_read));
    }

    #[test]
    fn test_keep_selection() {
        let mut window = PageWindow::from_batch(emails(&["a", "b"]), 2);
        window.keep_selection(&[EmailId::new("b"), EmailId::new("gone")]);
        assert_eq!(window.selected_ids(), vec![EmailId::new("b")]);
    }
}
