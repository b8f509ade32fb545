//! Dual-view email store
//!
//! Holds the "all" and "starred" views over the same mailbox. Each view is
//! paginated on its own and keeps one page of prefetch. Actions that touch a
//! record present in both views update both copies before any request goes
//! out, then confirm with the service.

mod actions;
mod view;
mod window;

use anyhow::Result;
use log::debug;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{
    DEFAULT_PAGE_SIZE, EmailId, EmailRecord, SearchPredicate, StructuredQuery,
};
use crate::transport::EmailTransport;
use crate::transport::api::ListResponse;

pub use view::{EmailView, ViewKind};
pub use window::PageWindow;

/// Wait before re-fetching after a delete.
///
/// The backing index does not serve its own writes immediately; a re-fetch
/// sent right after a delete can still count the deleted records.
pub const DEFAULT_REFETCH_DELAY: Duration = Duration::from_secs(1);

/// Store tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub page_size: usize,
    pub sort_by: Option<Vec<String>>,
    /// Delay between a delete and the re-fetch of both views
    pub refetch_delay: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: None,
            refetch_delay: DEFAULT_REFETCH_DELAY,
        }
    }
}

/// Client-side state for the email list screens
///
/// Construct one per session and hand it to the UI. All operations are
/// synchronous; each transport call completes before dependent state changes.
pub struct EmailStore {
    transport: Arc<dyn EmailTransport>,
    options: StoreOptions,
    all: EmailView,
    starred: EmailView,
    predicate: SearchPredicate,
    selected_view: ViewKind,
}

impl EmailStore {
    /// Create a store with empty views; call [`initialize`](Self::initialize) to load them
    pub fn new(transport: Arc<dyn EmailTransport>, options: StoreOptions) -> Self {
        let all = EmailView::new(ViewKind::All, options.page_size, options.sort_by.clone());
        let starred = EmailView::new(ViewKind::Starred, options.page_size, options.sort_by.clone());
        Self {
            transport,
            options,
            all,
            starred,
            predicate: SearchPredicate::None,
            selected_view: ViewKind::All,
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn view(&self, kind: ViewKind) -> &EmailView {
        match kind {
            ViewKind::All => &self.all,
            ViewKind::Starred => &self.starred,
        }
    }

    pub(crate) fn view_mut(&mut self, kind: ViewKind) -> &mut EmailView {
        match kind {
            ViewKind::All => &mut self.all,
            ViewKind::Starred => &mut self.starred,
        }
    }

    pub fn all(&self) -> &EmailView {
        &self.all
    }

    pub fn starred(&self) -> &EmailView {
        &self.starred
    }

    pub fn predicate(&self) -> &SearchPredicate {
        &self.predicate
    }

    /// View the UI is currently showing
    pub fn selected_view(&self) -> ViewKind {
        self.selected_view
    }

    pub fn select_view(&mut self, kind: ViewKind) {
        self.selected_view = kind;
    }

    // === Loading ===

    /// Clear any search and load page 1 of both views
    pub fn initialize(&mut self) -> Result<()> {
        self.predicate = SearchPredicate::None;
        self.reload()
    }

    /// Make `predicate` the active search and load page 1 of both views
    pub fn search(&mut self, predicate: SearchPredicate) -> Result<()> {
        self.predicate = predicate;
        self.reload()
    }

    /// Reset both views to page 1 with no selection, then fetch them under
    /// the active predicate (all first, then starred)
    pub fn reload(&mut self) -> Result<()> {
        for kind in ViewKind::BOTH {
            self.view_mut(kind).reset();
        }
        self.fetch(ViewKind::All)?;
        self.fetch(ViewKind::Starred)
    }

    /// Fetch the current page of a view plus one page of prefetch
    ///
    /// If the service reports fewer pages than the view is on (records were
    /// deleted elsewhere), the view moves to its last page and fetches again.
    pub fn fetch(&mut self, kind: ViewKind) -> Result<()> {
        let response = self.request(kind)?;

        let settings = &mut self.view_mut(kind).settings;
        settings.total = response.total;
        let last_page = settings.last_page();
        if settings.page > last_page {
            debug!(
                "{} view page {} past last page {}, clamping",
                kind, settings.page, last_page
            );
            settings.page = last_page;
            let response = self.request(kind)?;
            self.apply(kind, response);
        } else {
            self.apply(kind, response);
        }
        Ok(())
    }

    fn request(&self, kind: ViewKind) -> Result<ListResponse> {
        let page = self.view(kind).settings.page_request();
        debug!("Fetching {} view: {:?} ({:?})", kind, page, self.predicate);

        match &self.predicate {
            SearchPredicate::None => self.transport.list(&page),
            SearchPredicate::Query(query) => self.transport.search_by_query(query, &page),
            SearchPredicate::QueryString(query) => {
                self.transport.search_by_query_string(query, &page)
            }
        }
    }

    fn apply(&mut self, kind: ViewKind, response: ListResponse) {
        let view = self.view_mut(kind);
        let selected = view.window.selected_ids();

        view.settings.total = response.total;
        view.window = PageWindow::from_batch(response.emails, view.settings.page_size);
        view.window.keep_selection(&selected);

        debug!(
            "{} view: {} shown, {} prefetched, total {}",
            kind,
            view.window.current_page.len(),
            view.window.next_page.len(),
            view.settings.total
        );
    }

    // === Search predicate ===

    /// Use a structured query for subsequent fetches
    pub fn set_query(&mut self, query: StructuredQuery) {
        self.predicate = SearchPredicate::Query(query);
    }

    /// Use a raw query string for subsequent fetches
    pub fn set_query_string(&mut self, query: impl Into<String>) {
        self.predicate = SearchPredicate::QueryString(query.into());
    }

    pub fn clear_query(&mut self) {
        self.predicate = SearchPredicate::None;
    }

    // === Paging ===

    /// Go back one page; no-op on page 1. Clears the select-all box.
    pub fn previous_page(&mut self, kind: ViewKind) -> Result<()> {
        let view = self.view_mut(kind);
        if !view.settings.has_previous_page() {
            return Ok(());
        }
        view.settings.page -= 1;
        view.is_selected = false;
        self.fetch(kind)
    }

    /// Advance one page; no-op on the last page. Clears the select-all box.
    pub fn next_page(&mut self, kind: ViewKind) -> Result<()> {
        let view = self.view_mut(kind);
        if !view.settings.has_next_page() {
            return Ok(());
        }
        view.settings.page += 1;
        view.is_selected = false;
        self.fetch(kind)
    }

    /// Change a view's page size and reload it from page 1
    pub fn set_page_size(&mut self, kind: ViewKind, page_size: usize) -> Result<()> {
        let settings = &mut self.view_mut(kind).settings;
        settings.page_size = page_size.max(1);
        settings.page = 1;
        self.fetch(kind)
    }

    /// Change a view's ordering and reload it from page 1
    pub fn set_sort_by(&mut self, kind: ViewKind, sort_by: Option<Vec<String>>) -> Result<()> {
        let settings = &mut self.view_mut(kind).settings;
        settings.sort_by = sort_by;
        settings.page = 1;
        self.fetch(kind)
    }

    // === Lookup ===

    /// A loaded record, looked up in the all view first, then starred
    pub fn email(&self, id: &EmailId) -> Option<&EmailRecord> {
        self.all.window.find(id).or_else(|| self.starred.window.find(id))
    }

    /// The loaded copy of a record, or the service's copy if it is not on screen
    pub fn open(&self, id: &EmailId) -> Result<EmailRecord> {
        match self.email(id) {
            Some(email) => Ok(email.clone()),
            None => self.transport.get(id),
        }
    }

    /// Like [`open`](Self::open), keyed by Message-ID
    pub fn open_by_message_id(&self, message_id: &str) -> Result<EmailRecord> {
        let loaded = ViewKind::BOTH.iter().find_map(|kind| {
            self.view(*kind)
                .current_page()
                .iter()
                .find(|e| e.message_id == message_id)
        });
        match loaded {
            Some(email) => Ok(email.clone()),
            None => self.transport.get_by_message_id(message_id),
        }
    }

    /// Sleep out the read-after-write lag before re-fetching
    fn wait_for_consistency(&self) {
        if !self.options.refetch_delay.is_zero() {
            debug!("Waiting {:?} before re-fetch", self.options.refetch_delay);
            std::thread::sleep(self.options.refetch_delay);
        }
    }

    /// Re-fetch both views after a write that changed membership
    fn resync(&mut self) -> Result<()> {
        self.wait_for_consistency();
        self.fetch(ViewKind::All)?;
        self.fetch(ViewKind::Starred)
    }
}
