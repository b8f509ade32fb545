//! Mutating actions on the store
//!
//! Selection is local state. Read and star changes update every loaded copy
//! of the record, then persist. Deletes repair the visible pages from their
//! prefetch buffers, persist, and re-fetch both views once the service has
//! caught up.

use anyhow::Result;
use log::{debug, info, warn};

use super::{EmailStore, ViewKind};
use crate::models::{EmailId, EmailRecord};

impl EmailStore {
    // === Selection ===

    /// Flip a view's select-all box and apply it to the visible page
    pub fn toggle_selected_of_view(&mut self, kind: ViewKind) {
        let view = self.view_mut(kind);
        view.is_selected = !view.is_selected;
        let selected = view.is_selected;
        for email in &mut view.window.current_page {
            email.is_selected = selected;
        }
    }

    /// Flip one record's checkbox; no-op if it is not on the visible page
    pub fn toggle_selected_one_of_view(&mut self, kind: ViewKind, id: &EmailId) {
        if let Some(email) = self.view_mut(kind).window.find_mut(id) {
            email.is_selected = !email.is_selected;
        }
    }

    // === Read state ===

    /// Flip a view's read toggle and apply it to the selected records
    ///
    /// The other view's copies follow. The bulk update is best effort: a
    /// failure is logged and the local state is kept. Returns how many
    /// records changed.
    pub fn toggle_read_of_selected(&mut self, kind: ViewKind) -> usize {
        let view = self.view_mut(kind);
        view.is_read = !view.is_read;
        let is_read = view.is_read;

        let changed: Vec<EmailRecord> = view
            .window
            .current_page
            .iter_mut()
            .filter(|e| e.is_selected)
            .map(|email| {
                email.is_read = is_read;
                email.clone()
            })
            .collect();

        let other = self.view_mut(kind.other());
        for email in &changed {
            other.window.for_each_copy(&email.id, |e| e.is_read = is_read);
        }

        if changed.is_empty() {
            return 0;
        }

        info!(
            "Marking {} selected emails in {} view as {}",
            changed.len(),
            kind,
            if is_read { "read" } else { "unread" }
        );
        if let Err(e) = self.transport.update_many(&changed) {
            warn!("Bulk read update failed, server may lag local state: {:#}", e);
        }
        changed.len()
    }

    /// Flip one record's read state in every loaded copy and persist it
    ///
    /// Unknown IDs are ignored: the UI may hold a row from a page that has
    /// since been replaced.
    pub fn toggle_read_one(&mut self, id: &EmailId) -> Result<()> {
        self.change_read(id, |is_read| !is_read)
    }

    /// Set one record's read state in every loaded copy and persist it
    pub fn set_read_one(&mut self, id: &EmailId, is_read: bool) -> Result<()> {
        self.change_read(id, |_| is_read)
    }

    fn change_read<F>(&mut self, id: &EmailId, next: F) -> Result<()>
    where
        F: FnOnce(bool) -> bool,
    {
        let owner = if self.all.window.contains(id) {
            ViewKind::All
        } else if self.starred.window.contains(id) {
            ViewKind::Starred
        } else {
            debug!("Email {} not loaded in either view, ignoring read change", id);
            return Ok(());
        };

        let Some(email) = self.view_mut(owner).window.find_mut(id) else {
            return Ok(());
        };
        email.is_read = next(email.is_read);
        let record = email.clone();

        self.view_mut(owner.other())
            .window
            .for_each_copy(id, |e| e.is_read = record.is_read);

        self.transport.update(&record)?;
        Ok(())
    }

    // === Starred state ===

    /// Flip one record's starred state, persist it, then re-fetch the starred view
    ///
    /// The all view's copy is the one toggled. A record shown only in the
    /// starred view leaves it at once and the next prefetched record takes its
    /// place; the re-fetch then fixes page boundaries and the total.
    pub fn toggle_starred_one(&mut self, id: &EmailId) -> Result<()> {
        let record = if let Some(email) = self.all.window.find_mut(id) {
            email.is_starred = !email.is_starred;
            let record = email.clone();
            self.starred
                .window
                .for_each_copy(id, |e| e.is_starred = record.is_starred);
            record
        } else if self.starred.window.contains(id) {
            let page_size = self.starred.settings.page_size;
            let mut removed = self.starred.window.remove_where(|e| &e.id == id);
            self.starred.window.refill(page_size);

            let Some(mut record) = removed.pop() else {
                return Ok(());
            };
            record.is_starred = !record.is_starred;
            record.is_selected = false;
            self.all
                .window
                .for_each_copy(id, |e| e.is_starred = record.is_starred);
            record
        } else {
            debug!("Email {} not loaded in either view, ignoring star toggle", id);
            return Ok(());
        };

        info!(
            "{} email {}",
            if record.is_starred { "Starring" } else { "Unstarring" },
            id
        );
        self.transport.update(&record)?;
        self.fetch(ViewKind::Starred)
    }

    // === Deletion ===

    /// Delete one record, repair both visible pages, then re-fetch both views
    ///
    /// Only a record on a visible page can be deleted; other IDs are ignored.
    pub fn delete_one(&mut self, id: &EmailId) -> Result<()> {
        if !ViewKind::BOTH
            .iter()
            .any(|kind| self.view(*kind).window.contains(id))
        {
            debug!("Email {} not shown in either view, ignoring delete", id);
            return Ok(());
        }

        for kind in ViewKind::BOTH {
            let view = self.view_mut(kind);
            view.window.discard(std::slice::from_ref(id));
            view.window.refill(view.settings.page_size);
        }

        info!("Deleting email {}", id);
        self.transport.remove(id)?;
        self.resync()
    }

    /// Delete every selected record of a view, repair both visible pages,
    /// then re-fetch both views
    pub fn delete_selected_of_view(&mut self, kind: ViewKind) -> Result<()> {
        let ids = self.view(kind).window.selected_ids();
        if ids.is_empty() {
            return Ok(());
        }
        self.view_mut(kind).is_selected = false;

        for each in ViewKind::BOTH {
            let view = self.view_mut(each);
            view.window.discard(&ids);
            view.window.refill(view.settings.page_size);
        }

        info!("Deleting {} selected emails from {} view", ids.len(), kind);
        self.transport.remove_many(&ids)?;
        self.resync()
    }
}
