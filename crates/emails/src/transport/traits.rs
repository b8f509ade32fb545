//! Transport trait definition

use anyhow::Result;

use super::api::ListResponse;
use crate::models::{EmailId, EmailRecord, PageRequest, StructuredQuery};

/// Operations the email service exposes
///
/// Listing and search calls take a [`PageRequest`]; the store always asks for
/// two pages' worth so it can keep one page of prefetch.
pub trait EmailTransport: Send + Sync {
    /// List emails, optionally restricted to starred ones
    fn list(&self, page: &PageRequest) -> Result<ListResponse>;

    /// Search with a structured query
    fn search_by_query(&self, query: &StructuredQuery, page: &PageRequest)
    -> Result<ListResponse>;

    /// Search with a raw query string
    fn search_by_query_string(&self, query: &str, page: &PageRequest) -> Result<ListResponse>;

    /// Get one email by its server ID
    fn get(&self, id: &EmailId) -> Result<EmailRecord>;

    /// Get one email by its Message-ID header
    fn get_by_message_id(&self, message_id: &str) -> Result<EmailRecord>;

    /// Replace one email, returning the stored version
    fn update(&self, email: &EmailRecord) -> Result<EmailRecord>;

    /// Replace several emails at once
    fn update_many(&self, emails: &[EmailRecord]) -> Result<Vec<EmailRecord>>;

    /// Delete one email
    fn remove(&self, id: &EmailId) -> Result<()>;

    /// Delete several emails at once
    fn remove_many(&self, ids: &[EmailId]) -> Result<()>;
}
