//! In-memory transport implementation
//!
//! Answers every request the way the email service does, over a vector of
//! records held in memory. Used by tests and for running the store without
//! a backend.

use anyhow::Result;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use super::api::ListResponse;
use super::{EmailTransport, TransportError};
use crate::models::{EmailId, EmailRecord, PageRequest, SortField, StructuredQuery};
use crate::search::parse_query_string;

/// Page size the service falls back to when a request asks for zero records
const DEFAULT_QUERY_SIZE: usize = 100;

/// A request received by [`InMemoryTransport`]
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    List(PageRequest),
    SearchByQuery(StructuredQuery, PageRequest),
    SearchByQueryString(String, PageRequest),
    Get(EmailId),
    GetByMessageId(String),
    Update(EmailId),
    UpdateMany(Vec<EmailId>),
    Remove(EmailId),
    RemoveMany(Vec<EmailId>),
}

/// In-memory implementation of EmailTransport
///
/// Every request is appended to a call log so tests can assert on what the
/// store sent. Flipping [`set_unavailable`](Self::set_unavailable) makes all
/// requests fail with [`TransportError::Unavailable`].
pub struct InMemoryTransport {
    emails: RwLock<Vec<EmailRecord>>,
    calls: RwLock<Vec<TransportCall>>,
    unavailable: AtomicBool,
}

impl InMemoryTransport {
    /// Create an empty transport
    pub fn new() -> Self {
        Self::with_emails(Vec::new())
    }

    /// Create a transport holding the given records
    pub fn with_emails(emails: Vec<EmailRecord>) -> Self {
        let transport = Self {
            emails: RwLock::new(Vec::new()),
            calls: RwLock::new(Vec::new()),
            unavailable: AtomicBool::new(false),
        };
        transport.seed(emails);
        transport
    }

    /// Insert or replace records by ID
    pub fn seed(&self, emails: Vec<EmailRecord>) {
        let mut stored = self.emails.write().unwrap();
        for mut email in emails {
            email.is_selected = false;
            match stored.iter_mut().find(|e| e.id == email.id) {
                Some(existing) => *existing = email,
                None => stored.push(email),
            }
        }
    }

    /// Snapshot of every stored record
    pub fn emails(&self) -> Vec<EmailRecord> {
        self.emails.read().unwrap().clone()
    }

    /// Stored copy of one record
    pub fn email(&self, id: &EmailId) -> Option<EmailRecord> {
        self.emails.read().unwrap().iter().find(|e| &e.id == id).cloned()
    }

    /// Requests received so far, oldest first
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Log the request, then fail if the service is switched off
    fn receive(&self, call: TransportCall) -> Result<()> {
        self.calls.write().unwrap().push(call);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable.into());
        }
        Ok(())
    }

    fn page<F>(&self, page: &PageRequest, filter: F) -> Result<ListResponse>
    where
        F: Fn(&EmailRecord) -> bool,
    {
        let sort = SortField::resolve(&page.sort_by)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let emails = self.emails.read().unwrap();
        let mut matched: Vec<&EmailRecord> = emails
            .iter()
            .filter(|e| !page.starred_only || e.is_starred)
            .filter(|e| filter(e))
            .collect();

        matched.sort_by(|a, b| {
            sort.iter()
                .map(|field| field.compare(a, b))
                .find(|ord| ord.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let size = if page.size == 0 {
            DEFAULT_QUERY_SIZE
        } else {
            page.size
        };

        Ok(ListResponse {
            total: matched.len(),
            took: 0,
            emails: matched
                .into_iter()
                .skip(page.start)
                .take(size)
                .cloned()
                .collect(),
        })
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailTransport for InMemoryTransport {
    fn list(&self, page: &PageRequest) -> Result<ListResponse> {
        self.receive(TransportCall::List(page.clone()))?;
        self.page(page, |_| true)
    }

    fn search_by_query(
        &self,
        query: &StructuredQuery,
        page: &PageRequest,
    ) -> Result<ListResponse> {
        self.receive(TransportCall::SearchByQuery(query.clone(), page.clone()))?;
        self.page(page, |e| query.matches(e))
    }

    fn search_by_query_string(&self, query: &str, page: &PageRequest) -> Result<ListResponse> {
        self.receive(TransportCall::SearchByQueryString(
            query.to_string(),
            page.clone(),
        ))?;
        if query.trim().is_empty() {
            return Err(TransportError::InvalidRequest("query string can't be empty".into()).into());
        }

        let parsed = parse_query_string(query);
        self.page(page, |e| parsed.matches(e))
    }

    fn get(&self, id: &EmailId) -> Result<EmailRecord> {
        self.receive(TransportCall::Get(id.clone()))?;
        self.email(id)
            .ok_or_else(|| TransportError::NotFound(id.to_string()).into())
    }

    fn get_by_message_id(&self, message_id: &str) -> Result<EmailRecord> {
        self.receive(TransportCall::GetByMessageId(message_id.to_string()))?;
        self.emails
            .read()
            .unwrap()
            .iter()
            .find(|e| e.message_id == message_id)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(message_id.to_string()).into())
    }

    fn update(&self, email: &EmailRecord) -> Result<EmailRecord> {
        self.receive(TransportCall::Update(email.id.clone()))?;
        let mut stored = self.emails.write().unwrap();
        let existing = stored
            .iter_mut()
            .find(|e| e.id == email.id)
            .ok_or_else(|| TransportError::NotFound(email.id.to_string()))?;

        *existing = EmailRecord {
            is_selected: false,
            ..email.clone()
        };
        Ok(existing.clone())
    }

    fn update_many(&self, emails: &[EmailRecord]) -> Result<Vec<EmailRecord>> {
        self.receive(TransportCall::UpdateMany(
            emails.iter().map(|e| e.id.clone()).collect(),
        ))?;
        if emails.is_empty() {
            return Err(
                TransportError::InvalidRequest("emails must contain at least one item".into())
                    .into(),
            );
        }

        let mut stored = self.emails.write().unwrap();
        if let Some(missing) = emails
            .iter()
            .find(|email| !stored.iter().any(|e| e.id == email.id))
        {
            return Err(TransportError::NotFound(missing.id.to_string()).into());
        }

        let mut updated = Vec::with_capacity(emails.len());
        for email in emails {
            if let Some(existing) = stored.iter_mut().find(|e| e.id == email.id) {
                *existing = EmailRecord {
                    is_selected: false,
                    ..email.clone()
                };
                updated.push(existing.clone());
            }
        }
        Ok(updated)
    }

    fn remove(&self, id: &EmailId) -> Result<()> {
        self.receive(TransportCall::Remove(id.clone()))?;
        let mut stored = self.emails.write().unwrap();
        let before = stored.len();
        stored.retain(|e| &e.id != id);
        if stored.len() == before {
            return Err(TransportError::NotFound(id.to_string()).into());
        }
        Ok(())
    }

    fn remove_many(&self, ids: &[EmailId]) -> Result<()> {
        self.receive(TransportCall::RemoveMany(ids.to_vec()))?;
        let mut stored = self.emails.write().unwrap();
        if let Some(missing) = ids.iter().find(|id| !stored.iter().any(|e| &e.id == *id)) {
            return Err(TransportError::NotFound(missing.to_string()).into());
        }
        stored.retain(|e| !ids.contains(&e.id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn make_emails(count: usize) -> Vec<EmailRecord> {
        let base = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        (1..=count)
            .map(|i| {
                EmailRecord::builder(format!("{}", i))
                    .message_id(format!("<{}@enron>", i))
                    .from(format!("sender{}@enron.com", i % 3))
                    .subject(format!("Subject {}", i))
                    .body(if i % 2 == 0 { "even body" } else { "odd body" })
                    .date(base + Duration::hours(i as i64))
                    .starred(i % 2 == 0)
                    .build()
            })
            .collect()
    }

    fn request(start: usize, size: usize) -> PageRequest {
        PageRequest {
            start,
            size,
            starred_only: false,
            sort_by: Vec::new(),
        }
    }

    fn ids(response: &ListResponse) -> Vec<&str> {
        response.emails.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_list_defaults_to_newest_first() {
        let transport = InMemoryTransport::with_emails(make_emails(5));
        let response = transport.list(&request(0, 3)).unwrap();
        assert_eq!(response.total, 5);
        assert_eq!(ids(&response), vec!["5", "4", "3"]);
    }

    #[test]
    fn test_list_offset_and_size() {
        let transport = InMemoryTransport::with_emails(make_emails(5));
        let response = transport.list(&request(3, 10)).unwrap();
        assert_eq!(response.total, 5);
        assert_eq!(ids(&response), vec!["2", "1"]);
    }

    #[test]
    fn test_list_starred_only_counts_filtered_set() {
        let transport = InMemoryTransport::with_emails(make_emails(6));
        let mut req = request(0, 2);
        req.starred_only = true;

        let response = transport.list(&req).unwrap();
        assert_eq!(response.total, 3);
        assert_eq!(ids(&response), vec!["6", "4"]);
    }

    #[test]
    fn test_list_custom_sort() {
        let transport = InMemoryTransport::with_emails(make_emails(4));
        let mut req = request(0, 10);
        req.sort_by = vec!["date".to_string()];

        let response = transport.list(&req).unwrap();
        assert_eq!(ids(&response), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_list_invalid_sort_rejected() {
        let transport = InMemoryTransport::with_emails(make_emails(2));
        let mut req = request(0, 10);
        req.sort_by = vec!["subject".to_string()];

        let err = transport.list(&req).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TransportError>(),
            Some(TransportError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_zero_size_uses_service_default() {
        let transport = InMemoryTransport::with_emails(make_emails(120));
        let response = transport.list(&request(0, 0)).unwrap();
        assert_eq!(response.emails.len(), DEFAULT_QUERY_SIZE);
    }

    #[test]
    fn test_search_by_query() {
        let transport = InMemoryTransport::with_emails(make_emails(6));
        let query = StructuredQuery {
            body_includes: Some("even".into()),
            ..Default::default()
        };

        let response = transport.search_by_query(&query, &request(0, 10)).unwrap();
        assert_eq!(response.total, 3);
        assert_eq!(ids(&response), vec!["6", "4", "2"]);
    }

    #[test]
    fn test_search_by_query_string() {
        let transport = InMemoryTransport::with_emails(make_emails(6));
        let response = transport
            .search_by_query_string("from:sender0@enron.com", &request(0, 10))
            .unwrap();
        assert_eq!(ids(&response), vec!["6", "3"]);
    }

    #[test]
    fn test_empty_query_string_rejected() {
        let transport = InMemoryTransport::new();
        assert!(transport.search_by_query_string("  ", &request(0, 10)).is_err());
    }

    #[test]
    fn test_get_and_get_by_message_id() {
        let transport = InMemoryTransport::with_emails(make_emails(3));
        assert_eq!(transport.get(&EmailId::new("2")).unwrap().subject, "Subject 2");
        assert_eq!(
            transport.get_by_message_id("<3@enron>").unwrap().id,
            EmailId::new("3")
        );

        let err = transport.get(&EmailId::new("missing")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TransportError>(),
            Some(TransportError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_replaces_record() {
        let transport = InMemoryTransport::with_emails(make_emails(2));
        let mut email = transport.email(&EmailId::new("1")).unwrap();
        email.is_read = true;
        email.is_selected = true;

        let stored = transport.update(&email).unwrap();
        assert!(stored.is_read);
        assert!(!stored.is_selected);
        assert!(transport.email(&EmailId::new("1")).unwrap().is_read);
    }

    #[test]
    fn test_update_many_is_all_or_nothing() {
        let transport = InMemoryTransport::with_emails(make_emails(2));
        let mut first = transport.email(&EmailId::new("1")).unwrap();
        first.is_read = true;
        let ghost = EmailRecord::builder("ghost").build();

        assert!(transport.update_many(&[first.clone(), ghost]).is_err());
        assert!(!transport.email(&EmailId::new("1")).unwrap().is_read);

        let updated = transport.update_many(&[first]).unwrap();
        assert_eq!(updated.len(), 1);
        assert!(transport.email(&EmailId::new("1")).unwrap().is_read);
    }

    #[test]
    fn test_remove_and_remove_many() {
        let transport = InMemoryTransport::with_emails(make_emails(4));
        transport.remove(&EmailId::new("1")).unwrap();
        assert!(transport.remove(&EmailId::new("1")).is_err());

        transport
            .remove_many(&[EmailId::new("2"), EmailId::new("3")])
            .unwrap();
        let remaining: Vec<EmailId> = transport.emails().into_iter().map(|e| e.id).collect();
        assert_eq!(remaining, vec![EmailId::new("4")]);
    }

    #[test]
    fn test_unavailable_fails_and_logs() {
        let transport = InMemoryTransport::with_emails(make_emails(1));
        transport.set_unavailable(true);

        let err = transport.list(&request(0, 10)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TransportError>(),
            Some(TransportError::Unavailable)
        ));
        assert_eq!(transport.calls(), vec![TransportCall::List(request(0, 10))]);

        transport.set_unavailable(false);
        transport.clear_calls();
        assert!(transport.list(&request(0, 10)).is_ok());
        assert_eq!(transport.calls().len(), 1);
    }
}
