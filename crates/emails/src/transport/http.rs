//! HTTP client for the email REST service
//!
//! Uses synchronous HTTP (ureq) to stay executor-agnostic.

use anyhow::{Context, Result};
use log::debug;
use url::Url;

use super::api::ListResponse;
use super::{EmailTransport, TransportError};
use crate::config::ClientConfig;
use crate::models::{EmailId, EmailRecord, PageRequest, StructuredQuery};

/// REST transport rooted at the service's API URL (e.g. `http://host/api`)
pub struct HttpTransport {
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the given API base URL
    pub fn new(api_url: &str) -> Result<Self> {
        let url = Url::parse(api_url)
            .with_context(|| format!("Invalid email service URL: {}", api_url))?;
        if url.cannot_be_a_base() {
            anyhow::bail!("Email service URL cannot be a base: {}", api_url);
        }
        Ok(Self {
            base_url: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.api_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn emails_url(&self) -> String {
        format!("{}/emails", self.base_url)
    }

    fn email_url(&self, id: &EmailId) -> String {
        format!("{}/emails/{}", self.base_url, urlencoding::encode(id.as_str()))
    }

    fn with_page<B>(
        mut request: ureq::RequestBuilder<B>,
        page: &PageRequest,
    ) -> ureq::RequestBuilder<B> {
        for (key, value) in page.query_pairs() {
            request = request.query(key, value);
        }
        request
    }
}

/// Turn a ureq failure into a typed transport error where the service told us why
fn check_response<T>(result: Result<T, ureq::Error>, subject: &str, action: &str) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(ureq::Error::StatusCode(code)) => Err(TransportError::from_status(code, subject).into()),
        Err(ureq::Error::Io(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
            Err(TransportError::Unavailable.into())
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!("Failed to send {} request", action))),
    }
}

impl EmailTransport for HttpTransport {
    fn list(&self, page: &PageRequest) -> Result<ListResponse> {
        debug!("GET {} {:?}", self.emails_url(), page);
        let request = Self::with_page(ureq::get(&self.emails_url()), page);
        let mut response = check_response(request.call(), "list", "list emails")?;

        response
            .body_mut()
            .read_json()
            .context("Failed to parse list emails response")
    }

    fn search_by_query(
        &self,
        query: &StructuredQuery,
        page: &PageRequest,
    ) -> Result<ListResponse> {
        let url = format!("{}/search", self.emails_url());
        debug!("POST {} {:?}", url, page);
        let request = Self::with_page(ureq::post(&url), page);
        let mut response =
            check_response(request.send_json(query), "search", "search emails")?;

        response
            .body_mut()
            .read_json()
            .context("Failed to parse search response")
    }

    fn search_by_query_string(&self, query: &str, page: &PageRequest) -> Result<ListResponse> {
        let url = format!("{}/query", self.emails_url());
        debug!("GET {} q={:?} {:?}", url, query, page);
        let request = Self::with_page(ureq::get(&url).query("q", query), page);
        let mut response = check_response(request.call(), query, "query emails")?;

        response
            .body_mut()
            .read_json()
            .context("Failed to parse query response")
    }

    fn get(&self, id: &EmailId) -> Result<EmailRecord> {
        let mut response = check_response(
            ureq::get(&self.email_url(id)).call(),
            id.as_str(),
            "get email",
        )?;

        response
            .body_mut()
            .read_json()
            .context("Failed to parse email response")
    }

    fn get_by_message_id(&self, message_id: &str) -> Result<EmailRecord> {
        let url = format!(
            "{}/messageId/{}",
            self.emails_url(),
            urlencoding::encode(message_id)
        );
        let mut response = check_response(ureq::get(&url).call(), message_id, "get email")?;

        response
            .body_mut()
            .read_json()
            .context("Failed to parse email response")
    }

    fn update(&self, email: &EmailRecord) -> Result<EmailRecord> {
        let mut response = check_response(
            ureq::put(&self.email_url(&email.id)).send_json(email),
            email.id.as_str(),
            "update email",
        )?;

        response
            .body_mut()
            .read_json()
            .context("Failed to parse update response")
    }

    fn update_many(&self, emails: &[EmailRecord]) -> Result<Vec<EmailRecord>> {
        if emails.is_empty() {
            return Ok(Vec::new());
        }

        let mut response = check_response(
            ureq::put(&self.emails_url()).send_json(emails),
            "bulk update",
            "update emails",
        )?;

        response
            .body_mut()
            .read_json()
            .context("Failed to parse bulk update response")
    }

    fn remove(&self, id: &EmailId) -> Result<()> {
        check_response(
            ureq::delete(&self.email_url(id)).call(),
            id.as_str(),
            "delete email",
        )?;
        Ok(())
    }

    fn remove_many(&self, ids: &[EmailId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let csv = ids
            .iter()
            .map(EmailId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        check_response(
            ureq::delete(&self.emails_url()).query("ids", &csv).call(),
            &csv,
            "delete emails",
        )?;
        Ok(())
    }
}
