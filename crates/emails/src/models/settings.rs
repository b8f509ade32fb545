//! Per-view pagination settings and the page request sent to the service

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::EmailRecord;

/// Page size used when none is configured
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Ordering the service applies after any user-supplied sort fields
const DEFAULT_SORT_FIELDS: [&str; 2] = ["-date", "messageId"];

/// Pagination state of one view
///
/// `page` is 1-based. `total` is whatever the service last reported and is
/// overwritten on every fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationSettings {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub sort_by: Option<Vec<String>>,
    pub starred_only: bool,
}

impl PaginationSettings {
    /// Settings for page 1 with nothing loaded yet
    pub fn new(page_size: usize, starred_only: bool) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total: 0,
            sort_by: None,
            starred_only,
        }
    }

    pub fn with_sort_by(mut self, sort_by: Option<Vec<String>>) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// `ceil(total / page_size)`; zero when nothing matched
    pub fn max_page(&self) -> usize {
        self.total.div_ceil(self.page_size.max(1))
    }

    /// Highest page the view may sit on (never below 1)
    pub fn last_page(&self) -> usize {
        self.max_page().max(1)
    }

    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.max_page()
    }

    /// Offset of the first record on the current page
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.page_size
    }

    /// Request for the current page plus one page of prefetch
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            start: self.offset(),
            size: self.page_size * 2,
            starred_only: self.starred_only,
            sort_by: self.sort_by.clone().unwrap_or_default(),
        }
    }

    /// Query string for the current page request
    pub fn formatted_settings(&self) -> String {
        self.page_request().to_query_string()
    }

    /// Human readable range, e.g. `"6-10 of 10"`
    pub fn formatted_pagination(&self) -> String {
        if self.total == 0 {
            return "0-0 of 0".to_string();
        }
        let lower = self.offset() + 1;
        let upper = (self.page * self.page_size).min(self.total);
        format!("{}-{} of {}", lower, upper, self.total)
    }
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, false)
    }
}

/// Offset-based slice of a listing, as sent to the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub start: usize,
    pub size: usize,
    pub starred_only: bool,
    pub sort_by: Vec<String>,
}

impl PageRequest {
    /// Query parameters in wire order; `sortBy` only when non-empty
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("start", self.start.to_string()),
            ("size", self.size.to_string()),
            ("starredOnly", self.starred_only.to_string()),
        ];
        if !self.sort_by.is_empty() {
            pairs.push(("sortBy", self.sort_by.join(",")));
        }
        pairs
    }

    pub fn to_query_string(&self) -> String {
        self.query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(&v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Error for a sort field name the service does not know
#[derive(Debug, thiserror::Error)]
#[error("invalid sort field: {0}")]
pub struct InvalidSortField(pub String);

/// Record field a listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    MessageId,
    Date,
    From,
    To,
    Cc,
    Bcc,
}

impl SortKey {
    fn name(&self) -> &'static str {
        match self {
            SortKey::MessageId => "messageId",
            SortKey::Date => "date",
            SortKey::From => "from",
            SortKey::To => "to",
            SortKey::Cc => "cc",
            SortKey::Bcc => "bcc",
        }
    }
}

/// One sort criterion: `date` ascending, `-date` descending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortField {
    pub key: SortKey,
    pub descending: bool,
}

impl SortField {
    /// Parse user sort fields and append the default ordering for any key
    /// they leave out, so pages are stable across requests.
    pub fn resolve(fields: &[String]) -> Result<Vec<SortField>, InvalidSortField> {
        let mut resolved = fields
            .iter()
            .map(|f| f.parse())
            .collect::<Result<Vec<SortField>, _>>()?;

        for default in DEFAULT_SORT_FIELDS {
            let field: SortField = default.parse()?;
            if !resolved.iter().any(|f| f.key == field.key) {
                resolved.push(field);
            }
        }
        Ok(resolved)
    }

    pub fn compare(&self, a: &EmailRecord, b: &EmailRecord) -> Ordering {
        let ord = match self.key {
            SortKey::MessageId => a.message_id.cmp(&b.message_id),
            SortKey::Date => a.date.cmp(&b.date),
            SortKey::From => a.from.cmp(&b.from),
            SortKey::To => a.to.cmp(&b.to),
            SortKey::Cc => a.cc.cmp(&b.cc),
            SortKey::Bcc => a.bcc.cmp(&b.bcc),
        };
        if self.descending { ord.reverse() } else { ord }
    }
}

impl FromStr for SortField {
    type Err = InvalidSortField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (descending, name) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let key = match name {
            "messageId" => SortKey::MessageId,
            "date" => SortKey::Date,
            "from" => SortKey::From,
            "to" => SortKey::To,
            "cc" => SortKey::Cc,
            "bcc" => SortKey::Bcc,
            _ => return Err(InvalidSortField(s.to_string())),
        };
        Ok(Self { key, descending })
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            f.write_str("-")?;
        }
        f.write_str(self.key.name())
    }
}
