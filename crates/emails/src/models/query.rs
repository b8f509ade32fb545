//! Structured search query and the active search predicate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EmailRecord;

/// Inclusive date bounds; either side may be open
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, date: &DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| *date >= from) && self.to.is_none_or(|to| *date <= to)
    }
}

/// Field-by-field search, sent as the body of a search request
///
/// A record matches when it satisfies every field that is set. Empty strings
/// and empty lists count as unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    /// Sender address (exact, case-insensitive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Every address listed must be among the recipients
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_includes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_includes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_excludes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

impl StructuredQuery {
    pub fn is_empty(&self) -> bool {
        non_empty(&self.from).is_none()
            && self.to.is_empty()
            && self.cc.is_empty()
            && self.bcc.is_empty()
            && non_empty(&self.subject_includes).is_none()
            && non_empty(&self.body_includes).is_none()
            && non_empty(&self.body_excludes).is_none()
            && self.date_range.is_none()
    }

    /// Check a record against this query the way the service filters
    pub fn matches(&self, email: &EmailRecord) -> bool {
        if let Some(from) = non_empty(&self.from)
            && !address_eq(&email.from, from)
        {
            return false;
        }

        let all_present = |wanted: &[String], have: &[String]| {
            wanted
                .iter()
                .all(|w| have.iter().any(|h| address_eq(h, w)))
        };
        if !all_present(&self.to, &email.to)
            || !all_present(&self.cc, &email.cc)
            || !all_present(&self.bcc, &email.bcc)
        {
            return false;
        }

        if let Some(text) = non_empty(&self.subject_includes)
            && !contains_ignore_case(&email.subject, text)
        {
            return false;
        }
        if let Some(text) = non_empty(&self.body_includes)
            && !contains_ignore_case(&email.body, text)
        {
            return false;
        }
        if let Some(text) = non_empty(&self.body_excludes)
            && contains_ignore_case(&email.body, text)
        {
            return false;
        }

        self.date_range
            .as_ref()
            .is_none_or(|range| range.contains(&email.date))
    }
}

/// Search mode shared by both views
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchPredicate {
    #[default]
    None,
    Query(StructuredQuery),
    QueryString(String),
}

impl SearchPredicate {
    pub fn is_none(&self) -> bool {
        matches!(self, SearchPredicate::None)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn address_eq(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
