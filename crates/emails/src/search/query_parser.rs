//! Query-string parser
//!
//! Parses search strings with operators like:
//! - `from:alice@example.com` - sender filter
//! - `to:`, `cc:`, `bcc:` - recipient filters
//! - `subject:meeting` - subject filter
//! - `is:read`, `is:unread`, `is:starred` - flag filters
//! - `before:2001/12/01`, `after:2001-01-01` - date filters
//! - `-word` - exclude records containing the word
//!
//! Everything else is a free-text term.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::models::{EmailRecord, address_eq, contains_ignore_case};

/// Parsed query with structured components
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedQuery {
    /// Free-text terms; each must appear in the subject, body or sender
    pub terms: Vec<String>,
    /// Terms that must not appear in the subject or body
    pub excluded: Vec<String>,
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: Vec<String>,
    /// is:read / is:unread
    pub is_read: Option<bool>,
    /// is:starred
    pub is_starred: Option<bool>,
    pub before: Option<DateTime<Utc>>,
    pub after: Option<DateTime<Utc>>,
}

impl ParsedQuery {
    /// Check if the query is empty (no terms or filters)
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
            && self.excluded.is_empty()
            && self.from.is_empty()
            && self.to.is_empty()
            && self.cc.is_empty()
            && self.bcc.is_empty()
            && self.subject.is_empty()
            && self.is_read.is_none()
            && self.is_starred.is_none()
            && self.before.is_none()
            && self.after.is_none()
    }

    /// Evaluate the query against a record
    pub fn matches(&self, email: &EmailRecord) -> bool {
        let term_hit = |term: &str| {
            contains_ignore_case(&email.subject, term)
                || contains_ignore_case(&email.body, term)
                || contains_ignore_case(&email.from, term)
        };
        if !self.terms.iter().all(|t| term_hit(t)) {
            return false;
        }
        if self.excluded.iter().any(|t| {
            contains_ignore_case(&email.subject, t) || contains_ignore_case(&email.body, t)
        }) {
            return false;
        }

        // Address operators accept either the full address or a fragment of it
        let addr_hit = |wanted: &str, have: &str| {
            address_eq(have, wanted) || contains_ignore_case(have, wanted)
        };
        if !self.from.iter().all(|f| addr_hit(f, &email.from)) {
            return false;
        }
        let in_list = |wanted: &[String], have: &[String]| {
            wanted
                .iter()
                .all(|w| have.iter().any(|h| addr_hit(w, h)))
        };
        if !in_list(&self.to, &email.to)
            || !in_list(&self.cc, &email.cc)
            || !in_list(&self.bcc, &email.bcc)
        {
            return false;
        }
        if !self
            .subject
            .iter()
            .all(|s| contains_ignore_case(&email.subject, s))
        {
            return false;
        }

        if self.is_read.is_some_and(|r| r != email.is_read) {
            return false;
        }
        if self.is_starred.is_some_and(|s| s != email.is_starred) {
            return false;
        }
        if self.before.is_some_and(|b| email.date >= b) {
            return false;
        }
        if self.after.is_some_and(|a| email.date < a) {
            return false;
        }
        true
    }
}

/// Parse a query string into structured components
///
/// Operator values may be quoted (`subject:"weekly sync"`). Unknown operators
/// and operators with empty values are kept as plain terms.
pub fn parse_query_string(input: &str) -> ParsedQuery {
    let mut query = ParsedQuery::default();

    let mut i = 0;
    let chars: Vec<char> = input.chars().collect();

    while i < chars.len() {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }

        let rest: String = chars[i..].iter().collect();

        if let Some((key, value, consumed)) = parse_operator(&rest) {
            match key.to_lowercase().as_str() {
                "from" => query.from.push(value),
                "to" => query.to.push(value),
                "cc" => query.cc.push(value),
                "bcc" => query.bcc.push(value),
                "subject" => query.subject.push(value),
                "is" => match value.to_lowercase().as_str() {
                    "read" => query.is_read = Some(true),
                    "unread" => query.is_read = Some(false),
                    "starred" => query.is_starred = Some(true),
                    _ => {}
                },
                "before" => {
                    if let Some(date) = parse_date(&value) {
                        query.before = Some(date);
                    }
                }
                "after" => {
                    if let Some(date) = parse_date(&value) {
                        query.after = Some(date);
                    }
                }
                _ => {}
            }
            i += consumed;
        } else if let Some(stripped) = rest.strip_prefix('-')
            && !stripped.is_empty()
            && !stripped.starts_with(char::is_whitespace)
        {
            let (word, consumed) = parse_word(stripped);
            if !word.is_empty() {
                query.excluded.push(word);
            }
            i += 1 + consumed;
        } else {
            let (word, consumed) = parse_word(&rest);
            if !word.is_empty() {
                query.terms.push(word);
            }
            i += consumed;
        }
    }

    query
}

/// Parse an operator like "from:value" or "from:\"quoted value\""
fn parse_operator(input: &str) -> Option<(String, String, usize)> {
    let colon_pos = input.find(':')?;
    let key = &input[..colon_pos];

    let valid_ops = ["from", "to", "cc", "bcc", "subject", "is", "before", "after"];
    if !valid_ops.contains(&key.to_lowercase().as_str()) {
        return None;
    }

    let after_colon = &input[colon_pos + 1..];
    let (value, value_len) = parse_value(after_colon);

    if value.is_empty() {
        return None;
    }

    // Lengths are counted in chars by the caller
    let consumed = key.chars().count() + 1 + value_len;
    Some((key.to_string(), value, consumed))
}

/// Parse a value (quoted or unquoted), returning it and the chars consumed
fn parse_value(input: &str) -> (String, usize) {
    let chars: Vec<char> = input.chars().collect();

    if chars.is_empty() {
        return (String::new(), 0);
    }

    if chars[0] == '"' {
        let mut value = String::new();
        let mut i = 1;
        while i < chars.len() && chars[i] != '"' {
            value.push(chars[i]);
            i += 1;
        }
        let consumed = if i < chars.len() { i + 1 } else { i };
        return (value, consumed);
    }

    let mut value = String::new();
    let mut i = 0;
    while i < chars.len() && !chars[i].is_whitespace() {
        value.push(chars[i]);
        i += 1;
    }

    (value, i)
}

/// Parse a word or quoted phrase
fn parse_word(input: &str) -> (String, usize) {
    parse_value(input)
}

/// Parse a date string (YYYY/MM/DD or YYYY-MM-DD)
fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    ["%Y/%m/%d", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> EmailRecord {
        EmailRecord::builder("1")
            .from("phillip.allen@enron.com")
            .to(vec!["tim.belden@enron.com".into()])
            .subject("Re: West Position")
            .body("Attached is the Delta position for 1/16")
            .date(Utc.with_ymd_and_hms(2001, 1, 16, 9, 0, 0).unwrap())
            .starred(true)
            .build()
    }

    #[test]
    fn test_parse_simple_query() {
        let query = parse_query_string("hello world");
        assert_eq!(query.terms, vec!["hello", "world"]);
        assert!(query.from.is_empty());
    }

    #[test]
    fn test_parse_quoted_phrase() {
        let query = parse_query_string("\"hello world\"");
        assert_eq!(query.terms, vec!["hello world"]);
    }

    #[test]
    fn test_parse_recipient_operators() {
        let query = parse_query_string("from:alice to:bob cc:carol bcc:dave subject:meeting");
        assert_eq!(query.from, vec!["alice"]);
        assert_eq!(query.to, vec!["bob"]);
        assert_eq!(query.cc, vec!["carol"]);
        assert_eq!(query.bcc, vec!["dave"]);
        assert_eq!(query.subject, vec!["meeting"]);
        assert!(query.terms.is_empty());
    }

    #[test]
    fn test_parse_quoted_operator_value() {
        let query = parse_query_string("subject:\"weekly sync\" notes");
        assert_eq!(query.subject, vec!["weekly sync"]);
        assert_eq!(query.terms, vec!["notes"]);
    }

    #[test]
    fn test_parse_flags() {
        let query = parse_query_string("is:unread is:starred");
        assert_eq!(query.is_read, Some(false));
        assert_eq!(query.is_starred, Some(true));
    }

    #[test]
    fn test_parse_exclusion() {
        let query = parse_query_string("position -delta -\"gas desk\"");
        assert_eq!(query.terms, vec!["position"]);
        assert_eq!(query.excluded, vec!["delta", "gas desk"]);
    }

    #[test]
    fn test_lone_dash_is_a_term() {
        let query = parse_query_string("a - b");
        assert_eq!(query.terms, vec!["a", "-", "b"]);
    }

    #[test]
    fn test_parse_date_filters() {
        let query = parse_query_string("after:2001/01/01 before:2001-12-31");
        assert_eq!(
            query.after.unwrap().format("%Y-%m-%d").to_string(),
            "2001-01-01"
        );
        assert_eq!(
            query.before.unwrap().format("%Y-%m-%d").to_string(),
            "2001-12-31"
        );
    }

    #[test]
    fn test_unknown_operator_is_a_term() {
        let query = parse_query_string("foo:bar");
        assert_eq!(query.terms, vec!["foo:bar"]);
    }

    #[test]
    fn test_operator_with_empty_value_is_a_term() {
        let query = parse_query_string("from: hello");
        assert!(query.from.is_empty());
        assert_eq!(query.terms, vec!["from:", "hello"]);
    }

    #[test]
    fn test_parse_non_ascii_input() {
        let query = parse_query_string("subject:café résumé");
        assert_eq!(query.subject, vec!["café"]);
        assert_eq!(query.terms, vec!["résumé"]);
    }

    #[test]
    fn test_empty_query() {
        assert!(parse_query_string("").is_empty());
        assert!(parse_query_string("   ").is_empty());
    }

    #[test]
    fn test_matches_terms_and_operators() {
        let email = email();
        assert!(parse_query_string("position").matches(&email));
        assert!(parse_query_string("from:phillip.allen").matches(&email));
        assert!(parse_query_string("to:tim.belden@enron.com is:starred").matches(&email));
        assert!(!parse_query_string("is:read").matches(&email));
        assert!(!parse_query_string("position -delta").matches(&email));
        assert!(!parse_query_string("cc:anyone").matches(&email));
    }

    #[test]
    fn test_matches_dates() {
        let email = email();
        assert!(parse_query_string("after:2001-01-16").matches(&email));
        assert!(!parse_query_string("before:2001-01-16").matches(&email));
        assert!(parse_query_string("before:2001-01-17").matches(&email));
    }
}
