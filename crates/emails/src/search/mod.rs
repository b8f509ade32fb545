//! Raw query-string search
//!
//! The service accepts a free-form query string next to the structured
//! query. This module parses that language and evaluates it against a
//! record, which is what the in-memory transport uses to answer
//! string searches.

mod query_parser;

pub use query_parser::{ParsedQuery, parse_query_string};
