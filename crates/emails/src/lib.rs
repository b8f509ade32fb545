//! Emails crate - client-side state and data layer for an email listing UI
//!
//! This crate provides:
//! - Domain models (EmailRecord, PaginationSettings, StructuredQuery)
//! - A transport abstraction over the email REST service, with HTTP and
//!   in-memory implementations
//! - A raw query-string parser matching the service's search semantics
//! - The dual-view store keeping the "all" and "starred" pages in sync
//!
//! The crate has no UI dependencies; a view layer drives [`EmailStore`]
//! and renders what it exposes.

pub mod config;
pub mod models;
pub mod search;
pub mod store;
pub mod transport;

pub use self::config::ClientConfig;
pub use models::{
    DateRange, EmailId, EmailRecord, PageRequest, PaginationSettings, SearchPredicate, SortField,
    StructuredQuery,
};
pub use search::{ParsedQuery, parse_query_string};
pub use store::{EmailStore, EmailView, PageWindow, StoreOptions, ViewKind};
pub use transport::{
    EmailTransport, HttpTransport, InMemoryTransport, TransportCall, TransportError,
    api::ListResponse,
};
