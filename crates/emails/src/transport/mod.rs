//! Transport to the email REST service
//!
//! The store talks to the service only through [`EmailTransport`]. Two
//! implementations ship with the crate: [`HttpTransport`] for the real
//! service and [`InMemoryTransport`] for tests and offline runs.

mod error;
mod http;
mod memory;
mod traits;

pub use error::TransportError;
pub use http::HttpTransport;
pub use memory::{InMemoryTransport, TransportCall};
pub use traits::EmailTransport;

/// Service response types
pub mod api {
    use serde::{Deserialize, Serialize};

    use crate::models::EmailRecord;

    /// Response to a listing or search request
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct ListResponse {
        /// Number of records matching the request before paging
        #[serde(default)]
        pub total: usize,
        /// Milliseconds the service spent on the query
        #[serde(default)]
        pub took: u64,
        #[serde(default)]
        pub emails: Vec<EmailRecord>,
    }
}
