//! Domain models for the email listing

mod email;
mod query;
mod settings;

pub use email::{EmailId, EmailRecord, EmailRecordBuilder};
pub use query::{DateRange, SearchPredicate, StructuredQuery};
pub use settings::{
    DEFAULT_PAGE_SIZE, InvalidSortField, PageRequest, PaginationSettings, SortField, SortKey,
};

pub(crate) use query::{address_eq, contains_ignore_case};
