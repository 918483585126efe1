//! Form domain types
//!
//! User records and the supplier abstraction the batch consumes them from.

mod records;

pub use records::{RecordSource, ResourceType, StaticRecords, UserRecord};
