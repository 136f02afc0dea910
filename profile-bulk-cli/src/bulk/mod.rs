//! Bulk profile updates
//!
//! An uploaded spreadsheet is processed row by row: each row is validated,
//! its user looked up, its proposals reconciled against that user's pending
//! workflow requests and whatever remains submitted as a new request. The
//! annotated spreadsheet is published as the batch result.

pub mod batch;
pub mod cache;
pub mod consumer;
pub mod error;
pub mod excel;
pub mod extract;
pub mod profile;
pub mod reconcile;
pub mod resolver;
pub mod storage;
pub mod store;
pub mod submit;
pub mod types;
pub mod validate;

#[cfg(test)]
pub mod testing;

pub use batch::{BulkUploadProcessor, Collaborators};
pub use consumer::{BatchRunner, ConsumeSummary, TriggerMessage, consume};
