//! Data model for bulk profile updates

pub mod batch;
pub mod cell;
pub mod change_set;
pub mod field;
pub mod identity;
pub mod schema;
pub mod workflow;

pub use batch::{BatchJob, BatchStatus, RowOutcome};
pub use cell::{Cell, EMPTY_CELL, number_to_text};
pub use change_set::{ChangeSet, FieldValue};
pub use field::{Field, FieldCategory};
pub use identity::{IdentityField, IdentityHint, UserIdentity};
pub use schema::{ColumnSpec, ERROR_HEADER, RowSchema, STATUS_HEADER, SchemaChoice};
pub use workflow::{FieldChange, WorkflowRequest, WorkflowState};
