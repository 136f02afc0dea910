//! Spreadsheet row layouts
//!
//! Two incompatible upload templates are in circulation:
//! - `Standard`: 14 input columns, status at column 14, error details at 15
//! - `Compact`: 10 input columns, status at column 10, error details at 11
//!
//! Each layout owns its column table, its field classification and its
//! validation policy. The layout is chosen once per batch.

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::field::{Field, FieldCategory};

/// Binding of a spreadsheet column to a profile field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub index: usize,
    pub field: Field,
}

const fn col(index: usize, field: Field) -> ColumnSpec {
    ColumnSpec { index, field }
}

const STANDARD_COLUMNS: [ColumnSpec; 14] = [
    col(0, Field::FullName),
    col(1, Field::Email),
    col(2, Field::Phone),
    col(3, Field::Group),
    col(4, Field::Designation),
    col(5, Field::Gender),
    col(6, Field::Category),
    col(7, Field::DateOfBirth),
    col(8, Field::MotherTongue),
    col(9, Field::EmployeeCode),
    col(10, Field::PinCode),
    col(11, Field::ExternalSystemId),
    col(12, Field::ExternalSystem),
    col(13, Field::Tags),
];

const COMPACT_COLUMNS: [ColumnSpec; 10] = [
    col(0, Field::FullName),
    col(1, Field::Email),
    col(2, Field::Phone),
    col(3, Field::Group),
    col(4, Field::Designation),
    col(5, Field::Gender),
    col(6, Field::DateOfBirth),
    col(7, Field::MotherTongue),
    col(8, Field::ExternalSystemId),
    col(9, Field::Tags),
];

const STANDARD_CLASSIFICATION: [(&str, FieldCategory); 9] = [
    ("employeeCode", FieldCategory::Employment),
    ("pinCode", FieldCategory::Employment),
    ("group", FieldCategory::Professional),
    ("designation", FieldCategory::Professional),
    ("firstName", FieldCategory::Personal),
    ("dob", FieldCategory::Personal),
    ("domicileMedium", FieldCategory::Personal),
    ("category", FieldCategory::Personal),
    ("gender", FieldCategory::Personal),
];

const COMPACT_CLASSIFICATION: [(&str, FieldCategory); 6] = [
    ("group", FieldCategory::Professional),
    ("designation", FieldCategory::Professional),
    ("firstName", FieldCategory::Personal),
    ("dob", FieldCategory::Personal),
    ("domicileMedium", FieldCategory::Personal),
    ("gender", FieldCategory::Personal),
];

/// Header text written into the status column
pub const STATUS_HEADER: &str = "Status";
/// Header text written into the error column
pub const ERROR_HEADER: &str = "Error Details";

/// Row layout of an upload file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowSchema {
    Standard,
    Compact,
}

impl RowSchema {
    /// Input columns in spreadsheet order
    pub fn columns(&self) -> &'static [ColumnSpec] {
        match self {
            RowSchema::Standard => &STANDARD_COLUMNS,
            RowSchema::Compact => &COMPACT_COLUMNS,
        }
    }

    /// Column index holding a field, if this layout carries it
    pub fn column_of(&self, field: Field) -> Option<usize> {
        self.columns()
            .iter()
            .find(|c| c.field == field)
            .map(|c| c.index)
    }

    /// Column receiving SUCCESS / FAILED
    pub fn status_column(&self) -> usize {
        self.columns().len()
    }

    /// Column receiving the joined error list
    pub fn error_column(&self) -> usize {
        self.columns().len() + 1
    }

    /// Whether a resolved user must belong to the uploading organisation.
    /// The compact template is used by tenants without that restriction.
    pub fn checks_organization(&self) -> bool {
        matches!(self, RowSchema::Standard)
    }

    /// Profile section for a field key; unknown keys are additional properties
    pub fn classify(&self, key: &str) -> FieldCategory {
        let table: &[(&str, FieldCategory)] = match self {
            RowSchema::Standard => &STANDARD_CLASSIFICATION,
            RowSchema::Compact => &COMPACT_CLASSIFICATION,
        };
        table
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, c)| *c)
            .unwrap_or(FieldCategory::Additional)
    }

    /// Guess the layout from the header row.
    ///
    /// A standard header names a 14th input column; a compact header either
    /// stops after 10 columns or carries "Status" right after them.
    pub fn detect(header: &[Cell]) -> RowSchema {
        let last_standard = header.get(13).and_then(|c| c.as_text()).unwrap_or("");
        if !last_standard.is_empty() && !last_standard.eq_ignore_ascii_case(STATUS_HEADER) {
            RowSchema::Standard
        } else {
            RowSchema::Compact
        }
    }
}

impl std::fmt::Display for RowSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowSchema::Standard => write!(f, "standard"),
            RowSchema::Compact => write!(f, "compact"),
        }
    }
}

/// Configured layout selection for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaChoice {
    Standard,
    Compact,
    /// Detect from the header row
    #[default]
    Auto,
}

impl SchemaChoice {
    /// Resolve to a concrete layout, consulting the header when set to auto
    pub fn resolve(&self, header: &[Cell]) -> RowSchema {
        match self {
            SchemaChoice::Standard => RowSchema::Standard,
            SchemaChoice::Compact => RowSchema::Compact,
            SchemaChoice::Auto => RowSchema::detect(header),
        }
    }
}
