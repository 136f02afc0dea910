//! Spreadsheet I/O for bulk upload files
//!
//! The first worksheet is read into a [`Sheet`] of typed cells, annotated
//! with per-row outcomes and written back out as the result file.

pub mod reader;
pub mod writer;

pub use reader::read_first_sheet;
pub use writer::write_sheet;

use super::error::EMPTY_FILE;
use super::types::{Cell, ERROR_HEADER, RowOutcome, RowSchema, STATUS_HEADER};

pub const STATUS_SUCCESS: &str = "SUCCESS";
pub const STATUS_FAILED: &str = "FAILED";
/// Error cell of a successful row
pub const NO_ERROR: &str = "NA";

/// Error cell text for a failed row
pub fn error_cell_text(messages: &[String]) -> String {
    format!(
        "Failed to update user record. Error Cause by - [{}]",
        messages.join(", ")
    )
}

/// One worksheet; row 0 is the header
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Sheet {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn header(&self) -> &[Cell] {
        self.rows.first().map(|r| r.as_slice()).unwrap_or(&[])
    }

    pub fn row(&self, index: usize) -> &[Cell] {
        self.rows.get(index).map(|r| r.as_slice()).unwrap_or(&[])
    }

    /// Rows after the header
    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Set a cell, growing the sheet as needed
    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, Cell::Empty);
        }
        cells[col] = cell;
    }

    /// Title the output columns of the header row
    pub fn annotate_header(&mut self, schema: RowSchema) {
        self.set_cell(0, schema.status_column(), Cell::String(STATUS_HEADER.to_string()));
        self.set_cell(0, schema.error_column(), Cell::String(ERROR_HEADER.to_string()));
    }

    pub fn set_outcome(&mut self, row: usize, schema: RowSchema, outcome: &RowOutcome) {
        let (status, error) = match outcome {
            RowOutcome::Success => (STATUS_SUCCESS, NO_ERROR.to_string()),
            RowOutcome::Failure(messages) => (STATUS_FAILED, error_cell_text(messages)),
        };
        self.set_cell(row, schema.status_column(), Cell::String(status.to_string()));
        self.set_cell(row, schema.error_column(), Cell::String(error));
    }

    /// Append a row reporting that the upload held no data
    pub fn append_empty_file_marker(&mut self, schema: RowSchema) {
        let row = self.rows.len().max(1);
        self.set_cell(row, schema.status_column(), Cell::String(STATUS_FAILED.to_string()));
        self.set_cell(row, schema.error_column(), Cell::String(EMPTY_FILE.to_string()));
    }
}
