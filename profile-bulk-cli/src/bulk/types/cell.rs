//! Typed spreadsheet cell values
//!
//! Cells are read once from the workbook and carried through validation and
//! back into the annotated result sheet.

use chrono::{Duration, NaiveDate};

/// A single spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// No value
    Empty,
    /// Text value (kept as written, trimming happens during validation)
    String(String),
    /// Numeric value without date formatting
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Date-formatted numeric cell, converted to a calendar date
    Date(NaiveDate),
    /// Formula error (#N/A, #REF!, ...)
    Error(String),
}

/// Shared empty cell for rows shorter than the schema
pub static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Empty cells and whitespace-only strings count as blank
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed text for string cells
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::String(s) => Some(s.trim()),
            _ => None,
        }
    }

    /// Text for string cells, spreadsheet rendering for plain numbers
    pub fn as_text_or_number(&self) -> Option<String> {
        match self {
            Cell::String(s) => Some(s.trim().to_string()),
            Cell::Number(n) => Some(number_to_text(*n)),
            _ => None,
        }
    }
}

/// Render a number the way a spreadsheet shows it in a text context
/// (`9876543210.0` -> `"9876543210"`)
pub fn number_to_text(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Day zero of the 1900 date system as used by Excel serials
fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).expect("valid epoch date")
}

/// Convert an Excel date serial into a calendar date
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    excel_epoch().checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Convert a calendar date into an Excel date serial
pub fn serial_from_date(date: NaiveDate) -> f64 {
    (date - excel_epoch()).num_days() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_detection() {
        assert!(Cell::Empty.is_blank());
        assert!(Cell::String("   ".to_string()).is_blank());
        assert!(!Cell::String(" x ".to_string()).is_blank());
        assert!(!Cell::Number(0.0).is_blank());
    }

    #[test]
    fn test_number_to_text() {
        assert_eq!(number_to_text(9876543210.0), "9876543210");
        assert_eq!(number_to_text(560001.0), "560001");
        assert_eq!(number_to_text(12.5), "12.5");
    }

    #[test]
    fn test_serial_conversion() {
        let date = NaiveDate::from_ymd_opt(1990, 5, 14).unwrap();
        let serial = serial_from_date(date);
        assert_eq!(serial, 33007.0);
        assert_eq!(date_from_serial(serial), Some(date));
        // Time-of-day fraction is dropped
        assert_eq!(date_from_serial(serial + 0.75), Some(date));
        assert_eq!(date_from_serial(-1.0), None);
    }

    #[test]
    fn test_text_accessors() {
        assert_eq!(Cell::String("  a@b.in ".into()).as_text(), Some("a@b.in"));
        assert_eq!(Cell::Number(42.0).as_text(), None);
        assert_eq!(Cell::Number(42.0).as_text_or_number(), Some("42".to_string()));
        assert_eq!(Cell::Bool(true).as_text_or_number(), None);
    }
}
