//! Write an annotated sheet as an xlsx file

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};

use super::Sheet;
use crate::bulk::types::Cell;
use crate::bulk::types::cell::serial_from_date;

/// Display format of date cells
const DATE_FORMAT: &str = "dd-mm-yyyy";

pub fn write_sheet(sheet: &Sheet, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(&sheet.name)
        .with_context(|| format!("Invalid sheet name: {}", sheet.name))?;

    let date_format = Format::new().set_num_format(DATE_FORMAT);

    for (r, cells) in sheet.rows.iter().enumerate() {
        let row = u32::try_from(r).context("Too many rows")?;
        for (c, cell) in cells.iter().enumerate() {
            let col = u16::try_from(c).context("Too many columns")?;
            match cell {
                Cell::Empty => {}
                Cell::String(s) => {
                    worksheet.write_string(row, col, s)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(row, col, *n)?;
                }
                Cell::Bool(b) => {
                    worksheet.write_boolean(row, col, *b)?;
                }
                Cell::Date(d) => {
                    worksheet.write_number_with_format(row, col, serial_from_date(*d), &date_format)?;
                }
                Cell::Error(e) => {
                    worksheet.write_string(row, col, e)?;
                }
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::excel::read_first_sheet;
    use crate::bulk::types::{RowOutcome, RowSchema};
    use chrono::NaiveDate;

    #[test]
    fn test_annotated_sheet_survives_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.xlsx");

        let dob = NaiveDate::from_ymd_opt(1988, 1, 31).unwrap();
        let mut sheet = Sheet::new("Users");
        sheet.set_cell(0, 0, Cell::String("Full Name".into()));
        sheet.set_cell(1, 0, Cell::String("Asha".into()));
        sheet.set_cell(1, 2, Cell::Number(9876543210.0));
        sheet.set_cell(1, 7, Cell::Date(dob));
        sheet.annotate_header(RowSchema::Standard);
        sheet.set_outcome(1, RowSchema::Standard, &RowOutcome::Success);

        write_sheet(&sheet, &path).unwrap();
        let back = read_first_sheet(&path).unwrap();

        assert_eq!(back.name, "Users");
        assert_eq!(back.row(1)[7], Cell::Date(dob));
        assert_eq!(back.row(1)[2], Cell::Number(9876543210.0));
        assert_eq!(back.row(0)[14], Cell::String("Status".into()));
        assert_eq!(back.row(1)[15], Cell::String("NA".into()));
    }
}
