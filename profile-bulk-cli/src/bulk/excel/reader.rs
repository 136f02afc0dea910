//! Read the first worksheet of an xlsx file

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, Xlsx, open_workbook};
use chrono::NaiveDate;

use super::Sheet;
use crate::bulk::types::Cell;
use crate::bulk::types::cell::date_from_serial;

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::String(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            match date_from_serial(serial) {
                Some(date) if dt.is_datetime() => Cell::Date(date),
                _ => Cell::Number(serial),
            }
        }
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::String(s.clone())),
        Data::DurationIso(s) => Cell::String(s.clone()),
        Data::Error(e) => Cell::Error(e.to_string()),
    }
}

/// Read the first worksheet into absolute row/column positions
pub fn read_first_sheet(path: &Path) -> Result<Sheet> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .context("Excel file has no sheets")?
        .clone();

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    let mut sheet = Sheet::new(sheet_name);
    let Some((start_row, start_col)) = range.start() else {
        return Ok(sheet);
    };

    sheet.rows.resize_with(start_row as usize, Vec::new);
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col as usize];
        cells.extend(row.iter().map(to_cell));
        while matches!(cells.last(), Some(Cell::Empty)) {
            cells.pop();
        }
        sheet.rows.push(cells);
    }

    Ok(sheet)
}
