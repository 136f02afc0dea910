//! Row extraction
//!
//! Turns one spreadsheet row into the identity values used to find the user,
//! a [`ChangeSet`] of validated proposals and the validation errors of every
//! other field. Identity and field errors are kept apart: identity errors only
//! matter when no identity resolves.

use std::sync::Arc;

use super::cache::EnumLookup;
use super::types::{
    Cell, ChangeSet, EMPTY_CELL, Field, FieldValue, IdentityField, IdentityHint, RowSchema,
};
use super::validate::{AllowLists, ErrorCollector, fields};

/// Enumeration category holding valid designations
pub const POSITION_CATEGORY: &str = "position";
/// Enumeration category holding valid mother tongues
pub const LANGUAGES_CATEGORY: &str = "languages";

/// Validated identity cells of a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityCells {
    /// `None` when the email cell is blank
    pub email: Option<Result<String, String>>,
    pub phone: Result<String, String>,
}

impl IdentityCells {
    /// Valid identity values in lookup order: email first, then phone
    pub fn hints(&self) -> Vec<IdentityHint> {
        let mut hints = Vec::new();
        if let Some(Ok(email)) = &self.email {
            hints.push(IdentityHint::new(IdentityField::Email, email.clone()));
        }
        if let Ok(phone) = &self.phone {
            hints.push(IdentityHint::new(IdentityField::Phone, phone.clone()));
        }
        hints
    }

    /// Errors to report when no identity resolved
    pub fn errors(&self) -> ErrorCollector {
        let mut errors = ErrorCollector::new();
        if let Some(Err(e)) = &self.email {
            errors.push(e.clone());
        }
        if let Err(e) = &self.phone {
            errors.push(e.clone());
        }
        errors
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRow {
    pub identity: IdentityCells,
    pub changes: ChangeSet,
    pub errors: ErrorCollector,
}

fn cell_at(row: &[Cell], index: Option<usize>) -> &Cell {
    index.and_then(|i| row.get(i)).unwrap_or(&EMPTY_CELL)
}

/// A row whose email and phone cells are both blank ends the sheet
pub fn is_end_of_data(row: &[Cell], schema: RowSchema) -> bool {
    cell_at(row, schema.column_of(Field::Email)).is_blank()
        && cell_at(row, schema.column_of(Field::Phone)).is_blank()
}

pub struct RowExtractor {
    enums: Arc<dyn EnumLookup>,
    rules: AllowLists,
}

impl RowExtractor {
    pub fn new(enums: Arc<dyn EnumLookup>, rules: AllowLists) -> Self {
        Self { enums, rules }
    }

    pub async fn extract(&self, row: &[Cell], schema: RowSchema) -> ExtractedRow {
        let email_cell = cell_at(row, schema.column_of(Field::Email));
        let identity = IdentityCells {
            email: (!email_cell.is_blank()).then(|| fields::email(email_cell)),
            phone: fields::phone(cell_at(row, schema.column_of(Field::Phone))),
        };

        let mut changes = ChangeSet::new();
        let mut errors = ErrorCollector::new();

        for column in schema.columns() {
            let cell = cell_at(row, Some(column.index));
            if cell.is_blank() {
                continue;
            }
            match self.validate(column.field, cell).await {
                Some(Ok(value)) => changes.insert(column.field, value),
                Some(Err(messages)) => errors.extend(messages),
                None => {}
            }
        }

        ExtractedRow {
            identity,
            changes,
            errors,
        }
    }

    /// Validate a proposal cell; identity cells are not proposals and yield `None`
    async fn validate(
        &self,
        field: Field,
        cell: &Cell,
    ) -> Option<Result<FieldValue, Vec<String>>> {
        let result = match field {
            Field::Email | Field::Phone => return None,
            Field::FullName => fields::full_name(cell),
            Field::Group => fields::group(cell, &self.rules.group),
            Field::Designation => {
                let positions = self.enums.get(POSITION_CATEGORY).await;
                fields::designation(cell, &positions)
            }
            Field::Gender => fields::gender(cell, &self.rules.gender),
            Field::Category => fields::category(cell, &self.rules.category),
            Field::DateOfBirth => fields::date_of_birth(cell),
            Field::MotherTongue => {
                let languages = self.enums.get(LANGUAGES_CATEGORY).await;
                fields::mother_tongue(cell, &languages)
            }
            Field::EmployeeCode => fields::employee_code(cell),
            Field::PinCode => fields::pin_code(cell),
            Field::ExternalSystemId => fields::external_system_id(cell),
            Field::ExternalSystem => fields::external_system(cell),
            Field::Tags => fields::tags(cell),
        };
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::testing::StaticEnums;
    use chrono::NaiveDate;

    fn s(v: &str) -> Cell {
        Cell::String(v.to_string())
    }

    fn extractor() -> RowExtractor {
        let enums = StaticEnums::new()
            .with(POSITION_CATEGORY, &["Section Officer", "Clerk"])
            .with(LANGUAGES_CATEGORY, &["Hindi", "Tamil"]);
        RowExtractor::new(Arc::new(enums), AllowLists::default())
    }

    fn standard_row(values: &[(usize, Cell)]) -> Vec<Cell> {
        let mut row = vec![Cell::Empty; 14];
        for (i, cell) in values {
            row[*i] = cell.clone();
        }
        row
    }

    #[tokio::test]
    async fn test_valid_standard_row() {
        let row = standard_row(&[
            (0, s("Asha Kumari")),
            (1, s("asha@gov.in")),
            (2, Cell::Number(9876543210.0)),
            (3, s("Group B")),
            (4, s("Section Officer")),
            (5, s("Female")),
            (6, s("OBC")),
            (7, Cell::Date(NaiveDate::from_ymd_opt(1990, 5, 14).unwrap())),
            (8, s("Hindi")),
            (9, Cell::Number(4512.0)),
            (10, Cell::Number(560001.0)),
            (11, s("HRMS01")),
            (12, s("Sparrow")),
            (13, s("Bihar Circle, Patna Division")),
        ]);

        let extracted = extractor().extract(&row, RowSchema::Standard).await;

        assert!(extracted.errors.is_empty(), "{:?}", extracted.errors);
        assert_eq!(extracted.changes.len(), 12);
        assert_eq!(extracted.changes.get(Field::Email), None);
        assert_eq!(extracted.changes.get(Field::Phone), None);
        assert_eq!(
            extracted.changes.get(Field::DateOfBirth),
            Some(&FieldValue::Text("14-05-1990".into()))
        );
        assert_eq!(
            extracted.changes.get(Field::Tags),
            Some(&FieldValue::List(vec!["Bihar Circle".into(), "Patna Division".into()]))
        );
        assert_eq!(
            extracted.identity.hints(),
            vec![
                IdentityHint::new(IdentityField::Email, "asha@gov.in"),
                IdentityHint::new(IdentityField::Phone, "9876543210"),
            ]
        );
    }

    #[tokio::test]
    async fn test_accumulates_every_field_error() {
        let row = standard_row(&[
            (0, s("R2D2")),
            (1, s("asha@gov.in")),
            (4, s("Chief Wizard")),
            (5, s("F")),
            (10, s("12")),
        ]);

        let extracted = extractor().extract(&row, RowSchema::Standard).await;

        let errors = extracted.errors.into_vec();
        assert_eq!(errors.len(), 4, "{:?}", errors);
        assert_eq!(errors[0], "Invalid Full Name");
        assert!(errors[1].starts_with("Invalid Value of Designation"));
        assert!(errors[2].starts_with("Invalid Gender"));
        assert!(errors[3].starts_with("Invalid Office Pin Code"));
    }

    #[tokio::test]
    async fn test_identity_errors_are_separate() {
        let row = standard_row(&[(1, s("not-an-email")), (5, s("Male"))]);
        let extracted = extractor().extract(&row, RowSchema::Standard).await;

        assert!(extracted.identity.hints().is_empty());
        assert_eq!(
            extracted.identity.errors().into_vec(),
            vec!["The Email provided is Invalid", "Mobile Number is Missing"]
        );
        assert!(extracted.errors.is_empty());
        assert_eq!(extracted.changes.len(), 1);
    }

    #[tokio::test]
    async fn test_compact_layout() {
        let row = vec![
            s("Asha Kumari"),
            Cell::Empty,
            s("9876543210"),
            Cell::Empty,
            s("Clerk"),
            s("Female"),
            s("14-05-1990"),
            s("Tamil"),
            s("HRMS01"),
            s("Patna Division"),
        ];

        let extracted = extractor().extract(&row, RowSchema::Compact).await;

        assert!(extracted.errors.is_empty(), "{:?}", extracted.errors);
        assert_eq!(extracted.identity.email, None);
        assert_eq!(extracted.changes.get(Field::MotherTongue), Some(&FieldValue::Text("Tamil".into())));
        assert_eq!(extracted.changes.get(Field::ExternalSystemId), Some(&FieldValue::Text("HRMS01".into())));
        assert_eq!(extracted.changes.get(Field::EmployeeCode), None);
    }

    #[test]
    fn test_end_of_data() {
        assert!(is_end_of_data(&standard_row(&[(0, s("Asha"))]), RowSchema::Standard));
        assert!(is_end_of_data(&[], RowSchema::Compact));
        assert!(!is_end_of_data(&standard_row(&[(2, Cell::Number(9876543210.0))]), RowSchema::Standard));
    }
}
