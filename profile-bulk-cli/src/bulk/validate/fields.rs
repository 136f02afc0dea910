//! Per-field validation rules
//!
//! Each rule takes one non-blank cell and returns the normalized value or the
//! messages to record against the row. Rules are pure: enumeration sets and
//! allow-lists are passed in by the caller.

use std::collections::HashSet;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::bulk::types::{Cell, FieldValue};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_+&*-]+(?:\.[a-zA-Z0-9_+&*-]+)*@(?:[a-zA-Z0-9-]+\.)+[a-zA-Z]{2,7}$")
        .expect("valid email pattern")
});
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9]\d{9,14}$").expect("valid phone pattern"));
static NO_SPECIAL_CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9 ]+$").expect("valid free text pattern"));
static FULL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z .']*$").expect("valid full name pattern"));
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}-\d{2}-\d{4}$").expect("valid date pattern"));
static ALNUM_30_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]{1,30}$").expect("valid identifier pattern"));
static EXTERNAL_SYSTEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{1,255}$").expect("valid external system pattern"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z ]+$").expect("valid tag pattern"));
static PIN_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").expect("valid pin pattern"));

/// Output format for dates of birth
pub const DOB_FORMAT: &str = "%d-%m-%Y";

const DOB_FORMAT_ERROR: &str = "Invalid format for Date of Birth type. Expecting in format dd-mm-yyyy";
const EXTERNAL_ID_ERROR: &str = "Invalid External System ID : External System Id can contain alphanumeric characters and have a max length of 30";

type FieldResult = Result<FieldValue, Vec<String>>;

fn fail(message: impl Into<String>) -> FieldResult {
    Err(vec![message.into()])
}

fn text_cell<'a>(cell: &'a Cell, label: &str) -> Result<&'a str, Vec<String>> {
    cell.as_text()
        .ok_or_else(|| vec![format!("Invalid value for {} type. Expecting string format", label)])
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

/// Email identity cell. Non-text cells are invalid as well.
pub fn email(cell: &Cell) -> Result<String, String> {
    match cell.as_text() {
        Some(value) if is_valid_email(value) => Ok(value.to_string()),
        _ => Err("The Email provided is Invalid".to_string()),
    }
}

/// Phone identity cell: numeric or text, E.164-like digits
pub fn phone(cell: &Cell) -> Result<String, String> {
    if cell.is_blank() {
        return Err("Mobile Number is Missing".to_string());
    }
    let Some(value) = cell.as_text_or_number() else {
        return Err("Invalid Value of Mobile Number. Expecting number/string format".to_string());
    };
    if is_valid_phone(&value) {
        Ok(value)
    } else {
        Err("The Mobile Number provided is Invalid".to_string())
    }
}

pub fn full_name(cell: &Cell) -> FieldResult {
    let value = cell.as_text().ok_or_else(|| {
        vec!["Invalid value for Full Name type. Expecting string format".to_string()]
    })?;
    if FULL_NAME_RE.is_match(value) {
        Ok(FieldValue::Text(value.to_string()))
    } else {
        fail("Invalid Full Name")
    }
}

/// Group must be one of the configured values; a non-text cell reports both problems
pub fn group(cell: &Cell, allowed: &[String]) -> FieldResult {
    const NOT_LISTED: &str =
        "invalid value of Group Type, please choose a valid value from the default list";
    match cell.as_text() {
        Some(value) if allowed.iter().any(|g| g == value) => Ok(FieldValue::Text(value.to_string())),
        Some(_) => fail(NOT_LISTED),
        None => Err(vec![
            "Invalid value for Group type. Expecting string format".to_string(),
            NOT_LISTED.to_string(),
        ]),
    }
}

/// Designation: no special characters and listed under the `position` enumeration
pub fn designation(cell: &Cell, positions: &HashSet<String>) -> FieldResult {
    let value = text_cell(cell, "Designation")?;
    let mut errors = Vec::new();
    if !NO_SPECIAL_CHAR_RE.is_match(value) {
        errors.push(
            "Invalid Designation: Designation should be added from default list and cannot contain special character"
                .to_string(),
        );
    }
    if !positions.contains(value) {
        errors.push(
            "Invalid Value of Designation, please choose a valid value from the default list"
                .to_string(),
        );
    }
    if errors.is_empty() {
        Ok(FieldValue::Text(value.to_string()))
    } else {
        Err(errors)
    }
}

pub fn gender(cell: &Cell, allowed: &[String]) -> FieldResult {
    let value = text_cell(cell, "Gender")?;
    if allowed.iter().any(|g| g == value) {
        Ok(FieldValue::Text(value.to_string()))
    } else {
        fail(format!(
            "Invalid Gender : Gender can be only among one of these [{}]",
            allowed.join(", ")
        ))
    }
}

pub fn category(cell: &Cell, allowed: &[String]) -> FieldResult {
    let value = text_cell(cell, "Category")?;
    if allowed.iter().any(|c| c == value) {
        Ok(FieldValue::Text(value.to_string()))
    } else {
        fail(format!(
            "Invalid Category : Category can be only among one of these [{}]",
            allowed.join(", ")
        ))
    }
}

/// Parse a `dd-mm-yyyy` date, rejecting impossible calendar days
pub fn parse_dob(value: &str) -> Option<NaiveDate> {
    if !DATE_RE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, DOB_FORMAT).ok()
}

/// Date of birth from a `dd-mm-yyyy` text cell or a date-formatted cell
pub fn date_of_birth(cell: &Cell) -> FieldResult {
    match cell {
        Cell::String(s) => {
            let value = s.trim();
            match parse_dob(value) {
                Some(_) => Ok(FieldValue::Text(value.to_string())),
                None => fail(DOB_FORMAT_ERROR),
            }
        }
        Cell::Date(date) => Ok(FieldValue::Text(date.format(DOB_FORMAT).to_string())),
        Cell::Number(_) => fail("Cell is numeric but not a date."),
        _ => fail("Invalid value for Date of Birth type. Expecting string format"),
    }
}

/// Mother tongue: no special characters and listed under the `languages` enumeration
pub fn mother_tongue(cell: &Cell, languages: &HashSet<String>) -> FieldResult {
    let value = text_cell(cell, "Mother Tongue")?;
    if NO_SPECIAL_CHAR_RE.is_match(value) && languages.contains(value) {
        Ok(FieldValue::Text(value.to_string()))
    } else {
        fail("Invalid Mother Tongue: Mother Tongue should be added from default list and/or cannot contain special character(s)")
    }
}

pub fn employee_code(cell: &Cell) -> FieldResult {
    let value = cell.as_text_or_number().ok_or_else(|| {
        vec!["Invalid value for Employee ID type. Expecting string/number format".to_string()]
    })?;
    if ALNUM_30_RE.is_match(&value) {
        Ok(FieldValue::Text(value))
    } else {
        fail("Invalid Employee ID : Employee ID can contain alphanumeric characters or numeric character and have a max length of 30")
    }
}

pub fn pin_code(cell: &Cell) -> FieldResult {
    let value = cell.as_text_or_number().ok_or_else(|| {
        vec!["Invalid value for Office Pin Code type. Expecting number/string format".to_string()]
    })?;
    if PIN_CODE_RE.is_match(&value) {
        Ok(FieldValue::Text(value))
    } else {
        fail("Invalid Office Pin Code : Office Pin Code should be numeric and is of 6 digit.")
    }
}

pub fn external_system_id(cell: &Cell) -> FieldResult {
    let value = cell.as_text_or_number().ok_or_else(|| {
        vec!["Invalid value for External System ID type. Expecting string/number format".to_string()]
    })?;
    if ALNUM_30_RE.is_match(&value) {
        Ok(FieldValue::Text(value))
    } else {
        fail(EXTERNAL_ID_ERROR)
    }
}

pub fn external_system(cell: &Cell) -> FieldResult {
    let value = text_cell(cell, "External System Name")?;
    if EXTERNAL_SYSTEM_RE.is_match(value) {
        Ok(FieldValue::Text(value.to_string()))
    } else {
        fail("Invalid External System Name : External System Name can contain only alphabets and can have a max length of 255")
    }
}

/// Comma separated tags, each made of letters and spaces
pub fn tags(cell: &Cell) -> FieldResult {
    let value = text_cell(cell, "Tags")?;
    let tags: Vec<String> = value.split(',').map(|t| t.trim().to_string()).collect();
    if tags.iter().all(|t| TAG_RE.is_match(t)) {
        Ok(FieldValue::List(tags))
    } else {
        fail("Invalid Tag : Tags are comma seperated string values. A Tag can contain only alphabets with spaces. eg: Bihar Circle, Patna Division")
    }
}
