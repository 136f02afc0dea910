//! Profile fields carried by a bulk-upload row and their categories

use serde::{Deserialize, Serialize};

/// A column-backed profile field
///
/// Declaration order is the spreadsheet order of the standard layout, which
/// also makes it the order fields are proposed in a new workflow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    FullName,
    Email,
    Phone,
    Group,
    Designation,
    Gender,
    Category,
    DateOfBirth,
    MotherTongue,
    EmployeeCode,
    PinCode,
    ExternalSystemId,
    ExternalSystem,
    Tags,
}

impl Field {
    /// Every field, in declaration order
    pub const ALL: [Field; 14] = [
        Field::FullName,
        Field::Email,
        Field::Phone,
        Field::Group,
        Field::Designation,
        Field::Gender,
        Field::Category,
        Field::DateOfBirth,
        Field::MotherTongue,
        Field::EmployeeCode,
        Field::PinCode,
        Field::ExternalSystemId,
        Field::ExternalSystem,
        Field::Tags,
    ];

    /// Key used by the profile service and in stored workflow requests
    pub fn key(&self) -> &'static str {
        match self {
            Field::FullName => "firstName",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Group => "group",
            Field::Designation => "designation",
            Field::Gender => "gender",
            Field::Category => "category",
            Field::DateOfBirth => "dob",
            Field::MotherTongue => "domicileMedium",
            Field::EmployeeCode => "employeeCode",
            Field::PinCode => "pinCode",
            Field::ExternalSystemId => "externalSystemId",
            Field::ExternalSystem => "externalSystem",
            Field::Tags => "tag",
        }
    }

    /// Look up a field by its profile key
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.key() == key)
    }

    /// Column title as it appears in the upload template
    pub fn label(&self) -> &'static str {
        match self {
            Field::FullName => "Full Name",
            Field::Email => "Email",
            Field::Phone => "Mobile Number",
            Field::Group => "Group",
            Field::Designation => "Designation",
            Field::Gender => "Gender",
            Field::Category => "Category",
            Field::DateOfBirth => "Date of Birth",
            Field::MotherTongue => "Mother Tongue",
            Field::EmployeeCode => "Employee ID",
            Field::PinCode => "Office Pin Code",
            Field::ExternalSystemId => "External System ID",
            Field::ExternalSystem => "External System Name",
            Field::Tags => "Tags",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Section of the user profile a field change belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldCategory {
    #[serde(rename = "personalDetails")]
    Personal,
    #[serde(rename = "professionalDetails")]
    Professional,
    #[serde(rename = "employmentDetails")]
    Employment,
    #[serde(rename = "additionalProperties")]
    Additional,
}

impl FieldCategory {
    /// Name of the profile section as stored and sent to the profile service
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldCategory::Personal => "personalDetails",
            FieldCategory::Professional => "professionalDetails",
            FieldCategory::Employment => "employmentDetails",
            FieldCategory::Additional => "additionalProperties",
        }
    }
}

impl std::fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
