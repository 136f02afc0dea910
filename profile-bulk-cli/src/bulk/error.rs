//! Row-level and batch-level failures

/// Message recorded when neither email nor phone finds a user
pub const USER_NOT_FOUND: &str = "User record does not exist with given email and/or Mobile Number";
/// Message recorded when the user belongs to another organisation
pub const DIFFERENT_ORGANIZATION: &str = "The User belongs to a different MDO Organisation";
/// Message recorded when the profile update behind a request was rejected
pub const UPDATE_FAILED: &str = "Failed to update the user profile";
/// Error detail written for a sheet without data rows
pub const EMPTY_FILE: &str = "The uploaded file is empty";

/// Failure of a single row. Never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// One or more field validations failed
    Validation(Vec<String>),
    /// No identity resolved; carries every error accumulated for the row
    UserNotFound(Vec<String>),
    /// Resolved user belongs to a different organisation
    OrganizationMismatch,
    /// Directory could not be queried or answered garbage
    DirectoryLookup(String),
    /// A pending request was approved but the profile update behind it was rejected
    ReconciliationUpdateFailure,
    /// The newly submitted request came back rejected
    SubmissionRejected,
    /// Workflow store failure while processing the row
    Store(String),
}

impl RowError {
    /// Messages written into the row's error cell
    pub fn messages(&self) -> Vec<String> {
        match self {
            RowError::Validation(errors) | RowError::UserNotFound(errors) => errors.clone(),
            RowError::OrganizationMismatch => vec![DIFFERENT_ORGANIZATION.to_string()],
            RowError::DirectoryLookup(cause) => vec![format!("User lookup failed: {}", cause)],
            RowError::ReconciliationUpdateFailure | RowError::SubmissionRejected => {
                vec![UPDATE_FAILED.to_string()]
            }
            RowError::Store(cause) => vec![format!("Failed to process the record: {}", cause)],
        }
    }
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowError::Validation(errors) => write!(f, "validation failed: {}", errors.join("; ")),
            RowError::UserNotFound(_) => write!(f, "{}", USER_NOT_FOUND),
            RowError::OrganizationMismatch => write!(f, "{}", DIFFERENT_ORGANIZATION),
            RowError::DirectoryLookup(cause) => write!(f, "directory lookup failed: {}", cause),
            RowError::ReconciliationUpdateFailure => {
                write!(f, "profile update for an approved pending request was rejected")
            }
            RowError::SubmissionRejected => write!(f, "submitted workflow request was rejected"),
            RowError::Store(cause) => write!(f, "workflow store error: {}", cause),
        }
    }
}

impl std::error::Error for RowError {}

/// Failure that ends the whole batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// Source file could not be fetched
    FileMissing(String),
    /// Source file exists but has no content
    FileEmpty(String),
    /// Workbook could not be read or written
    Workbook(String),
    /// Annotated result could not be uploaded
    Upload(String),
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchError::FileMissing(cause) => {
                write!(f, "The file is not downloaded/present: {}", cause)
            }
            BatchError::FileEmpty(name) => write!(f, "The file '{}' is empty", name),
            BatchError::Workbook(cause) => write!(f, "Failed to process the workbook: {}", cause),
            BatchError::Upload(cause) => write!(f, "Failed to upload the result file: {}", cause),
        }
    }
}

impl std::error::Error for BatchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_messages() {
        let errors = vec!["Invalid Full Name".to_string(), USER_NOT_FOUND.to_string()];
        assert_eq!(RowError::UserNotFound(errors.clone()).messages(), errors);
        assert_eq!(
            RowError::OrganizationMismatch.messages(),
            vec![DIFFERENT_ORGANIZATION.to_string()]
        );
        assert_eq!(RowError::SubmissionRejected.messages(), vec![UPDATE_FAILED.to_string()]);
        assert_eq!(
            RowError::ReconciliationUpdateFailure.messages(),
            RowError::SubmissionRejected.messages()
        );
        assert!(RowError::DirectoryLookup("timeout".into()).messages()[0].contains("timeout"));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            BatchError::FileEmpty("users.xlsx".into()).to_string(),
            "The file 'users.xlsx' is empty"
        );
        assert!(RowError::Validation(vec!["a".into(), "b".into()]).to_string().contains("a; b"));
    }
}
