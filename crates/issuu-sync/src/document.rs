use std::path::PathBuf;

use serde::Serialize;

/// Minimum length of a remote document name.
pub const NAME_MIN_LEN: usize = 3;

/// Maximum length of a remote document name.
pub const NAME_MAX_LEN: usize = 50;

/// Identifiers the service assigned to a freshly uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub document_id: String,
    pub name: String,
    pub title: String,
}

/// One document in an account listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    pub document_id: String,
    pub name: Option<String>,
    pub title: Option<String>,
}

/// Everything the connector needs to upload a record's file.
///
/// `name` and `title` are optional; when omitted the service generates a
/// name and uses the filename as the title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentParams {
    pub file_path: PathBuf,
    pub name: Option<String>,
    pub title: Option<String>,
}

/// The three remote-sync fields carried by a local record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteFields {
    pub document_id: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
}

impl RemoteFields {
    /// Whether the record already has a remote counterpart.
    pub fn is_uploaded(&self) -> bool {
        self.document_id.is_some()
    }
}

impl From<UploadResult> for RemoteFields {
    fn from(result: UploadResult) -> Self {
        Self {
            document_id: Some(result.document_id),
            name: Some(result.name),
            title: Some(result.title),
        }
    }
}

/// Reasons a remote document name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("name must be at least 3 characters, got {0}")]
    TooShort(usize),

    #[error("name must be at most 50 characters, got {0}")]
    TooLong(usize),

    #[error("name contains invalid character {0:?}; use a-z, 0-9, '_', '.' or '-'")]
    InvalidChar(char),
}

/// Check a name against the service's URL slug rules: 3-50 characters of
/// lowercase ASCII letters, digits, `_`, `.` and `-`.
///
/// The service enforces this itself and answers with a field-scoped error,
/// so callers may skip it; it is offered to fail before a round trip.
pub fn validate_name(name: &str) -> Result<(), NameError> {
    if let Some(bad) = name
        .chars()
        .find(|c| !matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-'))
    {
        return Err(NameError::InvalidChar(bad));
    }

    // Only ASCII survives the check above, so byte length is char count.
    match name.len() {
        len if len < NAME_MIN_LEN => Err(NameError::TooShort(len)),
        len if len > NAME_MAX_LEN => Err(NameError::TooLong(len)),
        _ => Ok(()),
    }
}
