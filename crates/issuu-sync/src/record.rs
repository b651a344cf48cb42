use crate::document::{RemoteFields, UploadResult};
use crate::storage::StoredFile;

/// A host-owned record that mirrors a remote document.
///
/// The sync core only reads the stored file and the remote fields, and
/// writes the remote fields back after a successful upload. Persisting
/// the change is up to the host.
pub trait DocumentRecord {
    fn stored_file(&self) -> &StoredFile;

    fn remote(&self) -> &RemoteFields;

    /// Record the identifiers assigned by the service, all three at once.
    fn apply_upload(&mut self, result: &UploadResult);
}

/// A plain in-memory document record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDocument {
    pub file: StoredFile,
    pub remote: RemoteFields,
}

impl LocalDocument {
    pub fn new(file: StoredFile) -> Self {
        Self {
            file,
            remote: RemoteFields::default(),
        }
    }

    /// Request a specific remote name. See [`crate::validate_name`] for the rules.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.remote.name = Some(name.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.remote.title = Some(title.into());
        self
    }
}

impl DocumentRecord for LocalDocument {
    fn stored_file(&self) -> &StoredFile {
        &self.file
    }

    fn remote(&self) -> &RemoteFields {
        &self.remote
    }

    fn apply_upload(&mut self, result: &UploadResult) {
        self.remote = RemoteFields::from(result.clone());
    }
}
