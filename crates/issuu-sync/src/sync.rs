use std::path::Path;

use crate::config::{ConfigError, RemoteConfig, load_config};
use crate::document::{DocumentParams, ListingEntry, UploadResult};
use crate::record::DocumentRecord;
use crate::response::{
    self, ClassifiedError, MalformedResponseError, Outcome, ResponseStatus,
};
use crate::service::{DocumentService, TransportError};
use crate::storage::FileBinding;

/// The service rejected an upload. Displays as `field:message` when the
/// rejection names a field, otherwise as the bare message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct UploadError(pub ClassifiedError);

impl UploadError {
    pub fn field(&self) -> Option<&str> {
        self.0.field()
    }

    pub fn message(&self) -> &str {
        self.0.message()
    }
}

/// The service did not confirm a delete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("deletion failed")]
pub struct DeleteError;

/// Errors surfaced by the sync operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    MalformedResponse(#[from] MalformedResponseError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Delete(#[from] DeleteError),

    #[error("listing failed: {0}")]
    Listing(ClassifiedError),
}

/// What an upload trigger did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded(UploadResult),
    /// The record already had a remote document id; nothing was sent.
    AlreadyUploaded,
}

/// Entry points a host wires into its record lifecycle.
#[async_trait::async_trait]
pub trait LifecycleHooks<R: DocumentRecord + Send + Sync>: Send + Sync {
    /// Call after the record has been persisted (created or updated).
    async fn on_persisted(&self, record: &mut R) -> Result<UploadOutcome, SyncError>;

    /// Call before the record is destroyed. An error should abort the destroy.
    async fn on_before_destroy(&self, record: &R) -> Result<(), SyncError>;
}

/// Keeps local document records in step with the remote service.
///
/// Every operation performs at most one remote round trip and completes
/// before returning. Nothing is retried.
pub struct DocumentSync<S> {
    service: S,
    config: RemoteConfig,
    binding: FileBinding,
}

impl<S: DocumentService> DocumentSync<S> {
    pub fn new(service: S, config: RemoteConfig, binding: FileBinding) -> Self {
        Self {
            service,
            config,
            binding,
        }
    }

    /// Load the config file at `config_path` and build the orchestrator.
    pub fn load(service: S, config_path: &Path, binding: FileBinding) -> Result<Self, SyncError> {
        let config = load_config(config_path)?;
        Ok(Self::new(service, config, binding))
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    pub fn binding(&self) -> &FileBinding {
        &self.binding
    }

    /// The connector parameters for a record: its resolved file path plus
    /// whatever remote name and title it already carries.
    pub fn document_params<R: DocumentRecord>(&self, record: &R) -> DocumentParams {
        let remote = record.remote();
        DocumentParams {
            file_path: self.binding.file_path(record.stored_file()),
            name: remote.name.clone(),
            title: remote.title.clone(),
        }
    }

    /// Upload the record's file unless it already has a remote document id.
    ///
    /// On success the assigned id, name and title are written onto the
    /// record in a single [`DocumentRecord::apply_upload`] call.
    pub async fn upload_document<R: DocumentRecord>(
        &self,
        record: &mut R,
    ) -> Result<UploadOutcome, SyncError> {
        let remote = record.remote();
        if remote.is_uploaded() {
            tracing::debug!(
                document_id = ?remote.document_id,
                "document already uploaded, skipping"
            );
            return Ok(UploadOutcome::AlreadyUploaded);
        }

        let params = self.document_params(&*record);
        tracing::debug!(
            path = %params.file_path.display(),
            name = ?params.name,
            "uploading document"
        );

        let raw = self.service.upload_document(&self.config, &params).await?;

        match response::parse_upload(&raw)? {
            Outcome::Ok(result) => {
                record.apply_upload(&result);
                tracing::info!(
                    document_id = %result.document_id,
                    name = %result.name,
                    "document uploaded"
                );
                Ok(UploadOutcome::Uploaded(result))
            }
            Outcome::Fail(error) => {
                tracing::warn!(%error, "upload rejected");
                Err(UploadError(error).into())
            }
        }
    }

    /// Delete the record's remote document by its remote name.
    ///
    /// The call is made even if the record was never uploaded; the service
    /// reports that as a failure.
    pub async fn delete_document<R: DocumentRecord>(&self, record: &R) -> Result<(), SyncError> {
        let name = record.remote().name.as_deref().unwrap_or_default();
        self.delete_by_name(name).await
    }

    /// Delete a remote document by name. Any status other than `ok` is a
    /// [`DeleteError`]; the service's error detail is not carried over.
    pub async fn delete_by_name(&self, name: &str) -> Result<(), SyncError> {
        let raw = self.service.delete_document(&self.config, name).await?;

        match response::parse_delete(&raw)? {
            ResponseStatus::Ok => {
                tracing::info!(name, "document deleted");
                Ok(())
            }
            status => {
                tracing::warn!(name, ?status, "delete rejected");
                Err(DeleteError.into())
            }
        }
    }

    /// Every document in the account, in the order the service lists them.
    pub async fn documents_listing(&self) -> Result<Vec<ListingEntry>, SyncError> {
        let raw = self.service.list_documents(&self.config).await?;

        match response::parse_listing(&raw)? {
            Outcome::Ok(entries) => {
                tracing::debug!(count = entries.len(), "listed documents");
                Ok(entries)
            }
            Outcome::Fail(error) => {
                tracing::warn!(%error, "listing rejected");
                Err(SyncError::Listing(error))
            }
        }
    }
}

#[async_trait::async_trait]
impl<S, R> LifecycleHooks<R> for DocumentSync<S>
where
    S: DocumentService,
    R: DocumentRecord + Send + Sync,
{
    async fn on_persisted(&self, record: &mut R) -> Result<UploadOutcome, SyncError> {
        self.upload_document(record).await
    }

    async fn on_before_destroy(&self, record: &R) -> Result<(), SyncError> {
        self.delete_document(record).await
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::record::LocalDocument;
    use crate::storage::StoredFile;
    use crate::test_support::{FakeDocumentService, RecordedCall, test_config};

    use super::*;

    const UPLOAD_OK: &str =
        r#"<rsp stat="ok"><_content><document documentId="42" name="doc" title="Doc"/></_content></rsp>"#;

    fn binding() -> FileBinding {
        FileBinding::bind("AttachmentFu", "/public", "documents").unwrap()
    }

    fn sync_with(service: FakeDocumentService) -> DocumentSync<FakeDocumentService> {
        DocumentSync::new(service, test_config(), binding())
    }

    fn record() -> LocalDocument {
        LocalDocument::new(StoredFile::new(1, "report.pdf"))
    }

    #[tokio::test]
    async fn upload_writes_exactly_the_remote_fields() {
        let sync = sync_with(FakeDocumentService::new().with_upload_response(UPLOAD_OK));
        let mut doc = record();

        let outcome = sync.upload_document(&mut doc).await.unwrap();

        assert!(matches!(outcome, UploadOutcome::Uploaded(_)));
        let mut expected = record();
        expected.remote.document_id = Some("42".into());
        expected.remote.name = Some("doc".into());
        expected.remote.title = Some("Doc".into());
        assert_eq!(doc, expected);
    }

    #[tokio::test]
    async fn upload_sends_resolved_path_and_requested_name() {
        let sync = sync_with(FakeDocumentService::new().with_upload_response(UPLOAD_OK));
        let mut doc = record().with_name("doc").with_title("Doc");

        sync.upload_document(&mut doc).await.unwrap();

        assert_eq!(
            sync.service.calls(),
            vec![RecordedCall::Upload(DocumentParams {
                file_path: PathBuf::from("/public/documents/0000/0001/report.pdf"),
                name: Some("doc".into()),
                title: Some("Doc".into()),
            })]
        );
    }

    #[tokio::test]
    async fn already_uploaded_record_makes_no_remote_call() {
        let sync = sync_with(FakeDocumentService::new().with_upload_response(UPLOAD_OK));
        let mut doc = record();
        doc.remote.document_id = Some("7".into());
        let before = doc.clone();

        let outcome = sync.upload_document(&mut doc).await.unwrap();

        assert_eq!(outcome, UploadOutcome::AlreadyUploaded);
        assert_eq!(sync.service.call_count(), 0);
        assert_eq!(doc, before);
    }

    #[tokio::test]
    async fn second_persist_does_not_reupload() {
        let sync = sync_with(FakeDocumentService::new().with_upload_response(UPLOAD_OK));
        let mut doc = record();

        sync.on_persisted(&mut doc).await.unwrap();
        let second = sync.on_persisted(&mut doc).await.unwrap();

        assert_eq!(second, UploadOutcome::AlreadyUploaded);
        assert_eq!(sync.service.call_count(), 1);
    }

    #[tokio::test]
    async fn autogenerated_name_and_title_are_written_back() {
        let body = r#"<rsp stat="ok"><document documentId="900" name="090101120000-abc" title="report"/></rsp>"#;
        let sync = sync_with(FakeDocumentService::new().with_upload_response(body));
        let mut doc = record();
        assert!(doc.remote.name.is_none() && doc.remote.title.is_none());

        sync.upload_document(&mut doc).await.unwrap();

        assert_eq!(doc.remote.name.as_deref(), Some("090101120000-abc"));
        assert_eq!(doc.remote.title.as_deref(), Some("report"));
    }

    #[tokio::test]
    async fn field_scoped_rejection_formats_field_and_message() {
        let body = r#"<rsp stat="fail"><error code="200" field="name" message="taken"/></rsp>"#;
        let sync = sync_with(FakeDocumentService::new().with_upload_response(body));
        let mut doc = record().with_name("doc");

        let err = sync.upload_document(&mut doc).await.unwrap_err();

        let SyncError::Upload(upload) = &err else {
            panic!("expected upload error, got {err:?}");
        };
        assert_eq!(upload.to_string(), "name:taken");
        assert_eq!(upload.field(), Some("name"));
        assert_eq!(err.to_string(), "name:taken");
        assert!(doc.remote.document_id.is_none());
    }

    #[tokio::test]
    async fn generic_rejection_uses_bare_message() {
        let body = r#"<rsp stat="fail"><error code="010" message="Invalid API key"/></rsp>"#;
        let sync = sync_with(FakeDocumentService::new().with_upload_response(body));

        let err = sync.upload_document(&mut record()).await.unwrap_err();

        assert!(matches!(&err, SyncError::Upload(e) if e.message() == "Invalid API key"));
        assert_eq!(err.to_string(), "Invalid API key");
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let sync = sync_with(FakeDocumentService::new());
        let err = sync.upload_document(&mut record()).await.unwrap_err();
        assert!(matches!(err, SyncError::Transport(_)));
    }

    #[tokio::test]
    async fn malformed_upload_response_propagates() {
        let sync = sync_with(FakeDocumentService::new().with_upload_response("<html/>"));
        let err = sync.upload_document(&mut record()).await.unwrap_err();
        assert!(matches!(err, SyncError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn delete_uses_remote_name() {
        let sync =
            sync_with(FakeDocumentService::new().with_delete_response(r#"<rsp stat="ok"/>"#));
        let doc = record().with_name("doc");

        sync.on_before_destroy(&doc).await.unwrap();

        assert_eq!(sync.service.calls(), vec![RecordedCall::Delete("doc".into())]);
    }

    #[tokio::test]
    async fn delete_failure_hides_remote_detail() {
        let body = r#"<rsp stat="fail"><error code="300" field="names" message="Document not found"/></rsp>"#;
        let sync = sync_with(FakeDocumentService::new().with_delete_response(body));

        let err = sync.delete_document(&record().with_name("doc")).await.unwrap_err();

        assert!(matches!(err, SyncError::Delete(DeleteError)));
        assert_eq!(err.to_string(), "deletion failed");
    }

    #[tokio::test]
    async fn delete_of_never_uploaded_record_still_calls_remote() {
        let sync =
            sync_with(FakeDocumentService::new().with_delete_response(r#"<rsp stat="fail"/>"#));

        let err = sync.delete_document(&record()).await.unwrap_err();

        assert!(matches!(err, SyncError::Delete(_)));
        assert_eq!(sync.service.calls(), vec![RecordedCall::Delete(String::new())]);
    }

    #[tokio::test]
    async fn listing_returns_entries_in_order() {
        let body = r#"<rsp stat="ok"><result totalCount="3">
            <document documentId="a" name="one" title="One"/>
            <document documentId="b" name="two" title="Two"/>
            <document documentId="c" name="three" title="Three"/>
        </result></rsp>"#;
        let sync = sync_with(FakeDocumentService::new().with_list_response(body));

        let entries = sync.documents_listing().await.unwrap();

        let names: Vec<_> = entries.iter().filter_map(|e| e.name.as_deref()).collect();
        assert_eq!(names, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn empty_listing_is_empty_vec() {
        let sync = sync_with(
            FakeDocumentService::new().with_list_response(r#"<rsp stat="ok"><result/></rsp>"#),
        );
        assert!(sync.documents_listing().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_listing_is_classified() {
        let body = r#"<rsp stat="fail"><error code="009" message="Authentication required"/></rsp>"#;
        let sync = sync_with(FakeDocumentService::new().with_list_response(body));

        let err = sync.documents_listing().await.unwrap_err();

        match err {
            SyncError::Listing(ClassifiedError::Generic { message }) => {
                assert_eq!(message, "Authentication required");
            }
            other => panic!("expected listing failure, got {other:?}"),
        }
    }

    #[test]
    fn load_reports_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let result = DocumentSync::load(
            FakeDocumentService::new(),
            &dir.path().join("issuu.yml"),
            binding(),
        );
        assert!(matches!(result, Err(SyncError::Config(ConfigError::NotFound(_)))));
    }

    #[test]
    fn load_exposes_parsed_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issuu.yml");
        std::fs::write(
            &path,
            "api_key: key\napi_secret: secret\nendpoint: https://api.issuu.com/1_0\n",
        )
        .unwrap();

        let sync = DocumentSync::load(FakeDocumentService::new(), &path, binding()).unwrap();

        assert_eq!(sync.config().api_key(), "key");
        assert_eq!(sync.config().upload_endpoint(), "https://api.issuu.com/1_0");
    }
}
