use std::path::PathBuf;
use std::sync::Arc;

use crate::config::RemoteConfig;
use crate::document::DocumentParams;

/// Failures below the application protocol: the request never produced a
/// response body worth parsing.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to read {}: {message}", path.display())]
    File { path: PathBuf, message: String },
}

/// The three calls the document-hosting API exposes to us.
///
/// Implementations return the raw response body; interpreting it is the
/// job of [`crate::response`]. Application-level failures arrive as a
/// successful call whose body reports `stat="fail"`.
#[async_trait::async_trait]
pub trait DocumentService: Send + Sync {
    /// Upload the file at `params.file_path`, with the optional name and title.
    async fn upload_document(
        &self,
        config: &RemoteConfig,
        params: &DocumentParams,
    ) -> Result<String, TransportError>;

    /// Fetch the account's document listing.
    async fn list_documents(&self, config: &RemoteConfig) -> Result<String, TransportError>;

    /// Delete a document by its remote name.
    async fn delete_document(
        &self,
        config: &RemoteConfig,
        name: &str,
    ) -> Result<String, TransportError>;
}

#[async_trait::async_trait]
impl<T: DocumentService + ?Sized> DocumentService for Arc<T> {
    async fn upload_document(
        &self,
        config: &RemoteConfig,
        params: &DocumentParams,
    ) -> Result<String, TransportError> {
        (**self).upload_document(config, params).await
    }

    async fn list_documents(&self, config: &RemoteConfig) -> Result<String, TransportError> {
        (**self).list_documents(config).await
    }

    async fn delete_document(
        &self,
        config: &RemoteConfig,
        name: &str,
    ) -> Result<String, TransportError> {
        (**self).delete_document(config, name).await
    }
}
