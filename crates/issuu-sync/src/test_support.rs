use std::sync::Mutex;

use crate::{DocumentParams, DocumentService, RemoteConfig, TransportError};

/// A call observed by [`FakeDocumentService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Upload(DocumentParams),
    List,
    Delete(String),
}

/// Canned-response service for testing. Records every call it receives;
/// an operation without a configured body fails with a network error.
#[derive(Default)]
pub struct FakeDocumentService {
    upload: Option<String>,
    list: Option<String>,
    delete: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeDocumentService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upload_response(mut self, body: impl Into<String>) -> Self {
        self.upload = Some(body.into());
        self
    }

    pub fn with_list_response(mut self, body: impl Into<String>) -> Self {
        self.list = Some(body.into());
        self
    }

    pub fn with_delete_response(mut self, body: impl Into<String>) -> Self {
        self.delete = Some(body.into());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn respond(&self, call: RecordedCall, body: &Option<String>) -> Result<String, TransportError> {
        self.calls.lock().unwrap().push(call);
        body.clone()
            .ok_or_else(|| TransportError::Network("connection refused".into()))
    }
}

#[async_trait::async_trait]
impl DocumentService for FakeDocumentService {
    async fn upload_document(
        &self,
        _config: &RemoteConfig,
        params: &DocumentParams,
    ) -> Result<String, TransportError> {
        self.respond(RecordedCall::Upload(params.clone()), &self.upload)
    }

    async fn list_documents(&self, _config: &RemoteConfig) -> Result<String, TransportError> {
        self.respond(RecordedCall::List, &self.list)
    }

    async fn delete_document(
        &self,
        _config: &RemoteConfig,
        name: &str,
    ) -> Result<String, TransportError> {
        self.respond(RecordedCall::Delete(name.to_owned()), &self.delete)
    }
}

/// A valid config pointing at a non-routable endpoint.
pub fn test_config() -> RemoteConfig {
    RemoteConfig::from_pairs([
        ("api_key", "test-key"),
        ("api_secret", "test-secret"),
        ("endpoint", "http://127.0.0.1:9/1_0"),
    ])
    .unwrap()
}
