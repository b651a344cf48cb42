use std::collections::BTreeMap;
use std::fmt;

use issuu_sync::{
    DocumentParams, DocumentService, RemoteConfig, TransportError, is_service_response,
};
use reqwest::multipart::{Form, Part};

use crate::signature::SignedParams;

/// The API actions this client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Upload,
    List,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "issuu.document.upload",
            Self::List => "issuu.documents.list",
            Self::Delete => "issuu.document.delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP client for the Issuu document API.
///
/// Stateless apart from the connection pool: credentials, endpoints and
/// the request timeout come from the [`RemoteConfig`] passed to each call.
#[derive(Debug, Clone, Default)]
pub struct IssuuClient {
    client: reqwest::Client,
}

impl IssuuClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured reqwest client (proxies, TLS roots, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Signed parameters for `action`: the action itself, the API key, the
    /// response format and any operation-specific `extra` parameters.
    pub fn signed_params(
        config: &RemoteConfig,
        action: Action,
        extra: &[(&str, &str)],
    ) -> SignedParams {
        let mut params = BTreeMap::new();
        params.insert("action".to_owned(), action.as_str().to_owned());
        params.insert("apiKey".to_owned(), config.api_key().to_owned());
        params.insert("format".to_owned(), "xml".to_owned());
        for (name, value) in extra {
            params.insert((*name).to_owned(), (*value).to_owned());
        }
        SignedParams::new(config.api_secret(), params)
    }

    async fn read_body(
        action: Action,
        result: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<String, TransportError> {
        let response =
            result.map_err(|e| TransportError::Network(format!("{action} request failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            TransportError::Network(format!("failed to read {action} response: {e}"))
        })?;

        if !status.is_success() && !is_service_response(&body) {
            tracing::warn!(%action, status = status.as_u16(), "unexpected HTTP status");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // An `<rsp>` body under an error status is still the service's answer.
        Ok(body)
    }
}

#[async_trait::async_trait]
impl DocumentService for IssuuClient {
    async fn upload_document(
        &self,
        config: &RemoteConfig,
        params: &DocumentParams,
    ) -> Result<String, TransportError> {
        let path = &params.file_path;
        let file_error = |e: std::io::Error| TransportError::File {
            path: path.clone(),
            message: e.to_string(),
        };
        let file = tokio::fs::File::open(path).await.map_err(file_error)?;
        let length = file.metadata().await.map_err(file_error)?.len();

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_owned());

        let mut extra = Vec::new();
        if let Some(name) = &params.name {
            extra.push(("name", name.as_str()));
        }
        if let Some(title) = &params.title {
            extra.push(("title", title.as_str()));
        }

        let mut form = Form::new();
        for (name, value) in Self::signed_params(config, Action::Upload, &extra) {
            form = form.text(name, value);
        }
        form = form.part(
            "file",
            Part::stream_with_length(file, length).file_name(filename),
        );

        tracing::debug!(
            endpoint = config.upload_endpoint(),
            path = %path.display(),
            "sending {}",
            Action::Upload
        );

        let result = self
            .client
            .post(config.upload_endpoint())
            .timeout(config.timeout())
            .multipart(form)
            .send()
            .await;

        Self::read_body(Action::Upload, result).await
    }

    async fn list_documents(&self, config: &RemoteConfig) -> Result<String, TransportError> {
        let params = Self::signed_params(config, Action::List, &[]);

        tracing::debug!(endpoint = config.endpoint(), "sending {}", Action::List);

        let result = self
            .client
            .get(config.endpoint())
            .timeout(config.timeout())
            .query(params.as_map())
            .send()
            .await;

        Self::read_body(Action::List, result).await
    }

    async fn delete_document(
        &self,
        config: &RemoteConfig,
        name: &str,
    ) -> Result<String, TransportError> {
        let params = Self::signed_params(config, Action::Delete, &[("names", name)]);

        tracing::debug!(endpoint = config.endpoint(), name, "sending {}", Action::Delete);

        let result = self
            .client
            .post(config.endpoint())
            .timeout(config.timeout())
            .form(params.as_map())
            .send()
            .await;

        Self::read_body(Action::Delete, result).await
    }
}
