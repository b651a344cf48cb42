use anyhow::{Context, Result, bail};
use issuu_sync::{
    DocumentService, DocumentSync, LocalDocument, StoredFile, UploadOutcome, UploadResult,
    validate_name,
};

/// A stored attachment to publish.
pub struct UploadRequest {
    pub id: u64,
    pub filename: String,
    pub name: Option<String>,
    pub title: Option<String>,
}

pub async fn run<S: DocumentService>(
    sync: &DocumentSync<S>,
    request: UploadRequest,
    json: bool,
) -> Result<()> {
    let result = upload(sync, request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Uploaded {}", result.name);
        println!("  Document ID: {}", result.document_id);
        println!("  Title:       {}", result.title);
    }

    Ok(())
}

async fn upload<S: DocumentService>(
    sync: &DocumentSync<S>,
    request: UploadRequest,
) -> Result<UploadResult> {
    let UploadRequest {
        id,
        filename,
        name,
        title,
    } = request;

    let mut document = LocalDocument::new(StoredFile::new(id, filename));
    if let Some(name) = name {
        validate_name(&name).with_context(|| format!("invalid document name '{name}'"))?;
        document = document.with_name(name);
    }
    if let Some(title) = title {
        document = document.with_title(title);
    }

    let path = sync.binding().file_path(&document.file);
    if !path.is_file() {
        bail!("stored file not found: {}", path.display());
    }

    match sync.upload_document(&mut document).await? {
        UploadOutcome::Uploaded(result) => Ok(result),
        UploadOutcome::AlreadyUploaded => bail!("record {id} is already uploaded"),
    }
}
