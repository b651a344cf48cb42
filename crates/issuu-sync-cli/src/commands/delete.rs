use anyhow::{Context, Result};
use issuu_sync::{DocumentService, DocumentSync};

pub async fn run<S: DocumentService>(sync: &DocumentSync<S>, name: &str) -> Result<()> {
    sync.delete_by_name(name)
        .await
        .with_context(|| format!("could not delete '{name}'"))?;

    println!("Deleted {name}");
    Ok(())
}
