use anyhow::Result;
use issuu_sync::{DocumentService, DocumentSync};

use super::format;

pub async fn run<S: DocumentService>(sync: &DocumentSync<S>, json: bool) -> Result<()> {
    let entries = sync.documents_listing().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        format::print_listing_table(&entries);
    }

    Ok(())
}
