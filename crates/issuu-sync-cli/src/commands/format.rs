use issuu_sync::ListingEntry;

const MAX_NAME_WIDTH: usize = 35;
const LINE_BUDGET: usize = 100;

pub fn print_listing_table(entries: &[ListingEntry]) {
    if entries.is_empty() {
        println!("No documents");
        return;
    }

    for line in listing_lines(entries) {
        println!("{line}");
    }

    println!("\n{} documents", entries.len());
}

fn listing_lines(entries: &[ListingEntry]) -> Vec<String> {
    let name_width = entries
        .iter()
        .map(|e| display_name(e).chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_NAME_WIDTH);

    let id_width = entries
        .iter()
        .map(|e| e.document_id.chars().count())
        .max()
        .unwrap_or(0);

    let title_budget = LINE_BUDGET.saturating_sub(name_width + 2 + id_width + 2);

    entries
        .iter()
        .map(|entry| {
            let name = truncate(display_name(entry), name_width);
            let title = truncate(entry.title.as_deref().unwrap_or(""), title_budget);
            format!(
                "{:<name_width$}  {:<id_width$}  {}",
                name, entry.document_id, title
            )
            .trim_end()
            .to_owned()
        })
        .collect()
}

fn display_name(entry: &ListingEntry) -> &str {
    entry.name.as_deref().unwrap_or("-")
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}
