//! Audit record display formatting
//!
//! Formats records for terminal output in table and detail views.

use crate::models::AuditRecord;

const ANONYMOUS: &str = "-";

/// Format a list of records as a table
pub fn format_record_list(records: &[AuditRecord]) -> String {
    if records.is_empty() {
        return "No audit records found.".to_string();
    }

    // Calculate column widths
    let collection_width = records
        .iter()
        .map(|r| r.collection.len())
        .max()
        .unwrap_or(10)
        .max(10);

    let doc_width = records
        .iter()
        .map(|r| r.doc_id.len())
        .max()
        .unwrap_or(8)
        .max(8);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<19}  {:<6}  {:<collection_width$}  {:<doc_width$}  {}\n",
        "ID",
        "Created (UTC)",
        "Action",
        "Collection",
        "Document",
        "User",
        collection_width = collection_width,
        doc_width = doc_width,
    ));

    output.push_str(&format!(
        "{:-<12}  {:-<19}  {:-<6}  {:-<collection_width$}  {:-<doc_width$}  {:-<8}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        collection_width = collection_width,
        doc_width = doc_width,
    ));

    for record in records {
        output.push_str(&format!(
            "{:<12}  {:<19}  {:<6}  {:<collection_width$}  {:<doc_width$}  {}\n",
            record.id.to_string(),
            record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.action.to_string(),
            record.collection,
            record.doc_id,
            record.user_id.as_deref().unwrap_or(ANONYMOUS),
            collection_width = collection_width,
            doc_width = doc_width,
        ));
    }

    output.push_str(&format!("\n{} record(s)\n", records.len()));

    output
}

/// Format a single record's details, including every delta entry
pub fn format_record_details(record: &AuditRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Audit Record: {}\n", record.id));
    output.push_str(&format!("  ID:         {}\n", record.id.as_uuid()));
    output.push_str(&format!("  Action:     {}\n", record.action));
    output.push_str(&format!("  Collection: {}\n", record.collection));
    output.push_str(&format!("  Document:   {}\n", record.doc_id));
    output.push_str(&format!(
        "  User:       {}\n",
        record.user_id.as_deref().unwrap_or(ANONYMOUS)
    ));
    output.push_str(&format!(
        "  Created:    {}\n",
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if let Some(delta) = &record.delta {
        output.push('\n');
        if delta.is_empty() {
            output.push_str("  No tracked changes\n");
        } else {
            output.push_str(&format!("  Changes ({}):\n", delta.len()));
            for entry in delta {
                output.push_str(&format!("    [{}] {}\n", entry.kind(), entry.describe()));
            }
        }
    }

    output
}
