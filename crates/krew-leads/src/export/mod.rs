//! CSV export of captured leads, the admin panel's download button.

use std::sync::Arc;

use serde_json::Value;

use crate::funnel::Lead;
use crate::storage::{Collection, StorageBackend, StorageError, LEADS};

pub const EXPORT_FILE_NAME: &str = "neighborhood-krew-leads.csv";
pub const EXPORT_CONTENT_TYPE: &str = "text/csv";

/// Result of an export request. An empty collection is a benign,
/// operator-notified condition rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Document(CsvDocument),
    NoLeads,
}

/// A named, downloadable CSV artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvDocument {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub content: String,
}

/// Error raised while rendering the document.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("lead serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("csv rendering failed: {0}")]
    Render(#[from] csv::Error),
    #[error("csv buffer error: {0}")]
    Buffer(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Serializes the lead collection into a downloadable CSV document.
pub struct LeadExporter {
    leads: Collection<Lead>,
}

impl LeadExporter {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            leads: Collection::new(backend, LEADS),
        }
    }

    pub fn export(&self) -> Result<ExportOutcome, ExportError> {
        let leads = self.leads.load();
        if leads.is_empty() {
            return Ok(ExportOutcome::NoLeads);
        }

        let rows = leads
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ExportOutcome::Document(CsvDocument {
            file_name: EXPORT_FILE_NAME,
            content_type: EXPORT_CONTENT_TYPE,
            content: render_csv(&rows)?,
        }))
    }
}

/// Header row is the union of field names across all records, ordered by
/// first appearance over the records in insertion sequence.
fn header_union(rows: &[Value]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        if let Value::Object(fields) = row {
            for key in fields.keys() {
                if !headers.iter().any(|header| header == key) {
                    headers.push(key.clone());
                }
            }
        }
    }
    headers
}

/// Render rows under the union header. Cells go through the csv writer's
/// quoting so any value (separators, quotes, newlines) round-trips; rows
/// are joined with a bare `\n` and the document carries no trailing
/// terminator.
fn render_csv(rows: &[Value]) -> Result<String, ExportError> {
    let headers = header_union(rows);

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&headers)?;

    for row in rows {
        let record: Vec<String> = headers
            .iter()
            .map(|header| cell_text(row.get(header)))
            .collect();
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Buffer(err.to_string()))?;
    let mut content =
        String::from_utf8(bytes).map_err(|err| ExportError::Buffer(err.to_string()))?;
    if content.ends_with('\n') {
        content.pop();
    }
    Ok(content)
}

/// Absent and null render empty; scalars render bare; nested structures
/// render as their compact JSON text.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(nested) => nested.to_string(),
    }
}
