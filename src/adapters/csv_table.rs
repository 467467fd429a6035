use crate::domain::model::{AuditEntry, ParticipantTable, COLUMN_GROUP, COLUMN_NAME};
use crate::utils::error::{FormationError, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct FeedbackRow<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Group")]
    group: usize,
}

/// Reads a participant CSV with a header row. Rows must match the header width.
pub fn read_table(bytes: &[u8]) -> Result<ParticipantTable> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(FormationError::validation("header", "participant file has no header row"));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    tracing::debug!("Read participant table: {} columns, {} rows", headers.len(), rows.len());
    Ok(ParticipantTable::new(headers, rows))
}

/// Writes every column of `table`, header first.
pub fn write_table(table: &ParticipantTable) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    finish(writer)
}

/// `Name,Group` rows in participant order.
pub fn write_feedback(audit: &[AuditEntry]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record([COLUMN_NAME, COLUMN_GROUP])?;
    for entry in audit {
        writer.serialize(FeedbackRow {
            name: &entry.name,
            group: entry.group,
        })?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| FormationError::IoError(e.into_error()))
}
