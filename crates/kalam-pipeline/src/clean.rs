// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-source cleaning stages: raw CSV export -> normalized JSON.
//!
//! One stage per source (contacts, conversations, messages). Each
//! stage is independent: a missing source file is reported as
//! [`KalamError::SourceNotFound`] and the caller moves on to the next
//! stage.

use std::path::Path;

use tracing::{debug, info};

use kalam_core::corpus::write_json;
use kalam_core::{KalamError, MessagePayload};

use crate::normalize::{normalize, normalize_row, NormalizedRecord, TableSchema};

/// Contact export layout (27 columns).
pub const CONTACT_SCHEMA: TableSchema = TableSchema {
    columns: &[
        "ContactID",
        "FirstName",
        "LastName",
        "PhoneNumber",
        "Email",
        "Country",
        "Language",
        "Tags",
        "Status",
        "Lifecycle",
        "Assignee",
        "LastInteractionTime",
        "DateTimeCreated",
        "Channels",
        "Lead Source",
        "State",
        "Moyenne Bac",
        "Last Degree",
        "Graduation Year",
        "Current Degree",
        "Degree Sought",
        "Degree Choice",
        "Scholarship",
        "University",
        "Qualifying URL",
        "Eligible",
        "Qualifying Score",
    ],
    date_fields: &["LastInteractionTime", "DateTimeCreated"],
};

/// Conversation export layout (14 columns).
pub const CONVERSATION_SCHEMA: TableSchema = TableSchema {
    columns: &[
        "conversation_id",
        "start_time",
        "end_time",
        "contact_id",
        "assignee_id",
        "incoming_messages",
        "outgoing_messages",
        "last_reply_time",
        "status",
        "summary",
        "last_assignee_id",
        "first_reply_time",
        "total_handling_time",
        "recipient_id",
    ],
    date_fields: &["start_time", "end_time", "last_reply_time", "first_reply_time"],
};

/// Message export layout (9 columns).
pub const MESSAGE_SCHEMA: TableSchema = TableSchema {
    columns: &[
        "timestamp",
        "conversation_id",
        "sender_type",
        "sender_id",
        "message_id",
        "message_type",
        "direction",
        "payload",
        "recipient_id",
    ],
    date_fields: &["timestamp"],
};

/// Read a headerless, possibly-ragged CSV export into positional rows.
fn read_raw_csv(path: &Path) -> Result<Vec<Vec<String>>, KalamError> {
    let file = std::fs::File::open(path).map_err(|e| KalamError::from_io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut rows = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => rows.push(record.iter().map(|f| f.to_string()).collect()),
            // Bad lines are skipped, matching the export's known rough edges.
            Err(e) => debug!(path = %path.display(), error = %e, "skipping unreadable csv row"),
        }
    }
    Ok(rows)
}

/// Clean the contacts export into `contacts_clean.json`.
pub fn clean_contacts(input: &Path, output: &Path) -> Result<usize, KalamError> {
    let rows = read_raw_csv(input)?;
    let records = normalize(&rows, &CONTACT_SCHEMA);
    write_json(output, &records)?;
    info!(count = records.len(), output = %output.display(), "contacts cleaned");
    Ok(records.len())
}

/// Clean the conversations export into `conversations_clean.json`.
pub fn clean_conversations(input: &Path, output: &Path) -> Result<usize, KalamError> {
    let rows = read_raw_csv(input)?;
    let records = normalize(&rows, &CONVERSATION_SCHEMA);
    write_json(output, &records)?;
    info!(count = records.len(), output = %output.display(), "conversations cleaned");
    Ok(records.len())
}

/// Clean the messages export into `messages_clean.json`.
///
/// Two extra rules beyond plain normalization:
/// - rows without a message identifier are dropped before anything
///   else runs;
/// - every surviving row gains a `text` field holding the rendered
///   [`MessagePayload`].
pub fn clean_messages(input: &Path, output: &Path) -> Result<usize, KalamError> {
    let rows = read_raw_csv(input)?;
    let records = normalize_messages(&rows);
    write_json(output, &records)?;
    info!(count = records.len(), output = %output.display(), "messages cleaned");
    Ok(records.len())
}

/// Message normalization, exposed separately for tests.
pub fn normalize_messages(rows: &[Vec<String>]) -> Vec<NormalizedRecord> {
    let id_index = MESSAGE_SCHEMA
        .column_index("message_id")
        .unwrap_or_default();
    let payload_index = MESSAGE_SCHEMA.column_index("payload").unwrap_or_default();

    rows.iter()
        .filter(|row| {
            row.get(id_index)
                .map(|id| !id.trim().is_empty())
                .unwrap_or(false)
        })
        .map(|row| {
            let mut record = normalize_row(row, &MESSAGE_SCHEMA);
            let payload = row
                .get(payload_index)
                .map(String::as_str)
                .unwrap_or_default();
            record.insert("text".to_string(), MessagePayload::parse(payload).render());
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_row(
        timestamp: &str,
        sender_id: &str,
        message_id: &str,
        message_type: &str,
        payload: &str,
    ) -> Vec<String> {
        vec![
            timestamp.to_string(),
            "conv-1".to_string(),
            "contact".to_string(),
            sender_id.to_string(),
            message_id.to_string(),
            message_type.to_string(),
            "incoming".to_string(),
            payload.to_string(),
            "r-1".to_string(),
        ]
    }

    #[test]
    fn rows_without_message_id_are_dropped_exactly() {
        let rows = vec![
            message_row("2024-03-01 09:30:00", "C1", "m1", "text", r#"{"type":"text","text":"hi"}"#),
            message_row("2024-03-01 09:31:00", "C1", "", "text", r#"{"type":"text","text":"lost"}"#),
            message_row("2024-03-01 09:32:00", "C1", "  ", "text", r#"{"type":"text","text":"lost"}"#),
            message_row("2024-03-01 09:33:00", "C2", "m2", "text", r#"{"type":"text","text":"yo"}"#),
        ];
        let records = normalize_messages(&rows);
        // Cardinality decreases by exactly the number of id-less rows.
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| !r["message_id"].is_empty()));
    }

    #[test]
    fn surviving_rows_carry_rendered_payload_text() {
        let rows = vec![message_row(
            "2024-03-01 09:30:00",
            "C1",
            "m1",
            "attachment",
            r#"{""type"":""attachment"",""attachment"":{""fileName"":""cv.pdf""}}"#,
        )];
        let records = normalize_messages(&rows);
        assert_eq!(records[0]["text"], "[Pièce jointe] cv.pdf");
    }

    #[test]
    fn malformed_payload_renders_placeholder() {
        let rows = vec![message_row("", "C1", "m1", "text", "{broken")];
        let records = normalize_messages(&rows);
        assert_eq!(records[0]["text"], "[Erreur parsing]");
        assert_eq!(records[0]["timestamp"], "");
    }

    #[test]
    fn short_rows_are_padded_not_rejected() {
        // A truncated row that still has a message id.
        let rows = vec![vec![
            "2024-03-01 09:30:00".to_string(),
            "conv-1".to_string(),
            "contact".to_string(),
            "C1".to_string(),
            "m1".to_string(),
        ]];
        let records = normalize_messages(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["payload"], "");
        assert_eq!(records[0]["text"], "[Vide]");
    }

    #[test]
    fn clean_messages_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("messages-csv.csv");
        let output = dir.path().join("messages_clean.json");
        std::fs::write(
            &input,
            concat!(
                "timestamp,conversation_id,sender_type,sender_id,message_id,message_type,direction,payload,recipient_id\n",
                "2024-03-01 09:30:00,conv-1,contact,C1,m1,text,incoming,\"{\"\"type\"\":\"\"text\"\",\"\"text\"\":\"\"salut\"\"}\",r1\n",
                "2024-03-01 09:31:00,conv-1,user,U1,,text,outgoing,\"{\"\"type\"\":\"\"text\"\",\"\"text\"\":\"\"dropped\"\"}\",r1\n",
            ),
        )
        .unwrap();

        let count = clean_messages(&input, &output).unwrap();
        // Header row survives (it has a value in the message_id slot);
        // the id-less data row does not.
        assert_eq!(count, 2);

        let records: Vec<NormalizedRecord> =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(records[1]["text"], "salut");
        assert_eq!(records[1]["sender_id"], "C1");
    }

    #[test]
    fn missing_source_is_reported_not_panicked() {
        let dir = tempfile::tempdir().unwrap();
        let err = clean_contacts(
            &dir.path().join("absent.csv"),
            &dir.path().join("out.json"),
        )
        .unwrap_err();
        assert!(matches!(err, KalamError::SourceNotFound { .. }));
    }

    #[test]
    fn clean_contacts_coerces_dates() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("contacts.csv");
        let output = dir.path().join("contacts_clean.json");
        // 27 columns, dates at indices 11 and 12; second row has a bad date.
        let mut good: Vec<String> = vec![String::new(); 27];
        good[0] = "C1".into();
        good[11] = "2024-03-01 09:30:00".into();
        good[12] = "not a date".into();
        std::fs::write(&input, good.join(",")).unwrap();

        clean_contacts(&input, &output).unwrap();
        let records: Vec<NormalizedRecord> =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(records[0]["LastInteractionTime"], "2024-03-01 09:30:00");
        assert_eq!(records[0]["DateTimeCreated"], "");
    }
}
