/// Shared data structures for the application state
///
/// These structs represent the records persisted in the key-value store.
/// Field names are serialized in camelCase so stored values keep the same
/// shape as the rest of the scanner ecosystem (`folderId`, `createdAt`, ...).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

/// Store key for the recent-files list
pub const RECENT_FILES_KEY: &str = "recent-files";
/// Store key for the folders list
pub const FOLDERS_KEY: &str = "folders";
/// Store key for the share recipients list
pub const EMPLOYEES_KEY: &str = "employees";
/// Store key for the "introduction already shown" marker
pub const VISITED_KEY: &str = "scanner-app-visited";
/// Store key for SuiteDash credentials (written on connect, never read back)
pub const CREDENTIALS_KEY: &str = "suitedash-credentials";

/// Thumbnail used when no real frame could be captured
pub const PLACEHOLDER_THUMBNAIL: &str = "/placeholder.svg";

/// A share recipient (email or name)
pub type Recipient = String;

/// Anything that can be filtered by its display name
pub trait Named {
    fn display_name(&self) -> &str;
}

/// A scanned or imported document in the recent-files list
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Unique id (generation-time millisecond timestamp)
    pub id: String,
    /// Display name, e.g. "Scan_2024-05-01T10-22-13.jpg"
    pub name: String,
    /// File-extension tag ("jpg", "pdf", ...)
    #[serde(rename = "type")]
    pub file_type: String,
    /// Display size string, not computed from the buffer
    pub size: String,
    /// ISO-8601 creation timestamp
    pub date: String,
    /// Reserved; no writer ever sets it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    /// Data URI of the captured frame or the placeholder path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Broad category used to pick the badge shown next to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Image,
    Other,
}

impl FileRecord {
    /// Classify the record by its type tag (case-insensitive)
    pub fn kind(&self) -> FileKind {
        match self.file_type.to_lowercase().as_str() {
            "pdf" => FileKind::Pdf,
            "jpg" | "jpeg" | "png" => FileKind::Image,
            _ => FileKind::Other,
        }
    }

    /// Parse the stored ISO date, if it is well-formed
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }
}

impl Named for FileRecord {
    fn display_name(&self) -> &str {
        &self.name
    }
}

/// A user-created folder
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FolderRecord {
    pub id: String,
    /// Trimmed, never empty
    pub name: String,
    /// Always 0: files are never linked to folders
    pub file_count: u32,
    pub created_at: String,
}

impl Named for FolderRecord {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Named for String {
    fn display_name(&self) -> &str {
        self
    }
}

/// SuiteDash credentials as written on a successful connect
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub api_key: String,
    pub company_url: String,
    pub connected_at: String,
}

static LAST_RECORD_ID: AtomicI64 = AtomicI64::new(0);

/// Generate a unique record id from the given instant.
///
/// Ids are millisecond timestamps; two ids generated within the same
/// millisecond are bumped so they never collide within a process.
pub fn next_record_id(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis();
    let mut last = LAST_RECORD_ID.load(Ordering::Relaxed);
    loop {
        let candidate = millis.max(last + 1);
        match LAST_RECORD_ID.compare_exchange_weak(
            last,
            candidate,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return candidate.to_string(),
            Err(actual) => last = actual,
        }
    }
}

/// ISO-8601 timestamp with millisecond precision ("2024-05-01T10:22:13.511Z")
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_record_uses_camel_case_keys() {
        let record = FileRecord {
            id: "1".into(),
            name: "Scan.jpg".into(),
            file_type: "jpg".into(),
            size: "1.8 MB".into(),
            date: "2024-05-01T10:22:13.511Z".into(),
            folder_id: Some("f1".into()),
            thumbnail: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "jpg");
        assert_eq!(json["folderId"], "f1");
        assert!(json.get("thumbnail").is_none());
    }

    #[test]
    fn test_file_kind() {
        let mut record = FileRecord {
            id: "1".into(),
            name: "a".into(),
            file_type: "PDF".into(),
            size: String::new(),
            date: String::new(),
            folder_id: None,
            thumbnail: None,
        };
        assert_eq!(record.kind(), FileKind::Pdf);
        record.file_type = "jpeg".into();
        assert_eq!(record.kind(), FileKind::Image);
        record.file_type = "docx".into();
        assert_eq!(record.kind(), FileKind::Other);
    }

    #[test]
    fn test_record_ids_are_unique_within_same_millisecond() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let a: i64 = next_record_id(now).parse().unwrap();
        let b: i64 = next_record_id(now).parse().unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_iso_timestamp_format() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 22, 13).unwrap();
        assert_eq!(iso_timestamp(now), "2024-05-01T10:22:13.000Z");
    }
}
