//! Attachment metadata. File contents live with an external file store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{AttachmentId, TicketId, UserId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub ticket_id: TicketId,
    pub uploaded_by: UserId,
    /// Name under which the file store keeps the blob.
    pub file_name: String,
    /// Name the uploader's file had.
    pub original_file_name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    pub fn formatted_size(&self) -> String {
        const UNITS: [&str; 6] = ["KB", "MB", "GB", "TB", "PB", "EB"];

        let bytes = self.size_bytes;
        if bytes < 1024 {
            return format!("{} B", bytes);
        }

        let mut value = bytes as f64;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() {
            value /= 1024.0;
            unit += 1;
        }
        format!("{:.1} {}", value, UNITS[unit - 1])
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn is_document(&self) -> bool {
        const DOCUMENT_PREFIXES: [&str; 4] = [
            "application/pdf",
            "application/msword",
            "application/vnd.openxmlformats-officedocument",
            "text/",
        ];
        DOCUMENT_PREFIXES.iter().any(|p| self.mime_type.starts_with(p))
    }

    /// Lower-cased extension of the original file name, empty if none.
    pub fn extension(&self) -> String {
        match self.original_file_name.rfind('.') {
            Some(dot) if dot > 0 => self.original_file_name[dot + 1..].to_lowercase(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(name: &str, size: u64, mime: &str) -> Attachment {
        Attachment {
            id: AttachmentId::new(),
            ticket_id: TicketId::new(),
            uploaded_by: UserId::new(),
            file_name: "blob-1".into(),
            original_file_name: name.into(),
            size_bytes: size,
            mime_type: mime.into(),
            storage_path: "/var/helpdesk/blob-1".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_formatted_size() {
        assert_eq!(attachment("a", 512, "text/plain").formatted_size(), "512 B");
        assert_eq!(attachment("a", 1024, "text/plain").formatted_size(), "1.0 KB");
        assert_eq!(attachment("a", 1536, "text/plain").formatted_size(), "1.5 KB");
        assert_eq!(attachment("a", 5 * 1024 * 1024, "text/plain").formatted_size(), "5.0 MB");
    }

    #[test]
    fn test_kind_detection() {
        assert!(attachment("shot.PNG", 1, "image/png").is_image());
        assert!(attachment("manual.pdf", 1, "application/pdf").is_document());
        assert!(!attachment("a.zip", 1, "application/zip").is_document());
    }

    #[test]
    fn test_extension() {
        assert_eq!(attachment("Report.Final.PDF", 1, "application/pdf").extension(), "pdf");
        assert_eq!(attachment(".bashrc", 1, "text/plain").extension(), "");
        assert_eq!(attachment("README", 1, "text/plain").extension(), "");
    }
}
