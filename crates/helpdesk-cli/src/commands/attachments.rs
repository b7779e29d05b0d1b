//! Attachments commands
//!
//! Files stay where they are; the helpdesk records their metadata and path.

use anyhow::Context;
use colored::Colorize;
use std::path::Path;

use super::Session;
use crate::AttachmentCommands;
use helpdesk_core::{AttachmentUseCases, NewAttachment};

pub async fn handle(action: AttachmentCommands, session: &Session) -> anyhow::Result<()> {
    let attachments = &session.helpdesk.attachments;
    let actor = session.actor().await?;

    match action {
        AttachmentCommands::Add { ticket, file, mime } => {
            let attachment = attachments.attach(&ticket, describe(&file, mime)?, &actor).await?;
            session.format.print(&attachment)?;
        }
        AttachmentCommands::Get { id } => {
            session.format.print(&attachments.download(&id, &actor).await?)?;
        }
        AttachmentCommands::List { ticket } => {
            session.format.print_all(&attachments.list_attachments(&ticket, &actor).await?)?;
        }
        AttachmentCommands::Remove { id } => {
            attachments.remove_attachment(&id, &actor).await?;
            eprintln!("{} attachment {}", "Removed".green().bold(), id);
        }
    }
    Ok(())
}

fn describe(file: &Path, mime: Option<String>) -> anyhow::Result<NewAttachment> {
    let path = file
        .canonicalize()
        .with_context(|| format!("reading {}", file.display()))?;
    let metadata = std::fs::metadata(&path).with_context(|| format!("reading {}", path.display()))?;
    anyhow::ensure!(metadata.is_file(), "{} is not a regular file", path.display());

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(NewAttachment {
        file_name: name.clone(),
        mime_type: mime.unwrap_or_else(|| mime_guess::from_path(&path).first_or_octet_stream().to_string()),
        original_file_name: name,
        size_bytes: metadata.len(),
        storage_path: path.to_string_lossy().into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_reads_size_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.txt");
        std::fs::write(&path, b"0123456789").unwrap();

        let file = describe(&path, None).unwrap();
        assert_eq!(file.original_file_name, "trace.txt");
        assert_eq!(file.size_bytes, 10);
        assert_eq!(file.mime_type, "text/plain");
        assert!(describe(dir.path(), None).is_err());
    }

    #[test]
    fn test_describe_guesses_mime_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let docx = dir.path().join("Quote.DOCX");
        let blob = dir.path().join("dump.unknownext");
        std::fs::write(&docx, b"pk").unwrap();
        std::fs::write(&blob, b"??").unwrap();

        assert_eq!(
            describe(&docx, None).unwrap().mime_type,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(describe(&blob, None).unwrap().mime_type, "application/octet-stream");
        assert_eq!(describe(&blob, Some("text/x-dump".into())).unwrap().mime_type, "text/x-dump");
    }
}
