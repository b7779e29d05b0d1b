//! Attachment application service
//!
//! Only metadata passes through here; the caller owns the file bytes.

use async_trait::async_trait;
use std::sync::Arc;

use super::{audit_entry, authorize, load_ticket, required_text};
use crate::application::dto::NewAttachment;
use crate::config::ContentLimits;
use crate::domain::authorization::{self as authz, Capability};
use crate::domain::{Attachment, AttachmentId, TicketEvent, TicketId, User};
use crate::error::{HelpdeskError, HelpdeskResult};
use crate::ports::inbound::AttachmentUseCases;
use crate::ports::outbound::{Clock, Storage, UnitOfWork};

const FILE_NAME_MAX_LEN: usize = 255;
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

pub struct AttachmentService {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    limits: ContentLimits,
}

impl AttachmentService {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, limits: ContentLimits) -> Self {
        Self { storage, clock, limits }
    }

    async fn load_attachment(&self, id: &AttachmentId) -> HelpdeskResult<Attachment> {
        self.storage
            .find_attachment(id)
            .await?
            .ok_or_else(|| HelpdeskError::not_found("attachment", id))
    }

    fn check_size(&self, size_bytes: u64) -> HelpdeskResult<()> {
        if size_bytes == 0 {
            return Err(HelpdeskError::validation("attachment is empty"));
        }
        if size_bytes > self.limits.attachment_max_bytes {
            return Err(HelpdeskError::validation(format!(
                "attachment exceeds the {} byte limit",
                self.limits.attachment_max_bytes
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AttachmentUseCases for AttachmentService {
    async fn attach(&self, ticket_id: &TicketId, file: NewAttachment, actor: &User) -> HelpdeskResult<Attachment> {
        let ticket = load_ticket(&*self.storage, ticket_id).await?;
        authorize(Capability::ViewTicket, authz::can_view(actor, &ticket), actor)?;
        self.check_size(file.size_bytes)?;
        let file_name = required_text("file name", &file.file_name, FILE_NAME_MAX_LEN)?;
        let original_file_name = required_text("original file name", &file.original_file_name, FILE_NAME_MAX_LEN)?;
        let storage_path = required_text("storage path", &file.storage_path, usize::MAX)?;
        let mime_type = match file.mime_type.trim() {
            "" => DEFAULT_MIME_TYPE.to_string(),
            mime => mime.to_lowercase(),
        };

        let now = self.clock.now();
        let attachment = Attachment {
            id: AttachmentId::new(),
            ticket_id: *ticket_id,
            uploaded_by: actor.id,
            file_name,
            original_file_name,
            size_bytes: file.size_bytes,
            mime_type,
            storage_path,
            created_at: now,
        };
        let event = TicketEvent::AttachmentAdded {
            attachment_id: attachment.id,
            file_name: attachment.original_file_name.clone(),
        };
        let entry = audit_entry(&*self.storage, &ticket, actor, &event, now).await?;
        self.storage
            .commit(
                UnitOfWork::new()
                    .save_attachment(attachment.clone())
                    .touch_ticket(*ticket_id, now)
                    .save_comment(entry),
            )
            .await?;

        tracing::info!(
            ticket_id = %ticket_id,
            attachment_id = %attachment.id,
            size = %attachment.formatted_size(),
            actor = %actor.id,
            "Attachment added"
        );
        Ok(attachment)
    }

    async fn download(&self, id: &AttachmentId, actor: &User) -> HelpdeskResult<Attachment> {
        let attachment = self.load_attachment(id).await?;
        let ticket = load_ticket(&*self.storage, &attachment.ticket_id).await?;
        authorize(
            Capability::DownloadAttachment,
            authz::can_download(actor, &attachment, &ticket),
            actor,
        )?;
        Ok(attachment)
    }

    async fn list_attachments(&self, ticket_id: &TicketId, actor: &User) -> HelpdeskResult<Vec<Attachment>> {
        let ticket = load_ticket(&*self.storage, ticket_id).await?;
        authorize(Capability::ViewTicket, authz::can_view(actor, &ticket), actor)?;
        Ok(self.storage.attachments_for_ticket(ticket_id).await?)
    }

    async fn remove_attachment(&self, id: &AttachmentId, actor: &User) -> HelpdeskResult<()> {
        let attachment = self.load_attachment(id).await?;
        authorize(Capability::DeleteAttachment, authz::can_delete_attachment(actor, &attachment), actor)?;
        let ticket = load_ticket(&*self.storage, &attachment.ticket_id).await?;

        let now = self.clock.now();
        let event = TicketEvent::AttachmentRemoved {
            attachment_id: *id,
            file_name: attachment.original_file_name,
        };
        let entry = audit_entry(&*self.storage, &ticket, actor, &event, now).await?;
        self.storage
            .commit(
                UnitOfWork::new()
                    .delete_attachment(*id)
                    .touch_ticket(*ticket.id(), now)
                    .save_comment(entry),
            )
            .await?;

        tracing::info!(attachment_id = %id, actor = %actor.id, "Attachment removed");
        Ok(())
    }
}
