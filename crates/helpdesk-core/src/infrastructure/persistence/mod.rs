//! In-memory storage with optional JSON snapshot persistence

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::{
    Attachment, AttachmentId, Comment, CommentId, Rating, RatingId, Ticket, TicketId, User, UserId,
};
use crate::ports::outbound::{RepoResult, RepositoryError, Storage, UnitOfWork, Write};

/// Storage adapter keeping every table in memory.
///
/// Commits are serialized by `writer`. A commit clones the tables, applies
/// the writes to the clone, persists it when opened on a snapshot file and
/// only then swaps it in, so readers never observe half a unit and are held
/// off for the swap alone, not for the file I/O.
#[derive(Default)]
pub struct InMemoryStorage {
    tables: RwLock<Tables>,
    writer: Mutex<()>,
    snapshot_path: Option<PathBuf>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path` if it exists and persist there from now on.
    pub fn open_snapshot(path: impl Into<PathBuf>) -> RepoResult<Self> {
        let path = path.into();
        let tables = if path.exists() {
            let bytes = std::fs::read(&path).map_err(|e| storage_error(&path, e))?;
            let snapshot: Snapshot = serde_json::from_slice(&bytes).map_err(|e| storage_error(&path, e))?;
            Tables::from(snapshot)
        } else {
            Tables::default()
        };

        tracing::debug!("Opened snapshot {} ({} tickets)", path.display(), tables.tickets.len());
        Ok(Self {
            tables: RwLock::new(tables),
            writer: Mutex::new(()),
            snapshot_path: Some(path),
        })
    }

    fn commit_now(&self, unit: UnitOfWork) -> RepoResult<()> {
        if unit.is_empty() {
            return Ok(());
        }
        let _writer = self.writer.lock();
        tracing::trace!(writes = unit.len(), "Committing unit of work");

        let mut next = self.tables.read().clone();
        for write in unit {
            next.apply(write)?;
        }

        if let Some(path) = &self.snapshot_path {
            write_snapshot(path, &next)?;
        }
        *self.tables.write() = next;
        Ok(())
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn find_user(&self, id: &UserId) -> RepoResult<Option<User>> {
        Ok(self.tables.read().users.get(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email = email.trim().to_lowercase();
        let tables = self.tables.read();
        Ok(tables.users.values().find(|u| u.email.as_str() == email).cloned())
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut users: Vec<User> = self.tables.read().users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.email.as_str().cmp(b.email.as_str())));
        Ok(users)
    }

    async fn find_ticket(&self, id: &TicketId) -> RepoResult<Option<Ticket>> {
        Ok(self.tables.read().tickets.get(id).cloned())
    }

    async fn find_comment(&self, id: &CommentId) -> RepoResult<Option<Comment>> {
        Ok(self.tables.read().comments.get(id).map(|stored| stored.comment.clone()))
    }

    async fn comments_for_ticket(&self, ticket_id: &TicketId) -> RepoResult<Vec<Comment>> {
        let tables = self.tables.read();
        let mut thread: Vec<&StoredComment> = tables
            .comments
            .values()
            .filter(|stored| stored.comment.ticket_id == *ticket_id)
            .collect();
        thread.sort_by_key(|stored| (stored.comment.created_at, stored.seq));
        Ok(thread.into_iter().map(|stored| stored.comment.clone()).collect())
    }

    async fn find_rating_for_ticket(&self, ticket_id: &TicketId) -> RepoResult<Option<Rating>> {
        let tables = self.tables.read();
        Ok(tables.ratings.values().find(|r| r.ticket_id == *ticket_id).cloned())
    }

    async fn find_attachment(&self, id: &AttachmentId) -> RepoResult<Option<Attachment>> {
        Ok(self.tables.read().attachments.get(id).cloned())
    }

    async fn attachments_for_ticket(&self, ticket_id: &TicketId) -> RepoResult<Vec<Attachment>> {
        let mut files: Vec<Attachment> = self
            .tables
            .read()
            .attachments
            .values()
            .filter(|a| a.ticket_id == *ticket_id)
            .cloned()
            .collect();
        files.sort_by_key(|a| (a.created_at, a.id));
        Ok(files)
    }

    async fn commit(&self, unit: UnitOfWork) -> RepoResult<()> {
        self.commit_now(unit)
    }
}

// =============================================================================
// Tables
// =============================================================================

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    tickets: HashMap<TicketId, Ticket>,
    comments: HashMap<CommentId, StoredComment>,
    ratings: HashMap<RatingId, Rating>,
    attachments: HashMap<AttachmentId, Attachment>,
    next_seq: u64,
}

/// A comment plus its insertion sequence, the ordering tie-breaker.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredComment {
    seq: u64,
    #[serde(flatten)]
    comment: Comment,
}

impl Tables {
    fn apply(&mut self, write: Write) -> RepoResult<()> {
        match write {
            Write::SaveUser(user) => {
                if self.users.values().any(|u| u.id != user.id && u.email == user.email) {
                    return Err(RepositoryError::DuplicateKey(format!("users.email={}", user.email)));
                }
                self.users.insert(user.id, user);
            }
            Write::RequireNoUsers => {
                if !self.users.is_empty() {
                    return Err(RepositoryError::Conflict(format!("{} users already exist", self.users.len())));
                }
            }
            Write::SaveTicket(ticket) => {
                self.tickets.insert(*ticket.id(), ticket);
            }
            Write::TouchTicket { id, at } => match self.tickets.get_mut(&id) {
                Some(ticket) => ticket.touch(at),
                None => return Err(RepositoryError::NotFound(format!("ticket {}", id))),
            },
            Write::DeleteTicket(id) => {
                if self.tickets.remove(&id).is_none() {
                    return Err(RepositoryError::NotFound(format!("ticket {}", id)));
                }
                self.comments.retain(|_, stored| stored.comment.ticket_id != id);
                self.ratings.retain(|_, r| r.ticket_id != id);
                self.attachments.retain(|_, a| a.ticket_id != id);
            }
            Write::SaveComment(comment) => {
                self.require_ticket(&comment.ticket_id)?;
                let seq = match self.comments.get(&comment.id) {
                    Some(existing) => existing.seq,
                    None => {
                        self.next_seq += 1;
                        self.next_seq
                    }
                };
                self.comments.insert(comment.id, StoredComment { seq, comment });
            }
            Write::DeleteComment(id) => {
                if self.comments.remove(&id).is_none() {
                    return Err(RepositoryError::NotFound(format!("comment {}", id)));
                }
            }
            Write::SaveRating(rating) => {
                self.require_ticket(&rating.ticket_id)?;
                let taken = self.ratings.values().any(|r| {
                    r.id != rating.id && r.ticket_id == rating.ticket_id && r.rater_id == rating.rater_id
                });
                if taken {
                    return Err(RepositoryError::DuplicateKey(format!(
                        "ratings.ticket_rater={}/{}",
                        rating.ticket_id, rating.rater_id
                    )));
                }
                self.ratings.insert(rating.id, rating);
            }
            Write::SaveAttachment(attachment) => {
                self.require_ticket(&attachment.ticket_id)?;
                self.attachments.insert(attachment.id, attachment);
            }
            Write::DeleteAttachment(id) => {
                if self.attachments.remove(&id).is_none() {
                    return Err(RepositoryError::NotFound(format!("attachment {}", id)));
                }
            }
        }
        Ok(())
    }

    fn require_ticket(&self, id: &TicketId) -> RepoResult<()> {
        if self.tickets.contains_key(id) {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(format!("ticket {}", id)))
        }
    }
}

// =============================================================================
// Snapshot file
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    users: Vec<User>,
    tickets: Vec<Ticket>,
    comments: Vec<StoredComment>,
    ratings: Vec<Rating>,
    attachments: Vec<Attachment>,
    next_seq: u64,
}

impl From<&Tables> for Snapshot {
    fn from(tables: &Tables) -> Self {
        Self {
            users: tables.users.values().cloned().collect(),
            tickets: tables.tickets.values().cloned().collect(),
            comments: tables.comments.values().cloned().collect(),
            ratings: tables.ratings.values().cloned().collect(),
            attachments: tables.attachments.values().cloned().collect(),
            next_seq: tables.next_seq,
        }
    }
}

impl From<Snapshot> for Tables {
    fn from(snapshot: Snapshot) -> Self {
        // Older files may lack the counter; never reuse a sequence number.
        let max_seq = snapshot.comments.iter().map(|c| c.seq).max().unwrap_or(0);
        Self {
            users: snapshot.users.into_iter().map(|u| (u.id, u)).collect(),
            tickets: snapshot.tickets.into_iter().map(|t| (*t.id(), t)).collect(),
            comments: snapshot.comments.into_iter().map(|c| (c.comment.id, c)).collect(),
            ratings: snapshot.ratings.into_iter().map(|r| (r.id, r)).collect(),
            attachments: snapshot.attachments.into_iter().map(|a| (a.id, a)).collect(),
            next_seq: snapshot.next_seq.max(max_seq),
        }
    }
}

fn write_snapshot(path: &Path, tables: &Tables) -> RepoResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| storage_error(parent, e))?;
    }
    let bytes = serde_json::to_vec_pretty(&Snapshot::from(tables)).map_err(|e| storage_error(path, e))?;

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes).map_err(|e| storage_error(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| storage_error(path, e))?;
    Ok(())
}

fn storage_error(path: &Path, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Storage(format!("{}: {}", path.display(), err))
}
