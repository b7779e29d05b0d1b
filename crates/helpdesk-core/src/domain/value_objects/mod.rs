//! Value Objects module
//!
//! Immutable, validated domain primitives.

pub mod email;

pub use email::{Email, EmailError};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`User`](crate::domain::User)
    UserId
);
entity_id!(
    /// Identifier of a [`Ticket`](crate::domain::Ticket)
    TicketId
);
entity_id!(
    /// Identifier of a [`Comment`](crate::domain::Comment)
    CommentId
);
entity_id!(
    /// Identifier of a [`Rating`](crate::domain::Rating)
    RatingId
);
entity_id!(
    /// Identifier of an [`Attachment`](crate::domain::Attachment)
    AttachmentId
);
