//! Satisfaction rating

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::value_objects::{RatingId, TicketId, UserId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: RatingId,
    pub ticket_id: TicketId,
    pub rater_id: UserId,
    pub value: RatingValue,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(
        ticket_id: TicketId,
        rater_id: UserId,
        value: RatingValue,
        feedback: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RatingId::new(),
            ticket_id,
            rater_id,
            value,
            feedback,
            created_at: now,
        }
    }

    pub fn sentiment(&self) -> Sentiment {
        self.value.sentiment()
    }

    pub fn label(&self) -> &'static str {
        match self.value.get() {
            1 => "Very Poor",
            2 => "Poor",
            3 => "Average",
            4 => "Good",
            _ => "Excellent",
        }
    }

    /// Five-glyph star display, e.g. `★★★☆☆`.
    pub fn stars(&self) -> String {
        (1..=RatingValue::MAX)
            .map(|i| if i <= self.value.get() { '★' } else { '☆' })
            .collect()
    }
}

/// Integer score in `1..=5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct RatingValue(u8);

impl RatingValue {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, RatingValueError> {
        if value < i64::from(Self::MIN) || value > i64::from(Self::MAX) {
            return Err(RatingValueError(value));
        }
        Ok(Self(value as u8))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn sentiment(&self) -> Sentiment {
        match self.0 {
            4..=5 => Sentiment::Positive,
            3 => Sentiment::Neutral,
            _ => Sentiment::Negative,
        }
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = RatingValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RatingValue> for i64 {
    fn from(value: RatingValue) -> Self {
        i64::from(value.0)
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between 1 and 5, got {0}")]
pub struct RatingValueError(pub i64);
