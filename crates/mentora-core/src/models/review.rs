//! Post-session review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest and highest accepted review score.
pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub session_id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub score: u8,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReview {
    pub session_id: Uuid,
    pub mentor_id: Uuid,
    /// The reviewing mentee.
    pub mentee_id: Uuid,
    pub score: u8,
    pub remark: Option<String>,
}
