use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a swap request. `Accepted`, `Rejected` and `Cancelled` are
/// terminal: no transition ever leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl SwapStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SwapStatus::Pending => "pending",
            SwapStatus::Accepted => "accepted",
            SwapStatus::Rejected => "rejected",
            SwapStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SwapStatus::Pending),
            "accepted" => Some(SwapStatus::Accepted),
            "rejected" => Some(SwapStatus::Rejected),
            "cancelled" => Some(SwapStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, SwapStatus::Pending)
    }
}

impl std::fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillView {
    pub id: Uuid,
    pub name: String,
}

/// Full read view of a user, with both skill sets expanded to objects.
/// Writes go through the separate request DTOs in `api` — skills are
/// accepted as IDs on write and expanded on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    pub location: Option<String>,
    pub availability: Option<String>,
    pub is_public: bool,
    pub skills_offered: Vec<SkillView>,
    pub skills_wanted: Vec<SkillView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapRequestView {
    pub id: Uuid,
    pub sender: UserView,
    pub receiver: UserView,
    pub offered_skill: SkillView,
    pub requested_skill: SkillView,
    pub status: SwapStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackView {
    pub id: Uuid,
    pub swap_request: Uuid,
    pub from_user: UserView,
    pub to_user: UserView,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate counters for `GET /stats`. `average_rating` is 0 when the user
/// has no feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub total_sent_requests: i64,
    pub total_received_requests: i64,
    pub accepted_requests: i64,
    pub pending_requests: i64,
    pub total_feedbacks: i64,
    pub average_rating: f64,
}
