/// Database row types — these map directly to SQLite rows.
/// Distinct from the skillswap-types read views to keep the DB layer
/// independent of the API shapes.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub password: String,
    pub location: Option<String>,
    pub availability: Option<String>,
    pub is_public: bool,
    pub is_admin: bool,
    pub created_at: String,
}

pub struct SkillRow {
    pub id: String,
    pub name: String,
}

#[derive(Debug)]
pub struct SwapRow {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub offered_skill_id: String,
    pub requested_skill_id: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug)]
pub struct FeedbackRow {
    pub id: String,
    pub swap_request_id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: String,
}

pub struct RefreshTokenRow {
    pub token_hash: String,
    pub user_id: String,
    pub expires_at: String,
    pub revoked: bool,
}

/// Raw counters behind `GET /stats`.
pub struct StatsRow {
    pub total_sent_requests: i64,
    pub total_received_requests: i64,
    pub accepted_requests: i64,
    pub pending_requests: i64,
    pub total_feedbacks: i64,
    pub average_rating: f64,
}
