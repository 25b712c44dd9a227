use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use skillswap_db::Database;
use skillswap_db::models::{FeedbackRow, SkillRow, SwapRow, UserRow};
use skillswap_db::users::SkillSet;
use skillswap_types::models::{FeedbackView, SkillView, SwapRequestView, SwapStatus, UserView};

use crate::error::ApiError;

pub fn parse_uuid(s: &str, context: &str) -> Uuid {
    s.parse().unwrap_or_else(|e| {
        warn!("Corrupt {context} id '{s}': {e}");
        Uuid::default()
    })
}

pub fn parse_timestamp(s: &str, context: &str) -> DateTime<Utc> {
    s.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite column defaults store "YYYY-MM-DD HH:MM:SS" without a
            // timezone. Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{s}' on {context}: {e}");
            DateTime::default()
        })
}

pub fn skill_view(row: &SkillRow) -> SkillView {
    SkillView {
        id: parse_uuid(&row.id, "skill"),
        name: row.name.clone(),
    }
}

/// Read view of a user with both skill sets expanded.
pub fn user_view(db: &Database, row: &UserRow) -> Result<UserView, ApiError> {
    let offered = db.get_user_skills(&row.id, SkillSet::Offered)?;
    let wanted = db.get_user_skills(&row.id, SkillSet::Wanted)?;

    Ok(UserView {
        id: parse_uuid(&row.id, "user"),
        username: row.username.clone(),
        email: row.email.clone(),
        name: row.name.clone(),
        location: row.location.clone(),
        availability: row.availability.clone(),
        is_public: row.is_public,
        skills_offered: offered.iter().map(skill_view).collect(),
        skills_wanted: wanted.iter().map(skill_view).collect(),
    })
}

fn referenced_user(db: &Database, id: &str) -> Result<UserView, ApiError> {
    let row = db
        .get_user_by_id(id)?
        .ok_or_else(|| ApiError::Internal(format!("dangling user reference: {id}")))?;
    user_view(db, &row)
}

fn referenced_skill(db: &Database, id: &str) -> Result<SkillView, ApiError> {
    let row = db
        .get_skill(id)?
        .ok_or_else(|| ApiError::Internal(format!("dangling skill reference: {id}")))?;
    Ok(skill_view(&row))
}

/// Read view of a swap request: users and skills expanded to objects, the
/// write path having accepted them as IDs.
pub fn swap_view(db: &Database, row: &SwapRow) -> Result<SwapRequestView, ApiError> {
    let status = SwapStatus::parse(&row.status)
        .ok_or_else(|| ApiError::Internal(format!("corrupt swap status: {}", row.status)))?;

    Ok(SwapRequestView {
        id: parse_uuid(&row.id, "swap request"),
        sender: referenced_user(db, &row.sender_id)?,
        receiver: referenced_user(db, &row.receiver_id)?,
        offered_skill: referenced_skill(db, &row.offered_skill_id)?,
        requested_skill: referenced_skill(db, &row.requested_skill_id)?,
        status,
        timestamp: parse_timestamp(&row.created_at, "swap request"),
    })
}

pub fn feedback_view(db: &Database, row: &FeedbackRow) -> Result<FeedbackView, ApiError> {
    Ok(FeedbackView {
        id: parse_uuid(&row.id, "feedback"),
        swap_request: parse_uuid(&row.swap_request_id, "swap request"),
        from_user: referenced_user(db, &row.from_user_id)?,
        to_user: referenced_user(db, &row.to_user_id)?,
        rating: row.rating,
        comment: row.comment.clone(),
        created_at: parse_timestamp(&row.created_at, "feedback"),
    })
}
