use rusqlite::Connection;
use tracing::info;

use crate::StoreResult;

pub fn run(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              TEXT PRIMARY KEY,
            username        TEXT NOT NULL UNIQUE,
            email           TEXT NOT NULL UNIQUE,
            name            TEXT NOT NULL,
            password        TEXT NOT NULL,
            location        TEXT,
            availability    TEXT,
            is_public       INTEGER NOT NULL DEFAULT 1,
            is_admin        INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS skills (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS user_skills_offered (
            user_id     TEXT NOT NULL REFERENCES users(id),
            skill_id    TEXT NOT NULL REFERENCES skills(id),
            PRIMARY KEY (user_id, skill_id)
        );

        CREATE TABLE IF NOT EXISTS user_skills_wanted (
            user_id     TEXT NOT NULL REFERENCES users(id),
            skill_id    TEXT NOT NULL REFERENCES skills(id),
            PRIMARY KEY (user_id, skill_id)
        );

        CREATE TABLE IF NOT EXISTS swap_requests (
            id                  TEXT PRIMARY KEY,
            sender_id           TEXT NOT NULL REFERENCES users(id),
            receiver_id         TEXT NOT NULL REFERENCES users(id),
            offered_skill_id    TEXT NOT NULL REFERENCES skills(id),
            requested_skill_id  TEXT NOT NULL REFERENCES skills(id),
            status              TEXT NOT NULL DEFAULT 'pending',
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            CHECK (offered_skill_id <> requested_skill_id)
        );

        CREATE INDEX IF NOT EXISTS idx_swap_requests_sender
            ON swap_requests(sender_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_swap_requests_receiver
            ON swap_requests(receiver_id, created_at);

        CREATE TABLE IF NOT EXISTS feedback (
            id                  TEXT PRIMARY KEY,
            swap_request_id     TEXT NOT NULL REFERENCES swap_requests(id),
            from_user_id        TEXT NOT NULL REFERENCES users(id),
            to_user_id          TEXT NOT NULL REFERENCES users(id),
            rating              INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            comment             TEXT,
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(swap_request_id, from_user_id, to_user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_feedback_to_user
            ON feedback(to_user_id, created_at);

        CREATE TABLE IF NOT EXISTS refresh_tokens (
            token_hash  TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            expires_at  TEXT NOT NULL,
            revoked     INTEGER NOT NULL DEFAULT 0
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
