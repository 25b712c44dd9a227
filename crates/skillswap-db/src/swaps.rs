use rusqlite::{Connection, params};
use skillswap_types::models::SwapStatus;

use crate::models::SwapRow;
use crate::{Database, OptionalExt, StoreError, StoreResult, now_timestamp};

const SWAP_COLUMNS: &str =
    "id, sender_id, receiver_id, offered_skill_id, requested_skill_id, status, created_at";

impl Database {
    /// Create a pending swap request. The sender is whoever the caller
    /// authenticated as; the API layer never trusts a client-supplied sender.
    pub fn create_swap(
        &self,
        id: &str,
        sender_id: &str,
        receiver_id: &str,
        offered_skill_id: &str,
        requested_skill_id: &str,
    ) -> StoreResult<SwapRow> {
        if offered_skill_id == requested_skill_id {
            return Err(StoreError::Invalid(
                "offered and requested skills cannot be the same".into(),
            ));
        }

        self.with_conn_mut(|conn| {
            let receiver_known: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
                [receiver_id],
                |row| row.get(0),
            )?;
            if !receiver_known {
                return Err(StoreError::NotFound);
            }
            for skill_id in [offered_skill_id, requested_skill_id] {
                let known: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM skills WHERE id = ?1)",
                    [skill_id],
                    |row| row.get(0),
                )?;
                if !known {
                    return Err(StoreError::NotFound);
                }
            }

            conn.execute(
                "INSERT INTO swap_requests
                    (id, sender_id, receiver_id, offered_skill_id, requested_skill_id, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6)",
                params![
                    id,
                    sender_id,
                    receiver_id,
                    offered_skill_id,
                    requested_skill_id,
                    now_timestamp()
                ],
            )?;

            query_swap(conn, id)?.ok_or(StoreError::NotFound)
        })
    }

    pub fn get_swap(&self, id: &str) -> StoreResult<Option<SwapRow>> {
        self.with_conn(|conn| query_swap(conn, id))
    }

    /// A swap request is only visible to its sender and receiver.
    pub fn get_swap_for_user(&self, id: &str, user_id: &str) -> StoreResult<Option<SwapRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SWAP_COLUMNS} FROM swap_requests
                 WHERE id = ?1 AND (sender_id = ?2 OR receiver_id = ?2)"
            ))?;
            stmt.query_row(params![id, user_id], swap_from_row).optional()
        })
    }

    pub fn list_swaps_for_user(&self, user_id: &str) -> StoreResult<Vec<SwapRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SWAP_COLUMNS} FROM swap_requests
                 WHERE sender_id = ?1 OR receiver_id = ?1
                 ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt
                .query_map([user_id], swap_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Receiver accepts or rejects a pending request. A single guarded
    /// UPDATE is the compare-and-set: of two racing calls exactly one
    /// matches `status = 'pending'` and wins. Zero rows affected means the
    /// request is missing, not addressed to this caller, or no longer
    /// pending — deliberately indistinguishable to the caller.
    pub fn act_on_swap(
        &self,
        id: &str,
        receiver_id: &str,
        action: SwapStatus,
    ) -> StoreResult<SwapRow> {
        if !matches!(action, SwapStatus::Accepted | SwapStatus::Rejected) {
            return Err(StoreError::Invalid("Invalid action".into()));
        }

        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE swap_requests SET status = ?3
                 WHERE id = ?1 AND receiver_id = ?2 AND status = 'pending'",
                params![id, receiver_id, action.as_str()],
            )?;
            if n == 0 {
                return Err(StoreError::NotFound);
            }
            query_swap(conn, id)?.ok_or(StoreError::NotFound)
        })
    }

    /// Generic update path: `status` is the only writable field. Accept and
    /// reject are reserved to the receiver; either party may cancel; every
    /// transition starts from `pending`.
    pub fn update_swap_status(
        &self,
        id: &str,
        caller_id: &str,
        status: SwapStatus,
    ) -> StoreResult<SwapRow> {
        if !status.is_terminal() {
            return Err(StoreError::Invalid("Invalid status".into()));
        }

        self.with_conn_mut(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SWAP_COLUMNS} FROM swap_requests
                 WHERE id = ?1 AND (sender_id = ?2 OR receiver_id = ?2)"
            ))?;
            let row = stmt
                .query_row(params![id, caller_id], swap_from_row)
                .optional()?
                .ok_or(StoreError::NotFound)?;

            if matches!(status, SwapStatus::Accepted | SwapStatus::Rejected)
                && row.receiver_id != caller_id
            {
                return Err(StoreError::Forbidden(
                    "only the receiver can accept or reject a swap request".into(),
                ));
            }

            let n = conn.execute(
                "UPDATE swap_requests SET status = ?2 WHERE id = ?1 AND status = 'pending'",
                params![id, status.as_str()],
            )?;
            if n == 0 {
                return Err(StoreError::Invalid(format!(
                    "cannot change status of a {} request",
                    row.status
                )));
            }
            query_swap(conn, id)?.ok_or(StoreError::NotFound)
        })
    }

    /// Delete a swap request (sender or receiver only), together with any
    /// feedback that references it.
    pub fn delete_swap(&self, id: &str, user_id: &str) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM feedback WHERE swap_request_id = ?1", [id])?;
            let n = tx.execute(
                "DELETE FROM swap_requests
                 WHERE id = ?1 AND (sender_id = ?2 OR receiver_id = ?2)",
                params![id, user_id],
            )?;
            if n == 0 {
                // nothing matched: roll the feedback delete back too
                return Err(StoreError::NotFound);
            }
            tx.commit()?;
            Ok(())
        })
    }
}

fn query_swap(conn: &Connection, id: &str) -> StoreResult<Option<SwapRow>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {SWAP_COLUMNS} FROM swap_requests WHERE id = ?1"))?;
    stmt.query_row([id], swap_from_row).optional()
}

fn swap_from_row(row: &rusqlite::Row) -> rusqlite::Result<SwapRow> {
    Ok(SwapRow {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        offered_skill_id: row.get(3)?,
        requested_skill_id: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
    })
}
