use rusqlite::params;

use crate::models::FeedbackRow;
use crate::{Database, OptionalExt, StoreError, StoreResult, constraint_message, now_timestamp};

const FEEDBACK_COLUMNS: &str =
    "id, swap_request_id, from_user_id, to_user_id, rating, comment, created_at";

fn check_rating(rating: i64) -> StoreResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(StoreError::Invalid("rating must be between 1 and 5".into()));
    }
    Ok(())
}

impl Database {
    /// Record feedback for a completed swap. The swap request must be
    /// `accepted`, the rating in [1,5], and at most one entry may exist per
    /// (swap_request, from_user, to_user) triple — the UNIQUE constraint
    /// keeps that atomic.
    pub fn create_feedback(
        &self,
        id: &str,
        swap_request_id: &str,
        from_user_id: &str,
        to_user_id: &str,
        rating: i64,
        comment: Option<&str>,
    ) -> StoreResult<FeedbackRow> {
        check_rating(rating)?;

        self.with_conn_mut(|conn| {
            let status: Option<String> = conn
                .query_row(
                    "SELECT status FROM swap_requests WHERE id = ?1",
                    [swap_request_id],
                    |row| row.get(0),
                )
                .optional()?;
            let status = status.ok_or(StoreError::NotFound)?;
            if status != "accepted" {
                return Err(StoreError::Invalid(
                    "can only leave feedback for accepted swap requests".into(),
                ));
            }

            let to_known: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
                [to_user_id],
                |row| row.get(0),
            )?;
            if !to_known {
                return Err(StoreError::NotFound);
            }

            conn.execute(
                "INSERT INTO feedback
                    (id, swap_request_id, from_user_id, to_user_id, rating, comment, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id,
                    swap_request_id,
                    from_user_id,
                    to_user_id,
                    rating,
                    comment,
                    now_timestamp()
                ],
            )
            .map_err(|e| match constraint_message(&e) {
                Some(_) => StoreError::Conflict(
                    "feedback for this swap request already exists".into(),
                ),
                None => e.into(),
            })?;

            query_feedback(conn, id)?.ok_or(StoreError::NotFound)
        })
    }

    /// Feedback is listed for both directions: rows the user wrote and rows
    /// written about them.
    pub fn list_feedback_for_user(&self, user_id: &str) -> StoreResult<Vec<FeedbackRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {FEEDBACK_COLUMNS} FROM feedback
                 WHERE from_user_id = ?1 OR to_user_id = ?1
                 ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt
                .query_map([user_id], feedback_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Detail access is narrower than List: only the author sees, edits or
    /// deletes a row through the detail path.
    pub fn get_feedback_authored(
        &self,
        id: &str,
        from_user_id: &str,
    ) -> StoreResult<Option<FeedbackRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {FEEDBACK_COLUMNS} FROM feedback
                 WHERE id = ?1 AND from_user_id = ?2"
            ))?;
            stmt.query_row(params![id, from_user_id], feedback_from_row)
                .optional()
        })
    }

    pub fn update_feedback(
        &self,
        id: &str,
        from_user_id: &str,
        rating: Option<i64>,
        comment: Option<&str>,
    ) -> StoreResult<FeedbackRow> {
        if let Some(rating) = rating {
            check_rating(rating)?;
        }

        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE feedback SET
                    rating = COALESCE(?3, rating),
                    comment = COALESCE(?4, comment)
                 WHERE id = ?1 AND from_user_id = ?2",
                params![id, from_user_id, rating, comment],
            )?;
            if n == 0 {
                return Err(StoreError::NotFound);
            }
            query_feedback(conn, id)?.ok_or(StoreError::NotFound)
        })
    }

    pub fn delete_feedback(&self, id: &str, from_user_id: &str) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "DELETE FROM feedback WHERE id = ?1 AND from_user_id = ?2",
                params![id, from_user_id],
            )?;
            if n == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }
}

fn query_feedback(conn: &rusqlite::Connection, id: &str) -> StoreResult<Option<FeedbackRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE id = ?1"))?;
    stmt.query_row([id], feedback_from_row).optional()
}

fn feedback_from_row(row: &rusqlite::Row) -> rusqlite::Result<FeedbackRow> {
    Ok(FeedbackRow {
        id: row.get(0)?,
        swap_request_id: row.get(1)?,
        from_user_id: row.get(2)?,
        to_user_id: row.get(3)?,
        rating: row.get(4)?,
        comment: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use skillswap_types::models::SwapStatus;

    use super::*;
    use crate::testutil::{mk_skill, mk_swap, mk_user};

    fn accepted_swap(db: &Database) -> (String, String, String) {
        let alice = mk_user(db, "alice");
        let bob = mk_user(db, "bob");
        let python = mk_skill(db, "Python");
        let guitar = mk_skill(db, "Guitar");
        let swap = mk_swap(db, &alice, &bob, &python, &guitar);
        db.act_on_swap(&swap, &bob, SwapStatus::Accepted).unwrap();
        (swap, alice, bob)
    }

    #[test]
    fn feedback_requires_an_accepted_swap() {
        let db = Database::open_in_memory().unwrap();
        let alice = mk_user(&db, "alice");
        let bob = mk_user(&db, "bob");
        let python = mk_skill(&db, "Python");
        let guitar = mk_skill(&db, "Guitar");
        let swap = mk_swap(&db, &alice, &bob, &python, &guitar);

        // still pending
        let err = db
            .create_feedback("f1", &swap, &alice, &bob, 5, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));

        // rejected is just as invalid
        db.act_on_swap(&swap, &bob, SwapStatus::Rejected).unwrap();
        let err = db
            .create_feedback("f1", &swap, &alice, &bob, 5, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[test]
    fn missing_swap_or_recipient_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let (swap, alice, _) = accepted_swap(&db);

        let err = db
            .create_feedback("f1", "ghost", &alice, "whoever", 5, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        let err = db
            .create_feedback("f1", &swap, &alice, "ghost", 5, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        let db = Database::open_in_memory().unwrap();
        let (swap, alice, bob) = accepted_swap(&db);

        for bad in [0, 6, -1] {
            let err = db
                .create_feedback("f-bad", &swap, &alice, &bob, bad, None)
                .unwrap_err();
            assert!(matches!(err, StoreError::Invalid(_)));
        }

        db.create_feedback("f1", &swap, &alice, &bob, 1, None).unwrap();
        db.create_feedback("f5", &swap, &bob, &alice, 5, None).unwrap();
    }

    #[test]
    fn duplicate_triple_conflicts() {
        let db = Database::open_in_memory().unwrap();
        let (swap, alice, bob) = accepted_swap(&db);

        db.create_feedback("f1", &swap, &alice, &bob, 5, Some("great"))
            .unwrap();
        let err = db
            .create_feedback("f2", &swap, &alice, &bob, 3, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // the opposite direction is a different triple
        db.create_feedback("f3", &swap, &bob, &alice, 4, None).unwrap();
    }

    #[test]
    fn list_covers_both_directions_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let (swap, alice, bob) = accepted_swap(&db);

        db.create_feedback("f1", &swap, &alice, &bob, 5, None).unwrap();
        db.create_feedback("f2", &swap, &bob, &alice, 4, None).unwrap();

        let listed = db.list_feedback_for_user(&alice).unwrap();
        let ids: Vec<_> = listed.iter().map(|f| f.id.clone()).collect();
        assert_eq!(ids, vec!["f2", "f1"]);
    }

    #[test]
    fn detail_access_is_author_only() {
        let db = Database::open_in_memory().unwrap();
        let (swap, alice, bob) = accepted_swap(&db);
        db.create_feedback("f1", &swap, &alice, &bob, 5, None).unwrap();

        assert!(db.get_feedback_authored("f1", &alice).unwrap().is_some());
        // the recipient sees it in List but not through the detail path
        assert!(db.get_feedback_authored("f1", &bob).unwrap().is_none());

        let err = db.update_feedback("f1", &bob, Some(1), None).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        let err = db.delete_feedback("f1", &bob).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn author_updates_rating_and_comment() {
        let db = Database::open_in_memory().unwrap();
        let (swap, alice, bob) = accepted_swap(&db);
        db.create_feedback("f1", &swap, &alice, &bob, 5, Some("great"))
            .unwrap();

        let row = db
            .update_feedback("f1", &alice, Some(3), Some("revised"))
            .unwrap();
        assert_eq!(row.rating, 3);
        assert_eq!(row.comment.as_deref(), Some("revised"));

        let err = db.update_feedback("f1", &alice, Some(9), None).unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }
}
