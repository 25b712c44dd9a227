use crate::models::StatsRow;
use crate::{Database, StoreResult};

impl Database {
    /// Aggregate counters for one user. Accepted/pending counts include the
    /// user as either party; `average_rating` is 0 when there is no feedback.
    pub fn user_stats(&self, user_id: &str) -> StoreResult<StatsRow> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM swap_requests WHERE sender_id = ?1),
                    (SELECT COUNT(*) FROM swap_requests WHERE receiver_id = ?1),
                    (SELECT COUNT(*) FROM swap_requests
                        WHERE (sender_id = ?1 OR receiver_id = ?1) AND status = 'accepted'),
                    (SELECT COUNT(*) FROM swap_requests
                        WHERE (sender_id = ?1 OR receiver_id = ?1) AND status = 'pending'),
                    (SELECT COUNT(*) FROM feedback WHERE to_user_id = ?1),
                    (SELECT COALESCE(AVG(rating), 0) FROM feedback WHERE to_user_id = ?1)",
                [user_id],
                |row| {
                    Ok(StatsRow {
                        total_sent_requests: row.get(0)?,
                        total_received_requests: row.get(1)?,
                        accepted_requests: row.get(2)?,
                        pending_requests: row.get(3)?,
                        total_feedbacks: row.get(4)?,
                        average_rating: row.get(5)?,
                    })
                },
            )?;
            Ok(row)
        })
    }
}

#[cfg(test)]
mod tests {
    use skillswap_types::models::SwapStatus;

    use super::*;
    use crate::testutil::{mk_skill, mk_swap, mk_user};

    #[test]
    fn zero_feedback_means_average_exactly_zero() {
        let db = Database::open_in_memory().unwrap();
        let alice = mk_user(&db, "alice");

        let stats = db.user_stats(&alice).unwrap();
        assert_eq!(stats.total_feedbacks, 0);
        assert_eq!(stats.average_rating, 0.0);
    }

    #[test]
    fn counters_cover_both_roles() {
        let db = Database::open_in_memory().unwrap();
        let alice = mk_user(&db, "alice");
        let bob = mk_user(&db, "bob");
        let python = mk_skill(&db, "Python");
        let guitar = mk_skill(&db, "Guitar");
        let cooking = mk_skill(&db, "Cooking");

        // alice -> bob, accepted; bob -> alice, pending
        let accepted = mk_swap(&db, &alice, &bob, &python, &guitar);
        db.act_on_swap(&accepted, &bob, SwapStatus::Accepted).unwrap();
        mk_swap(&db, &bob, &alice, &cooking, &python);

        db.create_feedback("f1", &accepted, &bob, &alice, 5, None).unwrap();
        db.create_feedback("f2", &accepted, &alice, &bob, 2, None).unwrap();

        let stats = db.user_stats(&alice).unwrap();
        assert_eq!(stats.total_sent_requests, 1);
        assert_eq!(stats.total_received_requests, 1);
        assert_eq!(stats.accepted_requests, 1);
        assert_eq!(stats.pending_requests, 1);
        // only feedback *received* counts
        assert_eq!(stats.total_feedbacks, 1);
        assert_eq!(stats.average_rating, 5.0);
    }

    #[test]
    fn average_is_the_arithmetic_mean() {
        let db = Database::open_in_memory().unwrap();
        let alice = mk_user(&db, "alice");
        let bob = mk_user(&db, "bob");
        let carol = mk_user(&db, "carol");
        let python = mk_skill(&db, "Python");
        let guitar = mk_skill(&db, "Guitar");

        let s1 = mk_swap(&db, &bob, &alice, &python, &guitar);
        db.act_on_swap(&s1, &alice, SwapStatus::Accepted).unwrap();
        let s2 = mk_swap(&db, &carol, &alice, &python, &guitar);
        db.act_on_swap(&s2, &alice, SwapStatus::Accepted).unwrap();

        db.create_feedback("f1", &s1, &bob, &alice, 2, None).unwrap();
        db.create_feedback("f2", &s2, &carol, &alice, 5, None).unwrap();

        let stats = db.user_stats(&alice).unwrap();
        assert_eq!(stats.total_feedbacks, 2);
        assert_eq!(stats.average_rating, 3.5);
    }
}
