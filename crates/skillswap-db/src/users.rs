use rusqlite::{Connection, params};

use crate::models::{SkillRow, UserRow};
use crate::{Database, OptionalExt, StoreError, StoreResult, constraint_message};

const USER_COLUMNS: &str =
    "id, username, email, name, password, location, availability, is_public, is_admin, created_at";

/// Which of a user's two skill sets a join-table operation targets.
#[derive(Debug, Clone, Copy)]
pub enum SkillSet {
    Offered,
    Wanted,
}

impl SkillSet {
    fn table(self) -> &'static str {
        match self {
            SkillSet::Offered => "user_skills_offered",
            SkillSet::Wanted => "user_skills_wanted",
        }
    }
}

/// Partial profile update; `None` leaves the column unchanged. The nullable
/// columns take another level: `Some(None)` clears the stored value.
#[derive(Debug, Default)]
pub struct ProfileChanges<'a> {
    pub name: Option<&'a str>,
    pub location: Option<Option<&'a str>>,
    pub availability: Option<Option<&'a str>>,
    pub is_public: Option<bool>,
}

impl Database {
    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, name, password) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, username, email, name, password_hash],
            )
            .map_err(|e| match constraint_message(&e) {
                Some(msg) if msg.contains("users.email") => {
                    StoreError::Conflict("user with this email already exists".into())
                }
                Some(msg) if msg.contains("users.username") => {
                    StoreError::Conflict("user with this username already exists".into())
                }
                _ => e.into(),
            })?;
            Ok(())
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> StoreResult<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn get_user_by_email(&self, email: &str) -> StoreResult<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn update_profile(&self, id: &str, changes: &ProfileChanges) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            let row = query_user(conn, "id", id)?.ok_or(StoreError::NotFound)?;
            let name = changes.name.unwrap_or(&row.name);
            let location = match changes.location {
                Some(value) => value,
                None => row.location.as_deref(),
            };
            let availability = match changes.availability {
                Some(value) => value,
                None => row.availability.as_deref(),
            };
            let is_public = changes.is_public.unwrap_or(row.is_public);
            conn.execute(
                "UPDATE users SET
                    name = ?2, location = ?3, availability = ?4, is_public = ?5
                 WHERE id = ?1",
                params![id, name, location, availability, is_public],
            )?;
            Ok(())
        })
    }

    /// Replace one of the user's skill sets wholesale. Every referenced
    /// skill must exist.
    pub fn set_user_skills(
        &self,
        user_id: &str,
        set: SkillSet,
        skill_ids: &[String],
    ) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            for skill_id in skill_ids {
                let known: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM skills WHERE id = ?1)",
                    [skill_id],
                    |row| row.get(0),
                )?;
                if !known {
                    return Err(StoreError::Invalid(format!("unknown skill id: {skill_id}")));
                }
            }

            let tx = conn.transaction()?;
            tx.execute(
                &format!("DELETE FROM {} WHERE user_id = ?1", set.table()),
                [user_id],
            )?;
            for skill_id in skill_ids {
                tx.execute(
                    &format!(
                        "INSERT OR IGNORE INTO {} (user_id, skill_id) VALUES (?1, ?2)",
                        set.table()
                    ),
                    params![user_id, skill_id],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    pub fn get_user_skills(&self, user_id: &str, set: SkillSet) -> StoreResult<Vec<SkillRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT s.id, s.name FROM skills s
                 JOIN {} us ON us.skill_id = s.id
                 WHERE us.user_id = ?1
                 ORDER BY s.name",
                set.table()
            ))?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(SkillRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Directory listing: public users other than the caller. With a skill
    /// filter, only users involved in a swap request (either side) whose
    /// offered or requested skill name contains the substring,
    /// case-insensitively. LIKE is case-insensitive for ASCII in SQLite.
    pub fn list_public_users(
        &self,
        exclude_id: &str,
        skill: Option<&str>,
    ) -> StoreResult<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users u
                 WHERE u.is_public = 1 AND u.id <> ?1
                   AND (?2 IS NULL OR EXISTS (
                       SELECT 1 FROM swap_requests sr
                       JOIN skills so ON so.id = sr.offered_skill_id
                       JOIN skills rq ON rq.id = sr.requested_skill_id
                       WHERE (sr.sender_id = u.id OR sr.receiver_id = u.id)
                         AND (so.name LIKE '%' || ?2 || '%'
                              OR rq.name LIKE '%' || ?2 || '%')
                   ))
                 ORDER BY u.username"
            ))?;
            let rows = stmt
                .query_map(params![exclude_id, skill], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn set_admin(&self, id: &str, is_admin: bool) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE users SET is_admin = ?2 WHERE id = ?1",
                params![id, is_admin],
            )?;
            if n == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }

    /// Deleting a user deletes their swap requests and feedback. The cascade
    /// is an explicit data-layer rule, run in one transaction.
    pub fn delete_user(&self, id: &str) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM feedback
                 WHERE from_user_id = ?1 OR to_user_id = ?1
                    OR swap_request_id IN (
                        SELECT id FROM swap_requests
                        WHERE sender_id = ?1 OR receiver_id = ?1)",
                [id],
            )?;
            tx.execute(
                "DELETE FROM swap_requests WHERE sender_id = ?1 OR receiver_id = ?1",
                [id],
            )?;
            tx.execute("DELETE FROM user_skills_offered WHERE user_id = ?1", [id])?;
            tx.execute("DELETE FROM user_skills_wanted WHERE user_id = ?1", [id])?;
            tx.execute("DELETE FROM refresh_tokens WHERE user_id = ?1", [id])?;
            let n = tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
            tx.commit()?;
            if n == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> StoreResult<Option<UserRow>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"))?;
    stmt.query_row([value], user_from_row).optional()
}

fn user_from_row(row: &rusqlite::Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        name: row.get(3)?,
        password: row.get(4)?,
        location: row.get(5)?,
        availability: row.get(6)?,
        is_public: row.get(7)?,
        is_admin: row.get(8)?,
        created_at: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{mk_skill, mk_swap, mk_user};

    #[test]
    fn create_and_fetch_user() {
        let db = Database::open_in_memory().unwrap();
        let id = mk_user(&db, "alice");

        let row = db.get_user_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(row.id, id);
        assert_eq!(row.username, "alice");
        assert!(row.is_public);
        assert!(!row.is_admin);
        assert!(db.get_user_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_conflicts() {
        let db = Database::open_in_memory().unwrap();
        mk_user(&db, "alice");

        let err = db
            .create_user("x", "alice2", "alice@example.com", "Alice", "h")
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(msg) if msg.contains("email")));

        let err = db
            .create_user("y", "alice", "other@example.com", "Alice", "h")
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(msg) if msg.contains("username")));
    }

    #[test]
    fn partial_profile_update() {
        let db = Database::open_in_memory().unwrap();
        let id = mk_user(&db, "alice");

        db.update_profile(
            &id,
            &ProfileChanges {
                location: Some(Some("Berlin")),
                is_public: Some(false),
                ..ProfileChanges::default()
            },
        )
        .unwrap();

        let row = db.get_user_by_id(&id).unwrap().unwrap();
        assert_eq!(row.location.as_deref(), Some("Berlin"));
        assert!(!row.is_public);
        // untouched fields survive
        assert_eq!(row.name, "alice");
    }

    #[test]
    fn explicit_null_clears_nullable_fields() {
        let db = Database::open_in_memory().unwrap();
        let id = mk_user(&db, "alice");
        db.update_profile(
            &id,
            &ProfileChanges {
                location: Some(Some("Berlin")),
                availability: Some(Some("weekends")),
                ..ProfileChanges::default()
            },
        )
        .unwrap();

        // absent leaves the column alone
        db.update_profile(
            &id,
            &ProfileChanges {
                name: Some("Alice B"),
                ..ProfileChanges::default()
            },
        )
        .unwrap();
        let row = db.get_user_by_id(&id).unwrap().unwrap();
        assert_eq!(row.location.as_deref(), Some("Berlin"));
        assert_eq!(row.availability.as_deref(), Some("weekends"));

        // explicit null wipes it
        db.update_profile(
            &id,
            &ProfileChanges {
                location: Some(None),
                ..ProfileChanges::default()
            },
        )
        .unwrap();
        let row = db.get_user_by_id(&id).unwrap().unwrap();
        assert_eq!(row.location, None);
        assert_eq!(row.availability.as_deref(), Some("weekends"));
    }

    #[test]
    fn skill_sets_are_replaced_wholesale() {
        let db = Database::open_in_memory().unwrap();
        let id = mk_user(&db, "alice");
        let python = mk_skill(&db, "Python");
        let guitar = mk_skill(&db, "Guitar");

        db.set_user_skills(&id, SkillSet::Offered, &[python.clone(), guitar.clone()])
            .unwrap();
        db.set_user_skills(&id, SkillSet::Offered, &[guitar.clone()])
            .unwrap();

        let offered = db.get_user_skills(&id, SkillSet::Offered).unwrap();
        assert_eq!(offered.len(), 1);
        assert_eq!(offered[0].name, "Guitar");
        assert!(db.get_user_skills(&id, SkillSet::Wanted).unwrap().is_empty());
    }

    #[test]
    fn unknown_skill_id_is_invalid() {
        let db = Database::open_in_memory().unwrap();
        let id = mk_user(&db, "alice");
        let err = db
            .set_user_skills(&id, SkillSet::Wanted, &["missing".into()])
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[test]
    fn directory_excludes_caller_and_private_users() {
        let db = Database::open_in_memory().unwrap();
        let alice = mk_user(&db, "alice");
        let bob = mk_user(&db, "bob");
        let carol = mk_user(&db, "carol");
        db.update_profile(
            &carol,
            &ProfileChanges {
                is_public: Some(false),
                ..ProfileChanges::default()
            },
        )
        .unwrap();

        let listed = db.list_public_users(&alice, None).unwrap();
        let ids: Vec<_> = listed.iter().map(|u| u.id.clone()).collect();
        assert_eq!(ids, vec![bob.clone()]);
        assert!(!ids.contains(&alice));
    }

    #[test]
    fn directory_skill_filter_is_case_insensitive_substring() {
        let db = Database::open_in_memory().unwrap();
        let alice = mk_user(&db, "alice");
        let bob = mk_user(&db, "bob");
        let carol = mk_user(&db, "carol");
        let dave = mk_user(&db, "dave");
        let python = mk_skill(&db, "Python");
        let guitar = mk_skill(&db, "Guitar");
        let cooking = mk_skill(&db, "Cooking");

        // bob and carol are involved in a Guitar swap; dave only in Cooking
        mk_swap(&db, &bob, &carol, &python, &guitar);
        mk_swap(&db, &dave, &bob, &cooking, &python);

        let listed = db.list_public_users(&alice, Some("guit")).unwrap();
        let names: Vec<_> = listed.iter().map(|u| u.username.clone()).collect();
        assert_eq!(names, vec!["bob", "carol"]);

        // caller excluded even when they match the filter
        let listed = db.list_public_users(&bob, Some("guit")).unwrap();
        let names: Vec<_> = listed.iter().map(|u| u.username.clone()).collect();
        assert_eq!(names, vec!["carol"]);
    }

    #[test]
    fn deleting_a_user_cascades_to_swaps_and_feedback() {
        let db = Database::open_in_memory().unwrap();
        let alice = mk_user(&db, "alice");
        let bob = mk_user(&db, "bob");
        let python = mk_skill(&db, "Python");
        let guitar = mk_skill(&db, "Guitar");

        let swap = mk_swap(&db, &alice, &bob, &python, &guitar);
        db.act_on_swap(&swap, &bob, skillswap_types::models::SwapStatus::Accepted)
            .unwrap();
        db.create_feedback("f1", &swap, &alice, &bob, 5, None).unwrap();

        db.delete_user(&alice).unwrap();

        assert!(db.get_user_by_id(&alice).unwrap().is_none());
        assert!(db.list_swaps_for_user(&bob).unwrap().is_empty());
        assert!(db.list_feedback_for_user(&bob).unwrap().is_empty());
        // unrelated rows survive
        assert!(db.get_user_by_id(&bob).unwrap().is_some());
    }
}
