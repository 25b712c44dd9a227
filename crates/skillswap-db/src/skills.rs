use rusqlite::params;

use crate::models::SkillRow;
use crate::{Database, OptionalExt, StoreError, StoreResult, constraint_message};

impl Database {
    /// Skill names are unique, case-sensitively. Skills are immutable after
    /// creation.
    pub fn create_skill(&self, id: &str, name: &str) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO skills (id, name) VALUES (?1, ?2)",
                params![id, name],
            )
            .map_err(|e| match constraint_message(&e) {
                Some(_) => StoreError::Conflict("skill with this name already exists".into()),
                None => e.into(),
            })?;
            Ok(())
        })
    }

    /// Insert-if-missing, used by the seeding binary. Returns true when the
    /// skill was newly created.
    pub fn ensure_skill(&self, id: &str, name: &str) -> StoreResult<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "INSERT OR IGNORE INTO skills (id, name) VALUES (?1, ?2)",
                params![id, name],
            )?;
            Ok(n > 0)
        })
    }

    pub fn get_skill(&self, id: &str) -> StoreResult<Option<SkillRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, name FROM skills WHERE id = ?1",
                [id],
                |row| {
                    Ok(SkillRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()
        })
    }

    pub fn list_skills(&self) -> StoreResult<Vec<SkillRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM skills ORDER BY name")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(SkillRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::mk_skill;

    #[test]
    fn duplicate_name_conflicts() {
        let db = Database::open_in_memory().unwrap();
        mk_skill(&db, "Python");
        let err = db.create_skill("other-id", "Python").unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn name_uniqueness_is_case_sensitive() {
        let db = Database::open_in_memory().unwrap();
        mk_skill(&db, "Python");
        // different case is a different skill
        db.create_skill("other-id", "python").unwrap();
        assert_eq!(db.list_skills().unwrap().len(), 2);
    }

    #[test]
    fn ensure_skill_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.ensure_skill("a", "Cooking").unwrap());
        assert!(!db.ensure_skill("b", "Cooking").unwrap());
        assert_eq!(db.list_skills().unwrap().len(), 1);
    }
}
