use rusqlite::params;

use crate::{Database, OptionalExt, StoreError, StoreResult};

impl Database {
    /// Refresh tokens are stored as a sha256 digest, never in the clear.
    pub fn store_refresh_token(
        &self,
        token_hash: &str,
        user_id: &str,
        expires_at: &str,
    ) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO refresh_tokens (token_hash, user_id, expires_at) VALUES (?1, ?2, ?3)",
                params![token_hash, user_id, expires_at],
            )?;
            Ok(())
        })
    }

    /// Resolve a live (unrevoked, unexpired) refresh token to its user.
    pub fn lookup_refresh_token(&self, token_hash: &str, now: &str) -> StoreResult<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT user_id FROM refresh_tokens
                 WHERE token_hash = ?1 AND revoked = 0 AND expires_at > ?2",
                params![token_hash, now],
                |row| row.get(0),
            )
            .optional()
        })
    }

    /// Revoke on logout. Revoking an unknown or already-revoked token fails,
    /// which the API reports as a 400.
    pub fn revoke_refresh_token(&self, token_hash: &str) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE refresh_tokens SET revoked = 1 WHERE token_hash = ?1 AND revoked = 0",
                [token_hash],
            )?;
            if n == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::mk_user;

    const FAR_FUTURE: &str = "2999-01-01T00:00:00Z";
    const NOW: &str = "2026-01-01T00:00:00Z";

    #[test]
    fn live_token_resolves_to_its_user() {
        let db = Database::open_in_memory().unwrap();
        let alice = mk_user(&db, "alice");
        db.store_refresh_token("hash-a", &alice, FAR_FUTURE).unwrap();

        assert_eq!(
            db.lookup_refresh_token("hash-a", NOW).unwrap().as_deref(),
            Some(alice.as_str())
        );
        assert!(db.lookup_refresh_token("hash-b", NOW).unwrap().is_none());
    }

    #[test]
    fn expired_token_does_not_resolve() {
        let db = Database::open_in_memory().unwrap();
        let alice = mk_user(&db, "alice");
        db.store_refresh_token("hash-a", &alice, "2020-01-01T00:00:00Z")
            .unwrap();
        assert!(db.lookup_refresh_token("hash-a", NOW).unwrap().is_none());
    }

    #[test]
    fn revocation_is_single_shot() {
        let db = Database::open_in_memory().unwrap();
        let alice = mk_user(&db, "alice");
        db.store_refresh_token("hash-a", &alice, FAR_FUTURE).unwrap();

        db.revoke_refresh_token("hash-a").unwrap();
        assert!(db.lookup_refresh_token("hash-a", NOW).unwrap().is_none());

        let err = db.revoke_refresh_token("hash-a").unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        let err = db.revoke_refresh_token("never-stored").unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
