use anyhow::Result;
use rusqlite::{Connection, Row, params};

use crate::models::UserRow;
use crate::{Database, OptionalExt, is_unique_violation};

const USER_COLUMNS: &str = "id, username, email, full_name, avatar, cover_image, \
     password, refresh_token, created_at, updated_at";

impl Database {
    // -- Users --

    /// Inserts a new user. Username and email are expected pre-trimmed and
    /// lower-cased by the caller. Returns `false` when either collides with
    /// an existing row — the UNIQUE constraints decide, so two racing
    /// registrations cannot both succeed.
    #[allow(clippy::too_many_arguments)]
    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        full_name: &str,
        avatar: &str,
        cover_image: Option<&str>,
        password_hash: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, username, email, full_name, avatar, cover_image, password)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![id, username, email, full_name, avatar, cover_image, password_hash],
            );
            match inserted {
                Ok(_) => Ok(true),
                Err(e) if is_unique_violation(&e) => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    /// Looks up by username or email. The caller lower-cases the identifier;
    /// both columns are stored folded.
    pub fn get_user_by_identifier(&self, identifier: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users WHERE username = ?1 OR email = ?1"
            );
            let mut stmt = conn.prepare(&sql)?;
            let row = stmt.query_row([identifier], user_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn update_password(&self, id: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET password = ?2, updated_at = datetime('now') WHERE id = ?1",
                params![id, password_hash],
            )?;
            Ok(())
        })
    }

    // -- Refresh token field --

    /// Sets or clears the stored refresh token unconditionally. Used at
    /// login (set) and logout / reuse revocation (clear). Idempotent.
    pub fn set_refresh_token(&self, id: &str, token: Option<&str>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET refresh_token = ?2, updated_at = datetime('now') WHERE id = ?1",
                params![id, token],
            )?;
            Ok(())
        })
    }

    /// Compare-and-swap on the stored refresh token. The WHERE clause is the
    /// serialization point for rotation: only the caller holding the current
    /// token value wins, even across server processes. Returns `true` when
    /// the swap was applied. A NULL stored token matches nothing, so a
    /// revoked session always loses.
    pub fn swap_refresh_token(&self, id: &str, expected: &str, new: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE users SET refresh_token = ?3, updated_at = datetime('now')
                 WHERE id = ?1 AND refresh_token = ?2",
                params![id, expected, new],
            )?;
            Ok(updated == 1)
        })
    }

    // -- Watch history --

    /// Records a watch. Re-watching moves the entry to the front; the
    /// delete+insert pair commits atomically.
    pub fn record_watch(&self, user_id: &str, video_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM watch_history WHERE user_id = ?1 AND video_id = ?2",
                params![user_id, video_id],
            )?;
            tx.execute(
                "INSERT INTO watch_history (user_id, video_id) VALUES (?1, ?2)",
                params![user_id, video_id],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Watched video ids, newest first. Rowid breaks same-second ties so the
    /// order is stable.
    pub fn watch_history(&self, user_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT video_id FROM watch_history WHERE user_id = ?1
                 ORDER BY watched_at DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map([user_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([value], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> std::result::Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        full_name: row.get(3)?,
        avatar: row.get(4)?,
        cover_image: row.get(5)?,
        password: row.get(6)?,
        refresh_token: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn user(db: &Database, name: &str, email: &str) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        assert!(
            db.create_user(&id, name, email, "Some One", "avatar.png", None, "hash")
                .unwrap()
        );
        id
    }

    #[test]
    fn duplicate_username_or_email_rejected_by_constraint() {
        let db = Database::open_in_memory().unwrap();
        user(&db, "alice", "alice@example.com");

        let id = uuid::Uuid::new_v4().to_string();
        let dup_name = db
            .create_user(&id, "alice", "other@example.com", "A", "a.png", None, "h")
            .unwrap();
        assert!(!dup_name);

        let id = uuid::Uuid::new_v4().to_string();
        let dup_email = db
            .create_user(&id, "alice2", "alice@example.com", "A", "a.png", None, "h")
            .unwrap();
        assert!(!dup_email);
    }

    #[test]
    fn identifier_lookup_matches_username_and_email() {
        let db = Database::open_in_memory().unwrap();
        let id = user(&db, "bob", "bob@example.com");

        let by_name = db.get_user_by_identifier("bob").unwrap().unwrap();
        let by_email = db.get_user_by_identifier("bob@example.com").unwrap().unwrap();
        assert_eq!(by_name.id, id);
        assert_eq!(by_email.id, id);
        assert!(db.get_user_by_identifier("nobody").unwrap().is_none());
    }

    #[test]
    fn refresh_token_swap_is_conditional() {
        let db = Database::open_in_memory().unwrap();
        let id = user(&db, "carol", "carol@example.com");

        db.set_refresh_token(&id, Some("tok-1")).unwrap();
        assert!(db.swap_refresh_token(&id, "tok-1", "tok-2").unwrap());
        // Old value no longer matches.
        assert!(!db.swap_refresh_token(&id, "tok-1", "tok-3").unwrap());

        // Cleared token matches nothing at all.
        db.set_refresh_token(&id, None).unwrap();
        assert!(!db.swap_refresh_token(&id, "tok-2", "tok-4").unwrap());
    }

    #[test]
    fn watch_history_is_newest_first_and_dedupes() {
        let db = Database::open_in_memory().unwrap();
        let id = user(&db, "dave", "dave@example.com");

        db.record_watch(&id, "v1").unwrap();
        db.record_watch(&id, "v2").unwrap();
        db.record_watch(&id, "v1").unwrap(); // re-watch moves to front

        assert_eq!(db.watch_history(&id).unwrap(), vec!["v1", "v2"]);
    }
}
