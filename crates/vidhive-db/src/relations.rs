use anyhow::Result;
use rusqlite::params;

use crate::Database;

impl Database {
    // -- Toggle relations --

    /// Flips the relation for `(subject_id, target_id, kind)` and returns the
    /// new active state. One transaction: DELETE the exact tuple first — if a
    /// row went away the relation is now off. Otherwise INSERT OR IGNORE; an
    /// ignored insert means a concurrent toggler created the row between our
    /// two statements, so the relation is on either way. The UNIQUE
    /// constraint is what guarantees at most one row per tuple — there is no
    /// read-then-branch window.
    pub fn toggle_relation(
        &self,
        id: &str,
        subject_id: &str,
        target_id: &str,
        kind: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;

            let deleted = tx.execute(
                "DELETE FROM toggle_relations
                 WHERE subject_id = ?1 AND target_id = ?2 AND kind = ?3",
                params![subject_id, target_id, kind],
            )?;

            let active = if deleted > 0 {
                false
            } else {
                tx.execute(
                    "INSERT OR IGNORE INTO toggle_relations (id, subject_id, target_id, kind)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![id, subject_id, target_id, kind],
                )?;
                true
            };

            tx.commit()?;
            Ok(active)
        })
    }

    pub fn relation_exists(&self, subject_id: &str, target_id: &str, kind: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT COUNT(*) FROM toggle_relations
                 WHERE subject_id = ?1 AND target_id = ?2 AND kind = ?3",
            )?;
            let count: i64 = stmt.query_row(params![subject_id, target_id, kind], |row| row.get(0))?;
            Ok(count > 0)
        })
    }

    // -- Aggregates --

    /// Relations of `kind` pointing at `target_id`. For kind=channel this is
    /// the channel's subscriber count. Always computed fresh from the
    /// relation rows.
    pub fn count_relations_to(&self, target_id: &str, kind: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM toggle_relations WHERE target_id = ?1 AND kind = ?2",
                params![target_id, kind],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
    }

    /// Relations of `kind` made by `subject_id`. For kind=channel this is
    /// how many channels the subject subscribes to.
    pub fn count_relations_from(&self, subject_id: &str, kind: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM toggle_relations WHERE subject_id = ?1 AND kind = ?2",
                params![subject_id, kind],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
    }

    /// Target ids of `subject_id`'s relations of `kind`, newest first with
    /// rowid as the stable tiebreak. Backs liked-videos/comments/tweets and
    /// the subscribed-channels list.
    pub fn relation_targets(&self, subject_id: &str, kind: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT target_id FROM toggle_relations
                 WHERE subject_id = ?1 AND kind = ?2
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map(params![subject_id, kind], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(rows)
        })
    }
}
