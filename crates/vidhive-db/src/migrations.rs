use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              TEXT PRIMARY KEY,
            username        TEXT NOT NULL UNIQUE,
            email           TEXT NOT NULL UNIQUE,
            full_name       TEXT NOT NULL,
            avatar          TEXT NOT NULL,
            cover_image     TEXT,
            password        TEXT NOT NULL,
            refresh_token   TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS toggle_relations (
            id          TEXT PRIMARY KEY,
            subject_id  TEXT NOT NULL REFERENCES users(id),
            target_id   TEXT NOT NULL,
            kind        TEXT NOT NULL
                        CHECK (kind IN ('video', 'comment', 'tweet', 'channel')),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(subject_id, target_id, kind)
        );

        CREATE INDEX IF NOT EXISTS idx_relations_target
            ON toggle_relations(target_id, kind);

        CREATE INDEX IF NOT EXISTS idx_relations_subject
            ON toggle_relations(subject_id, kind);

        CREATE TABLE IF NOT EXISTS watch_history (
            user_id     TEXT NOT NULL REFERENCES users(id),
            video_id    TEXT NOT NULL,
            watched_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(user_id, video_id)
        );

        CREATE INDEX IF NOT EXISTS idx_watch_history_user
            ON watch_history(user_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
