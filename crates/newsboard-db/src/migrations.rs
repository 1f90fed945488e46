use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (authors, stories, sessions)");
        conn.execute_batch(
            "
            CREATE TABLE authors (
                username    TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                password    TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE stories (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                headline    TEXT NOT NULL CHECK (length(headline) <= 64),
                category    TEXT NOT NULL CHECK (category IN ('pol', 'art', 'tech', 'trivia')),
                region      TEXT NOT NULL CHECK (region IN ('uk', 'eu', 'w')),
                author      TEXT NOT NULL REFERENCES authors(username) ON DELETE CASCADE,
                date        TEXT NOT NULL DEFAULT (date('now')),
                details     TEXT NOT NULL CHECK (length(details) <= 128)
            );

            CREATE INDEX idx_stories_filter ON stories(category, region, date);
            CREATE INDEX idx_stories_author ON stories(author);

            CREATE TABLE sessions (
                token       TEXT PRIMARY KEY,
                username    TEXT NOT NULL REFERENCES authors(username) ON DELETE CASCADE,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                expires_at  TEXT NOT NULL
            );

            CREATE INDEX idx_sessions_expiry ON sessions(expires_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
