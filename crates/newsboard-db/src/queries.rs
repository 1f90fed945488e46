use crate::Database;
use crate::filter::StoryFilter;
use crate::models::{AuthorRow, NewStory, SessionRow, StoryRow};
use anyhow::Result;
use chrono::{DateTime, Utc};
use newsboard_types::models::STORY_DATE_FORMAT;
use rusqlite::Connection;

/// Timestamps are stored the way SQLite's `datetime('now')` renders them, so
/// plain string comparison orders them correctly.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

impl Database {
    // -- Authors --

    pub fn create_author(&self, username: &str, name: &str, password_hash: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO authors (username, name, password) VALUES (?1, ?2, ?3)",
                (username, name, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_author(&self, username: &str) -> Result<Option<AuthorRow>> {
        self.with_conn(|conn| query_author(conn, username))
    }

    pub fn list_authors(&self) -> Result<Vec<AuthorRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT username, name, password, created_at FROM authors ORDER BY username",
            )?;
            let rows = stmt
                .query_map([], author_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Remove an author. Their stories and sessions go with them.
    pub fn delete_author(&self, username: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute("DELETE FROM authors WHERE username = ?1", [username])?;
            Ok(removed > 0)
        })
    }

    // -- Stories --

    /// Insert a story and return its assigned id.
    pub fn insert_story(&self, story: &NewStory<'_>) -> Result<i64> {
        let date = story.date.format(STORY_DATE_FORMAT).to_string();
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO stories (headline, category, region, author, date, details)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    story.headline,
                    story.category,
                    story.region,
                    story.author,
                    date,
                    story.details,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_story(&self, id: i64) -> Result<Option<StoryRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, headline, category, region, author, date, details
                 FROM stories WHERE id = ?1",
                [id],
                story_from_row,
            )
            .optional()
        })
    }

    pub fn list_stories(&self, filter: &StoryFilter) -> Result<Vec<StoryRow>> {
        let (where_clause, params) = filter.to_sql();
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT id, headline, category, region, author, date, details
                 FROM stories{}
                 ORDER BY id",
                where_clause
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(params), story_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Delete a story only if `author` owns it. Returns whether a row went away.
    pub fn delete_story(&self, id: i64, author: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute(
                "DELETE FROM stories WHERE id = ?1 AND author = ?2",
                rusqlite::params![id, author],
            )?;
            Ok(removed > 0)
        })
    }

    // -- Sessions --

    pub fn insert_session(&self, token: &str, username: &str, expires_at: DateTime<Utc>) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO sessions (token, username, expires_at) VALUES (?1, ?2, ?3)",
                (token, username, timestamp(expires_at)),
            )?;
            Ok(())
        })
    }

    /// Look up a session that has not expired as of `now`.
    pub fn get_live_session(&self, token: &str, now: DateTime<Utc>) -> Result<Option<SessionRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT token, username, created_at, expires_at
                 FROM sessions WHERE token = ?1 AND expires_at > ?2",
                (token, timestamp(now)),
                |row| {
                    Ok(SessionRow {
                        token: row.get(0)?,
                        username: row.get(1)?,
                        created_at: row.get(2)?,
                        expires_at: row.get(3)?,
                    })
                },
            )
            .optional()
        })
    }

    pub fn delete_session(&self, token: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?;
            Ok(removed > 0)
        })
    }

    pub fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", [timestamp(now)])?;
            Ok(removed)
        })
    }
}

fn query_author(conn: &Connection, username: &str) -> Result<Option<AuthorRow>> {
    let mut stmt = conn
        .prepare("SELECT username, name, password, created_at FROM authors WHERE username = ?1")?;

    stmt.query_row([username], author_from_row).optional()
}

fn author_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuthorRow> {
    Ok(AuthorRow {
        username: row.get(0)?,
        name: row.get(1)?,
        password: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn story_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoryRow> {
    Ok(StoryRow {
        id: row.get(0)?,
        headline: row.get(1)?,
        category: row.get(2)?,
        region: row.get(3)?,
        author: row.get(4)?,
        date: row.get(5)?,
        details: row.get(6)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
