//! Database row types. These map directly to SQLite rows and are kept apart
//! from the newsboard-types models so the storage layer stays independent.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use newsboard_types::models::{Author, STORY_DATE_FORMAT, Story};

pub struct AuthorRow {
    pub username: String,
    pub name: String,
    /// Argon2 PHC string.
    pub password: String,
    pub created_at: String,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Self {
            username: row.username,
            name: row.name,
        }
    }
}

pub struct StoryRow {
    pub id: i64,
    pub headline: String,
    pub category: String,
    pub region: String,
    pub author: String,
    pub date: String,
    pub details: String,
}

impl TryFrom<StoryRow> for Story {
    type Error = anyhow::Error;

    fn try_from(row: StoryRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            category: row
                .category
                .parse()
                .with_context(|| format!("story {} has a corrupt category", row.id))?,
            region: row
                .region
                .parse()
                .with_context(|| format!("story {} has a corrupt region", row.id))?,
            date: NaiveDate::parse_from_str(&row.date, STORY_DATE_FORMAT)
                .with_context(|| format!("story {} has a corrupt date '{}'", row.id, row.date))?,
            headline: row.headline,
            author: row.author,
            details: row.details,
        })
    }
}

/// Values for a story about to be inserted; the id is assigned by SQLite.
pub struct NewStory<'a> {
    pub headline: &'a str,
    pub category: &'a str,
    pub region: &'a str,
    pub author: &'a str,
    pub date: NaiveDate,
    pub details: &'a str,
}

pub struct SessionRow {
    pub token: String,
    pub username: String,
    pub created_at: String,
    pub expires_at: String,
}
