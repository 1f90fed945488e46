//! Author administration. Authors are not created over HTTP; the server
//! binary exposes these as subcommands.

use newsboard_db::Database;
use newsboard_types::models::{Author, MAX_AUTHOR_FIELD_LEN, is_slug};
use tracing::info;

use crate::auth::hash_password;

#[derive(Debug, thiserror::Error)]
pub enum AuthorError {
    #[error("username must be 1-{max} characters without whitespace", max = MAX_AUTHOR_FIELD_LEN)]
    InvalidUsername,
    #[error("name must be a slug (letters, digits, '_' or '-') of at most {max} characters", max = MAX_AUTHOR_FIELD_LEN)]
    InvalidName,
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("username '{0}' is already registered")]
    UsernameTaken(String),
    #[error("no author named '{0}'")]
    UnknownAuthor(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub fn register_author(db: &Database, username: &str, name: &str, password: &str) -> Result<Author, AuthorError> {
    if username.is_empty()
        || username.chars().count() > MAX_AUTHOR_FIELD_LEN
        || username.chars().any(char::is_whitespace)
    {
        return Err(AuthorError::InvalidUsername);
    }
    if !is_slug(name) || name.chars().count() > MAX_AUTHOR_FIELD_LEN {
        return Err(AuthorError::InvalidName);
    }
    if password.is_empty() {
        return Err(AuthorError::EmptyPassword);
    }
    if db.get_author(username)?.is_some() {
        return Err(AuthorError::UsernameTaken(username.to_string()));
    }

    let hash = hash_password(password)?;
    db.create_author(username, name, &hash)?;

    info!("Registered author {}", username);
    Ok(Author {
        username: username.to_string(),
        name: name.to_string(),
    })
}

/// Remove an author together with their stories and sessions.
pub fn remove_author(db: &Database, username: &str) -> Result<(), AuthorError> {
    if !db.delete_author(username)? {
        return Err(AuthorError::UnknownAuthor(username.to_string()));
    }
    info!("Removed author {}", username);
    Ok(())
}

pub fn list_authors(db: &Database) -> Result<Vec<Author>, AuthorError> {
    Ok(db.list_authors()?.into_iter().map(Author::from).collect())
}
