use serde::{Deserialize, Serialize};

use crate::models::{STORY_DATE_DISPLAY_FORMAT, Story};

/// Sentinel meaning "do not filter on this field".
pub const WILDCARD: &str = "*";

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "sessionid";

// -- Auth --

/// `application/x-www-form-urlencoded` login payload. Both fields are optional
/// so that a missing credential is reported as a failed login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

// -- Stories --

/// JSON body for posting a story. Every field is required and non-empty;
/// they are optional here so the handler can report which one is missing.
#[derive(Debug, Default, Deserialize)]
pub struct CreateStoryRequest {
    pub headline: Option<String>,
    pub category: Option<String>,
    pub region: Option<String>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoryQuery {
    #[serde(default = "wildcard")]
    pub story_cat: String,
    #[serde(default = "wildcard")]
    pub story_region: String,
    #[serde(default = "wildcard")]
    pub story_date: String,
}

impl Default for StoryQuery {
    fn default() -> Self {
        Self {
            story_cat: wildcard(),
            story_region: wildcard(),
            story_date: wildcard(),
        }
    }
}

fn wildcard() -> String {
    WILDCARD.to_string()
}

/// One story as it appears in a list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryView {
    pub key: String,
    pub headline: String,
    pub story_cat: String,
    pub story_region: String,
    pub author: String,
    pub story_date: String,
    pub story_details: String,
}

impl From<Story> for StoryView {
    fn from(story: Story) -> Self {
        Self {
            key: story.id.to_string(),
            headline: story.headline,
            story_cat: story.category.code().to_string(),
            story_region: story.region.code().to_string(),
            author: story.author,
            story_date: story.date.format(STORY_DATE_DISPLAY_FORMAT).to_string(),
            story_details: story.details,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoriesResponse {
    pub stories: Vec<StoryView>,
}
