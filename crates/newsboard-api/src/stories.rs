use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{Method, StatusCode},
    response::IntoResponse,
};
use chrono::NaiveDate;
use tracing::{info, warn};

use newsboard_db::StoryFilter;
use newsboard_db::models::NewStory;
use newsboard_types::api::{CreateStoryRequest, StoriesResponse, StoryQuery, StoryView, WILDCARD};
use newsboard_types::models::{
    Category, MAX_DETAILS_LEN, MAX_HEADLINE_LEN, Region, STORY_DATE_DISPLAY_FORMAT,
    STORY_DATE_FORMAT, Story,
};

use crate::error::{ApiError, run_blocking};
use crate::session::SessionContext;
use crate::state::AppState;

/// A create request that passed validation.
#[derive(Debug)]
struct ValidStory {
    headline: String,
    category: Category,
    region: Region,
    details: String,
}

fn required(field: &str, value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::bad_request(format!("Missing required field '{}'.", field))),
    }
}

fn validate(req: CreateStoryRequest) -> Result<ValidStory, ApiError> {
    let headline = required("headline", req.headline)?;
    let category = required("category", req.category)?;
    let region = required("region", req.region)?;
    let details = required("details", req.details)?;

    if headline.chars().count() > MAX_HEADLINE_LEN {
        return Err(ApiError::bad_request(format!(
            "Headline is limited to {} characters.",
            MAX_HEADLINE_LEN
        )));
    }
    if details.chars().count() > MAX_DETAILS_LEN {
        return Err(ApiError::bad_request(format!(
            "Details are limited to {} characters.",
            MAX_DETAILS_LEN
        )));
    }

    Ok(ValidStory {
        headline,
        category: category.parse().map_err(|e| ApiError::bad_request(format!("{}.", e)))?,
        region: region.parse().map_err(|e| ApiError::bad_request(format!("{}.", e)))?,
        details,
    })
}

/// POST /api/stories
pub async fn create_story(
    State(state): State<AppState>,
    session: SessionContext,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let req: CreateStoryRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON payload: {}.", e)))?;
    let story = validate(req)?;

    let db = state.db.clone();
    let author = session.username.clone();
    let today = chrono::Utc::now().date_naive();
    let id = run_blocking("story insert", move || {
        if db.get_author(&author)?.is_none() {
            return Ok(None);
        }
        let id = db.insert_story(&NewStory {
            headline: &story.headline,
            category: story.category.code(),
            region: story.region.code(),
            author: &author,
            date: today,
            details: &story.details,
        })?;
        Ok(Some(id))
    })
    .await?
    .ok_or_else(|| {
        warn!("Session user '{}' has no author record", session.username);
        ApiError::unavailable("Cannot add story: no author record for this account.")
    })?;

    info!("Story {} posted by {}", id, session.username);
    Ok((StatusCode::CREATED, format!("Story {} added successfully.", id)))
}

/// `None` when the parameter is the wildcard (or blank).
fn concrete(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty() && value != WILDCARD).then_some(value)
}

/// Dates are ISO `YYYY-MM-DD`; the `DD/MM/YYYY` form used in responses is
/// accepted too.
fn parse_story_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, STORY_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(value, STORY_DATE_DISPLAY_FORMAT))
        .map_err(|_| {
            ApiError::bad_request(format!(
                "Invalid story_date '{}'. Use YYYY-MM-DD, DD/MM/YYYY or '*'.",
                value
            ))
        })
}

/// Translate list parameters into a filter. Category and region match by
/// exact code; long forms are normalized, anything else is compared verbatim
/// and simply matches nothing.
pub fn build_filter(query: &StoryQuery) -> Result<StoryFilter, ApiError> {
    let mut filter = StoryFilter::new();

    if let Some(cat) = concrete(&query.story_cat) {
        let code = cat.parse::<Category>().map(|c| c.code().to_string()).unwrap_or_else(|_| cat.to_string());
        filter = filter.category(code);
    }
    if let Some(region) = concrete(&query.story_region) {
        let code = region.parse::<Region>().map(|r| r.code().to_string()).unwrap_or_else(|_| region.to_string());
        filter = filter.region(code);
    }
    if let Some(date) = concrete(&query.story_date) {
        filter = filter.since(parse_story_date(date)?);
    }

    Ok(filter)
}

/// GET /api/stories?story_cat=..&story_region=..&story_date=..
pub async fn list_stories(
    State(state): State<AppState>,
    query: Result<Query<StoryQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(format!("Invalid query: {}.", e)))?;
    let filter = build_filter(&query)?;

    let db = state.db.clone();
    let stories = run_blocking("story list", move || {
        db.list_stories(&filter)?
            .into_iter()
            .map(Story::try_from)
            .collect::<anyhow::Result<Vec<_>>>()
    })
    .await?;

    if stories.is_empty() {
        return Err(ApiError::NotFound("No stories found.".into()));
    }

    Ok(Json(StoriesResponse {
        stories: stories.into_iter().map(StoryView::from).collect(),
    }))
}

/// Any method other than GET or POST on /api/stories.
pub async fn stories_wrong_method() -> ApiError {
    ApiError::bad_request("Bad request method.")
}

/// DELETE /api/stories/{key}
///
/// Existence and ownership are checked before the method, so a non-DELETE
/// request for someone else's story still answers 403.
pub async fn delete_story(
    State(state): State<AppState>,
    method: Method,
    session: SessionContext,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let not_found = || ApiError::NotFound("Not found.".into());
    let id: i64 = key.parse().map_err(|_| not_found())?;

    let db = state.db.clone();
    let row = run_blocking("story lookup", move || db.get_story(id)).await?.ok_or_else(not_found)?;

    if row.author != session.username {
        warn!("{} tried to delete story {} owned by {}", session.username, id, row.author);
        return Err(ApiError::Forbidden("You may only delete your own stories.".into()));
    }

    if method != Method::DELETE {
        return Err(ApiError::unavailable("Could not delete, server unable to process request."));
    }

    let db = state.db.clone();
    let author = session.username.clone();
    let removed = run_blocking("story delete", move || db.delete_story(id, &author)).await?;
    if !removed {
        // Deleted between the lookup and now
        return Err(not_found());
    }

    info!("Story {} deleted by {}", id, session.username);
    Ok((StatusCode::OK, "Story deleted successfully."))
}
