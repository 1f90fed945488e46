use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Longest headline a story may carry, in characters.
pub const MAX_HEADLINE_LEN: usize = 64;
/// Longest details text a story may carry, in characters.
pub const MAX_DETAILS_LEN: usize = 128;
/// Longest author username or name, in characters.
pub const MAX_AUTHOR_FIELD_LEN: usize = 30;

/// Story dates travel as `DD/MM/YYYY` in list responses.
pub const STORY_DATE_DISPLAY_FORMAT: &str = "%d/%m/%Y";
/// Story dates are stored and filtered as ISO calendar dates.
pub const STORY_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Politics,
    Art,
    Tech,
    Trivia,
}

impl Category {
    pub const ALL: [Category; 4] = [Self::Politics, Self::Art, Self::Tech, Self::Trivia];

    /// Code stored in the database and sent on the wire.
    pub fn code(self) -> &'static str {
        match self {
            Self::Politics => "pol",
            Self::Art => "art",
            Self::Tech => "tech",
            Self::Trivia => "trivia",
        }
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pol" | "politics" => Ok(Self::Politics),
            "art" => Ok(Self::Art),
            "tech" | "technology" => Ok(Self::Tech),
            "trivia" => Ok(Self::Trivia),
            _ => Err(UnknownVariant { kind: "category", value: s.to_string() }),
        }
    }
}

impl TryFrom<String> for Category {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.code().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Region {
    Uk,
    Europe,
    World,
}

impl Region {
    pub const ALL: [Region; 3] = [Self::Uk, Self::Europe, Self::World];

    pub fn code(self) -> &'static str {
        match self {
            Self::Uk => "uk",
            Self::Europe => "eu",
            Self::World => "w",
        }
    }
}

impl FromStr for Region {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uk" => Ok(Self::Uk),
            "eu" | "europe" => Ok(Self::Europe),
            "w" | "world" => Ok(Self::World),
            _ => Err(UnknownVariant { kind: "region", value: s.to_string() }),
        }
    }
}

impl TryFrom<String> for Region {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Region> for String {
    fn from(value: Region) -> Self {
        value.code().to_string()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A registered author. The password hash never leaves the db crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: i64,
    pub headline: String,
    pub category: Category,
    pub region: Region,
    pub author: String,
    pub date: NaiveDate,
    pub details: String,
}

/// Author names follow the slug rule: ASCII letters, digits, `_` and `-`.
pub fn is_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
