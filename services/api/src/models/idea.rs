//! Idea models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::ApiError;

/// Estimated time stored when the submitter leaves it blank
pub const DEFAULT_ESTIMATED_TIME: &str = "1-3 days";
/// Author name used when neither the request nor the account provides one
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

const CONTENT_MISSING: &str = "Content for idea not filled correctly.";

/// How hard an idea is to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Parse a client-supplied difficulty, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Parse an optional client value, where blank means the default
    pub fn from_input(value: Option<&str>) -> Result<Self, ApiError> {
        match value.map(str::trim) {
            None | Some("") => Ok(Difficulty::default()),
            Some(value) => Self::parse(value).ok_or_else(|| {
                ApiError::BadRequest("Difficulty must be one of easy, medium, hard.".to_string())
            }),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author details embedded in an idea
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub github_url: String,
}

/// Idea entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub verified: bool,
    pub summary: String,
    pub description: String,
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
    pub estimated_time: String,
    pub tech_stack: Vec<String>,
    pub upvotes: i64,
    pub views: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspiration_link: Option<String>,
    pub author: Author,
    #[serde(rename = "user")]
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Idea {
    /// Whether `user_id` may modify this idea
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == Some(user_id)
    }
}

/// A list accepted either as a JSON array or as a comma-separated string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    List(Vec<String>),
    Csv(String),
}

impl StringList {
    /// Trim every entry and drop the empty ones
    pub fn normalize(self) -> Vec<String> {
        let entries: Vec<String> = match self {
            StringList::List(items) => items,
            StringList::Csv(text) => text.split(',').map(str::to_string).collect(),
        };

        entries
            .iter()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Author fields as submitted by the client
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorInput {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub github_url: Option<String>,
}

/// Request body for creating, replacing or patching an idea
///
/// Unknown fields (`verified`, counters, timestamps) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaInput {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Option<StringList>,
    pub difficulty: Option<String>,
    pub estimated_time: Option<String>,
    pub tech_stack: Option<StringList>,
    pub inspiration_link: Option<String>,
    pub author: Option<AuthorInput>,
}

/// Validated, normalised idea content ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct IdeaDraft {
    pub title: String,
    pub summary: String,
    pub description: String,
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
    pub estimated_time: String,
    pub tech_stack: Vec<String>,
    pub inspiration_link: Option<String>,
    pub author: Author,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>) -> Result<String, ApiError> {
    trimmed(value).ok_or_else(|| ApiError::BadRequest(CONTENT_MISSING.to_string()))
}

fn author_from_input(input: Option<AuthorInput>, fallback_name: &str) -> Author {
    let input = input.unwrap_or_default();
    let name = trimmed(input.name)
        .or_else(|| trimmed(Some(fallback_name.to_string())))
        .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string());

    Author {
        name,
        avatar_url: trimmed(input.avatar_url).unwrap_or_default(),
        github_url: trimmed(input.github_url).unwrap_or_default(),
    }
}

impl IdeaDraft {
    /// Build a complete idea from a create or full-replace request
    ///
    /// `author_name` is used when the request carries no author name.
    pub fn from_input(input: IdeaInput, author_name: &str) -> Result<Self, ApiError> {
        let title = required(input.title)?;
        let summary = required(input.summary)?;
        let description = required(input.description)?;
        let difficulty = Difficulty::from_input(input.difficulty.as_deref())?;

        Ok(Self {
            title,
            summary,
            description,
            tags: input.tags.map(StringList::normalize).unwrap_or_default(),
            difficulty,
            estimated_time: trimmed(input.estimated_time)
                .unwrap_or_else(|| DEFAULT_ESTIMATED_TIME.to_string()),
            tech_stack: input
                .tech_stack
                .map(StringList::normalize)
                .unwrap_or_default(),
            inspiration_link: trimmed(input.inspiration_link),
            author: author_from_input(input.author, author_name),
        })
    }

    /// Apply a partial update on top of an existing idea
    ///
    /// Absent fields keep their stored value; present fields follow the same
    /// rules as [`IdeaDraft::from_input`]. An empty `inspirationLink` clears it.
    pub fn from_patch(existing: &Idea, input: IdeaInput) -> Result<Self, ApiError> {
        let keep_or_require = |value: Option<String>, current: &str| match value {
            None => Ok(current.to_string()),
            Some(value) => required(Some(value)),
        };

        let author = match input.author {
            None => existing.author.clone(),
            Some(author) => {
                let mut merged = existing.author.clone();
                if let Some(name) = trimmed(author.name) {
                    merged.name = name;
                }
                if let Some(avatar_url) = author.avatar_url {
                    merged.avatar_url = avatar_url.trim().to_string();
                }
                if let Some(github_url) = author.github_url {
                    merged.github_url = github_url.trim().to_string();
                }
                merged
            }
        };

        Ok(Self {
            title: keep_or_require(input.title, &existing.title)?,
            summary: keep_or_require(input.summary, &existing.summary)?,
            description: keep_or_require(input.description, &existing.description)?,
            tags: input
                .tags
                .map(StringList::normalize)
                .unwrap_or_else(|| existing.tags.clone()),
            difficulty: match input.difficulty {
                None => existing.difficulty,
                Some(value) => Difficulty::from_input(Some(&value))?,
            },
            estimated_time: match input.estimated_time {
                None => existing.estimated_time.clone(),
                Some(value) => trimmed(Some(value))
                    .unwrap_or_else(|| DEFAULT_ESTIMATED_TIME.to_string()),
            },
            tech_stack: input
                .tech_stack
                .map(StringList::normalize)
                .unwrap_or_else(|| existing.tech_stack.clone()),
            inspiration_link: match input.inspiration_link {
                None => existing.inspiration_link.clone(),
                Some(value) => trimmed(Some(value)),
            },
            author,
        })
    }
}

/// Sort orders accepted by the idea listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Upvotes,
    Views,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "newest" => Some(SortOrder::Newest),
            "oldest" => Some(SortOrder::Oldest),
            "upvotes" | "popular" => Some(SortOrder::Upvotes),
            "views" => Some(SortOrder::Views),
            _ => None,
        }
    }

    /// SQL `ORDER BY` clause for this order
    pub fn order_by(self) -> &'static str {
        match self {
            SortOrder::Newest => "created_at DESC, id DESC",
            SortOrder::Oldest => "created_at ASC, id ASC",
            SortOrder::Upvotes => "upvotes DESC, created_at DESC",
            SortOrder::Views => "views DESC, created_at DESC",
        }
    }
}

/// Query parameters for idea listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdeaQuery {
    /// Only ideas carrying this tag (case-insensitive)
    pub tag: Option<String>,
    /// Only ideas of this difficulty
    pub difficulty: Option<String>,
    /// Case-insensitive substring of title or summary
    pub search: Option<String>,
    /// Only ideas owned by this user
    pub user: Option<Uuid>,
    /// newest (default), oldest, upvotes, views
    pub sort: Option<String>,
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
}

/// Validated listing filter
#[derive(Debug, Clone, PartialEq)]
pub struct IdeaFilter {
    pub tag: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub search: Option<String>,
    pub user: Option<Uuid>,
    pub sort: SortOrder,
    pub page: u32,
    pub limit: u32,
}

/// Largest page the listing returns
pub const MAX_PAGE_SIZE: u32 = 100;

impl IdeaFilter {
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

impl TryFrom<IdeaQuery> for IdeaFilter {
    type Error = ApiError;

    fn try_from(query: IdeaQuery) -> Result<Self, Self::Error> {
        let difficulty = match trimmed(query.difficulty) {
            None => None,
            Some(value) => Some(Difficulty::parse(&value).ok_or_else(|| {
                ApiError::BadRequest("Difficulty must be one of easy, medium, hard.".to_string())
            })?),
        };

        let sort = match trimmed(query.sort) {
            None => SortOrder::default(),
            Some(value) => SortOrder::parse(&value).ok_or_else(|| {
                ApiError::BadRequest(
                    "Sort must be one of newest, oldest, upvotes, views.".to_string(),
                )
            })?,
        };

        Ok(Self {
            tag: trimmed(query.tag),
            difficulty,
            search: trimmed(query.search),
            user: query.user,
            sort,
            page: query.page.unwrap_or(1).max(1),
            limit: query.limit.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        })
    }
}

/// `?limit=` for the featured and latest listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}

impl LimitQuery {
    /// Requested limit, defaulted and capped at 20
    pub fn resolve(&self, default: u32) -> i64 {
        i64::from(self.limit.unwrap_or(default).clamp(1, 20))
    }
}

/// An idea with its effort score, as listed on the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct ScoredIdea {
    #[serde(flatten)]
    pub idea: Idea,
    pub score: f64,
}

/// Aggregate counters over a user's ideas
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaCounts {
    pub total_ideas: i64,
    pub total_upvotes: i64,
    pub total_views: i64,
    pub avg_upvotes: f64,
}

/// How often a tag appears across a user's ideas
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: i64,
}

/// Short form of an idea for the dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentIdea {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub upvotes: i64,
}

/// Dashboard summary for the current user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaSummary {
    pub counts: IdeaCounts,
    pub top_tags: Vec<TagCount>,
    pub recent_ideas: Vec<RecentIdea>,
}
