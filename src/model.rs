//! Data models for the Telegram link directory
//!
//! Stored records (users, categories, links, likes, comments, sessions) are
//! serialized to JSON inside redb. The view types at the bottom of this module
//! are what handlers send back to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Link types offered on the upload and edit forms
pub const LINK_TYPES: &[(&str, &str)] = &[("channel", "Channel"), ("group", "Group")];

/// Closed set of category codes a link can be filed under
pub const CATEGORY_CHOICES: &[(&str, &str)] = &[
    // Technology & Programming
    ("tech", "Technology"),
    ("programming", "Programming"),
    ("web_dev", "Web Development"),
    ("mobile_dev", "Mobile Development"),
    ("ai_ml", "AI & Machine Learning"),
    ("cybersecurity", "Cybersecurity"),
    ("blockchain", "Blockchain & Crypto"),
    // Business & Finance
    ("business", "Business"),
    ("entrepreneurship", "Entrepreneurship"),
    ("marketing", "Marketing"),
    ("finance", "Finance & Investing"),
    ("crypto_trading", "Crypto Trading"),
    // Education & Learning
    ("education", "Education"),
    ("language", "Language Learning"),
    ("programming_courses", "Programming Courses"),
    // Entertainment
    ("entertainment", "Entertainment"),
    ("gaming", "Gaming"),
    ("movies_tv", "Movies & TV Shows"),
    ("music", "Music"),
    ("anime", "Anime & Manga"),
    // Social & Community
    ("social", "Social"),
    ("dating", "Dating"),
    ("local", "Local Communities"),
    // News & Media
    ("news", "News"),
    ("politics", "Politics"),
    ("tech_news", "Tech News"),
    // Health & Wellness
    ("health", "Health & Wellness"),
    ("fitness", "Fitness"),
    ("mental_health", "Mental Health"),
    // Hobbies & Interests
    ("travel", "Travel"),
    ("food", "Food & Cooking"),
    ("sports", "Sports"),
    ("fashion", "Fashion"),
    // Regional
    ("india", "India"),
    ("usa", "USA"),
    ("europe", "Europe"),
    // Miscellaneous
    ("other", "Other"),
];

pub const DEFAULT_CATEGORY: &str = "other";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Human readable label for a category code
pub fn category_label(code: &str) -> Option<&'static str> {
    CATEGORY_CHOICES
        .iter()
        .find(|(value, _)| *value == code)
        .map(|(_, label)| *label)
}

/// Kind of Telegram chat a link points to.
///
/// Forms only accept `channel` and `group`; `other` is the stored default for
/// records written without an explicit type.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Channel,
    Group,
    #[default]
    Other,
}

impl LinkType {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkType::Channel => "channel",
            LinkType::Group => "group",
            LinkType::Other => "other",
        }
    }

    /// Parses a form choice; only the offered choices are accepted
    pub fn from_choice(value: &str) -> Option<Self> {
        match value {
            "channel" => Some(LinkType::Channel),
            "group" => Some(LinkType::Group),
            _ => None,
        }
    }
}

/// A registered account
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    /// Opaque identifier (UUID v4)
    pub id: String,
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

/// Admin-managed category. Links reference categories by code, and a
/// category row groups the links whose code equals its `name`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A submitted Telegram channel or group
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TelegramLink {
    /// Public, non-sequential identifier used in every URL
    pub hash_id: String,

    /// Owner (creator) of the link
    pub user_id: String,

    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link_type: LinkType,
    #[serde(default = "default_category")]
    pub category: String,

    /// Server-maintained counters
    #[serde(default)]
    pub views_count: u64,
    #[serde(default)]
    pub likes_count: u64,

    /// `false` once soft-deleted; never flips back
    pub is_active: bool,

    /// Set by administrators only
    #[serde(default)]
    pub is_verified: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row per (user, link) pair that is currently liked
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LinkLike {
    pub user_id: String,
    pub hash_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Comment {
    pub id: u64,
    pub user_id: String,
    pub hash_id: String,
    pub text: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Error,
}

/// Transient notice shown on the next page the session renders
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub level: MessageLevel,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            text: text.into(),
        }
    }
}

/// Server-side login session, keyed by the cookie token
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionRecord {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<FlashMessage>,
}

/// The authenticated caller, resolved from the session cookie
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    /// Session token the request was authenticated with
    pub session: String,
}

/// Validated link fields, ready to be written
#[derive(Debug, Clone)]
pub struct LinkInput {
    pub title: String,
    pub url: String,
    pub description: String,
    pub link_type: LinkType,
    pub category: String,
}

/// Outcome of a like toggle
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub liked: bool,
    pub likes_count: u64,
}

/// `value`/`label` pair used by clients to build select boxes
#[derive(Serialize, Debug, Clone)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn choices(table: &[(&'static str, &'static str)]) -> Vec<Choice> {
    table
        .iter()
        .map(|&(value, label)| Choice { value, label })
        .collect()
}

/// Public projection of a user
#[derive(Serialize, Debug, Clone)]
pub struct Author {
    pub id: String,
    pub username: String,
}

/// Link as shown in listings and on the detail page
#[derive(Serialize, Debug, Clone)]
pub struct LinkSummary {
    pub hash_id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub link_type: LinkType,
    pub category: String,
    pub category_label: &'static str,
    pub views_count: u64,
    pub likes_count: u64,
    pub is_verified: bool,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkSummary {
    pub fn new(link: TelegramLink, owner: String) -> Self {
        Self {
            category_label: category_label(&link.category).unwrap_or("Other"),
            hash_id: link.hash_id,
            title: link.title,
            url: link.url,
            description: link.description,
            link_type: link.link_type,
            category: link.category,
            views_count: link.views_count,
            likes_count: link.likes_count,
            is_verified: link.is_verified,
            owner,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct CommentView {
    pub id: u64,
    pub author: Author,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Category as listed by the admin API
#[derive(Serialize, Debug, Clone)]
pub struct CategorySummary {
    #[serde(flatten)]
    pub category: Category,
    pub link_count: usize,
}

/// Body of `POST /admin/categories`
#[derive(Deserialize, Debug)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Body of `POST /admin/links/{hash_id}/verify`
#[derive(Deserialize, Debug)]
pub struct VerifyRequest {
    pub is_verified: bool,
}
