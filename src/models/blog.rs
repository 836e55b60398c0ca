//! Blog post models for the admin CRUD resource.

use serde::{Deserialize, Serialize};

/// A blog post. Ids are UUID v4; timestamps are RFC 3339 strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub category: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time: Option<i64>,
    /// Once set non-null, only the matching caller token may mutate or delete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a blog post.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogPostRequest {
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    pub content: String,
    #[serde(default)]
    pub read_time: Option<i64>,
    #[serde(default)]
    pub owner_id: Option<String>,
}

/// Request body for updating a blog post.
///
/// `owner_id` is the caller's owner token, not a new value for the field.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogPostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub read_time: Option<i64>,
    #[serde(default)]
    pub owner_id: Option<String>,
}
