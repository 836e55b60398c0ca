//! Admin blog-post CRUD endpoints.
//!
//! Ids must have UUID v4 shape; malformed ids are rejected before any
//! storage access. Mutations are ownership-gated in the repository.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{BlogPost, CreateBlogPostRequest, UpdateBlogPostRequest};
use crate::validation::is_uuid_v4;
use crate::AppState;

/// GET /api/admin/blog-posts - List all blog posts, newest first.
pub async fn list_blog_posts(State(state): State<AppState>) -> ApiResult<Vec<BlogPost>> {
    success(state.repo.list_blog_posts().await?)
}

/// GET /api/admin/blog-posts/:id - Get a single blog post.
pub async fn get_blog_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<BlogPost> {
    validate_post_id(&id)?;

    match state.repo.get_blog_post(&id).await? {
        Some(post) => success(post),
        None => Err(AppError::NotFound(format!("Blog post {} not found", id))),
    }
}

/// POST /api/admin/blog-posts - Create a blog post.
pub async fn create_blog_post(
    State(state): State<AppState>,
    Json(request): Json<CreateBlogPostRequest>,
) -> ApiResult<BlogPost> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("Content is required".to_string()));
    }

    success(state.repo.create_blog_post(&request).await?)
}

/// PUT /api/admin/blog-posts/:id - Update a blog post.
///
/// The `ownerId` field of the body is the caller's owner token.
pub async fn update_blog_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateBlogPostRequest>,
) -> ApiResult<BlogPost> {
    validate_post_id(&id)?;

    if let Some(title) = &request.title {
        if title.trim().is_empty() {
            return Err(AppError::Validation("Title must not be empty".to_string()));
        }
    }
    if let Some(content) = &request.content {
        if content.trim().is_empty() {
            return Err(AppError::Validation("Content must not be empty".to_string()));
        }
    }

    success(state.repo.update_blog_post(&id, &request).await?)
}

/// Query parameters for blog-post deletion.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBlogPostQuery {
    /// Caller's owner token.
    #[serde(default)]
    pub owner_id: Option<String>,
}

/// DELETE /api/admin/blog-posts/:id - Delete a blog post.
pub async fn delete_blog_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DeleteBlogPostQuery>,
) -> ApiResult<()> {
    validate_post_id(&id)?;

    state
        .repo
        .delete_blog_post(&id, params.owner_id.as_deref())
        .await?;
    success(())
}

fn validate_post_id(id: &str) -> Result<(), AppError> {
    if !is_uuid_v4(id) {
        return Err(AppError::Validation(format!(
            "Invalid blog post id: {}",
            id
        )));
    }
    Ok(())
}
