//! Signup and application form endpoints.
//!
//! Each handler validates, stores, and then fires a best-effort notification
//! email. Delivery failures are logged and never surfaced to the caller.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    EarlyAccessEntry, EarlyAccessRequest, FarmApplication, FarmApplicationRequest,
    JoinWaitlistRequest, NewsletterSubscriber, SubscribeRequest, WaitlistEntry,
};
use crate::validation::is_valid_email;
use crate::AppState;

/// POST /api/waitlist - Join the waitlist.
pub async fn join_waitlist(
    State(state): State<AppState>,
    Json(request): Json<JoinWaitlistRequest>,
) -> ApiResult<WaitlistEntry> {
    if !is_valid_email(&request.email) {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }

    let entry = state.repo.add_waitlist_entry(&request).await?;

    notify(
        &state,
        "New waitlist signup",
        &format!("{} joined the waitlist", entry.email),
    )
    .await;

    success(entry)
}

/// POST /api/newsletter - Subscribe to the newsletter.
pub async fn subscribe_newsletter(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> ApiResult<NewsletterSubscriber> {
    if !is_valid_email(&request.email) {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }

    let subscriber = state.repo.add_newsletter_subscriber(&request).await?;
    success(subscriber)
}

/// POST /api/early-access - Request early access.
pub async fn request_early_access(
    State(state): State<AppState>,
    Json(request): Json<EarlyAccessRequest>,
) -> ApiResult<EarlyAccessEntry> {
    if !is_valid_email(&request.email) {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }

    let entry = state.repo.add_early_access_entry(&request).await?;

    notify(
        &state,
        "New early-access request",
        &format!("{} requested early access", entry.email),
    )
    .await;

    success(entry)
}

/// POST /api/farm-applications - Submit a farm partnership application.
pub async fn submit_farm_application(
    State(state): State<AppState>,
    Json(request): Json<FarmApplicationRequest>,
) -> ApiResult<FarmApplication> {
    if request.farm_name.trim().is_empty() {
        return Err(AppError::Validation("Farm name is required".to_string()));
    }
    if request.contact_name.trim().is_empty() {
        return Err(AppError::Validation("Contact name is required".to_string()));
    }
    if !is_valid_email(&request.email) {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }

    let application = state.repo.create_farm_application(&request).await?;

    notify(
        &state,
        "New farm partnership application",
        &format!(
            "{} ({}) applied for a farm partnership",
            application.farm_name, application.email
        ),
    )
    .await;

    success(application)
}

/// Fire a notification email if a mailer is configured.
async fn notify(state: &AppState, subject: &str, body: &str) {
    if let Some(mailer) = &state.mailer {
        if let Err(e) = mailer.notify(subject, body).await {
            tracing::warn!("Failed to send notification email: {}", e);
        }
    }
}
