//! Admin stats and CSV export endpoints.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::AppState;

/// Counts returned by the stats endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub waitlist: i64,
    pub newsletter: i64,
    pub early_access: i64,
    pub farm_applications: i64,
    pub chat_messages: i64,
    pub blog_posts: i64,
    pub produce_items: usize,
    pub farms: usize,
    pub faqs: usize,
}

/// GET /api/admin/stats - Stored record counts plus catalog sizes.
pub async fn admin_stats(State(state): State<AppState>) -> ApiResult<StatsResponse> {
    let counts = state.repo.stored_counts().await?;

    success(StatsResponse {
        waitlist: counts.waitlist,
        newsletter: counts.newsletter,
        early_access: counts.early_access,
        farm_applications: counts.farm_applications,
        chat_messages: counts.chat_messages,
        blog_posts: counts.blog_posts,
        produce_items: state.catalog.produce_count(),
        farms: state.catalog.farm_count(),
        faqs: state.catalog.faq_count(),
    })
}

/// GET /api/admin/export/:kind - Export a signup list as CSV.
pub async fn export_csv(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Response, AppError> {
    let (filename, body) = match kind.as_str() {
        "waitlist" => {
            let entries = state.repo.list_waitlist().await?;
            let rows = entries.iter().map(|e| {
                vec![
                    e.id.clone(),
                    e.name.clone().unwrap_or_default(),
                    e.email.clone(),
                    e.zip_code.clone().unwrap_or_default(),
                    e.created_at.clone(),
                ]
            });
            (
                "waitlist.csv",
                render_csv(&["id", "name", "email", "zip_code", "created_at"], rows),
            )
        }
        "newsletter" => {
            let subscribers = state.repo.list_newsletter_subscribers().await?;
            let rows = subscribers
                .iter()
                .map(|s| vec![s.id.clone(), s.email.clone(), s.created_at.clone()]);
            (
                "newsletter.csv",
                render_csv(&["id", "email", "created_at"], rows),
            )
        }
        "early-access" => {
            let entries = state.repo.list_early_access().await?;
            let rows = entries.iter().map(|e| {
                vec![
                    e.id.clone(),
                    e.name.clone().unwrap_or_default(),
                    e.email.clone(),
                    e.city.clone().unwrap_or_default(),
                    e.created_at.clone(),
                ]
            });
            (
                "early-access.csv",
                render_csv(&["id", "name", "email", "city", "created_at"], rows),
            )
        }
        "farm-applications" => {
            let applications = state.repo.list_farm_applications().await?;
            let rows = applications.iter().map(|a| {
                vec![
                    a.id.clone(),
                    a.farm_name.clone(),
                    a.contact_name.clone(),
                    a.email.clone(),
                    a.phone.clone().unwrap_or_default(),
                    a.location.clone().unwrap_or_default(),
                    a.products.clone().unwrap_or_default(),
                    a.message.clone().unwrap_or_default(),
                    a.status.as_str().to_string(),
                    a.created_at.clone(),
                ]
            });
            (
                "farm-applications.csv",
                render_csv(
                    &[
                        "id",
                        "farm_name",
                        "contact_name",
                        "email",
                        "phone",
                        "location",
                        "products",
                        "message",
                        "status",
                        "created_at",
                    ],
                    rows,
                ),
            )
        }
        _ => {
            return Err(AppError::NotFound(format!("Unknown export type: {}", kind)));
        }
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}

/// Render a header row plus one row per entry, RFC 4180 quoting.
fn render_csv<I>(header: &[&str], rows: I) -> String
where
    I: Iterator<Item = Vec<String>>,
{
    let mut out = String::new();
    push_row(&mut out, header.iter().map(|s| *s));
    for row in rows {
        push_row(&mut out, row.iter().map(|s| s.as_str()));
    }
    out
}

fn push_row<'a, I: Iterator<Item = &'a str>>(out: &mut String, fields: I) {
    let line: Vec<String> = fields.map(csv_escape).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

/// Quote a field when it contains a comma, quote, or line break.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_escape_plain() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape(""), "");
    }

    #[test]
    fn test_csv_escape_comma_and_newline() {
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn test_csv_escape_doubles_quotes() {
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_render_csv_shape() {
        let rows = vec![
            vec!["1".to_string(), "Asha, Jr.".to_string()],
            vec!["2".to_string(), "Ben".to_string()],
        ];
        let csv = render_csv(&["id", "name"], rows.into_iter());
        assert_eq!(csv, "id,name\r\n1,\"Asha, Jr.\"\r\n2,Ben\r\n");
    }
}
