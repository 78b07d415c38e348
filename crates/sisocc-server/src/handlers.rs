//! REST endpoint handlers for the occurrence API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/health` | Service health check |
//! | `GET` | `/api/occurrences` | Filtered, paginated listing |
//! | `GET` | `/api/occurrences/stats` | Aggregate counts |
//! | `GET` | `/api/occurrences/{id}` | Single occurrence + history |
//! | `POST` | `/api/occurrences` | Create (multipart, photos) |
//! | `PUT` | `/api/occurrences/{id}` | Partial update (JSON) |
//! | `DELETE` | `/api/occurrences/{id}` | Delete |
//!
//! Every response uses the `{success, message?, data?}` envelope. Writes
//! append an audit entry after they succeed; an audit failure is logged
//! and never fails the request.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use sisocc_db::{AuditStore, HistoryStore, NewAuditEntry, OccurrenceStore};
use sisocc_types::{AuditAction, OccurrenceChanges, OccurrenceDetail, OccurrenceFilter, UserId};
use uuid::Uuid;

use crate::auth::ActingUser;
use crate::config::UploadSection;
use crate::error::ApiError;
use crate::state::AppState;
use crate::upload;
use crate::validate::{self, CreateOccurrenceForm};

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

/// Service health check.
pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": Utc::now(),
        },
    }))
}

// ---------------------------------------------------------------------------
// GET /api/occurrences
// ---------------------------------------------------------------------------

/// Filtered, paginated occurrence listing, newest first.
pub async fn list_occurrences(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<OccurrenceFilter>,
) -> Result<Json<Value>, ApiError> {
    let (occurrences, total) = OccurrenceStore::new(&state.pool).list(&filter).await?;
    let details = state.lifecycle.enrich_all(occurrences).await?;

    let limit = i64::from(filter.limit());
    let total_pages = if total == 0 {
        0
    } else {
        // `i64::div_ceil` is unstable; divisor is always positive, so this
        // div_euclid/rem_euclid form is exactly equivalent.
        total.div_euclid(limit.max(1)) + i64::from(total.rem_euclid(limit.max(1)) > 0)
    };

    Ok(Json(json!({
        "success": true,
        "data": details,
        "pagination": {
            "page": filter.page(),
            "limit": filter.limit(),
            "total": total,
            "total_pages": total_pages,
        },
    })))
}

// ---------------------------------------------------------------------------
// GET /api/occurrences/stats
// ---------------------------------------------------------------------------

/// Aggregate occurrence counts for the dashboard.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let stats = OccurrenceStore::new(&state.pool).stats().await?;
    Ok(Json(json!({
        "success": true,
        "data": stats,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/occurrences/{id}
// ---------------------------------------------------------------------------

/// One occurrence with its user display records and full status history.
pub async fn get_occurrence(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let occurrence = OccurrenceStore::new(&state.pool)
        .fetch(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("occurrence {id}")))?;

    let history = HistoryStore::new(&state.pool)
        .list_for_occurrence(id)
        .await?;

    let detail = state.lifecycle.enrich(occurrence).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "occurrence": detail,
            "history": history,
        },
    })))
}

// ---------------------------------------------------------------------------
// POST /api/occurrences
// ---------------------------------------------------------------------------

/// Create an occurrence from a multipart form.
///
/// Text parts carry the scalar fields; up to `uploads.max_files` image
/// parts may arrive under the `photos` field. The form is validated and
/// converted before the lifecycle runs.
pub async fn create_occurrence(
    State(state): State<Arc<AppState>>,
    ActingUser(actor): ActingUser,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut photos = Vec::new();
    let detail = match read_and_create(&state, actor, &mut multipart, &mut photos).await {
        Ok(detail) => detail,
        Err(error) => {
            discard_photos(&state.uploads, &photos).await;
            return Err(error);
        }
    };

    record_audit(
        &state,
        actor,
        AuditAction::Create,
        detail.occurrence.id.into_inner(),
        json!({
            "occurrence_type": detail.occurrence.occurrence_type,
            "place": detail.occurrence.place,
            "photos": detail.occurrence.photos.len(),
        }),
        &headers,
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "occurrence created",
            "data": detail,
        })),
    ))
}

// ---------------------------------------------------------------------------
// PUT /api/occurrences/{id}
// ---------------------------------------------------------------------------

/// Apply a typed partial update.
pub async fn update_occurrence(
    State(state): State<Arc<AppState>>,
    ActingUser(actor): ActingUser,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(changes): Json<OccurrenceChanges>,
) -> Result<Json<Value>, ApiError> {
    validate::check_changes(&changes)?;

    let audit_details = json!({
        "status": changes.status,
        "priority": changes.priority,
        "assignee": changes.assignee,
    });

    let detail = state.lifecycle.update(id.into(), changes, actor).await?;

    record_audit(
        &state,
        actor,
        AuditAction::Update,
        id,
        audit_details,
        &headers,
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": "occurrence updated",
        "data": detail,
    })))
}

// ---------------------------------------------------------------------------
// DELETE /api/occurrences/{id}
// ---------------------------------------------------------------------------

/// Delete one occurrence; its history cascades away with it.
pub async fn delete_occurrence(
    State(state): State<Arc<AppState>>,
    ActingUser(actor): ActingUser,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let removed = OccurrenceStore::new(&state.pool).delete(id).await?;
    if !removed {
        return Err(ApiError::NotFound(format!("occurrence {id}")));
    }

    tracing::info!(%id, "occurrence deleted");
    record_audit(
        &state,
        actor,
        AuditAction::Delete,
        id,
        json!({}),
        &headers,
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": "occurrence deleted",
    })))
}

/// Drain the multipart form, save photos, then run the creation lifecycle.
///
/// Filenames of every photo written to disk are pushed into `photos`
/// before any later step can fail, so the caller can remove them when
/// this returns an error.
async fn read_and_create(
    state: &AppState,
    actor: UserId,
    multipart: &mut Multipart,
    photos: &mut Vec<String>,
) -> Result<OccurrenceDetail, ApiError> {
    let mut form = CreateOccurrenceForm::default();
    let body_limit = state.uploads.body_limit();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, body_limit))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };

        if name == "photos" {
            if photos.len() >= state.uploads.max_files {
                return Err(ApiError::Validation(format!(
                    "at most {} photos per occurrence",
                    state.uploads.max_files
                )));
            }
            let original = field.file_name().unwrap_or("photo").to_owned();
            let content_type = field.content_type().unwrap_or("").to_owned();
            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error(&e, body_limit))?;
            let stored = upload::save_photo(&state.uploads, &original, &content_type, &data).await?;
            photos.push(stored);
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| multipart_error(&e, body_limit))?;
            if !form.set_field(&name, value) {
                tracing::debug!(field = name, "ignoring unknown form field");
            }
        }
    }

    let input = form.into_new_occurrence(actor, photos.clone())?;
    Ok(state.lifecycle.create(input).await?)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a multipart read failure, surfacing the transport size limit
/// distinctly from a malformed body.
fn multipart_error(error: &MultipartError, body_limit: usize) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!("request body exceeds the {body_limit} byte limit"))
    } else {
        ApiError::Validation(format!("malformed multipart body: {error}"))
    }
}

/// Remove photos written to disk before a creation request failed.
async fn discard_photos(config: &UploadSection, photos: &[String]) {
    for filename in photos {
        let path = std::path::Path::new(&config.directory).join(filename);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(error = %e, filename, "failed to remove photo of rejected request");
        }
    }
}

/// Append an audit entry for a successful write; failure is logged only.
async fn record_audit(
    state: &AppState,
    user: UserId,
    action: AuditAction,
    entity_id: Uuid,
    details: Value,
    headers: &HeaderMap,
) {
    let entry = NewAuditEntry {
        user_id: user,
        action,
        entity: String::from("occurrence"),
        entity_id,
        details,
        ip: client_ip(headers),
        user_agent: user_agent(headers),
    };
    if let Err(e) = AuditStore::new(&state.pool).append(&entry).await {
        tracing::warn!(error = %e, %entity_id, "audit append failed");
    }
}

/// The request's user-agent header, when readable.
fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned)
}

/// The originating client address as reported by the gateway.
///
/// The service runs behind the municipal gateway, which sets
/// `x-forwarded-for`; the first entry is the client.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn client_ip_takes_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.9, 10.0.0.2".parse().unwrap(),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn client_ip_is_none_without_gateway_header() {
        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), None);

        let mut blank = HeaderMap::new();
        blank.insert("x-forwarded-for", " ".parse().unwrap());
        assert_eq!(client_ip(&blank), None);
    }
}
