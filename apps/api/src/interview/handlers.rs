//! Axum route handlers for the candidate admin API.
//!
//! Every handler builds a `CandidatePolicy` for the caller first and asks it
//! for the record scope and field policy before touching the store.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Local;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::export::{export_filename, render_csv, EXPORT_PERMISSION};
use crate::interview::fields::{CandidateField, FieldValue};
use crate::interview::fieldsets::FieldSet;
use crate::interview::policy::{CandidatePolicy, CandidateScope};
use crate::interview::store::{CandidatePatch, CandidateQuery};
use crate::models::candidate::{CandidateListItem, CandidateRow};
use crate::models::user::CurrentUser;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CandidateListResponse {
    pub scope: CandidateScope,
    pub list_editable: &'static [CandidateField],
    pub candidates: Vec<CandidateListItem>,
}

#[derive(Debug, Serialize)]
pub struct FieldView {
    pub name: CandidateField,
    pub label: &'static str,
    pub value: Value,
    pub readonly: bool,
}

#[derive(Debug, Serialize)]
pub struct SectionView {
    pub title: &'static str,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Serialize)]
pub struct CandidateDetail {
    pub id: Uuid,
    pub fieldset: FieldSet,
    pub sections: Vec<SectionView>,
    pub readonly_fields: &'static [CandidateField],
    pub writable_fields: Vec<CandidateField>,
}

impl CandidateDetail {
    /// Renders only the sections of the field set the policy selects for this candidate.
    pub fn render(policy: &CandidatePolicy, candidate: &CandidateRow) -> Self {
        let fieldset = policy.fieldset_for(candidate);
        let writable = policy.writable_fields(candidate);
        let values = candidate.field_values();

        let sections = fieldset
            .sections()
            .iter()
            .map(|section| SectionView {
                title: section.title,
                fields: FieldSet::section_fields(section)
                    .map(|field| FieldView {
                        name: field,
                        label: field.label(),
                        value: values.get(field.as_str()).cloned().unwrap_or(Value::Null),
                        readonly: !writable.contains(&field),
                    })
                    .collect(),
            })
            .collect();

        Self {
            id: candidate.id,
            fieldset,
            sections,
            readonly_fields: policy.readonly_fields(),
            writable_fields: writable,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Out-of-scope candidates are reported as missing so their existence is not disclosed.
async fn load_visible(
    state: &AppState,
    policy: &CandidatePolicy,
    id: Uuid,
) -> Result<CandidateRow, AppError> {
    state
        .candidates
        .get(id)
        .await?
        .filter(|c| policy.visible_candidates().admits(c))
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))
}

async fn ensure_users_exist(state: &AppState, patch: &CandidatePatch) -> Result<(), AppError> {
    for (field, value) in patch.iter() {
        if let FieldValue::User(Some(user_id)) = value {
            if !state.users.exists(*user_id).await? {
                return Err(AppError::Validation(format!(
                    "{field}: user {user_id} does not exist"
                )));
            }
        }
    }
    Ok(())
}

fn field_list(fields: &[CandidateField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<CurrentUser>>,
    Query(query): Query<CandidateQuery>,
) -> Result<Json<CandidateListResponse>, AppError> {
    let policy = CandidatePolicy::for_user(&user);
    let scope = policy.visible_candidates();
    let rows = state.candidates.list(scope, &query.paged()).await?;

    Ok(Json(CandidateListResponse {
        scope,
        list_editable: policy.editable_list_fields(),
        candidates: rows.iter().map(CandidateListItem::from).collect(),
    }))
}

/// GET /api/v1/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<CurrentUser>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CandidateDetail>, AppError> {
    let policy = CandidatePolicy::for_user(&user);
    let candidate = load_visible(&state, &policy, id).await?;
    Ok(Json(CandidateDetail::render(&policy, &candidate)))
}

/// PATCH /api/v1/candidates/:id
///
/// Body: JSON object of field name → value. Every named field must be writable
/// for the caller on this candidate, otherwise nothing is written.
pub async fn handle_update_candidate(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<CurrentUser>>,
    Path(id): Path<Uuid>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<CandidateDetail>, AppError> {
    let policy = CandidatePolicy::for_user(&user);
    let candidate = load_visible(&state, &policy, id).await?;
    let patch = CandidatePatch::from_json(&body)?;

    let denied = policy.denied_fields(&candidate, patch.fields());
    if !denied.is_empty() {
        warn!(user = %user.username, candidate_id = %id, denied = %field_list(&denied), "field edit denied");
        return Err(AppError::Forbidden(format!(
            "Not allowed to edit: {}",
            field_list(&denied)
        )));
    }

    ensure_users_exist(&state, &patch).await?;
    patch.check_stage_invariant(&candidate)?;

    let updated = state
        .candidates
        .update(id, &patch, &user.username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;

    Ok(Json(CandidateDetail::render(&policy, &updated)))
}

/// PATCH /api/v1/candidates/:id/interviewers
///
/// Inline reassignment from the list view; limited to the caller's list-editable fields.
pub async fn handle_assign_interviewers(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<CurrentUser>>,
    Path(id): Path<Uuid>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<CandidateListItem>, AppError> {
    let policy = CandidatePolicy::for_user(&user);
    let editable = policy.editable_list_fields();
    let patch = CandidatePatch::from_json(&body)?;

    let denied: Vec<CandidateField> = patch.fields().filter(|f| !editable.contains(f)).collect();
    if !denied.is_empty() {
        warn!(user = %user.username, candidate_id = %id, denied = %field_list(&denied), "inline edit denied");
        return Err(AppError::Forbidden(format!(
            "Not allowed to edit from the list: {}",
            field_list(&denied)
        )));
    }

    let candidate = load_visible(&state, &policy, id).await?;
    ensure_users_exist(&state, &patch).await?;
    patch.check_stage_invariant(&candidate)?;

    let updated = state
        .candidates
        .update(id, &patch, &user.username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;

    Ok(Json(CandidateListItem::from(&updated)))
}

/// GET /api/v1/candidates/export
///
/// CSV of the caller's visible candidates matching the list filters.
pub async fn handle_export_candidates(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<CurrentUser>>,
    Query(query): Query<CandidateQuery>,
) -> Result<impl IntoResponse, AppError> {
    if !user.has_perm(EXPORT_PERMISSION) {
        warn!(user = %user.username, "export denied: missing export permission");
        return Err(AppError::Forbidden(
            "Export permission required".to_string(),
        ));
    }

    let policy = CandidatePolicy::for_user(&user);
    let rows = state
        .candidates
        .list(policy.visible_candidates(), &query.unpaged())
        .await?;
    let body = render_csv(&rows)?;

    info!(actor = %user.username, count = rows.len(), "{} exported {} candidate records", user.username, rows.len());

    let disposition = format!("attachment; filename={}", export_filename(&Local::now()));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
