//! Axum route handlers for the job board and resume submission.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::auth::roles::resolve_roles;
use crate::errors::AppError;
use crate::jobs::validation::{can_view_resume, ResumeSubmission, JOB_CITIES, JOB_TYPES};
use crate::models::job::{JobRow, ResumeRow};
use crate::models::user::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct JobFilter {
    pub job_type: Option<String>,
    pub job_city: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResumeCreatedResponse {
    pub resume: ResumeRow,
    pub candidate_id: Uuid,
}

fn check_choice(name: &str, value: &str, choices: &[&str]) -> Result<(), AppError> {
    if choices.contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{name} must be one of [{}]",
            choices.join(", ")
        )))
    }
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(filter): Query<JobFilter>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM jobs WHERE TRUE");
    if let Some(job_type) = filter.job_type.as_deref().filter(|s| !s.is_empty()) {
        check_choice("job_type", job_type, JOB_TYPES)?;
        qb.push(" AND job_type = ").push_bind(job_type.to_string());
    }
    if let Some(job_city) = filter.job_city.as_deref().filter(|s| !s.is_empty()) {
        check_choice("job_city", job_city, JOB_CITIES)?;
        qb.push(" AND job_city = ").push_bind(job_city.to_string());
    }
    qb.push(" ORDER BY job_type, created_date DESC");

    let jobs = qb.build_query_as::<JobRow>().fetch_all(&state.db).await?;
    Ok(Json(jobs))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<i32>,
) -> Result<Json<JobRow>, AppError> {
    let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    Ok(Json(job))
}

/// POST /api/v1/resumes
///
/// Stores the resume with the caller as applicant and opens a candidate record for it.
pub async fn handle_submit_resume(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<CurrentUser>>,
    Json(mut submission): Json<ResumeSubmission>,
) -> Result<(StatusCode, Json<ResumeCreatedResponse>), AppError> {
    if let Some(job_id) = submission.job_id {
        let job_name: String = sqlx::query_scalar("SELECT job_name FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
        submission.fill_position(&job_name);
    }

    submission
        .validate()
        .map_err(|errors| AppError::Validation(errors.join("; ")))?;

    let (resume, candidate) = state.resumes.submit(&user, &submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(ResumeCreatedResponse {
            resume,
            candidate_id: candidate.id,
        }),
    ))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<CurrentUser>>,
    Path(resume_id): Path<i32>,
) -> Result<Json<ResumeRow>, AppError> {
    let roles = resolve_roles(&user);
    let resume = state
        .resumes
        .get(resume_id)
        .await?
        .filter(|r| can_view_resume(&user, &roles, r))
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;
    Ok(Json(resume))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_choice() {
        assert!(check_choice("job_city", "杭州", JOB_CITIES).is_ok());
        assert!(matches!(
            check_choice("job_city", "Paris", JOB_CITIES),
            Err(AppError::Validation(msg)) if msg.starts_with("job_city")
        ));
    }
}
