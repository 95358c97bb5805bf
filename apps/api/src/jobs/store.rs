//! Resume persistence. A submitted resume and the candidate record opened
//! for it are written together or not at all.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::interview::store::insert_candidate;
use crate::jobs::validation::{candidate_from_resume, ResumeSubmission};
use crate::models::candidate::CandidateRow;
use crate::models::job::ResumeRow;
use crate::models::user::CurrentUser;

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Stores a validated submission with `applicant` as owner and opens the
    /// matching candidate record.
    async fn submit(
        &self,
        applicant: &CurrentUser,
        submission: &ResumeSubmission,
    ) -> Result<(ResumeRow, CandidateRow), AppError>;

    async fn get(&self, id: i32) -> Result<Option<ResumeRow>, AppError>;
}

pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn submit(
        &self,
        applicant: &CurrentUser,
        submission: &ResumeSubmission,
    ) -> Result<(ResumeRow, CandidateRow), AppError> {
        let mut tx = self.pool.begin().await?;

        let resume = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes
                (applicant, username, city, phone, email, apply_position, born_address, gender,
                 bachelor_school, master_school, doctor_school, major, degree,
                 candidate_introduction, work_experience, project_experience)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(applicant.id)
        .bind(submission.username.trim())
        .bind(&submission.city)
        .bind(submission.phone.trim())
        .bind(submission.email.trim())
        .bind(&submission.apply_position)
        .bind(&submission.born_address)
        .bind(&submission.gender)
        .bind(&submission.bachelor_school)
        .bind(&submission.master_school)
        .bind(&submission.doctor_school)
        .bind(&submission.major)
        .bind(&submission.degree)
        .bind(&submission.candidate_introduction)
        .bind(&submission.work_experience)
        .bind(&submission.project_experience)
        .fetch_one(&mut *tx)
        .await?;

        let candidate =
            insert_candidate(&mut tx, &candidate_from_resume(&resume, &applicant.username)).await?;

        // Dropping `tx` on any earlier `?` rolls both inserts back.
        tx.commit().await?;

        info!(
            resume_id = resume.id,
            candidate_id = %candidate.id,
            applicant = %applicant.username,
            "Resume submitted"
        );
        Ok((resume, candidate))
    }

    async fn get(&self, id: i32) -> Result<Option<ResumeRow>, AppError> {
        Ok(
            sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }
}
