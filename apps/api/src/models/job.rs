use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: i32,
    pub job_type: String,
    pub job_name: String,
    pub job_city: String,
    pub job_responsibility: String,
    pub job_requirement: String,
    pub creator: Option<Uuid>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: i32,
    pub applicant: Option<Uuid>,
    pub username: String,
    pub city: Option<String>,
    pub phone: String,
    pub email: String,
    pub apply_position: Option<String>,
    pub born_address: Option<String>,
    pub gender: Option<String>,
    pub bachelor_school: Option<String>,
    pub master_school: Option<String>,
    pub doctor_school: Option<String>,
    pub major: Option<String>,
    pub degree: Option<String>,
    pub candidate_introduction: Option<String>,
    pub work_experience: Option<String>,
    pub project_experience: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}
