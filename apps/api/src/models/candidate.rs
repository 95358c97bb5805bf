use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

/// A candidate moving through the interview pipeline.
/// Column names double as the field names used by the visibility policy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct CandidateRow {
    pub id: Uuid,
    pub username: String,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub apply_position: Option<String>,
    pub born_address: Option<String>,
    pub gender: Option<String>,
    pub candidate_remark: Option<String>,
    pub bachelor_school: Option<String>,
    pub master_school: Option<String>,
    pub doctor_school: Option<String>,
    pub major: Option<String>,
    pub degree: Option<String>,
    pub test_score_of_general_ability: Option<f64>,
    pub paper_score: Option<f64>,

    pub first_score: Option<f64>,
    pub first_learning_ability: Option<f64>,
    pub first_professional_competency: Option<f64>,
    pub first_advantage: Option<String>,
    pub first_disadvantage: Option<String>,
    pub first_result: Option<String>,
    pub first_recommend_position: Option<String>,
    pub first_interviewer_user: Option<Uuid>,
    pub first_remark: Option<String>,

    pub second_score: Option<f64>,
    pub second_learning_ability: Option<f64>,
    pub second_professional_competency: Option<f64>,
    pub second_pursue_of_excellence: Option<f64>,
    pub second_communication_ability: Option<f64>,
    pub second_pressure_score: Option<f64>,
    pub second_advantage: Option<String>,
    pub second_disadvantage: Option<String>,
    pub second_result: Option<String>,
    pub second_recommend_position: Option<String>,
    pub second_interviewer_user: Option<Uuid>,
    pub second_remark: Option<String>,

    pub hr_score: Option<String>,
    pub hr_responsibility: Option<String>,
    pub hr_communication_ability: Option<String>,
    pub hr_logic_ability: Option<String>,
    pub hr_potential: Option<String>,
    pub hr_stability: Option<String>,
    pub hr_advantage: Option<String>,
    pub hr_disadvantage: Option<String>,
    pub hr_result: Option<String>,
    pub hr_interviewer_user: Option<Uuid>,
    pub hr_remark: Option<String>,

    pub creator: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub last_editor: Option<String>,
}

impl CandidateRow {
    /// Every column keyed by field name, as JSON values.
    pub fn field_values(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Fields copied into a fresh candidate when a resume is submitted.
#[derive(Debug, Clone, Default)]
pub struct NewCandidate {
    pub username: String,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub apply_position: Option<String>,
    pub born_address: Option<String>,
    pub gender: Option<String>,
    pub bachelor_school: Option<String>,
    pub master_school: Option<String>,
    pub doctor_school: Option<String>,
    pub major: Option<String>,
    pub degree: Option<String>,
    pub creator: Option<String>,
}

/// List view projection.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateListItem {
    pub id: Uuid,
    pub username: String,
    pub city: Option<String>,
    pub bachelor_school: Option<String>,
    pub first_score: Option<f64>,
    pub first_result: Option<String>,
    pub first_interviewer_user: Option<Uuid>,
    pub second_result: Option<String>,
    pub second_interviewer_user: Option<Uuid>,
    pub hr_score: Option<String>,
    pub hr_result: Option<String>,
    pub last_editor: Option<String>,
}

impl From<&CandidateRow> for CandidateListItem {
    fn from(row: &CandidateRow) -> Self {
        Self {
            id: row.id,
            username: row.username.clone(),
            city: row.city.clone(),
            bachelor_school: row.bachelor_school.clone(),
            first_score: row.first_score,
            first_result: row.first_result.clone(),
            first_interviewer_user: row.first_interviewer_user,
            second_result: row.second_result.clone(),
            second_interviewer_user: row.second_interviewer_user,
            hr_score: row.hr_score.clone(),
            hr_result: row.hr_result.clone(),
            last_editor: row.last_editor.clone(),
        }
    }
}
