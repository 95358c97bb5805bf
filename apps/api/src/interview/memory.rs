//! In-memory `CandidateStore` used by the HTTP tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::policy::CandidateScope;
use crate::interview::store::{CandidatePatch, CandidateQuery, CandidateStore};
use crate::models::candidate::{CandidateRow, NewCandidate};

#[derive(Default)]
pub struct MemoryCandidateStore {
    rows: Mutex<Vec<CandidateRow>>,
}

impl MemoryCandidateStore {
    pub fn with_rows(rows: Vec<CandidateRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    pub fn snapshot(&self) -> Vec<CandidateRow> {
        self.rows.lock().unwrap().clone()
    }

    /// Stores a new candidate built from `candidate`.
    pub fn insert(&self, candidate: NewCandidate) -> CandidateRow {
        let mut row = crate::interview::policy::tests::candidate(None, None);
        row.username = candidate.username;
        row.city = candidate.city;
        row.phone = candidate.phone;
        row.email = candidate.email;
        row.apply_position = candidate.apply_position;
        row.born_address = candidate.born_address;
        row.gender = candidate.gender;
        row.bachelor_school = candidate.bachelor_school;
        row.master_school = candidate.master_school;
        row.doctor_school = candidate.doctor_school;
        row.major = candidate.major;
        row.degree = candidate.degree;
        row.creator = candidate.creator;
        self.rows.lock().unwrap().push(row.clone());
        row
    }
}

fn matches(query: &CandidateQuery, row: &CandidateRow) -> bool {
    let columns = row.field_values();
    let text_ok = query.text_filters().into_iter().all(|(field, value)| {
        columns.get(field.as_str()).and_then(|v| v.as_str()) == Some(value)
    });
    let users_ok = query.user_filters().into_iter().all(|(field, user_id)| {
        columns.get(field.as_str()).and_then(|v| v.as_str()) == Some(user_id.to_string().as_str())
    });
    let search_ok = match query.search_term() {
        None => true,
        Some(term) => {
            let term = term.to_lowercase();
            [
                Some(row.username.as_str()),
                row.phone.as_deref(),
                row.email.as_deref(),
                row.bachelor_school.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|v| v.to_lowercase().contains(&term))
        }
    };
    text_ok && users_ok && search_ok
}

#[async_trait]
impl CandidateStore for MemoryCandidateStore {
    async fn list(
        &self,
        scope: CandidateScope,
        query: &CandidateQuery,
    ) -> Result<Vec<CandidateRow>, AppError> {
        let mut rows: Vec<CandidateRow> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| scope.admits(r) && matches(query, r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (&a.hr_result, &a.second_result, &a.first_result, a.id).cmp(&(
                &b.hr_result,
                &b.second_result,
                &b.first_result,
                b.id,
            ))
        });
        let offset = query.offset.unwrap_or(0).max(0) as usize;
        let limit = query.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<CandidateRow>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &CandidatePatch,
        editor: &str,
    ) -> Result<Option<CandidateRow>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(slot) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        let mut updated = patch.apply_to(slot)?;
        updated.last_editor = Some(editor.to_string());
        updated.modified_date = Utc::now();
        *slot = updated.clone();
        Ok(Some(updated))
    }
}
