//! Candidate persistence: the `CandidateStore` contract, list query
//! parameters, validated patches, and the PostgreSQL implementation.
//! Candidates are only created together with a resume (see `jobs::store`).

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{de, Deserialize, Deserializer};
use serde_json::{Map, Value};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::fields::{CandidateField, FieldValue};
use crate::interview::policy::CandidateScope;
use crate::models::candidate::{CandidateRow, NewCandidate};

pub const DEFAULT_PAGE_SIZE: i64 = 100;
pub const MAX_PAGE_SIZE: i64 = 500;

/// List filters, free-text search and paging.
/// Empty values are treated as "no filter", as filter forms submit them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateQuery {
    pub city: Option<String>,
    pub first_result: Option<String>,
    pub second_result: Option<String>,
    pub hr_result: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub first_interviewer_user: Option<Uuid>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub second_interviewer_user: Option<Uuid>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub hr_interviewer_user: Option<Uuid>,
    /// Substring search over username, phone, email and bachelor_school.
    pub q: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub offset: Option<i64>,
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

impl CandidateQuery {
    /// Exact-match text filters as (column, value) pairs.
    pub fn text_filters(&self) -> Vec<(CandidateField, &str)> {
        [
            (CandidateField::City, &self.city),
            (CandidateField::FirstResult, &self.first_result),
            (CandidateField::SecondResult, &self.second_result),
            (CandidateField::HrResult, &self.hr_result),
        ]
        .into_iter()
        .filter_map(|(field, value)| non_empty(value).map(|v| (field, v)))
        .collect()
    }

    pub fn user_filters(&self) -> Vec<(CandidateField, Uuid)> {
        [
            (CandidateField::FirstInterviewerUser, self.first_interviewer_user),
            (CandidateField::SecondInterviewerUser, self.second_interviewer_user),
            (CandidateField::HrInterviewerUser, self.hr_interviewer_user),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }

    pub fn search_term(&self) -> Option<&str> {
        non_empty(&self.q).map(str::trim).filter(|s| !s.is_empty())
    }

    /// Clamps paging for the list view. Export leaves `limit` unset to take everything.
    pub fn paged(mut self) -> Self {
        self.limit = Some(
            self.limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        );
        self.offset = Some(self.offset.unwrap_or(0).max(0));
        self
    }

    pub fn unpaged(mut self) -> Self {
        self.limit = None;
        self.offset = None;
        self
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// A validated set of field writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePatch(Vec<(CandidateField, FieldValue)>);

impl CandidatePatch {
    /// Parses a JSON object of field name to value. Unknown names and
    /// out-of-domain values are validation errors.
    pub fn from_json(body: &Map<String, Value>) -> Result<Self, AppError> {
        let mut writes = Vec::with_capacity(body.len());
        for (name, raw) in body {
            let field: CandidateField = name.parse().map_err(AppError::Validation)?;
            let value = field.parse_value(raw).map_err(AppError::Validation)?;
            writes.push((field, value));
        }
        if writes.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }
        Ok(Self(writes))
    }

    pub fn fields(&self) -> impl Iterator<Item = CandidateField> + '_ {
        self.0.iter().map(|(f, _)| *f)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(CandidateField, FieldValue)> {
        self.0.iter()
    }

    /// Returns a copy of `row` with the patch applied.
    pub fn apply_to(&self, row: &CandidateRow) -> Result<CandidateRow, AppError> {
        let mut values = row.field_values();
        for (field, value) in &self.0 {
            values.insert(field.as_str().to_string(), value.to_json());
        }
        serde_json::from_value(Value::Object(values))
            .map_err(|e| AppError::Internal(anyhow::anyhow!("patch produced invalid row: {e}")))
    }

    /// A stage result can only be recorded once that stage has an interviewer.
    /// Only stages the patch touches are checked.
    pub fn check_stage_invariant(&self, row: &CandidateRow) -> Result<(), AppError> {
        let patched = self.apply_to(row)?.field_values();
        let stages = [
            CandidateField::FirstResult,
            CandidateField::SecondResult,
            CandidateField::HrResult,
        ];
        for result in stages {
            let Some(interviewer) = result.required_interviewer() else {
                continue;
            };
            let touched = self.fields().any(|f| f == result || f == interviewer);
            let has_result = !patched.get(result.as_str()).unwrap_or(&Value::Null).is_null();
            let has_interviewer = !patched
                .get(interviewer.as_str())
                .unwrap_or(&Value::Null)
                .is_null();
            if touched && has_result && !has_interviewer {
                return Err(AppError::Validation(format!(
                    "{result} cannot be set before {interviewer} is assigned"
                )));
            }
        }
        Ok(())
    }
}

/// Read/write contract for candidate records.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Candidates admitted by `scope` and matching `query`, in list order:
    /// hr_result, second_result, first_result (empty first), then id.
    async fn list(
        &self,
        scope: CandidateScope,
        query: &CandidateQuery,
    ) -> Result<Vec<CandidateRow>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<CandidateRow>, AppError>;

    /// Applies the patch and stamps `last_editor` and `modified_date`.
    /// Returns `None` when the candidate does not exist.
    async fn update(
        &self,
        id: Uuid,
        patch: &CandidatePatch,
        editor: &str,
    ) -> Result<Option<CandidateRow>, AppError>;
}

pub struct PgCandidateStore {
    pool: PgPool,
}

impl PgCandidateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends the scope condition to a WHERE clause.
pub fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, scope: CandidateScope) {
    match scope {
        CandidateScope::All => {
            qb.push("TRUE");
        }
        CandidateScope::AssignedTo(user_id) => {
            qb.push("(first_interviewer_user = ")
                .push_bind(user_id)
                .push(" OR second_interviewer_user = ")
                .push_bind(user_id)
                .push(")");
        }
    }
}

/// Escapes LIKE metacharacters so user input matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub fn build_list_query(scope: CandidateScope, query: &CandidateQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT * FROM candidates WHERE ");
    push_scope(&mut qb, scope);

    for (field, value) in query.text_filters() {
        qb.push(" AND ")
            .push(field.as_str())
            .push(" = ")
            .push_bind(value.to_string());
    }
    for (field, user_id) in query.user_filters() {
        qb.push(" AND ")
            .push(field.as_str())
            .push(" = ")
            .push_bind(user_id);
    }
    if let Some(term) = query.search_term() {
        let pattern = format!("%{}%", escape_like(term));
        qb.push(" AND (");
        let mut any = qb.separated(" OR ");
        for column in ["username", "phone", "email", "bachelor_school"] {
            any.push(column)
                .push_unseparated(" ILIKE ")
                .push_bind_unseparated(pattern.clone());
        }
        qb.push(")");
    }

    qb.push(
        " ORDER BY hr_result ASC NULLS FIRST, second_result ASC NULLS FIRST, \
         first_result ASC NULLS FIRST, id",
    );
    if let Some(limit) = query.limit {
        qb.push(" LIMIT ").push_bind(limit);
    }
    if let Some(offset) = query.offset {
        qb.push(" OFFSET ").push_bind(offset);
    }
    qb
}

/// Inserts a candidate on `conn`, which may be a pool connection or an open
/// transaction.
pub async fn insert_candidate(
    conn: &mut PgConnection,
    candidate: &NewCandidate,
) -> Result<CandidateRow, AppError> {
    let row = sqlx::query_as::<_, CandidateRow>(
        r#"
        INSERT INTO candidates
            (username, city, phone, email, apply_position, born_address, gender,
             bachelor_school, master_school, doctor_school, major, degree, creator)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *
        "#,
    )
    .bind(&candidate.username)
    .bind(&candidate.city)
    .bind(&candidate.phone)
    .bind(&candidate.email)
    .bind(&candidate.apply_position)
    .bind(&candidate.born_address)
    .bind(&candidate.gender)
    .bind(&candidate.bachelor_school)
    .bind(&candidate.master_school)
    .bind(&candidate.doctor_school)
    .bind(&candidate.major)
    .bind(&candidate.degree)
    .bind(&candidate.creator)
    .fetch_one(&mut *conn)
    .await?;

    info!(candidate_id = %row.id, username = %row.username, "Created candidate");
    Ok(row)
}

#[async_trait]
impl CandidateStore for PgCandidateStore {
    async fn list(
        &self,
        scope: CandidateScope,
        query: &CandidateQuery,
    ) -> Result<Vec<CandidateRow>, AppError> {
        let mut qb = build_list_query(scope, query);
        Ok(qb
            .build_query_as::<CandidateRow>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get(&self, id: Uuid) -> Result<Option<CandidateRow>, AppError> {
        Ok(
            sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &CandidatePatch,
        editor: &str,
    ) -> Result<Option<CandidateRow>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE candidates SET ");
        let mut set = qb.separated(", ");
        for (field, value) in patch.iter() {
            set.push(field.as_str()).push_unseparated(" = ");
            match value {
                FieldValue::Text(v) => set.push_bind_unseparated(v.clone()),
                FieldValue::Score(v) => set.push_bind_unseparated(*v),
                FieldValue::User(v) => set.push_bind_unseparated(*v),
            };
        }
        set.push("last_editor = ")
            .push_bind_unseparated(editor.to_string());
        set.push("modified_date = now()");
        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        let row = qb
            .build_query_as::<CandidateRow>()
            .fetch_optional(&self.pool)
            .await?;

        if row.is_some() {
            let fields: Vec<&str> = patch.fields().map(CandidateField::as_str).collect();
            info!(candidate_id = %id, editor, ?fields, "Updated candidate");
        }
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::policy::tests::candidate;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_scope_all_has_no_bind() {
        let qb = build_list_query(CandidateScope::All, &CandidateQuery::default());
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT * FROM candidates WHERE TRUE ORDER BY hr_result"));
        assert!(!sql.contains("LIMIT"));
    }

    #[test]
    fn test_assigned_scope_checks_both_slots() {
        let qb = build_list_query(
            CandidateScope::AssignedTo(Uuid::new_v4()),
            &CandidateQuery::default(),
        );
        assert!(qb
            .sql()
            .contains("(first_interviewer_user = $1 OR second_interviewer_user = $2)"));
    }

    #[test]
    fn test_filters_search_and_paging_are_bound() {
        let query = CandidateQuery {
            city: Some("北京".into()),
            hr_result: Some(String::new()),
            hr_interviewer_user: Some(Uuid::new_v4()),
            q: Some("  tsinghua ".into()),
            ..Default::default()
        }
        .paged();
        let qb = build_list_query(CandidateScope::All, &query);
        let sql = qb.sql();
        assert!(sql.contains("AND city = $1"));
        assert!(!sql.contains("hr_result = "));
        assert!(sql.contains("AND hr_interviewer_user = $2"));
        assert!(sql.contains(
            "(username ILIKE $3 OR phone ILIKE $4 OR email ILIKE $5 OR bachelor_school ILIKE $6)"
        ));
        assert!(sql.ends_with("LIMIT $7 OFFSET $8"));
    }

    #[test]
    fn test_paging_is_clamped() {
        let q = CandidateQuery {
            limit: Some(10_000),
            offset: Some(-5),
            ..Default::default()
        }
        .paged();
        assert_eq!(q.limit, Some(MAX_PAGE_SIZE));
        assert_eq!(q.offset, Some(0));
        assert_eq!(CandidateQuery::default().paged().limit, Some(DEFAULT_PAGE_SIZE));
        assert_eq!(q.unpaged().limit, None);
    }

    #[test]
    fn test_blank_typed_filters_deserialize_as_none() {
        let query: CandidateQuery = serde_json::from_value(json!({
            "city": "",
            "first_interviewer_user": "",
            "limit": " ",
            "offset": "20",
        }))
        .unwrap();
        assert_eq!(query.first_interviewer_user, None);
        assert_eq!(query.limit, None);
        assert_eq!(query.offset, Some(20));
        assert!(query.text_filters().is_empty());

        let bad = serde_json::from_value::<CandidateQuery>(json!({"hr_interviewer_user": "bob"}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_escape_like_metacharacters() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
    }

    #[test]
    fn test_patch_rejects_unknown_field() {
        let err = CandidatePatch::from_json(&object(json!({"salary": 1}))).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("salary")));
    }

    #[test]
    fn test_patch_rejects_empty_body() {
        assert!(matches!(
            CandidatePatch::from_json(&Map::new()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_patch_applies_values() {
        let interviewer = Uuid::new_v4();
        let row = candidate(None, None);
        let patch = CandidatePatch::from_json(&object(json!({
            "first_interviewer_user": interviewer.to_string(),
            "first_score": 4.0,
            "city": "",
        })))
        .unwrap();
        let patched = patch.apply_to(&row).unwrap();
        assert_eq!(patched.first_interviewer_user, Some(interviewer));
        assert_eq!(patched.first_score, Some(4.0));
        assert_eq!(patched.city, None);
        assert_eq!(patched.username, row.username);
    }

    #[test]
    fn test_result_requires_assigned_interviewer() {
        let row = candidate(None, None);
        let patch =
            CandidatePatch::from_json(&object(json!({"first_result": "建议复试"}))).unwrap();
        assert!(matches!(
            patch.check_stage_invariant(&row),
            Err(AppError::Validation(msg)) if msg.contains("first_interviewer_user")
        ));

        let assigned = candidate(Some(Uuid::new_v4()), None);
        assert!(patch.check_stage_invariant(&assigned).is_ok());
    }

    #[test]
    fn test_clearing_interviewer_with_recorded_result_is_rejected() {
        let mut row = candidate(None, Some(Uuid::new_v4()));
        row.second_result = Some("待定".into());
        let patch =
            CandidatePatch::from_json(&object(json!({"second_interviewer_user": null}))).unwrap();
        assert!(patch.check_stage_invariant(&row).is_err());
    }

    #[test]
    fn test_untouched_stages_are_not_checked() {
        let mut row = candidate(None, None);
        row.hr_result = Some("待定".into());
        let patch = CandidatePatch::from_json(&object(json!({"city": "上海"}))).unwrap();
        assert!(patch.check_stage_invariant(&row).is_ok());
    }
}
