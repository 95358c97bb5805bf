//! Visibility policy for candidate records.
//!
//! A `CandidatePolicy` is built once per request from the authenticated user
//! and answers four questions:
//! - which candidates the user may see at all (`visible_candidates`)
//! - which columns are inline-editable on the list view (`editable_list_fields`)
//! - which field set the detail view is rendered with (`fieldset_for`)
//! - which detail fields are read-only (`readonly_fields`)
//!
//! Everything here is pure; callers guard preconditions (an authenticated
//! user, an existing candidate) before asking.

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::auth::roles::{resolve_roles, RoleSet};
use crate::interview::fields::{CandidateField, FieldGroup};
use crate::interview::fieldsets::FieldSet;
use crate::models::candidate::CandidateRow;
use crate::models::user::CurrentUser;

const INTERVIEWER_SLOTS: &[CandidateField] = &[
    CandidateField::FirstInterviewerUser,
    CandidateField::SecondInterviewerUser,
];

/// The subset of candidate records a user may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "user_id", rename_all = "snake_case")]
pub enum CandidateScope {
    All,
    /// Candidates where the user is first or second interviewer.
    AssignedTo(Uuid),
}

impl CandidateScope {
    pub fn admits(&self, candidate: &CandidateRow) -> bool {
        match self {
            CandidateScope::All => true,
            CandidateScope::AssignedTo(user_id) => {
                candidate.first_interviewer_user == Some(*user_id)
                    || candidate.second_interviewer_user == Some(*user_id)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CandidatePolicy {
    user_id: Uuid,
    username: String,
    is_superuser: bool,
    roles: RoleSet,
}

impl CandidatePolicy {
    pub fn new(user: &CurrentUser, roles: RoleSet) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            is_superuser: user.is_superuser,
            roles,
        }
    }

    /// Resolves the user's roles and builds the policy.
    pub fn for_user(user: &CurrentUser) -> Self {
        Self::new(user, resolve_roles(user))
    }

    /// Superusers and HR oversee the whole pipeline.
    fn has_full_access(&self) -> bool {
        self.is_superuser || self.roles.is_hr()
    }

    pub fn visible_candidates(&self) -> CandidateScope {
        if self.has_full_access() {
            CandidateScope::All
        } else {
            CandidateScope::AssignedTo(self.user_id)
        }
    }

    /// Only HR and administrators reassign interviewers from the list view.
    pub fn editable_list_fields(&self) -> &'static [CandidateField] {
        if self.has_full_access() {
            INTERVIEWER_SLOTS
        } else {
            &[]
        }
    }

    /// First-stage assignment wins over second-stage assignment.
    /// Anyone not matched as an assigned interviewer gets the default set.
    pub fn fieldset_for(&self, candidate: &CandidateRow) -> FieldSet {
        if self.roles.is_interviewer() {
            if candidate.first_interviewer_user == Some(self.user_id) {
                return FieldSet::FirstStage;
            }
            if candidate.second_interviewer_user == Some(self.user_id) {
                return FieldSet::SecondStage;
            }
        }
        FieldSet::Default
    }

    /// Interviewers may not reassign interviewer slots.
    pub fn readonly_fields(&self) -> &'static [CandidateField] {
        if self.roles.is_interviewer() {
            debug!(user = %self.username, "interviewer group present, interviewer slots read-only");
            INTERVIEWER_SLOTS
        } else {
            &[]
        }
    }

    /// Detail fields the user may write: the selected field set minus read-only fields.
    pub fn writable_fields(&self, candidate: &CandidateRow) -> Vec<CandidateField> {
        let readonly = self.readonly_fields();
        self.fieldset_for(candidate)
            .fields()
            .into_iter()
            .filter(|f| f.group() != FieldGroup::System)
            .filter(|f| *f != CandidateField::LastEditor)
            .filter(|f| !readonly.contains(f))
            .collect()
    }

    /// Returns the requested fields the user is not allowed to write, if any.
    pub fn denied_fields(
        &self,
        candidate: &CandidateRow,
        requested: impl IntoIterator<Item = CandidateField>,
    ) -> Vec<CandidateField> {
        let writable = self.writable_fields(candidate);
        requested
            .into_iter()
            .filter(|f| !writable.contains(f))
            .collect()
    }
}
