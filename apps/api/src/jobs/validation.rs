use serde::Deserialize;

use crate::auth::roles::RoleSet;
use crate::interview::fields::{DEGREE_CHOICES, GENDER_CHOICES};
use crate::models::candidate::NewCandidate;
use crate::models::job::ResumeRow;
use crate::models::user::CurrentUser;

pub const JOB_TYPES: &[&str] = &["技术类", "产品类", "运营类", "设计类", "市场营销类"];
pub const JOB_CITIES: &[&str] = &["北京", "上海", "深圳", "杭州"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeSubmission {
    /// Job being applied for; fills `apply_position` when that is left empty.
    pub job_id: Option<i32>,
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
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or("").is_empty()
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

impl ResumeSubmission {
    /// Collects every problem with the submission.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.username.trim().is_empty() {
            errors.push("username is required".to_string());
        }
        if self.phone.trim().is_empty() {
            errors.push("phone is required".to_string());
        } else if !self
            .phone
            .trim()
            .chars()
            .all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == ' ')
        {
            errors.push("phone may only contain digits, spaces, '+' and '-'".to_string());
        }
        if self.email.trim().is_empty() {
            errors.push("email is required".to_string());
        } else if !looks_like_email(self.email.trim()) {
            errors.push(format!("email '{}' is not a valid address", self.email));
        }
        if let Some(degree) = self.degree.as_deref().filter(|d| !d.is_empty()) {
            if !DEGREE_CHOICES.contains(&degree) {
                errors.push(format!("degree must be one of [{}]", DEGREE_CHOICES.join(", ")));
            }
        }
        if let Some(gender) = self.gender.as_deref().filter(|g| !g.is_empty()) {
            if !GENDER_CHOICES.contains(&gender) {
                errors.push(format!("gender must be one of [{}]", GENDER_CHOICES.join(", ")));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn fill_position(&mut self, job_name: &str) {
        if blank(&self.apply_position) {
            self.apply_position = Some(job_name.to_string());
        }
    }
}

/// The candidate record opened for a freshly stored resume.
pub fn candidate_from_resume(resume: &ResumeRow, creator: &str) -> NewCandidate {
    NewCandidate {
        username: resume.username.clone(),
        city: resume.city.clone(),
        phone: Some(resume.phone.clone()),
        email: Some(resume.email.clone()),
        apply_position: resume.apply_position.clone(),
        born_address: resume.born_address.clone(),
        gender: resume.gender.clone(),
        bachelor_school: resume.bachelor_school.clone(),
        master_school: resume.master_school.clone(),
        doctor_school: resume.doctor_school.clone(),
        major: resume.major.clone(),
        degree: resume.degree.clone(),
        creator: Some(creator.to_string()),
    }
}

/// Applicants see their own resumes; HR and superusers see all.
pub fn can_view_resume(user: &CurrentUser, roles: &RoleSet, resume: &ResumeRow) -> bool {
    user.is_superuser || roles.is_hr() || resume.applicant == Some(user.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::resolve_roles;
    use chrono::Utc;
    use uuid::Uuid;

    fn submission() -> ResumeSubmission {
        ResumeSubmission {
            username: "李四".to_string(),
            phone: "+86 138-0000-0000".to_string(),
            email: "lisi@example.com".to_string(),
            degree: Some("硕士".to_string()),
            ..Default::default()
        }
    }

    fn resume(applicant: Option<Uuid>) -> ResumeRow {
        ResumeRow {
            id: 1,
            applicant,
            username: "李四".to_string(),
            city: Some("深圳".to_string()),
            phone: "13900000000".to_string(),
            email: "lisi@example.com".to_string(),
            apply_position: Some("Backend Engineer".to_string()),
            born_address: None,
            gender: Some("男".to_string()),
            bachelor_school: Some("PKU".to_string()),
            master_school: None,
            doctor_school: None,
            major: Some("CS".to_string()),
            degree: Some("本科".to_string()),
            candidate_introduction: None,
            work_experience: None,
            project_experience: None,
            created_date: Utc::now(),
            modified_date: Utc::now(),
        }
    }

    fn user(groups: &[&str], is_superuser: bool) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            username: "viewer".to_string(),
            is_superuser,
            groups: groups.iter().map(|g| g.to_string()).collect(),
            permissions: Default::default(),
        }
    }

    #[test]
    fn test_valid_submission_passes() {
        assert!(submission().validate().is_ok());
    }

    #[test]
    fn test_missing_contact_fields_are_all_reported() {
        let s = ResumeSubmission::default();
        let errors = s.validate().unwrap_err();
        assert_eq!(errors.len(), 3, "{errors:?}");
    }

    #[test]
    fn test_bad_email_and_degree_rejected() {
        let mut s = submission();
        s.email = "lisi@localhost".to_string();
        s.degree = Some("PhD".to_string());
        let errors = s.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("email")));
        assert!(errors.iter().any(|e| e.contains("degree")));
    }

    #[test]
    fn test_phone_with_letters_rejected() {
        let mut s = submission();
        s.phone = "call me".to_string();
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_fill_position_keeps_explicit_choice() {
        let mut s = submission();
        s.fill_position("Data Engineer");
        assert_eq!(s.apply_position.as_deref(), Some("Data Engineer"));
        s.fill_position("Designer");
        assert_eq!(s.apply_position.as_deref(), Some("Data Engineer"));
    }

    #[test]
    fn test_candidate_copies_identity_and_application_fields() {
        let r = resume(Some(Uuid::new_v4()));
        let c = candidate_from_resume(&r, "applicant-1");
        assert_eq!(c.username, r.username);
        assert_eq!(c.phone.as_deref(), Some("13900000000"));
        assert_eq!(c.bachelor_school.as_deref(), Some("PKU"));
        assert_eq!(c.creator.as_deref(), Some("applicant-1"));
    }

    #[test]
    fn test_resume_visibility() {
        let owner = user(&[], false);
        let r = resume(Some(owner.id));
        assert!(can_view_resume(&owner, &resolve_roles(&owner), &r));

        let hr = user(&["hr"], false);
        assert!(can_view_resume(&hr, &resolve_roles(&hr), &r));

        let admin = user(&[], true);
        assert!(can_view_resume(&admin, &resolve_roles(&admin), &r));

        let interviewer = user(&["interviewer"], false);
        assert!(!can_view_resume(&interviewer, &resolve_roles(&interviewer), &r));
    }
}
