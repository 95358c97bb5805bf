//! Candidate field catalogue.
//!
//! Every editable or displayable candidate column has a `CandidateField`
//! variant carrying its wire name, a human-readable label, the interview
//! stage it belongs to and the domain its values are drawn from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const DEGREE_CHOICES: &[&str] = &["本科", "硕士", "博士"];
pub const GENDER_CHOICES: &[&str] = &["男", "女"];
pub const FIRST_RESULT_CHOICES: &[&str] = &["建议复试", "待定", "放弃"];
pub const RESULT_CHOICES: &[&str] = &["建议录用", "待定", "放弃"];
pub const HR_GRADE_CHOICES: &[&str] = &["S", "A", "B", "C"];

/// Which section of the candidate record a field lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    Basic,
    FirstRound,
    SecondRound,
    HrRound,
    /// Bookkeeping columns: never shown on the detail form, never writable.
    System,
}

/// Value domain of a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    Choice(&'static [&'static str]),
    Score,
    Interviewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateField {
    Username,
    City,
    Phone,
    Email,
    ApplyPosition,
    BornAddress,
    Gender,
    CandidateRemark,
    BachelorSchool,
    MasterSchool,
    DoctorSchool,
    Major,
    Degree,
    TestScoreOfGeneralAbility,
    PaperScore,
    LastEditor,

    FirstScore,
    FirstLearningAbility,
    FirstProfessionalCompetency,
    FirstAdvantage,
    FirstDisadvantage,
    FirstResult,
    FirstRecommendPosition,
    FirstInterviewerUser,
    FirstRemark,

    SecondScore,
    SecondLearningAbility,
    SecondProfessionalCompetency,
    SecondPursueOfExcellence,
    SecondCommunicationAbility,
    SecondPressureScore,
    SecondAdvantage,
    SecondDisadvantage,
    SecondResult,
    SecondRecommendPosition,
    SecondInterviewerUser,
    SecondRemark,

    HrScore,
    HrResponsibility,
    HrCommunicationAbility,
    HrLogicAbility,
    HrPotential,
    HrStability,
    HrAdvantage,
    HrDisadvantage,
    HrResult,
    HrInterviewerUser,
    HrRemark,

    Creator,
    CreatedDate,
    ModifiedDate,
}

pub struct FieldMeta {
    pub name: &'static str,
    pub label: &'static str,
    pub group: FieldGroup,
    pub kind: FieldKind,
}

const fn meta(
    name: &'static str,
    label: &'static str,
    group: FieldGroup,
    kind: FieldKind,
) -> FieldMeta {
    FieldMeta {
        name,
        label,
        group,
        kind,
    }
}

impl CandidateField {
    /// Declaration order; sections render their fields in this order.
    pub const ALL: &'static [CandidateField] = &[
        Self::Username,
        Self::City,
        Self::Phone,
        Self::Email,
        Self::ApplyPosition,
        Self::BornAddress,
        Self::Gender,
        Self::CandidateRemark,
        Self::BachelorSchool,
        Self::MasterSchool,
        Self::DoctorSchool,
        Self::Major,
        Self::Degree,
        Self::TestScoreOfGeneralAbility,
        Self::PaperScore,
        Self::LastEditor,
        Self::FirstScore,
        Self::FirstLearningAbility,
        Self::FirstProfessionalCompetency,
        Self::FirstAdvantage,
        Self::FirstDisadvantage,
        Self::FirstResult,
        Self::FirstRecommendPosition,
        Self::FirstInterviewerUser,
        Self::FirstRemark,
        Self::SecondScore,
        Self::SecondLearningAbility,
        Self::SecondProfessionalCompetency,
        Self::SecondPursueOfExcellence,
        Self::SecondCommunicationAbility,
        Self::SecondPressureScore,
        Self::SecondAdvantage,
        Self::SecondDisadvantage,
        Self::SecondResult,
        Self::SecondRecommendPosition,
        Self::SecondInterviewerUser,
        Self::SecondRemark,
        Self::HrScore,
        Self::HrResponsibility,
        Self::HrCommunicationAbility,
        Self::HrLogicAbility,
        Self::HrPotential,
        Self::HrStability,
        Self::HrAdvantage,
        Self::HrDisadvantage,
        Self::HrResult,
        Self::HrInterviewerUser,
        Self::HrRemark,
        Self::Creator,
        Self::CreatedDate,
        Self::ModifiedDate,
    ];

    pub fn meta(self) -> FieldMeta {
        use FieldGroup::*;
        use FieldKind::*;

        match self {
            Self::Username => meta("username", "Name", Basic, Text),
            Self::City => meta("city", "City", Basic, Text),
            Self::Phone => meta("phone", "Phone", Basic, Text),
            Self::Email => meta("email", "Email", Basic, Text),
            Self::ApplyPosition => meta("apply_position", "Applied Position", Basic, Text),
            Self::BornAddress => meta("born_address", "Place Of Birth", Basic, Text),
            Self::Gender => meta("gender", "Gender", Basic, Choice(GENDER_CHOICES)),
            Self::CandidateRemark => meta("candidate_remark", "Candidate Remark", Basic, Text),
            Self::BachelorSchool => meta("bachelor_school", "Bachelor School", Basic, Text),
            Self::MasterSchool => meta("master_school", "Master School", Basic, Text),
            Self::DoctorSchool => meta("doctor_school", "Doctor School", Basic, Text),
            Self::Major => meta("major", "Major", Basic, Text),
            Self::Degree => meta("degree", "Degree", Basic, Choice(DEGREE_CHOICES)),
            Self::TestScoreOfGeneralAbility => meta(
                "test_score_of_general_ability",
                "General Ability Test Score",
                Basic,
                Score,
            ),
            Self::PaperScore => meta("paper_score", "Written Test Score", Basic, Score),
            Self::LastEditor => meta("last_editor", "Last Editor", Basic, Text),

            Self::FirstScore => meta("first_score", "First Interview Score", FirstRound, Score),
            Self::FirstLearningAbility => {
                meta("first_learning_ability", "Learning Ability", FirstRound, Score)
            }
            Self::FirstProfessionalCompetency => meta(
                "first_professional_competency",
                "Professional Competency",
                FirstRound,
                Score,
            ),
            Self::FirstAdvantage => meta("first_advantage", "Strengths", FirstRound, Text),
            Self::FirstDisadvantage => meta("first_disadvantage", "Concerns", FirstRound, Text),
            Self::FirstResult => meta(
                "first_result",
                "First Interview Result",
                FirstRound,
                Choice(FIRST_RESULT_CHOICES),
            ),
            Self::FirstRecommendPosition => meta(
                "first_recommend_position",
                "Recommended Position",
                FirstRound,
                Text,
            ),
            Self::FirstInterviewerUser => meta(
                "first_interviewer_user",
                "First Interviewer",
                FirstRound,
                Interviewer,
            ),
            Self::FirstRemark => meta("first_remark", "First Interview Remark", FirstRound, Text),

            Self::SecondScore => meta("second_score", "Second Interview Score", SecondRound, Score),
            Self::SecondLearningAbility => {
                meta("second_learning_ability", "Learning Ability", SecondRound, Score)
            }
            Self::SecondProfessionalCompetency => meta(
                "second_professional_competency",
                "Professional Competency",
                SecondRound,
                Score,
            ),
            Self::SecondPursueOfExcellence => meta(
                "second_pursue_of_excellence",
                "Pursuit Of Excellence",
                SecondRound,
                Score,
            ),
            Self::SecondCommunicationAbility => meta(
                "second_communication_ability",
                "Communication Ability",
                SecondRound,
                Score,
            ),
            Self::SecondPressureScore => {
                meta("second_pressure_score", "Stress Resistance", SecondRound, Score)
            }
            Self::SecondAdvantage => meta("second_advantage", "Strengths", SecondRound, Text),
            Self::SecondDisadvantage => meta("second_disadvantage", "Concerns", SecondRound, Text),
            Self::SecondResult => meta(
                "second_result",
                "Second Interview Result",
                SecondRound,
                Choice(RESULT_CHOICES),
            ),
            Self::SecondRecommendPosition => meta(
                "second_recommend_position",
                "Recommended Position",
                SecondRound,
                Text,
            ),
            Self::SecondInterviewerUser => meta(
                "second_interviewer_user",
                "Second Interviewer",
                SecondRound,
                Interviewer,
            ),
            Self::SecondRemark => {
                meta("second_remark", "Second Interview Remark", SecondRound, Text)
            }

            Self::HrScore => meta("hr_score", "HR Overall Grade", HrRound, Choice(HR_GRADE_CHOICES)),
            Self::HrResponsibility => meta(
                "hr_responsibility",
                "Responsibility",
                HrRound,
                Choice(HR_GRADE_CHOICES),
            ),
            Self::HrCommunicationAbility => meta(
                "hr_communication_ability",
                "Communication",
                HrRound,
                Choice(HR_GRADE_CHOICES),
            ),
            Self::HrLogicAbility => meta(
                "hr_logic_ability",
                "Logical Thinking",
                HrRound,
                Choice(HR_GRADE_CHOICES),
            ),
            Self::HrPotential => {
                meta("hr_potential", "Potential", HrRound, Choice(HR_GRADE_CHOICES))
            }
            Self::HrStability => {
                meta("hr_stability", "Stability", HrRound, Choice(HR_GRADE_CHOICES))
            }
            Self::HrAdvantage => meta("hr_advantage", "Strengths", HrRound, Text),
            Self::HrDisadvantage => meta("hr_disadvantage", "Concerns", HrRound, Text),
            Self::HrResult => meta("hr_result", "HR Result", HrRound, Choice(RESULT_CHOICES)),
            Self::HrInterviewerUser => {
                meta("hr_interviewer_user", "HR Interviewer", HrRound, Interviewer)
            }
            Self::HrRemark => meta("hr_remark", "HR Remark", HrRound, Text),

            Self::Creator => meta("creator", "Creator", System, Text),
            Self::CreatedDate => meta("created_date", "Created", System, Text),
            Self::ModifiedDate => meta("modified_date", "Modified", System, Text),
        }
    }

    pub fn as_str(self) -> &'static str {
        self.meta().name
    }

    pub fn label(self) -> &'static str {
        self.meta().label
    }

    pub fn group(self) -> FieldGroup {
        self.meta().group
    }

    pub fn kind(self) -> FieldKind {
        self.meta().kind
    }

    /// The interviewer slot that must be filled before this stage result is meaningful.
    pub fn required_interviewer(self) -> Option<CandidateField> {
        match self {
            Self::FirstResult => Some(Self::FirstInterviewerUser),
            Self::SecondResult => Some(Self::SecondInterviewerUser),
            Self::HrResult => Some(Self::HrInterviewerUser),
            _ => None,
        }
    }

    /// Parses and validates a JSON value for this field. `null` and `""` clear the field.
    pub fn parse_value(self, raw: &Value) -> Result<FieldValue, String> {
        let name = self.as_str();
        match self.kind() {
            FieldKind::Text => match raw {
                Value::Null => Ok(FieldValue::Text(None)),
                Value::String(s) if s.is_empty() => Ok(FieldValue::Text(None)),
                Value::String(s) => Ok(FieldValue::Text(Some(s.clone()))),
                _ => Err(format!("{name} must be a string")),
            },
            FieldKind::Choice(choices) => match raw {
                Value::Null => Ok(FieldValue::Text(None)),
                Value::String(s) if s.is_empty() => Ok(FieldValue::Text(None)),
                Value::String(s) if choices.contains(&s.as_str()) => {
                    Ok(FieldValue::Text(Some(s.clone())))
                }
                Value::String(s) => Err(format!(
                    "{name} must be one of [{}], got '{s}'",
                    choices.join(", ")
                )),
                _ => Err(format!("{name} must be a string")),
            },
            FieldKind::Score => match raw {
                Value::Null => Ok(FieldValue::Score(None)),
                Value::Number(n) => match n.as_f64() {
                    Some(v) if v >= 0.0 && v.is_finite() => Ok(FieldValue::Score(Some(v))),
                    _ => Err(format!("{name} must be a non-negative number")),
                },
                _ => Err(format!("{name} must be a number")),
            },
            FieldKind::Interviewer => match raw {
                Value::Null => Ok(FieldValue::User(None)),
                Value::String(s) if s.is_empty() => Ok(FieldValue::User(None)),
                Value::String(s) => Uuid::parse_str(s)
                    .map(|id| FieldValue::User(Some(id)))
                    .map_err(|_| format!("{name} must be a user id")),
                _ => Err(format!("{name} must be a user id")),
            },
        }
    }
}

impl fmt::Display for CandidateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CandidateField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown candidate field '{s}'"))
    }
}

/// A validated value ready to be written to a candidate column.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Score(Option<f64>),
    User(Option<Uuid>),
}

impl FieldValue {
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(v) => v.clone().map(Value::String).unwrap_or(Value::Null),
            FieldValue::Score(v) => v.map(Value::from).unwrap_or(Value::Null),
            FieldValue::User(v) => v.map(|id| Value::String(id.to_string())).unwrap_or(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_names_round_trip_through_from_str() {
        for field in CandidateField::ALL {
            assert_eq!(field.as_str().parse::<CandidateField>(), Ok(*field));
        }
        assert!("salary".parse::<CandidateField>().is_err());
    }

    #[test]
    fn test_serde_name_matches_column_name() {
        for field in CandidateField::ALL {
            let encoded = serde_json::to_value(field).unwrap();
            assert_eq!(encoded, json!(field.as_str()));
        }
    }

    #[test]
    fn test_every_name_is_a_candidate_column() {
        use crate::models::candidate::CandidateRow;
        use chrono::Utc;

        let row: CandidateRow = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "username": "x",
            "created_date": Utc::now(),
            "modified_date": Utc::now(),
        }))
        .unwrap();
        let columns = row.field_values();
        for field in CandidateField::ALL {
            assert!(columns.contains_key(field.as_str()), "missing column {field}");
        }
    }

    #[test]
    fn test_choice_rejects_value_outside_domain() {
        let err = CandidateField::FirstResult
            .parse_value(&json!("建议录用"))
            .unwrap_err();
        assert!(err.contains("first_result"));
        assert_eq!(
            CandidateField::FirstResult.parse_value(&json!("建议复试")),
            Ok(FieldValue::Text(Some("建议复试".to_string())))
        );
    }

    #[test]
    fn test_empty_string_clears_field() {
        assert_eq!(
            CandidateField::HrScore.parse_value(&json!("")),
            Ok(FieldValue::Text(None))
        );
        assert_eq!(
            CandidateField::FirstInterviewerUser.parse_value(&json!("")),
            Ok(FieldValue::User(None))
        );
    }

    #[test]
    fn test_score_must_be_non_negative_number() {
        assert!(CandidateField::FirstScore.parse_value(&json!(-1)).is_err());
        assert!(CandidateField::FirstScore.parse_value(&json!("9")).is_err());
        assert_eq!(
            CandidateField::FirstScore.parse_value(&json!(4.5)),
            Ok(FieldValue::Score(Some(4.5)))
        );
    }

    #[test]
    fn test_score_keeps_the_entered_number() {
        let value = CandidateField::FirstScore.parse_value(&json!(4.1)).unwrap();
        assert_eq!(value.to_json(), json!(4.1));

        let large = CandidateField::PaperScore.parse_value(&json!(1e39)).unwrap();
        assert_eq!(large, FieldValue::Score(Some(1e39)));
        assert_eq!(large.to_json(), json!(1e39));
    }

    #[test]
    fn test_interviewer_requires_uuid() {
        assert!(CandidateField::SecondInterviewerUser
            .parse_value(&json!("bob"))
            .is_err());
        let id = Uuid::new_v4();
        assert_eq!(
            CandidateField::SecondInterviewerUser.parse_value(&json!(id.to_string())),
            Ok(FieldValue::User(Some(id)))
        );
    }

    #[test]
    fn test_stage_results_name_their_interviewer() {
        assert_eq!(
            CandidateField::HrResult.required_interviewer(),
            Some(CandidateField::HrInterviewerUser)
        );
        assert_eq!(CandidateField::HrRemark.required_interviewer(), None);
    }
}
