use chrono::{DateTime, TimeZone};
use serde_json::Value;

use crate::errors::AppError;
use crate::interview::fields::CandidateField;
use crate::models::candidate::CandidateRow;

/// Columns of the candidate CSV export, in order.
pub const EXPORT_FIELDS: &[CandidateField] = &[
    CandidateField::Username,
    CandidateField::City,
    CandidateField::Phone,
    CandidateField::BachelorSchool,
    CandidateField::MasterSchool,
    CandidateField::Degree,
    CandidateField::FirstResult,
    CandidateField::FirstInterviewerUser,
    CandidateField::SecondResult,
    CandidateField::SecondInterviewerUser,
    CandidateField::HrResult,
    CandidateField::HrScore,
    CandidateField::HrRemark,
    CandidateField::HrInterviewerUser,
];

pub const EXPORT_PERMISSION: &str = "export";
const FILENAME_PREFIX: &str = "recruitment-candidates";

/// `recruitment-candidates-list-<YYYY-MM-DD-HH-MM-SS>.csv`
pub fn export_filename<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{FILENAME_PREFIX}-list-{}.csv",
        at.format("%Y-%m-%d-%H-%M-%S")
    )
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Renders the header row and one row per candidate.
pub fn render_csv(candidates: &[CandidateRow]) -> Result<Vec<u8>, AppError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(EXPORT_FIELDS.iter().map(|f| f.label()))
        .map_err(|e| AppError::Export(e.to_string()))?;

    for candidate in candidates {
        let values = candidate.field_values();
        wtr.write_record(EXPORT_FIELDS.iter().map(|f| cell(values.get(f.as_str()))))
            .map_err(|e| AppError::Export(e.to_string()))?;
    }

    wtr.into_inner().map_err(|e| AppError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::policy::tests::candidate;
    use chrono::{FixedOffset, Utc};
    use uuid::Uuid;

    #[test]
    fn test_filename_pattern() {
        let at = FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 9, 7, 5, 1)
            .unwrap();
        assert_eq!(
            export_filename(&at),
            "recruitment-candidates-list-2024-03-09-07-05-01.csv"
        );
        assert!(export_filename(&Utc::now()).ends_with(".csv"));
    }

    #[test]
    fn test_two_records_give_header_plus_two_rows() {
        let interviewer = Uuid::new_v4();
        let mut first = candidate(Some(interviewer), None);
        first.first_result = Some("建议复试".into());
        first.hr_remark = Some("strong, but remote only".into());
        let second = candidate(None, None);

        let bytes = render_csv(&[first, second]).unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        let expected: Vec<String> = EXPORT_FIELDS.iter().map(|f| f.label().to_string()).collect();
        assert_eq!(headers, expected);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), EXPORT_FIELDS.len());
        assert_eq!(&rows[0][0], "张三");
        assert_eq!(&rows[0][6], "建议复试");
        assert_eq!(rows[0][7], interviewer.to_string());
        assert_eq!(&rows[0][12], "strong, but remote only");
        assert_eq!(&rows[1][7], "");
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let bytes = render_csv(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("Name,City,Phone"));
    }
}
