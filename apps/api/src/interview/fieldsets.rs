use serde::Serialize;

use crate::interview::fields::{CandidateField, FieldGroup};

/// A titled group of fields rendered together on the detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub group: FieldGroup,
}

const BASIC: Section = Section {
    title: "Basic information",
    group: FieldGroup::Basic,
};
const FIRST_ROUND: Section = Section {
    title: "First interview",
    group: FieldGroup::FirstRound,
};
const SECOND_ROUND: Section = Section {
    title: "Second interview",
    group: FieldGroup::SecondRound,
};
const HR_ROUND: Section = Section {
    title: "HR interview",
    group: FieldGroup::HrRound,
};

/// The field sets a detail view can be rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSet {
    /// Everything; HR and administrators.
    Default,
    /// Basic information plus first interview feedback.
    FirstStage,
    /// Basic information, first interview feedback for context, and second interview feedback.
    SecondStage,
}

impl FieldSet {
    pub fn sections(self) -> &'static [Section] {
        match self {
            FieldSet::Default => &[BASIC, FIRST_ROUND, SECOND_ROUND, HR_ROUND],
            FieldSet::FirstStage => &[BASIC, FIRST_ROUND],
            FieldSet::SecondStage => &[BASIC, FIRST_ROUND, SECOND_ROUND],
        }
    }

    /// Fields of one section, in declaration order.
    pub fn section_fields(section: &Section) -> impl Iterator<Item = CandidateField> + '_ {
        CandidateField::ALL
            .iter()
            .copied()
            .filter(move |f| f.group() == section.group)
    }

    /// All fields shown by this set, section by section.
    pub fn fields(self) -> Vec<CandidateField> {
        self.sections()
            .iter()
            .flat_map(|section| Self::section_fields(section))
            .collect()
    }
}
