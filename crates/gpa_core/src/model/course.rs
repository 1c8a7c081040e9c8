//! Course domain model.
//!
//! # Responsibility
//! - Define the persisted course record and its form draft.
//! - Validate drafts before they reach the course list.
//!
//! # Invariants
//! - `id` is generated once and never reassigned.
//! - `grade` is uppercased whenever a draft is applied.
//! - `semester` is within `MIN_SEMESTER..=MAX_SEMESTER`.
//! - `credits` keeps the raw user text; `credit_hours()` is the numeric view.

use crate::model::numeric::parse_leading_float;
use crate::model::scale::GradeKey;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a course.
pub type CourseId = Uuid;

/// First selectable semester.
pub const MIN_SEMESTER: u8 = 1;
/// Last selectable semester.
pub const MAX_SEMESTER: u8 = 8;

/// Course rigor tier. Selects the grade key prefix used for point lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseType {
    #[default]
    Regular,
    Honors,
    /// Advanced placement. Stored as `ap`.
    #[serde(rename = "ap")]
    Advanced,
}

impl CourseType {
    pub const ALL: [Self; 3] = [Self::Regular, Self::Honors, Self::Advanced];

    /// Prefix prepended to the letter grade to form a composite grade key.
    pub fn key_prefix(self) -> &'static str {
        match self {
            Self::Regular => "",
            Self::Honors => "H ",
            Self::Advanced => "AP ",
        }
    }

    /// Stable wire label (`regular|honors|ap`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Honors => "honors",
            Self::Advanced => "ap",
        }
    }

    /// Parses a wire label; `advanced` is accepted as an alias of `ap`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "regular" => Some(Self::Regular),
            "honors" => Some(Self::Honors),
            "ap" | "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

/// One graded course in the user's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    /// Uppercased letter grade, e.g. `A-`.
    pub grade: String,
    /// Raw credit text as typed by the user.
    pub credits: String,
    pub course_type: CourseType,
    pub semester: u8,
}

impl Course {
    /// Builds a course from a validated draft with a fresh id.
    pub fn from_draft(draft: &CourseDraft) -> Result<Self, CourseValidationError> {
        draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            grade: normalize_grade(&draft.grade),
            credits: draft.credits.trim().to_string(),
            course_type: draft.course_type,
            semester: draft.semester,
        })
    }

    /// Replaces the editable fields from `draft`. The semester is kept.
    pub fn apply_edit(&mut self, draft: &CourseDraft) -> Result<(), CourseValidationError> {
        draft.validate_fields()?;
        self.name = draft.name.trim().to_string();
        self.grade = normalize_grade(&draft.grade);
        self.credits = draft.credits.trim().to_string();
        self.course_type = draft.course_type;
        Ok(())
    }

    /// Numeric credit hours. Unparseable, empty or negative text counts as 0.
    pub fn credit_hours(&self) -> f64 {
        parse_leading_float(&self.credits)
            .filter(|hours| *hours > 0.0)
            .unwrap_or(0.0)
    }

    /// Composite key used to look this course up in a grade scale.
    pub fn grade_key(&self) -> GradeKey {
        GradeKey::new(self.course_type, &self.grade)
    }
}

/// Form input for creating or editing a course.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CourseDraft {
    pub name: String,
    pub grade: String,
    pub credits: String,
    pub course_type: CourseType,
    /// Ignored by edits.
    pub semester: u8,
}

impl CourseDraft {
    pub fn new(
        name: impl Into<String>,
        grade: impl Into<String>,
        credits: impl Into<String>,
        course_type: CourseType,
        semester: u8,
    ) -> Self {
        Self {
            name: name.into(),
            grade: grade.into(),
            credits: credits.into(),
            course_type,
            semester,
        }
    }

    /// Checks required fields and the semester range.
    pub fn validate(&self) -> Result<(), CourseValidationError> {
        self.validate_fields()?;
        if !(MIN_SEMESTER..=MAX_SEMESTER).contains(&self.semester) {
            return Err(CourseValidationError::SemesterOutOfRange(self.semester));
        }
        Ok(())
    }

    fn validate_fields(&self) -> Result<(), CourseValidationError> {
        if self.name.trim().is_empty() {
            return Err(CourseValidationError::MissingName);
        }
        if self.grade.trim().is_empty() {
            return Err(CourseValidationError::MissingGrade);
        }
        if self.credits.trim().is_empty() {
            return Err(CourseValidationError::MissingCredits);
        }
        Ok(())
    }
}

/// Rejection reasons for course form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseValidationError {
    MissingName,
    MissingGrade,
    MissingCredits,
    SemesterOutOfRange(u8),
}

impl Display for CourseValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "course name is required"),
            Self::MissingGrade => write!(f, "grade is required"),
            Self::MissingCredits => write!(f, "credits are required"),
            Self::SemesterOutOfRange(value) => write!(
                f,
                "semester {value} is outside {MIN_SEMESTER}..={MAX_SEMESTER}"
            ),
        }
    }
}

impl Error for CourseValidationError {}

fn normalize_grade(grade: &str) -> String {
    grade.trim().to_uppercase()
}
