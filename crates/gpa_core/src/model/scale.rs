//! Grade scale model.
//!
//! # Responsibility
//! - Define the composite grade key and the persisted scale shape.
//!
//! # Invariants
//! - A composite key is `course-type prefix + uppercased letter`.
//! - `points` keys use the composite string form (`"AP A-"`), which is also
//!   the persisted JSON shape.

use crate::model::course::CourseType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Letter grades every scale assigns points to, best first.
pub const GRADE_LETTERS: [&str; 13] = [
    "A+", "A", "A-", "B+", "B", "B-", "C+", "C", "C-", "D+", "D", "D-", "F",
];

/// Typed composite grade key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GradeKey {
    pub course_type: CourseType,
    /// Uppercased letter grade.
    pub letter: String,
}

impl GradeKey {
    pub fn new(course_type: CourseType, letter: &str) -> Self {
        Self {
            course_type,
            letter: letter.trim().to_uppercase(),
        }
    }

    /// Splits a composite string back into course type and letter.
    ///
    /// Returns `None` when the remaining letter is empty.
    pub fn parse(composite: &str) -> Option<Self> {
        let (course_type, letter) = if let Some(rest) = composite.strip_prefix("AP ") {
            (CourseType::Advanced, rest)
        } else if let Some(rest) = composite.strip_prefix("H ") {
            (CourseType::Honors, rest)
        } else {
            (CourseType::Regular, composite)
        };
        let key = Self::new(course_type, letter);
        (!key.letter.is_empty()).then_some(key)
    }

    /// Whether the letter is one of `GRADE_LETTERS`.
    pub fn is_known(&self) -> bool {
        GRADE_LETTERS.contains(&self.letter.as_str())
    }
}

impl Display for GradeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.course_type.key_prefix(), self.letter)
    }
}

/// Every composite key a complete scale defines, grouped by course type.
pub fn known_grade_keys() -> Vec<GradeKey> {
    CourseType::ALL
        .iter()
        .flat_map(|course_type| {
            GRADE_LETTERS
                .iter()
                .map(move |letter| GradeKey::new(*course_type, letter))
        })
        .collect()
}

/// Named mapping from composite grade key to grade points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeScaleConfig {
    pub name: String,
    pub points: BTreeMap<String, f64>,
    pub description: String,
}

impl GradeScaleConfig {
    pub fn new(
        name: impl Into<String>,
        points: BTreeMap<String, f64>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            points,
            description: description.into(),
        }
    }

    /// Configured points for `key`, if any.
    pub fn points_for(&self, key: &GradeKey) -> Option<f64> {
        self.points.get(&key.to_string()).copied()
    }

    /// Whether both scales assign exactly the same points to the same keys.
    pub fn same_table_as(&self, other: &Self) -> bool {
        self.points == other.points
    }
}
