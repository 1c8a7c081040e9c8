//! Credit-weighted GPA aggregation.
//!
//! # Invariants
//! - Totals accumulate unrounded; rounding is a display step only.
//! - Zero total credits or overflowing totals yield a GPA of `0.0`, never
//!   NaN or infinity.
//! - Results do not depend on course order beyond float summation noise.

use crate::grading::registry::resolve_points;
use crate::model::course::{Course, MAX_SEMESTER, MIN_SEMESTER};
use crate::model::scale::GradeScaleConfig;

/// Running sums behind a GPA.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GpaTotals {
    pub total_points: f64,
    pub total_credits: f64,
    pub course_count: usize,
}

impl GpaTotals {
    /// Sums `points * credits` and `credits` over `courses` under `scale`.
    pub fn accumulate<'a>(
        courses: impl IntoIterator<Item = &'a Course>,
        scale: &GradeScaleConfig,
    ) -> Self {
        courses.into_iter().fold(Self::default(), |mut totals, course| {
            let credits = course.credit_hours();
            totals.total_points +=
                resolve_points(scale, course.course_type, &course.grade) * credits;
            totals.total_credits += credits;
            totals.course_count += 1;
            totals
        })
    }

    pub fn gpa(&self) -> f64 {
        if self.total_credits <= 0.0 {
            return 0.0;
        }
        let gpa = self.total_points / self.total_credits;
        if gpa.is_finite() {
            gpa
        } else {
            0.0
        }
    }
}

/// Overall GPA of every course in `courses`.
pub fn compute_gpa(courses: &[Course], scale: &GradeScaleConfig) -> f64 {
    GpaTotals::accumulate(courses, scale).gpa()
}

/// GPA of the courses taken in `semester`.
pub fn compute_semester_gpa(courses: &[Course], semester: u8, scale: &GradeScaleConfig) -> f64 {
    GpaTotals::accumulate(
        courses.iter().filter(|course| course.semester == semester),
        scale,
    )
    .gpa()
}

/// One semester's line in a GPA breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemesterSummary {
    pub semester: u8,
    pub course_count: usize,
    pub credits: f64,
    pub gpa: f64,
}

/// Per-semester GPA for every semester that has at least one course.
pub fn semester_breakdown(courses: &[Course], scale: &GradeScaleConfig) -> Vec<SemesterSummary> {
    (MIN_SEMESTER..=MAX_SEMESTER)
        .filter_map(|semester| {
            let totals = GpaTotals::accumulate(
                courses.iter().filter(|course| course.semester == semester),
                scale,
            );
            (totals.course_count > 0).then(|| SemesterSummary {
                semester,
                course_count: totals.course_count,
                credits: totals.total_credits,
                gpa: totals.gpa(),
            })
        })
        .collect()
}

/// Rounds `value` to `places` decimals, ties away from zero.
pub fn round_gpa(value: f64, places: u8) -> f64 {
    let factor = 10_f64.powi(i32::from(places));
    (value * factor).round() / factor
}

/// Fixed-point text for display, e.g. `format_gpa(3.125, 2) == "3.13"`.
///
/// Rounds through `round_gpa` first; the formatter alone rounds ties to even.
pub fn format_gpa(value: f64, places: u8) -> String {
    let rounded = round_gpa(value, places);
    format!("{rounded:.prec$}", prec = usize::from(places))
}
