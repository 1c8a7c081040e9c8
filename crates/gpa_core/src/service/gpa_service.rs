//! GPA tracker use-case service.
//!
//! # Responsibility
//! - Hold the explicit app state: courses, scale registry, preferences.
//! - Apply user actions (course CRUD, scale management, settings, resets).
//! - Answer GPA queries against the active scale.
//!
//! # Invariants
//! - Every mutation is staged, written to the store, then committed. A use
//!   case touching several keys writes them in one batch, so a failed write
//!   leaves both the store and the in-memory state untouched and is returned
//!   as `ServiceError::Storage` after being logged.
//! - Loading never fails: unreadable values are logged, recorded in
//!   `load_errors()` and replaced by defaults.
//! - GPA queries are recomputed from the current state on every call.

use crate::grading::gpa::{self, SemesterSummary};
use crate::grading::registry::{self, ScaleError, ScaleRegistry};
use crate::model::course::{Course, CourseDraft, CourseId, CourseValidationError};
use crate::model::preferences::{parse_decimal_places, PreferenceError, Preferences};
use crate::model::scale::GradeScaleConfig;
use crate::model::theme::{self, Palette, ThemeName};
use crate::repo::app_repo::{AppRepository, RepoError, RepoResult};
use crate::repo::kv_store::KeyValueStore;
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for GPA tracker use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Course form input was rejected.
    InvalidCourse(CourseValidationError),
    /// Scale selection, creation or deletion was rejected.
    Scale(ScaleError),
    /// Settings input was rejected.
    Preference(PreferenceError),
    CourseNotFound(CourseId),
    /// The store could not be written; the action was not applied.
    Storage(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCourse(err) => write!(f, "{err}"),
            Self::Scale(err) => write!(f, "{err}"),
            Self::Preference(err) => write!(f, "{err}"),
            Self::CourseNotFound(id) => write!(f, "course not found: {id}"),
            Self::Storage(err) => write!(f, "failed to save data: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCourse(err) => Some(err),
            Self::Scale(err) => Some(err),
            Self::Preference(err) => Some(err),
            Self::CourseNotFound(_) => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<CourseValidationError> for ServiceError {
    fn from(value: CourseValidationError) -> Self {
        Self::InvalidCourse(value)
    }
}

impl From<ScaleError> for ServiceError {
    fn from(value: ScaleError) -> Self {
        Self::Scale(value)
    }
}

impl From<PreferenceError> for ServiceError {
    fn from(value: PreferenceError) -> Self {
        Self::Preference(value)
    }
}

/// Everything the UI renders from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub courses: Vec<Course>,
    pub scales: ScaleRegistry,
    pub preferences: Preferences,
}

/// Use-case service over an injected key-value store.
pub struct GpaService<S: KeyValueStore> {
    repo: AppRepository<S>,
    state: AppState,
    load_errors: Vec<String>,
}

impl<S: KeyValueStore> GpaService<S> {
    /// Loads persisted state from `store`.
    pub fn load(store: S) -> Self {
        let repo = AppRepository::new(store);
        let mut load_errors = Vec::new();

        let courses = recover(repo.load_courses(), "courses", &mut load_errors);
        let custom = recover(repo.load_custom_scales(), "custom_scales", &mut load_errors);
        let selected = recover(repo.load_selected_scale(), "selected_scale", &mut load_errors);
        let preferences = recover(repo.load_preferences(), "preferences", &mut load_errors);

        let scales = ScaleRegistry::from_parts(custom, selected);
        let duplicates = scales.duplicate_tables().len();
        if duplicates > 0 {
            debug!("event=scale_duplicate module=service status=ok identical_pairs={duplicates}");
        }

        info!(
            "event=state_load module=service status={} courses={} custom_scales={}",
            if load_errors.is_empty() { "ok" } else { "degraded" },
            courses.len(),
            scales.custom_scales().len()
        );

        Self {
            repo,
            state: AppState {
                courses,
                scales,
                preferences,
            },
            load_errors,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Messages for values that could not be loaded and were reset to defaults.
    pub fn load_errors(&self) -> &[String] {
        &self.load_errors
    }

    pub fn store(&self) -> &S {
        self.repo.store()
    }

    // Courses

    pub fn courses(&self) -> &[Course] {
        &self.state.courses
    }

    pub fn courses_in_semester(&self, semester: u8) -> Vec<&Course> {
        self.state
            .courses
            .iter()
            .filter(|course| course.semester == semester)
            .collect()
    }

    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.state.courses.iter().find(|course| course.id == id)
    }

    /// Validates `draft`, appends it as a new course and returns its id.
    pub fn add_course(&mut self, draft: &CourseDraft) -> ServiceResult<CourseId> {
        let course = Course::from_draft(draft)?;
        let id = course.id;
        let mut next = self.state.courses.clone();
        next.push(course);
        self.commit_courses(next, "course_add")?;
        Ok(id)
    }

    /// Replaces name, grade, credits and course type of course `id`.
    pub fn edit_course(&mut self, id: CourseId, draft: &CourseDraft) -> ServiceResult<()> {
        let mut next = self.state.courses.clone();
        let course = next
            .iter_mut()
            .find(|course| course.id == id)
            .ok_or(ServiceError::CourseNotFound(id))?;
        course.apply_edit(draft)?;
        self.commit_courses(next, "course_edit")
    }

    pub fn remove_course(&mut self, id: CourseId) -> ServiceResult<()> {
        let mut next = self.state.courses.clone();
        let before = next.len();
        next.retain(|course| course.id != id);
        if next.len() == before {
            return Err(ServiceError::CourseNotFound(id));
        }
        self.commit_courses(next, "course_remove")
    }

    fn commit_courses(&mut self, next: Vec<Course>, event: &str) -> ServiceResult<()> {
        write_through(self.repo.save_courses(&next), event)?;
        debug!(
            "event={event} module=service status=ok courses={}",
            next.len()
        );
        self.state.courses = next;
        Ok(())
    }

    // GPA

    /// GPA over every course under the active scale.
    pub fn overall_gpa(&self) -> f64 {
        gpa::compute_gpa(&self.state.courses, self.active_scale())
    }

    /// GPA over the courses of `semester` under the active scale.
    pub fn semester_gpa(&self, semester: u8) -> f64 {
        gpa::compute_semester_gpa(&self.state.courses, semester, self.active_scale())
    }

    pub fn semester_breakdown(&self) -> Vec<SemesterSummary> {
        gpa::semester_breakdown(&self.state.courses, self.active_scale())
    }

    /// Formats `value` with the user's decimal places setting.
    pub fn display_gpa(&self, value: f64) -> String {
        gpa::format_gpa(value, self.state.preferences.decimal_places)
    }

    // Scales

    pub fn scales(&self) -> &ScaleRegistry {
        &self.state.scales
    }

    pub fn active_scale(&self) -> &GradeScaleConfig {
        self.state.scales.active_scale()
    }

    pub fn select_scale(&mut self, name: &str) -> ServiceResult<()> {
        let mut next = self.state.scales.clone();
        next.select(name)?;
        write_through(self.repo.save_selected_scale(name), "scale_select")?;
        self.state.scales = next;
        Ok(())
    }

    /// Builds a custom scale from `overrides`, stores it and selects it.
    ///
    /// A custom scale with the same name is replaced.
    pub fn create_scale(
        &mut self,
        name: &str,
        overrides: &BTreeMap<String, String>,
        description: &str,
    ) -> ServiceResult<()> {
        let scale = registry::create_scale(name, overrides, description)?;
        let name = scale.name.clone();
        let mut next = self.state.scales.clone();
        next.add_custom(scale)?;
        next.select(&name)?;

        write_through(
            self.repo.save_custom_scales(next.custom_scales(), Some(name.as_str())),
            "scale_create",
        )?;
        info!(
            "event=scale_create module=service status=ok custom_scales={}",
            next.custom_scales().len()
        );
        self.state.scales = next;
        Ok(())
    }

    /// Deletes a custom scale. Returns `true` when the selection fell back to
    /// the base scale.
    pub fn delete_scale(&mut self, name: &str) -> ServiceResult<bool> {
        let mut next = self.state.scales.clone();
        let selection_reset = next.delete_custom(name)?;

        let selected = selection_reset.then(|| next.selected_name());
        write_through(
            self.repo.save_custom_scales(next.custom_scales(), selected),
            "scale_delete",
        )?;
        info!(
            "event=scale_delete module=service status=ok selection_reset={selection_reset}"
        );
        self.state.scales = next;
        Ok(selection_reset)
    }

    // Preferences

    pub fn preferences(&self) -> Preferences {
        self.state.preferences
    }

    pub fn palette(&self) -> Palette {
        let preferences = self.state.preferences;
        theme::palette(preferences.theme, preferences.dark_mode)
    }

    pub fn set_theme(&mut self, name: &str) -> ServiceResult<()> {
        let theme = ThemeName::parse(name)
            .ok_or_else(|| PreferenceError::UnknownTheme(name.trim().to_string()))?;
        write_through(self.repo.save_theme(theme), "prefs_theme")?;
        self.state.preferences.theme = theme;
        Ok(())
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) -> ServiceResult<()> {
        write_through(self.repo.save_dark_mode(dark_mode), "prefs_dark_mode")?;
        self.state.preferences.dark_mode = dark_mode;
        Ok(())
    }

    /// Parses and stores the decimal places field; returns the applied value.
    pub fn set_decimal_places(&mut self, text: &str) -> ServiceResult<u8> {
        let places = parse_decimal_places(text)?;
        write_through(self.repo.save_decimal_places(places), "prefs_decimal_places")?;
        self.state.preferences.decimal_places = places;
        Ok(places)
    }

    // Resets

    pub fn reset_courses(&mut self) -> ServiceResult<()> {
        write_through(self.repo.reset_courses(), "reset_courses")?;
        self.state.courses.clear();
        Ok(())
    }

    /// Removes every custom scale; a custom selection falls back to the base
    /// scale.
    pub fn reset_custom_scales(&mut self) -> ServiceResult<()> {
        let mut next = self.state.scales.clone();
        let selection_reset = next.clear_custom();
        let selected = selection_reset.then(|| next.selected_name());
        write_through(
            self.repo.reset_custom_scales(selected),
            "reset_custom_scales",
        )?;
        self.state.scales = next;
        Ok(())
    }

    pub fn reset_preferences(&mut self) -> ServiceResult<()> {
        write_through(self.repo.reset_preferences(), "reset_preferences")?;
        self.state.preferences = Preferences::default();
        Ok(())
    }

    /// Clears the store and returns to a fresh state.
    pub fn reset_all(&mut self) -> ServiceResult<()> {
        write_through(self.repo.reset_all(), "reset_all")?;
        self.state = AppState::default();
        info!("event=reset_all module=service status=ok");
        Ok(())
    }
}

fn write_through(result: RepoResult<()>, event: &str) -> ServiceResult<()> {
    result.map_err(|err| {
        error!("event={event} module=service status=error error={err}");
        ServiceError::Storage(err)
    })
}

fn recover<T: Default>(result: RepoResult<T>, field: &str, errors: &mut Vec<String>) -> T {
    result.unwrap_or_else(|err| {
        warn!("event=state_load module=service status=degraded field={field} error={err}");
        errors.push(format!("{field}: {err}"));
        T::default()
    })
}
