//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose course, scale, settings and reset use cases to Dart via FRB.
//! - Translate core errors into plain response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every DB-backed call opens the database, loads state, runs one use case
//!   and drops the connection before returning.
//! - Failure messages carry the call name and the core error text.

use gpa_core::db::open_db;
use gpa_core::{
    builtin_scales, core_version as core_version_inner, format_gpa,
    init_logging as init_logging_inner, is_builtin, known_grade_keys, ping as ping_inner,
    resolve_points, CourseDraft, CourseType, GpaService, GradeScaleConfig, Palette,
    ServiceError, SqliteKvStore, MAX_SEMESTER, MIN_SEMESTER, TEMPLATE_SCALE_NAME,
};
use log::warn;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const DB_PATH_ENV: &str = "GPA_TRACKER_DB_PATH";
#[cfg(not(test))]
const DB_FILE_NAME: &str = "gpa_tracker.sqlite3";
#[cfg(test)]
const DB_FILE_NAME: &str = "gpa_tracker_ffi_test.sqlite3";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

type Service<'conn> = GpaService<SqliteKvStore<'conn>>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action response envelope for mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Created course ID, when the action created one.
    pub id: Option<String>,
    /// Human-readable response message for alerts.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            id: None,
            message: message.into(),
        }
    }

    fn created(message: impl Into<String>, id: String) -> Self {
        Self {
            ok: true,
            id: Some(id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }

    fn from_result(call: &str, result: Result<String, String>) -> Self {
        match result {
            Ok(message) => Self::success(message),
            Err(err) => Self::failure(format!("{call} failed: {err}")),
        }
    }
}

/// One course row for list screens.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseItem {
    pub id: String,
    pub name: String,
    pub grade: String,
    /// Raw credit text as entered.
    pub credits: String,
    /// `regular|honors|ap`.
    pub course_type: String,
    pub semester: u32,
    /// Grade points under the active scale.
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseListResponse {
    pub ok: bool,
    pub items: Vec<CourseItem>,
    pub message: String,
}

/// Per-semester line of the GPA summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SemesterGpaItem {
    pub semester: u32,
    pub course_count: u32,
    pub credits: f64,
    pub gpa: f64,
    /// `gpa` formatted with the decimal places setting.
    pub gpa_display: String,
}

/// GPA overview under the active scale.
#[derive(Debug, Clone, PartialEq)]
pub struct GpaSummaryResponse {
    pub ok: bool,
    pub scale_name: String,
    pub overall_gpa: f64,
    pub overall_display: String,
    pub semesters: Vec<SemesterGpaItem>,
    pub message: String,
}

/// One composite grade key and its points.
#[derive(Debug, Clone, PartialEq)]
pub struct GradePointItem {
    /// Composite key, e.g. `H B+`.
    pub key: String,
    pub points: f64,
}

/// Raw text entered for one grade key in the create-scale form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradePointOverride {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleItem {
    pub name: String,
    pub description: String,
    pub builtin: bool,
    pub selected: bool,
    /// Points in display order (regular, honors, AP; best grade first).
    pub points: Vec<GradePointItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleListResponse {
    pub ok: bool,
    pub items: Vec<ScaleItem>,
    pub selected: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsResponse {
    pub ok: bool,
    /// `blue|green|purple|orange`.
    pub theme: String,
    pub dark_mode: bool,
    pub decimal_places: u32,
    pub message: String,
}

/// Resolved colors for the stored theme and dark mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemePalette {
    pub theme: String,
    pub dark_mode: bool,
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
    pub card: String,
    pub border: String,
    pub input_background: String,
}

/// Overall GPA and per-semester breakdown.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn gpa_summary() -> GpaSummaryResponse {
    let result = with_service(|service| {
        let places = service.preferences().decimal_places;
        let overall = service.overall_gpa();
        let semesters = service
            .semester_breakdown()
            .into_iter()
            .map(|row| SemesterGpaItem {
                semester: u32::from(row.semester),
                course_count: u32::try_from(row.course_count).unwrap_or(u32::MAX),
                credits: row.credits,
                gpa: row.gpa,
                gpa_display: format_gpa(row.gpa, places),
            })
            .collect::<Vec<_>>();
        Ok(GpaSummaryResponse {
            ok: true,
            scale_name: service.active_scale().name.clone(),
            overall_gpa: overall,
            overall_display: format_gpa(overall, places),
            semesters,
            message: String::new(),
        })
    });

    result.unwrap_or_else(|err| GpaSummaryResponse {
        ok: false,
        scale_name: String::new(),
        overall_gpa: 0.0,
        overall_display: String::new(),
        semesters: Vec::new(),
        message: format!("gpa_summary failed: {err}"),
    })
}

/// Lists courses, optionally only those of one semester.
#[flutter_rust_bridge::frb(sync)]
pub fn courses_list(semester: Option<u32>) -> CourseListResponse {
    let result = with_service(|service| {
        let scale = service.active_scale();
        let items = service
            .courses()
            .iter()
            .filter(|course| semester.map_or(true, |wanted| u32::from(course.semester) == wanted))
            .map(|course| CourseItem {
                id: course.id.to_string(),
                name: course.name.clone(),
                grade: course.grade.clone(),
                credits: course.credits.clone(),
                course_type: course.course_type.as_str().to_string(),
                semester: u32::from(course.semester),
                points: resolve_points(scale, course.course_type, &course.grade),
            })
            .collect::<Vec<_>>();
        Ok(items)
    });

    match result {
        Ok(items) => {
            let message = if items.is_empty() {
                "No courses.".to_string()
            } else {
                format!("Found {} course(s).", items.len())
            };
            CourseListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => CourseListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("courses_list failed: {err}"),
        },
    }
}

/// Adds a course.
///
/// Input semantics:
/// - `course_type`: `regular|honors|ap` (`advanced` accepted).
/// - `semester`: `1..=8`.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns the created course ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn course_add(
    name: String,
    grade: String,
    credits: String,
    course_type: String,
    semester: u32,
) -> ActionResponse {
    let result = parse_course_type(&course_type)
        .and_then(|course_type| {
            let semester = parse_semester(semester)?;
            Ok(CourseDraft::new(name, grade, credits, course_type, semester))
        })
        .and_then(|draft| with_service(|service| Ok(service.add_course(&draft)?)));

    match result {
        Ok(id) => ActionResponse::created("Course added.", id.to_string()),
        Err(err) => ActionResponse::failure(format!("course_add failed: {err}")),
    }
}

/// Replaces name, grade, credits and type of an existing course.
///
/// The course keeps its semester.
#[flutter_rust_bridge::frb(sync)]
pub fn course_edit(
    id: String,
    name: String,
    grade: String,
    credits: String,
    course_type: String,
) -> ActionResponse {
    let result = parse_course_id(&id).and_then(|id| {
        let course_type = parse_course_type(&course_type)?;
        with_service(|service| {
            let semester = service
                .course(id)
                .map_or(MIN_SEMESTER, |course| course.semester);
            let draft = CourseDraft::new(name, grade, credits, course_type, semester);
            service.edit_course(id, &draft)?;
            Ok("Course updated.".to_string())
        })
    });
    ActionResponse::from_result("course_edit", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn course_remove(id: String) -> ActionResponse {
    let result = parse_course_id(&id).and_then(|id| {
        with_service(|service| {
            service.remove_course(id)?;
            Ok("Course removed.".to_string())
        })
    });
    ActionResponse::from_result("course_remove", result)
}

/// Lists built-in then custom scales with the current selection.
#[flutter_rust_bridge::frb(sync)]
pub fn scales_list() -> ScaleListResponse {
    let result = with_service(|service| {
        let registry = service.scales();
        let selected = registry.active_scale().name.clone();
        let items = registry
            .scales()
            .into_iter()
            .map(|scale| to_scale_item(scale, scale.name == selected))
            .collect::<Vec<_>>();
        Ok((items, selected))
    });

    match result {
        Ok((items, selected)) => ScaleListResponse {
            ok: true,
            items,
            selected,
            message: String::new(),
        },
        Err(err) => ScaleListResponse {
            ok: false,
            items: Vec::new(),
            selected: String::new(),
            message: format!("scales_list failed: {err}"),
        },
    }
}

/// Every grade key a custom scale defines, with the value used when the
/// create form leaves it blank.
///
/// # FFI contract
/// - Sync call, no DB access.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn scale_grade_keys() -> Vec<GradePointItem> {
    builtin_scales()
        .iter()
        .find(|scale| scale.name == TEMPLATE_SCALE_NAME)
        .map(ordered_points)
        .unwrap_or_default()
}

#[flutter_rust_bridge::frb(sync)]
pub fn scale_select(name: String) -> ActionResponse {
    let result = with_service(|service| {
        service.select_scale(&name)?;
        Ok("Scale selected.".to_string())
    });
    ActionResponse::from_result("scale_select", result)
}

/// Creates (or replaces) a custom scale and selects it.
///
/// Blank override values take the template scale's points; unknown keys are
/// ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn scale_create(
    name: String,
    overrides: Vec<GradePointOverride>,
    description: String,
) -> ActionResponse {
    let overrides = overrides
        .into_iter()
        .map(|entry| (entry.key, entry.value))
        .collect::<BTreeMap<_, _>>();
    let result = with_service(|service| {
        service.create_scale(&name, &overrides, &description)?;
        Ok("Scale created.".to_string())
    });
    ActionResponse::from_result("scale_create", result)
}

/// Deletes a custom scale. Built-in scales are refused.
#[flutter_rust_bridge::frb(sync)]
pub fn scale_delete(name: String) -> ActionResponse {
    let result = with_service(|service| {
        let selection_reset = service.delete_scale(&name)?;
        Ok(if selection_reset {
            format!(
                "Scale deleted. Switched to {}.",
                service.active_scale().name
            )
        } else {
            "Scale deleted.".to_string()
        })
    });
    ActionResponse::from_result("scale_delete", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn settings_get() -> SettingsResponse {
    match with_service(|service| Ok(service.preferences())) {
        Ok(preferences) => SettingsResponse {
            ok: true,
            theme: preferences.theme.as_str().to_string(),
            dark_mode: preferences.dark_mode,
            decimal_places: u32::from(preferences.decimal_places),
            message: String::new(),
        },
        Err(err) => SettingsResponse {
            ok: false,
            theme: String::new(),
            dark_mode: false,
            decimal_places: 0,
            message: format!("settings_get failed: {err}"),
        },
    }
}

/// Stores the theme (`blue|green|purple|orange`).
#[flutter_rust_bridge::frb(sync)]
pub fn settings_set_theme(theme: String) -> ActionResponse {
    let result = with_service(|service| {
        service.set_theme(&theme)?;
        Ok("Theme updated.".to_string())
    });
    ActionResponse::from_result("settings_set_theme", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn settings_set_dark_mode(enabled: bool) -> ActionResponse {
    let result = with_service(|service| {
        service.set_dark_mode(enabled)?;
        Ok("Dark mode updated.".to_string())
    });
    ActionResponse::from_result("settings_set_dark_mode", result)
}

/// Stores the decimal places field as typed (`0..=4`).
#[flutter_rust_bridge::frb(sync)]
pub fn settings_set_decimal_places(value: String) -> ActionResponse {
    let result = with_service(|service| {
        let places = service.set_decimal_places(&value)?;
        Ok(format!("Decimal places set to {places}."))
    });
    ActionResponse::from_result("settings_set_decimal_places", result)
}

/// Colors for the stored theme. Falls back to the default light palette when
/// the database cannot be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_palette() -> ThemePalette {
    let preferences = with_service(|service| Ok(service.preferences())).unwrap_or_default();
    let colors = gpa_core::palette(preferences.theme, preferences.dark_mode);
    to_theme_palette(preferences.theme.as_str(), preferences.dark_mode, colors)
}

#[flutter_rust_bridge::frb(sync)]
pub fn reset_courses() -> ActionResponse {
    let result = with_service(|service| {
        service.reset_courses()?;
        Ok("All courses deleted.".to_string())
    });
    ActionResponse::from_result("reset_courses", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn reset_custom_scales() -> ActionResponse {
    let result = with_service(|service| {
        service.reset_custom_scales()?;
        Ok("Custom scales deleted.".to_string())
    });
    ActionResponse::from_result("reset_custom_scales", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn reset_preferences() -> ActionResponse {
    let result = with_service(|service| {
        service.reset_preferences()?;
        Ok("Preferences reset.".to_string())
    });
    ActionResponse::from_result("reset_preferences", result)
}

/// Deletes every stored value.
#[flutter_rust_bridge::frb(sync)]
pub fn reset_all_data() -> ActionResponse {
    let result = with_service(|service| {
        service.reset_all()?;
        Ok("All data deleted.".to_string())
    });
    ActionResponse::from_result("reset_all_data", result)
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_service<T>(
    f: impl FnOnce(&mut Service<'_>) -> Result<T, ServiceError>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("DB open failed: {err}"))?;
    let store =
        SqliteKvStore::try_new(&conn).map_err(|err| format!("store init failed: {err}"))?;
    let mut service = GpaService::load(store);
    if !service.load_errors().is_empty() {
        warn!(
            "event=ffi_load module=ffi status=degraded errors={}",
            service.load_errors().len()
        );
    }
    f(&mut service).map_err(|err| err.to_string())
}

fn parse_course_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid course id `{}`", raw.trim()))
}

fn parse_course_type(raw: &str) -> Result<CourseType, String> {
    CourseType::parse(raw).ok_or_else(|| format!("unknown course type `{}`", raw.trim()))
}

fn parse_semester(raw: u32) -> Result<u8, String> {
    u8::try_from(raw)
        .ok()
        .filter(|semester| (MIN_SEMESTER..=MAX_SEMESTER).contains(semester))
        .ok_or_else(|| format!("semester {raw} is outside {MIN_SEMESTER}..={MAX_SEMESTER}"))
}

fn ordered_points(scale: &GradeScaleConfig) -> Vec<GradePointItem> {
    known_grade_keys()
        .into_iter()
        .map(|key| GradePointItem {
            points: scale.points_for(&key).unwrap_or(0.0),
            key: key.to_string(),
        })
        .collect()
}

fn to_scale_item(scale: &GradeScaleConfig, selected: bool) -> ScaleItem {
    ScaleItem {
        name: scale.name.clone(),
        description: scale.description.clone(),
        builtin: is_builtin(&scale.name),
        selected,
        points: ordered_points(scale),
    }
}

fn to_theme_palette(theme: &str, dark_mode: bool, colors: Palette) -> ThemePalette {
    ThemePalette {
        theme: theme.to_string(),
        dark_mode,
        primary: colors.primary.to_string(),
        secondary: colors.secondary.to_string(),
        accent: colors.accent.to_string(),
        background: colors.background.to_string(),
        text: colors.text.to_string(),
        card: colors.card.to_string(),
        border: colors.border.to_string(),
        input_background: colors.input_background.to_string(),
    }
}
