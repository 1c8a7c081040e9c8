//! Core domain logic for the GPA tracker.
//! This crate owns grade scales, GPA math and on-device persistence; the UI
//! only talks to it through `gpa_ffi`.

pub mod db;
pub mod grading;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use grading::gpa::{
    compute_gpa, compute_semester_gpa, format_gpa, round_gpa, semester_breakdown, GpaTotals,
    SemesterSummary,
};
pub use grading::registry::{
    builtin_scales, create_scale, is_builtin, resolve_points, ScaleError, ScaleRegistry,
    BASE_SCALE_NAME, TEMPLATE_SCALE_NAME,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::course::{
    Course, CourseDraft, CourseId, CourseType, CourseValidationError, MAX_SEMESTER, MIN_SEMESTER,
};
pub use model::preferences::{
    parse_decimal_places, PreferenceError, Preferences, DEFAULT_DECIMAL_PLACES,
    MAX_DECIMAL_PLACES,
};
pub use model::scale::{known_grade_keys, GradeKey, GradeScaleConfig, GRADE_LETTERS};
pub use model::theme::{palette, Palette, ThemeName};
pub use repo::app_repo::{AppRepository, RepoError, RepoResult};
pub use repo::kv_store::{
    keys, KeyValueStore, KvWrite, MemoryKvStore, SqliteKvStore, StoreError, StoreResult,
};
pub use service::gpa_service::{AppState, GpaService, ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
