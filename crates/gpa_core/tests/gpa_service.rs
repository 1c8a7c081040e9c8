use gpa_core::db::{open_db, open_db_in_memory};
use gpa_core::{
    keys, CourseDraft, CourseType, GpaService, KeyValueStore, MemoryKvStore, PreferenceError,
    ScaleError, ServiceError, SqliteKvStore, ThemeName, BASE_SCALE_NAME,
};
use rusqlite::Connection;
use serde_json::Value;
use std::collections::BTreeMap;

fn draft(name: &str, grade: &str, credits: &str, semester: u8) -> CourseDraft {
    CourseDraft::new(name, grade, credits, CourseType::Regular, semester)
}

#[test]
fn adding_courses_updates_displayed_gpa() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();
    let mut service = GpaService::load(store);
    assert_eq!(service.active_scale().name, BASE_SCALE_NAME);
    assert_eq!(service.display_gpa(service.overall_gpa()), "0.00");

    service.add_course(&draft("Math", "A", "3", 1)).unwrap();
    assert_eq!(service.display_gpa(service.overall_gpa()), "4.00");

    service.add_course(&draft("Biology", "B", "4", 1)).unwrap();
    assert_eq!(service.display_gpa(service.overall_gpa()), "3.43");
    assert_eq!(service.display_gpa(service.semester_gpa(1)), "3.43");
    assert_eq!(service.semester_gpa(2), 0.0);
}

#[test]
fn editing_grade_changes_gpa_on_next_read() {
    let mut service = GpaService::load(MemoryKvStore::new());
    let id = service.add_course(&draft("Chemistry", "A", "4", 2)).unwrap();
    assert_eq!(service.overall_gpa(), 4.0);

    service
        .edit_course(id, &CourseDraft::new("Chemistry", "c+", "4", CourseType::Honors, 7))
        .unwrap();

    let course = service.course(id).unwrap();
    assert_eq!(course.grade, "C+");
    assert_eq!(course.semester, 2);
    assert_eq!(service.overall_gpa(), 2.3);

    service.select_scale("4.0 Weighted").unwrap();
    assert_eq!(service.overall_gpa(), 2.8);
}

#[test]
fn removing_and_editing_unknown_course_fails() {
    let mut service = GpaService::load(MemoryKvStore::new());
    let id = service.add_course(&draft("Art", "B", "1", 3)).unwrap();
    service.remove_course(id).unwrap();
    assert!(service.courses().is_empty());

    assert!(matches!(
        service.remove_course(id),
        Err(ServiceError::CourseNotFound(missing)) if missing == id
    ));
    assert!(matches!(
        service.edit_course(id, &draft("Art", "A", "1", 3)),
        Err(ServiceError::CourseNotFound(_))
    ));
}

#[test]
fn state_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gpa_tracker.sqlite3");

    let mut overrides = BTreeMap::new();
    overrides.insert("A".to_string(), "4.3".to_string());
    {
        let conn = open_db(&path).unwrap();
        let mut service = GpaService::load(SqliteKvStore::try_new(&conn).unwrap());
        service.add_course(&draft("Physics", "A", "3", 4)).unwrap();
        service.create_scale("District", &overrides, "").unwrap();
        service.set_theme("purple").unwrap();
        service.set_dark_mode(true).unwrap();
        service.set_decimal_places("3").unwrap();
    }

    let conn = open_db(&path).unwrap();
    let service = GpaService::load(SqliteKvStore::try_new(&conn).unwrap());
    assert!(service.load_errors().is_empty());
    assert_eq!(service.courses().len(), 1);
    assert_eq!(service.courses_in_semester(4).len(), 1);
    assert_eq!(service.active_scale().name, "District");
    assert_eq!(service.active_scale().description, "District grade scale");
    assert_eq!(service.display_gpa(service.overall_gpa()), "4.300");

    let preferences = service.preferences();
    assert_eq!(preferences.theme, ThemeName::Purple);
    assert!(preferences.dark_mode);
    assert_eq!(preferences.decimal_places, 3);
}

#[test]
fn persisted_values_use_expected_wire_shape() {
    let store = MemoryKvStore::new();
    let mut service = GpaService::load(&store);
    service
        .add_course(&CourseDraft::new("Calculus", "a-", "5", CourseType::Advanced, 6))
        .unwrap();
    service.create_scale("Mine", &BTreeMap::new(), "desc").unwrap();

    let courses: Value =
        serde_json::from_str(&store.get(keys::COURSES).unwrap().unwrap()).unwrap();
    let course = &courses[0];
    assert_eq!(course["name"], "Calculus");
    assert_eq!(course["grade"], "A-");
    assert_eq!(course["credits"], "5");
    assert_eq!(course["courseType"], "ap");
    assert_eq!(course["semester"], 6);
    assert!(course["id"].is_string());

    let scales: Value =
        serde_json::from_str(&store.get(keys::CUSTOM_SCALES).unwrap().unwrap()).unwrap();
    assert_eq!(scales[0]["name"], "Mine");
    assert_eq!(scales[0]["description"], "desc");
    assert_eq!(scales[0]["points"]["AP A+"], 5.0);
    assert_eq!(
        store.get(keys::SELECTED_SCALE).unwrap().as_deref(),
        Some("Mine")
    );
}

#[test]
fn deleting_selected_custom_scale_reverts_and_persists_selection() {
    let store = MemoryKvStore::new();
    let mut service = GpaService::load(&store);
    service.create_scale("Mine", &BTreeMap::new(), "").unwrap();
    assert_eq!(service.active_scale().name, "Mine");

    assert!(service.delete_scale("Mine").unwrap());
    assert_eq!(service.active_scale().name, BASE_SCALE_NAME);
    assert_eq!(
        store.get(keys::SELECTED_SCALE).unwrap().as_deref(),
        Some(BASE_SCALE_NAME)
    );
    assert_eq!(store.get(keys::CUSTOM_SCALES).unwrap().as_deref(), Some("[]"));

    assert!(matches!(
        service.delete_scale("4.0 Weighted"),
        Err(ServiceError::Scale(ScaleError::BuiltInScale(_)))
    ));
}

#[test]
fn creating_scale_with_builtin_name_is_rejected() {
    let store = MemoryKvStore::new();
    let mut service = GpaService::load(&store);
    assert!(matches!(
        service.create_scale("5.0 Weighted", &BTreeMap::new(), ""),
        Err(ServiceError::Scale(ScaleError::ReservedName(_)))
    ));
    assert!(store.is_empty());
    assert_eq!(service.scales().scales().len(), 3);
}

#[test]
fn settings_reject_invalid_input() {
    let mut service = GpaService::load(MemoryKvStore::new());
    assert!(matches!(
        service.set_theme("teal"),
        Err(ServiceError::Preference(PreferenceError::UnknownTheme(_)))
    ));
    assert!(matches!(
        service.set_decimal_places("7"),
        Err(ServiceError::Preference(PreferenceError::DecimalPlacesOutOfRange(7)))
    ));
    assert!(matches!(
        service.set_decimal_places("x"),
        Err(ServiceError::Preference(PreferenceError::InvalidDecimalPlaces(_)))
    ));
    assert_eq!(service.set_decimal_places("0 places").unwrap(), 0);
    assert_eq!(service.display_gpa(3.6), "4");
}

#[test]
fn palette_follows_theme_and_dark_mode() {
    let mut service = GpaService::load(MemoryKvStore::new());
    let light = service.palette();
    service.set_dark_mode(true).unwrap();
    let dark = service.palette();
    assert_eq!(light.primary, dark.primary);
    assert_ne!(light.background, dark.background);

    service.set_theme("orange").unwrap();
    assert_ne!(service.palette().primary, dark.primary);
}

#[test]
fn resets_clear_only_their_scope() {
    let store = MemoryKvStore::new();
    let mut service = GpaService::load(&store);
    service.add_course(&draft("Music", "B+", "2", 5)).unwrap();
    service.create_scale("Mine", &BTreeMap::new(), "").unwrap();
    service.set_theme("green").unwrap();

    service.reset_preferences().unwrap();
    assert_eq!(service.preferences().theme, ThemeName::Blue);
    assert_eq!(store.get(keys::THEME).unwrap(), None);
    assert_eq!(service.courses().len(), 1);

    service.reset_custom_scales().unwrap();
    assert!(service.scales().custom_scales().is_empty());
    assert_eq!(service.active_scale().name, BASE_SCALE_NAME);
    assert_eq!(service.courses().len(), 1);

    service.reset_courses().unwrap();
    assert!(service.courses().is_empty());
    assert_eq!(store.get(keys::COURSES).unwrap(), None);
}

#[test]
fn reset_all_clears_store_and_state() {
    let store = MemoryKvStore::new();
    let mut service = GpaService::load(&store);
    service.add_course(&draft("Gym", "A", "1", 1)).unwrap();
    service.create_scale("Mine", &BTreeMap::new(), "").unwrap();
    service.set_dark_mode(true).unwrap();

    service.reset_all().unwrap();
    assert!(store.is_empty());
    assert!(service.courses().is_empty());
    assert!(service.scales().custom_scales().is_empty());
    assert!(!service.preferences().dark_mode);

    let reloaded = GpaService::load(&store);
    assert_eq!(reloaded.state(), service.state());
}

#[test]
fn semester_breakdown_lists_only_populated_semesters() {
    let mut service = GpaService::load(MemoryKvStore::new());
    service.add_course(&draft("One", "A", "3", 1)).unwrap();
    service.add_course(&draft("Three", "B", "3", 3)).unwrap();
    service.add_course(&draft("Three b", "C", "3", 3)).unwrap();

    let summary = service.semester_breakdown();
    let semesters = summary.iter().map(|row| row.semester).collect::<Vec<_>>();
    assert_eq!(semesters, vec![1, 3]);
    assert_eq!(summary[1].course_count, 2);
    assert_eq!(summary[1].credits, 6.0);
    assert_eq!(summary[1].gpa, 2.5);
}

fn lock_selected_scale(conn: &Connection) {
    let key = keys::SELECTED_SCALE;
    conn.execute_batch(&format!(
        "CREATE TRIGGER lock_selection_insert BEFORE INSERT ON kv_entries
         WHEN NEW.key = '{key}' BEGIN SELECT RAISE(ABORT, 'selection locked'); END;
         CREATE TRIGGER lock_selection_update BEFORE UPDATE ON kv_entries
         WHEN NEW.key = '{key}' BEGIN SELECT RAISE(ABORT, 'selection locked'); END;"
    ))
    .unwrap();
}

#[test]
fn create_scale_is_not_persisted_when_selection_write_fails() {
    let conn = open_db_in_memory().unwrap();
    lock_selected_scale(&conn);
    let store = SqliteKvStore::try_new(&conn).unwrap();
    let mut service = GpaService::load(&store);

    let err = service
        .create_scale("Mine", &BTreeMap::new(), "")
        .unwrap_err();
    assert!(matches!(err, ServiceError::Storage(_)));
    assert!(service.scales().custom_scales().is_empty());

    assert_eq!(store.get(keys::CUSTOM_SCALES).unwrap(), None);
    let reloaded = GpaService::load(&store);
    assert!(reloaded.scales().custom_scales().is_empty());
    assert_eq!(reloaded.active_scale().name, BASE_SCALE_NAME);
}

#[test]
fn delete_and_reset_keep_store_in_step_when_selection_write_fails() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();
    let mut service = GpaService::load(&store);
    service.create_scale("Mine", &BTreeMap::new(), "").unwrap();
    lock_selected_scale(&conn);

    assert!(matches!(
        service.delete_scale("Mine"),
        Err(ServiceError::Storage(_))
    ));
    assert!(matches!(
        service.reset_custom_scales(),
        Err(ServiceError::Storage(_))
    ));
    assert_eq!(service.active_scale().name, "Mine");

    let reloaded = GpaService::load(&store);
    assert_eq!(reloaded.scales().custom_scales().len(), 1);
    assert_eq!(reloaded.active_scale().name, "Mine");
    assert_eq!(reloaded.state(), service.state());
}
