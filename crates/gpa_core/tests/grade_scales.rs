use gpa_core::{
    builtin_scales, create_scale, known_grade_keys, resolve_points, CourseType, GradeKey,
    ScaleError, ScaleRegistry, BASE_SCALE_NAME,
};
use std::collections::BTreeMap;

fn builtin(name: &str) -> &'static gpa_core::GradeScaleConfig {
    builtin_scales()
        .iter()
        .find(|scale| scale.name == name)
        .unwrap()
}

#[test]
fn resolve_points_returns_exact_configured_values() {
    for scale in builtin_scales() {
        for (composite, expected) in &scale.points {
            let key = GradeKey::parse(composite).unwrap();
            let resolved = resolve_points(scale, key.course_type, &key.letter);
            assert_eq!(resolved, *expected, "{} / {composite}", scale.name);
        }
    }
}

#[test]
fn resolve_points_is_zero_for_unknown_letters() {
    let scale = builtin("4.0 Weighted");
    assert_eq!(resolve_points(scale, CourseType::Regular, "E"), 0.0);
    assert_eq!(resolve_points(scale, CourseType::Advanced, "Z+"), 0.0);
    assert_eq!(resolve_points(scale, CourseType::Honors, ""), 0.0);
}

#[test]
fn resolve_points_uppercases_letter() {
    let scale = builtin("4.0 Weighted");
    assert_eq!(resolve_points(scale, CourseType::Honors, "b+"), 3.8);
    assert_eq!(resolve_points(scale, CourseType::Regular, "a-"), 3.7);
}

#[test]
fn unweighted_scale_gives_no_type_bonus() {
    let scale = builtin(BASE_SCALE_NAME);
    for letter in ["A", "B-", "D+"] {
        let regular = resolve_points(scale, CourseType::Regular, letter);
        assert_eq!(resolve_points(scale, CourseType::Honors, letter), regular);
        assert_eq!(resolve_points(scale, CourseType::Advanced, letter), regular);
    }
}

#[test]
fn create_scale_without_overrides_reproduces_template() {
    let created = create_scale("Copy", &BTreeMap::new(), "").unwrap();
    assert_eq!(created.points, builtin("5.0 Weighted").points);
    assert_eq!(created.points.len(), known_grade_keys().len());

    let mut blanks = BTreeMap::new();
    for key in known_grade_keys() {
        blanks.insert(key.to_string(), "  ".to_string());
    }
    let created = create_scale("Blanks", &blanks, "").unwrap();
    assert_eq!(created.points, builtin("5.0 Weighted").points);
}

#[test]
fn create_scale_applies_overrides_and_ignores_unknown_keys() {
    let mut overrides = BTreeMap::new();
    overrides.insert("AP A".to_string(), "6".to_string());
    overrides.insert("H C-".to_string(), " 2.25 ".to_string());
    overrides.insert("X Q".to_string(), "9".to_string());

    let scale = create_scale("Custom", &overrides, "My district").unwrap();
    assert_eq!(scale.points["AP A"], 6.0);
    assert_eq!(scale.points["H C-"], 2.25);
    assert_eq!(scale.points["A"], 4.0);
    assert!(!scale.points.contains_key("X Q"));
    assert_eq!(scale.description, "My district");
}

#[test]
fn create_scale_requires_name() {
    assert_eq!(
        create_scale("   ", &BTreeMap::new(), "").unwrap_err(),
        ScaleError::EmptyName
    );
}

#[test]
fn duplicate_builtin_tables_are_flagged() {
    let registry = ScaleRegistry::new();
    assert_eq!(
        registry.duplicate_tables(),
        vec![("4.0 Weighted".to_string(), "5.0 Weighted".to_string())]
    );
}

#[test]
fn deleting_selected_custom_scale_reverts_to_first_builtin() {
    let mut registry = ScaleRegistry::new();
    registry
        .add_custom(create_scale("Mine", &BTreeMap::new(), "").unwrap())
        .unwrap();
    registry.select("Mine").unwrap();
    assert_eq!(registry.active_scale().name, "Mine");

    let reset = registry.delete_custom("Mine").unwrap();
    assert!(reset);
    assert_eq!(registry.selected_name(), builtin_scales()[0].name);
    assert!(registry.get("Mine").is_none());
}

#[test]
fn deleting_unselected_custom_scale_keeps_selection() {
    let mut registry = ScaleRegistry::new();
    registry
        .add_custom(create_scale("Mine", &BTreeMap::new(), "").unwrap())
        .unwrap();
    registry.select("4.0 Weighted").unwrap();

    assert!(!registry.delete_custom("Mine").unwrap());
    assert_eq!(registry.selected_name(), "4.0 Weighted");
}

#[test]
fn builtin_scales_cannot_be_deleted_and_unknown_names_fail() {
    let mut registry = ScaleRegistry::new();
    assert_eq!(
        registry.delete_custom("5.0 Weighted"),
        Err(ScaleError::BuiltInScale("5.0 Weighted".to_string()))
    );
    assert_eq!(
        registry.delete_custom("Nope"),
        Err(ScaleError::NotFound("Nope".to_string()))
    );
    assert_eq!(
        registry.select("Nope"),
        Err(ScaleError::NotFound("Nope".to_string()))
    );
    assert_eq!(registry.scales().len(), 3);
}

#[test]
fn from_parts_drops_reserved_names_and_keeps_last_duplicate() {
    let first = create_scale("Mine", &BTreeMap::new(), "first").unwrap();
    let second = create_scale("Mine", &BTreeMap::new(), "second").unwrap();
    let mut shadow = create_scale("x", &BTreeMap::new(), "").unwrap();
    shadow.name = "4.0 Unweighted".to_string();

    let registry =
        ScaleRegistry::from_parts(vec![first, shadow, second], Some("Mine".to_string()));
    assert_eq!(registry.custom_scales().len(), 1);
    assert_eq!(registry.active_scale().description, "second");
}
