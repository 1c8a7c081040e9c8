//! Grade scale registry.
//!
//! # Responsibility
//! - Hold the built-in scales and the user's custom scales.
//! - Resolve `(course type, letter)` to grade points.
//! - Build custom scales from partial point overrides.
//! - Track which scale is selected.
//!
//! # Invariants
//! - Built-in scales are immutable and always listed first.
//! - Custom scale names are unique and never shadow a built-in name.
//! - A lookup miss resolves to `0.0`; it is never an error.
//! - `active_scale()` always returns a scale: an unknown selection falls back
//!   to `BASE_SCALE_NAME`.

use crate::model::course::CourseType;
use crate::model::numeric::parse_leading_float;
use crate::model::scale::{known_grade_keys, GradeKey, GradeScaleConfig, GRADE_LETTERS};
use log::{debug, warn};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// First built-in scale; selected by default and after deleting the
/// selected custom scale.
pub const BASE_SCALE_NAME: &str = "4.0 Unweighted";
/// Built-in scale whose table fills in every key a custom scale leaves blank.
pub const TEMPLATE_SCALE_NAME: &str = "5.0 Weighted";

const UNWEIGHTED: [f64; 13] = [4.0, 4.0, 3.7, 3.3, 3.0, 2.7, 2.3, 2.0, 1.7, 1.3, 1.0, 0.7, 0.0];
const HONORS_WEIGHTED: [f64; 13] = [4.5, 4.5, 4.2, 3.8, 3.5, 3.2, 2.8, 2.5, 2.2, 1.8, 1.5, 1.2, 0.0];
const ADVANCED_WEIGHTED: [f64; 13] =
    [5.0, 5.0, 4.7, 4.3, 4.0, 3.7, 3.3, 3.0, 2.7, 2.3, 2.0, 1.7, 0.0];

// "4.0 Weighted" and "5.0 Weighted" carry the same table; see `duplicate_tables`.
static BUILTIN_SCALES: Lazy<Vec<GradeScaleConfig>> = Lazy::new(|| {
    vec![
        GradeScaleConfig::new(
            BASE_SCALE_NAME,
            point_table(&UNWEIGHTED, &UNWEIGHTED, &UNWEIGHTED),
            "Standard 4.0 scale, no honors/AP bonus",
        ),
        GradeScaleConfig::new(
            "4.0 Weighted",
            point_table(&UNWEIGHTED, &HONORS_WEIGHTED, &ADVANCED_WEIGHTED),
            "4.0 scale with 0.5 bonus for Honors and 1.0 bonus for AP",
        ),
        GradeScaleConfig::new(
            TEMPLATE_SCALE_NAME,
            point_table(&UNWEIGHTED, &HONORS_WEIGHTED, &ADVANCED_WEIGHTED),
            "5.0 scale with 0.5 bonus for Honors and 1.0 bonus for AP",
        ),
    ]
});

fn point_table(
    regular: &[f64; 13],
    honors: &[f64; 13],
    advanced: &[f64; 13],
) -> BTreeMap<String, f64> {
    let mut points = BTreeMap::new();
    for (course_type, values) in [
        (CourseType::Regular, regular),
        (CourseType::Honors, honors),
        (CourseType::Advanced, advanced),
    ] {
        for (letter, value) in GRADE_LETTERS.iter().zip(values.iter()) {
            points.insert(GradeKey::new(course_type, letter).to_string(), *value);
        }
    }
    points
}

/// Built-in scales in display order.
pub fn builtin_scales() -> &'static [GradeScaleConfig] {
    BUILTIN_SCALES.as_slice()
}

/// Whether `name` belongs to a built-in scale.
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_SCALES.iter().any(|scale| scale.name == name)
}

fn base_scale() -> &'static GradeScaleConfig {
    &BUILTIN_SCALES[0]
}

fn template_scale() -> &'static GradeScaleConfig {
    BUILTIN_SCALES
        .iter()
        .find(|scale| scale.name == TEMPLATE_SCALE_NAME)
        .unwrap_or_else(base_scale)
}

/// Grade points for a letter grade in a course of `course_type` under `scale`.
///
/// Unknown letters resolve to `0.0`.
pub fn resolve_points(scale: &GradeScaleConfig, course_type: CourseType, letter_grade: &str) -> f64 {
    scale
        .points_for(&GradeKey::new(course_type, letter_grade))
        .unwrap_or(0.0)
}

/// Builds a custom scale from per-key text overrides.
///
/// `overrides` is keyed by composite grade key (`"H B+"`). Every known key
/// takes its override when the text is non-blank and the template value
/// otherwise. Keys outside the known set are ignored. A blank description
/// becomes `"<name> grade scale"`.
///
/// # Errors
/// - `EmptyName` when `name` is blank.
/// - `InvalidPoints` for the first non-blank override with no numeric prefix.
pub fn create_scale(
    name: &str,
    overrides: &BTreeMap<String, String>,
    description: &str,
) -> Result<GradeScaleConfig, ScaleError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ScaleError::EmptyName);
    }

    let template = template_scale();
    let mut points = BTreeMap::new();
    for key in known_grade_keys() {
        let composite = key.to_string();
        let value = match overrides.get(&composite).map(|text| text.trim()) {
            Some(text) if !text.is_empty() => {
                parse_leading_float(text).ok_or_else(|| ScaleError::InvalidPoints {
                    key: composite.clone(),
                    value: text.to_string(),
                })?
            }
            _ => template.points_for(&key).unwrap_or(0.0),
        };
        points.insert(composite, value);
    }

    let ignored = overrides
        .keys()
        .filter(|key| !points.contains_key(key.as_str()))
        .count();
    if ignored > 0 {
        debug!("event=scale_create module=grading status=ok ignored_override_keys={ignored}");
    }

    let description = description.trim();
    let description = if description.is_empty() {
        format!("{name} grade scale")
    } else {
        description.to_string()
    };

    Ok(GradeScaleConfig::new(name, points, description))
}

/// Grade scale registry errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleError {
    EmptyName,
    InvalidPoints { key: String, value: String },
    ReservedName(String),
    BuiltInScale(String),
    NotFound(String),
}

impl Display for ScaleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "scale name is required"),
            Self::InvalidPoints { key, value } => {
                write!(f, "invalid number for grade {key}: `{value}`")
            }
            Self::ReservedName(name) => {
                write!(f, "scale name `{name}` is reserved by a built-in scale")
            }
            Self::BuiltInScale(name) => write!(f, "built-in scale `{name}` cannot be deleted"),
            Self::NotFound(name) => write!(f, "scale not found: `{name}`"),
        }
    }
}

impl Error for ScaleError {}

/// Built-in plus custom scales and the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleRegistry {
    custom: Vec<GradeScaleConfig>,
    selected: String,
}

impl Default for ScaleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ScaleRegistry {
    /// Registry with no custom scales and the base scale selected.
    pub fn new() -> Self {
        Self {
            custom: Vec::new(),
            selected: BASE_SCALE_NAME.to_string(),
        }
    }

    /// Rebuilds a registry from persisted state.
    ///
    /// Custom scales named like a built-in are dropped; repeated names keep
    /// the last entry. A missing or unknown selection stays as given and is
    /// resolved by `active_scale()`.
    pub fn from_parts(custom: Vec<GradeScaleConfig>, selected: Option<String>) -> Self {
        let mut registry = Self::new();
        for scale in custom {
            if registry.add_custom(scale).is_err() {
                warn!("event=scale_load module=grading status=skipped reason=reserved_name");
            }
        }
        if let Some(selected) = selected {
            registry.selected = selected;
        }
        registry
    }

    /// All scales, built-ins first.
    pub fn scales(&self) -> Vec<&GradeScaleConfig> {
        builtin_scales().iter().chain(self.custom.iter()).collect()
    }

    pub fn custom_scales(&self) -> &[GradeScaleConfig] {
        &self.custom
    }

    pub fn get(&self, name: &str) -> Option<&GradeScaleConfig> {
        builtin_scales()
            .iter()
            .chain(self.custom.iter())
            .find(|scale| scale.name == name)
    }

    /// Selected scale name as stored; may name a scale that no longer exists.
    pub fn selected_name(&self) -> &str {
        &self.selected
    }

    /// Scale used for GPA math.
    pub fn active_scale(&self) -> &GradeScaleConfig {
        self.get(&self.selected).unwrap_or_else(|| base_scale())
    }

    pub fn select(&mut self, name: &str) -> Result<(), ScaleError> {
        if self.get(name).is_none() {
            return Err(ScaleError::NotFound(name.to_string()));
        }
        self.selected = name.to_string();
        Ok(())
    }

    /// Registers a custom scale, replacing a custom scale of the same name.
    pub fn add_custom(&mut self, scale: GradeScaleConfig) -> Result<(), ScaleError> {
        if is_builtin(&scale.name) {
            return Err(ScaleError::ReservedName(scale.name));
        }
        match self.custom.iter_mut().find(|existing| existing.name == scale.name) {
            Some(existing) => *existing = scale,
            None => self.custom.push(scale),
        }
        Ok(())
    }

    /// Deletes a custom scale. Returns `true` when the selection was reset to
    /// the base scale because the deleted scale was selected.
    pub fn delete_custom(&mut self, name: &str) -> Result<bool, ScaleError> {
        if is_builtin(name) {
            return Err(ScaleError::BuiltInScale(name.to_string()));
        }
        let before = self.custom.len();
        self.custom.retain(|scale| scale.name != name);
        if self.custom.len() == before {
            return Err(ScaleError::NotFound(name.to_string()));
        }
        Ok(self.reset_selection_if(|selected| selected == name))
    }

    /// Drops every custom scale. Returns `true` when the selection was reset.
    pub fn clear_custom(&mut self) -> bool {
        self.custom.clear();
        self.reset_selection_if(|selected| !is_builtin(selected))
    }

    fn reset_selection_if(&mut self, predicate: impl FnOnce(&str) -> bool) -> bool {
        if predicate(&self.selected) {
            self.selected = BASE_SCALE_NAME.to_string();
            return true;
        }
        false
    }

    /// Pairs of registered scale names whose point tables are identical.
    pub fn duplicate_tables(&self) -> Vec<(String, String)> {
        let scales = self.scales();
        let mut pairs = Vec::new();
        for (index, left) in scales.iter().enumerate() {
            for right in &scales[index + 1..] {
                if left.same_table_as(right) {
                    pairs.push((left.name.clone(), right.name.clone()));
                }
            }
        }
        pairs
    }
}
