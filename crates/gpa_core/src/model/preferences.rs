//! Display preferences.

use crate::model::numeric::parse_leading_int;
use crate::model::theme::ThemeName;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Decimal places shown for GPA values unless the user changes it.
pub const DEFAULT_DECIMAL_PLACES: u8 = 2;
/// Largest accepted decimal places setting.
pub const MAX_DECIMAL_PLACES: u8 = 4;

/// User display preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub theme: ThemeName,
    pub dark_mode: bool,
    pub decimal_places: u8,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: ThemeName::default(),
            dark_mode: false,
            decimal_places: DEFAULT_DECIMAL_PLACES,
        }
    }
}

/// Rejection reasons for preference input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceError {
    UnknownTheme(String),
    InvalidDecimalPlaces(String),
    DecimalPlacesOutOfRange(i64),
}

impl Display for PreferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTheme(value) => write!(f, "unknown theme: `{value}`"),
            Self::InvalidDecimalPlaces(value) => {
                write!(f, "decimal places must be a number, got `{value}`")
            }
            Self::DecimalPlacesOutOfRange(value) => write!(
                f,
                "decimal places must be between 0 and {MAX_DECIMAL_PLACES}, got {value}"
            ),
        }
    }
}

impl Error for PreferenceError {}

/// Parses the decimal places field (integer prefix, `0..=4`).
pub fn parse_decimal_places(text: &str) -> Result<u8, PreferenceError> {
    let value = parse_leading_int(text)
        .ok_or_else(|| PreferenceError::InvalidDecimalPlaces(text.trim().to_string()))?;
    u8::try_from(value)
        .ok()
        .filter(|places| *places <= MAX_DECIMAL_PLACES)
        .ok_or(PreferenceError::DecimalPlacesOutOfRange(value))
}

#[cfg(test)]
mod tests {
    use super::{parse_decimal_places, PreferenceError};

    #[test]
    fn accepts_zero_through_four() {
        for places in 0..=4u8 {
            assert_eq!(parse_decimal_places(&places.to_string()), Ok(places));
        }
        assert_eq!(parse_decimal_places("3.7"), Ok(3));
    }

    #[test]
    fn rejects_out_of_range_and_non_numeric() {
        assert_eq!(
            parse_decimal_places("5"),
            Err(PreferenceError::DecimalPlacesOutOfRange(5))
        );
        assert_eq!(
            parse_decimal_places("-1"),
            Err(PreferenceError::DecimalPlacesOutOfRange(-1))
        );
        assert!(matches!(
            parse_decimal_places("two"),
            Err(PreferenceError::InvalidDecimalPlaces(_))
        ));
    }
}
