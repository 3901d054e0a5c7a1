//! Small parsing and validation helpers shared by the form view-models.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ()\-]{7,20}$").expect("phone pattern compiles"));

/// Trimmed value, or `Required(field)` when blank.
pub fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(value)
    }
}

/// Untrimmed value for passwords; blank input is still `Required(field)`.
pub fn secret(field: &'static str, value: &str) -> Result<String, ValidationError> {
    required(field, value)?;
    Ok(value.to_string())
}

pub fn email(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = required(field, value)?;
    if EMAIL.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(ValidationError::Invalid {
            field,
            value: value.to_string(),
        })
    }
}

pub fn phone(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = required(field, value)?;
    if PHONE.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(ValidationError::Invalid {
            field,
            value: value.to_string(),
        })
    }
}

/// `YYYY-MM-DD`, the shape of a date input.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let value = required("date", value)?;
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::Invalid {
        field: "date",
        value: value.to_string(),
    })
}

/// `HH:MM`, the shape of a time input. Seconds are tolerated.
pub fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime, ValidationError> {
    let value = required(field, value)?;
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| ValidationError::Invalid {
            field,
            value: value.to_string(),
        })
}
