//! Field validation: required, type rules, mask completeness, custom hooks

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use validator::ValidateEmail;

use super::field::{Field, FieldKind};
use super::value::{FieldValue, FormValues};

/// Phone numbers: optional leading `+`, digits with common separators
static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9(][0-9\s\-()]{5,19}$").unwrap());

/// CSS hex colors, short or long form
static COLOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());

/// Validation failure shown under a field
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(String),

    #[error("Enter a valid email address")]
    InvalidEmail,

    #[error("Enter a valid phone number")]
    InvalidPhone,

    #[error("Enter a number")]
    NotANumber,

    #[error("Must be at least {0}")]
    TooSmall(f64),

    #[error("Must be at most {0}")]
    TooLarge(f64),

    #[error("Enter a valid date (YYYY-MM-DD)")]
    InvalidDate,

    #[error("Enter a color such as #1e88e5")]
    InvalidColor,

    #[error("Choose one of the listed options")]
    UnknownOption,

    #[error("Input is incomplete")]
    IncompleteInput,

    #[error("{0}")]
    Custom(String),
}

/// Validate a field's value in the context of the whole form
pub fn validate_field(field: &Field, value: &FieldValue, values: &FormValues) -> Result<(), FieldError> {
    if is_missing(&field.kind, value) {
        return if field.required {
            Err(FieldError::Required(field.label.clone()))
        } else {
            Ok(())
        };
    }

    if let (Some(mask), FieldValue::Text(text)) = (&field.mask, value) {
        if !mask.is_complete(text) {
            return Err(FieldError::IncompleteInput);
        }
    }

    check_kind(&field.kind, value)?;

    if let Some(custom) = &field.validator {
        if let Some(message) = custom(value, values) {
            return Err(FieldError::Custom(message));
        }
    }

    Ok(())
}

/// Blank, or an unchecked required-style toggle
fn is_missing(kind: &FieldKind, value: &FieldValue) -> bool {
    match kind {
        FieldKind::Checkbox | FieldKind::Switch => !value.as_bool(),
        _ => value.is_blank(),
    }
}

fn check_kind(kind: &FieldKind, value: &FieldValue) -> Result<(), FieldError> {
    match kind {
        FieldKind::Text | FieldKind::Password | FieldKind::Textarea { .. } => Ok(()),
        FieldKind::Checkbox | FieldKind::Switch => Ok(()),
        FieldKind::Email => {
            if value.as_text().trim().to_string().validate_email() {
                Ok(())
            } else {
                Err(FieldError::InvalidEmail)
            }
        }
        FieldKind::Tel => {
            let text = value.as_text();
            let digits = text.chars().filter(char::is_ascii_digit).count();
            if PHONE_REGEX.is_match(text.trim()) && digits >= 7 {
                Ok(())
            } else {
                Err(FieldError::InvalidPhone)
            }
        }
        FieldKind::Number { min, max, .. } => {
            let n = value.as_number().ok_or(FieldError::NotANumber)?;
            check_bounds(n, *min, *max)
        }
        FieldKind::Range { min, max, .. } => {
            let n = value.as_number().ok_or(FieldError::NotANumber)?;
            check_bounds(n, Some(*min), Some(*max))
        }
        FieldKind::Date => {
            let text = value.as_text();
            let date = text.get(..10).unwrap_or(text.as_str());
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| FieldError::InvalidDate)
        }
        FieldKind::Color => {
            if COLOR_REGEX.is_match(&value.as_text()) {
                Ok(())
            } else {
                Err(FieldError::InvalidColor)
            }
        }
        FieldKind::Select { options, .. } => {
            let known = |v: &str| options.iter().any(|o| o.value == v);
            let ok = match value {
                FieldValue::List(items) => items.iter().all(|i| known(i)),
                other => known(&other.as_text()),
            };
            if ok {
                Ok(())
            } else {
                Err(FieldError::UnknownOption)
            }
        }
        FieldKind::File { .. } => Ok(()),
    }
}

fn check_bounds(n: f64, min: Option<f64>, max: Option<f64>) -> Result<(), FieldError> {
    if let Some(min) = min.filter(|m| n < *m) {
        return Err(FieldError::TooSmall(min));
    }
    if let Some(max) = max.filter(|m| n > *m) {
        return Err(FieldError::TooLarge(max));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::field::SelectOption;

    fn check(field: &Field, value: FieldValue) -> Result<(), FieldError> {
        validate_field(field, &value, &FormValues::new())
    }

    #[test]
    fn test_required() {
        let field = Field::new("title", "Title", FieldKind::Text).required();
        assert_eq!(
            check(&field, FieldValue::text(" ")),
            Err(FieldError::Required("Title".into()))
        );
        assert!(check(&field, FieldValue::text("Alpomish")).is_ok());

        let optional = Field::new("note", "Note", FieldKind::Email);
        assert!(check(&optional, FieldValue::Empty).is_ok());
    }

    #[test]
    fn test_required_checkbox_must_be_checked() {
        let field = Field::new("terms", "Terms", FieldKind::Checkbox).required();
        assert!(check(&field, FieldValue::Bool(false)).is_err());
        assert!(check(&field, FieldValue::Bool(true)).is_ok());
    }

    #[test]
    fn test_email() {
        let field = Field::new("email", "Email", FieldKind::Email);
        assert!(check(&field, FieldValue::text("librarian@example.com")).is_ok());
        assert_eq!(
            check(&field, FieldValue::text("not-an-email")),
            Err(FieldError::InvalidEmail)
        );
    }

    #[test]
    fn test_phone() {
        let field = Field::new("phone", "Phone", FieldKind::Tel);
        assert!(check(&field, FieldValue::text("+998 (90) 123-45-67")).is_ok());
        assert_eq!(check(&field, FieldValue::text("12ab")), Err(FieldError::InvalidPhone));
        assert_eq!(check(&field, FieldValue::text("123")), Err(FieldError::InvalidPhone));
    }

    #[test]
    fn test_number_bounds() {
        let field = Field::new(
            "pages",
            "Pages",
            FieldKind::Number {
                min: Some(1.0),
                max: Some(5000.0),
                step: None,
            },
        );
        assert!(check(&field, FieldValue::Number(320.0)).is_ok());
        assert_eq!(check(&field, FieldValue::Number(0.0)), Err(FieldError::TooSmall(1.0)));
        assert_eq!(
            check(&field, FieldValue::Number(9000.0)),
            Err(FieldError::TooLarge(5000.0))
        );
        assert_eq!(check(&field, FieldValue::text("abc")), Err(FieldError::NotANumber));
    }

    #[test]
    fn test_date_and_color() {
        let date = Field::new("published", "Published", FieldKind::Date);
        assert!(check(&date, FieldValue::text("2024-02-29")).is_ok());
        assert!(check(&date, FieldValue::text("2024-02-29T00:00:00Z")).is_ok());
        assert_eq!(check(&date, FieldValue::text("2023-02-29")), Err(FieldError::InvalidDate));

        let color = Field::new("accent", "Accent", FieldKind::Color);
        assert!(check(&color, FieldValue::text("#1e88e5")).is_ok());
        assert!(check(&color, FieldValue::text("#fff")).is_ok());
        assert_eq!(check(&color, FieldValue::text("blue")), Err(FieldError::InvalidColor));
    }

    #[test]
    fn test_select_membership() {
        let field = Field::new(
            "lang",
            "Language",
            FieldKind::Select {
                options: vec![SelectOption::new("Uzbek", "uz"), SelectOption::new("Russian", "ru")],
                multiple: true,
            },
        );
        assert!(check(&field, FieldValue::List(vec!["uz".into(), "ru".into()])).is_ok());
        assert_eq!(
            check(&field, FieldValue::List(vec!["en".into()])),
            Err(FieldError::UnknownOption)
        );
    }

    #[test]
    fn test_mask_completeness() {
        let field = Field::new("phone", "Phone", FieldKind::Text).mask("(99) 999-99-99");
        assert_eq!(
            check(&field, FieldValue::text("(90) 12")),
            Err(FieldError::IncompleteInput)
        );
        assert!(check(&field, FieldValue::text("(90) 123-45-67")).is_ok());
    }

    #[test]
    fn test_custom_validator_sees_siblings() {
        let field = Field::new("confirm", "Confirm", FieldKind::Password).validate_with(|v, all| {
            let password = all.get("password").map(FieldValue::as_text).unwrap_or_default();
            (v.as_text() != password).then(|| "Passwords do not match".to_string())
        });
        let mut values = FormValues::new();
        values.insert("password".into(), FieldValue::text("secret"));
        assert_eq!(
            validate_field(&field, &FieldValue::text("other"), &values),
            Err(FieldError::Custom("Passwords do not match".into()))
        );
        assert!(validate_field(&field, &FieldValue::text("secret"), &values).is_ok());
    }
}
