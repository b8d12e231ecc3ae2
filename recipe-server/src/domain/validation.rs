use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

pub const MAX_TEXT_LEN: usize = 255;
pub const PRICE_MAX_DIGITS: u32 = 5;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

/// Field name -> list of problems, serialized as a JSON object.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Non-blank text up to `MAX_TEXT_LEN` characters, trimmed.
pub fn text(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    bounded(errors, field, trimmed)
}

/// Text that may be blank but still has a length bound.
pub fn optional_text(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<String> {
    bounded(errors, field, value.trim())
}

fn bounded(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<String> {
    if value.chars().count() > MAX_TEXT_LEN {
        errors.add(
            field,
            format!("Ensure this field has no more than {MAX_TEXT_LEN} characters."),
        );
        return None;
    }
    Some(value.to_string())
}

pub fn minutes(errors: &mut ValidationErrors, field: &str, value: i64) -> Option<i32> {
    if value < 0 {
        errors.add(field, "Ensure this value is greater than or equal to 0.");
        return None;
    }
    match i32::try_from(value) {
        Ok(minutes) => Some(minutes),
        Err(_) => {
            errors.add(field, format!("Ensure this value is less than or equal to {}.", i32::MAX));
            None
        }
    }
}

/// Accepts a JSON string ("5.60") or number (5.6) and enforces NUMERIC(5, 2).
pub fn price(errors: &mut ValidationErrors, field: &str, value: &serde_json::Value) -> Option<Decimal> {
    let parsed = match value {
        serde_json::Value::String(s) => Decimal::from_str(s.trim()).ok(),
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        _ => None,
    };
    let Some(decimal) = parsed else {
        errors.add(field, "A valid number is required.");
        return None;
    };

    if decimal.is_sign_negative() && !decimal.is_zero() {
        errors.add(field, "Ensure this value is greater than or equal to 0.");
        return None;
    }

    let normalized = decimal.normalize();
    let scale = normalized.scale();
    let integer_digits = normalized.trunc().abs().to_string().trim_start_matches('0').len() as u32;

    if scale > PRICE_DECIMAL_PLACES {
        errors.add(
            field,
            format!("Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."),
        );
        return None;
    }
    if integer_digits > PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES {
        errors.add(
            field,
            format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES
            ),
        );
        return None;
    }

    let mut money = normalized;
    money.rescale(PRICE_DECIMAL_PLACES);
    Some(money)
}

pub fn email(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<String> {
    let value = value.trim().to_lowercase();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        errors.add(field, "Enter a valid email address.");
        return None;
    }
    bounded(errors, field, &value)
}

pub const PASSWORD_MIN_LEN: usize = 5;

pub fn password(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<String> {
    if value.chars().count() < PASSWORD_MIN_LEN {
        errors.add(
            field,
            format!("Ensure this field has at least {PASSWORD_MIN_LEN} characters."),
        );
        return None;
    }
    Some(value.to_string())
}
