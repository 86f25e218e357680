//! Reusable field validators
//!
//! Each validator receives the field name and its value and returns the
//! message to report under that field when the value is rejected.
//! Values of the wrong JSON type pass through; type checks happen earlier.

use regex::Regex;
use serde_json::Value;
use validator::ValidateEmail;

/// Validator: field is required (not null)
pub fn required() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |_: &str, value: &Value| {
        if value.is_null() {
            Err("This field is required.".to_string())
        } else {
            Ok(())
        }
    }
}

/// Validator: string must not be blank
pub fn not_blank() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |_: &str, value: &Value| match value.as_str() {
        Some(s) if s.trim().is_empty() => Err("This field may not be blank.".to_string()),
        _ => Ok(()),
    }
}

/// Validator: string length must be within range (in characters)
pub fn string_length(
    min: usize,
    max: usize,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: &Value| {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        let len = s.chars().count();
        if len < min {
            Err(format!("Ensure this field has at least {} characters.", min))
        } else if len > max {
            Err(format!("Ensure this field has no more than {} characters.", max))
        } else {
            Ok(())
        }
    }
}

/// Validator: value must be in allowed list
pub fn in_list(
    allowed: Vec<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| match value.as_str() {
        Some(s) if !allowed.iter().any(|a| a == s) => Err(format!(
            "{} must be one of: {}",
            capitalize(field),
            allowed.join(", ")
        )),
        _ => Ok(()),
    }
}

/// Validator: string must match a regular expression
pub fn pattern(
    regex: Regex,
    message: &'static str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: &Value| match value.as_str() {
        Some(s) if !regex.is_match(s) => Err(message.to_string()),
        _ => Ok(()),
    }
}

/// Validator: date must match format
pub fn date_format(
    format: &'static str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: &Value| match value.as_str() {
        Some(s) if chrono::NaiveDate::parse_from_str(s, format).is_err() => Err(format!(
            "Date has wrong format. Use one of these formats instead: {}.",
            format
        )),
        _ => Ok(()),
    }
}

/// Validator: string must be an email address
pub fn email() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |_: &str, value: &Value| match value.as_str() {
        Some(s) if !s.to_string().validate_email() => {
            Err("Enter a valid email address.".to_string())
        }
        _ => Ok(()),
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required() {
        let v = required();
        assert_eq!(v("name", &json!(null)), Err("This field is required.".to_string()));
        assert!(v("name", &json!("x")).is_ok());
        assert!(v("age", &json!(0)).is_ok());
    }

    #[test]
    fn test_not_blank() {
        let v = not_blank();
        assert!(v("message", &json!("   ")).is_err());
        assert!(v("message", &json!("hi")).is_ok());
        assert!(v("message", &json!(3)).is_ok());
    }

    #[test]
    fn test_string_length_counts_characters() {
        let v = string_length(2, 4);
        assert!(v("code", &json!("a")).is_err());
        assert!(v("code", &json!("ébcd")).is_ok());
        assert_eq!(
            v("code", &json!("abcde")),
            Err("Ensure this field has no more than 4 characters.".to_string())
        );
    }

    #[test]
    fn test_in_list_message() {
        let v = in_list(vec!["todo".to_string(), "done".to_string()]);
        assert!(v("status", &json!("todo")).is_ok());
        assert_eq!(
            v("status", &json!("later")),
            Err("Status must be one of: todo, done".to_string())
        );
    }

    #[test]
    fn test_pattern() {
        let v = pattern(Regex::new(r"^\d{6}$").unwrap(), "Pincode must be 6 digits");
        assert!(v("pincode", &json!("411001")).is_ok());
        assert_eq!(v("pincode", &json!("41100a")), Err("Pincode must be 6 digits".to_string()));
    }

    #[test]
    fn test_date_format() {
        let v = date_format("%Y-%m-%d");
        assert!(v("dob", &json!("1990-05-17")).is_ok());
        assert!(v("dob", &json!("17/05/1990")).is_err());
    }

    #[test]
    fn test_email() {
        let e = email();
        assert!(e("email", &json!("alice@example.com")).is_ok());
        assert!(e("email", &json!("not-an-email")).is_err());
        assert!(e("email", &json!(null)).is_ok());
    }
}
