/// Custom `validator` rules used by the request types
use std::borrow::Cow;

use taskdeck_shared::auth::{password::validate_password_strength, tokens::is_short_token};
use taskdeck_shared::services::validation::{is_valid_color, COLOR_ERROR};
use validator::ValidationError;

pub const EMAIL_ERROR: &str = "Please provide a valid email address";

fn error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

pub fn password(value: &str) -> Result<(), ValidationError> {
    validate_password_strength(value).map_err(|msg| error("password", msg))
}

pub fn short_token(value: &str) -> Result<(), ValidationError> {
    if is_short_token(value) {
        Ok(())
    } else {
        Err(error("token", "Token must be exactly 5 characters"))
    }
}

pub fn color(value: &str) -> Result<(), ValidationError> {
    if is_valid_color(value) {
        Ok(())
    } else {
        Err(error("color", COLOR_ERROR))
    }
}

/// Rejects titles and names that are only whitespace
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "Must not be blank"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules() {
        assert!(password("Abcd123!").is_ok());
        assert!(password("abcd1234").is_err());
        assert!(short_token("0a1b2").is_ok());
        assert!(short_token("0A1B2").is_err());
        assert!(short_token("123456").is_err());
        assert!(color("#fff").is_ok());
        assert!(color("red").is_err());
        assert!(color(&format!("rgb({})", "1".repeat(70))).is_err());
        assert!(not_blank("  ").is_err());
    }

    #[test]
    fn test_messages() {
        let err = short_token("x").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("Token must be exactly 5 characters"));
    }
}
