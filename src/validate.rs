//! Input validation rules for registration and profile edits.

use regex::Regex;

use std::sync::LazyLock;

use crate::error::ServiceError;
use crate::models::EDUCATION_LEVELS;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

fn invalid(message: &str) -> ServiceError {
    ServiceError::Validation(message.to_string())
}

pub fn username(value: &str) -> Result<(), ServiceError> {
    let length = value.chars().count();
    if length < 3 || length > 20 {
        return Err(invalid("Username must be 3-20 characters"));
    }
    if !USERNAME_RE.is_match(value) {
        return Err(invalid("Username can only contain letters, numbers, _ and -"));
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), ServiceError> {
    if !EMAIL_RE.is_match(value) {
        return Err(invalid("Must be a valid email"));
    }
    Ok(())
}

pub fn password(value: &str) -> Result<(), ServiceError> {
    if value.chars().count() < 8 {
        return Err(invalid("Password must be at least 8 characters"));
    }
    let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        return Err(invalid(
            "Password must contain at least one uppercase letter, one lowercase letter, and one number",
        ));
    }
    Ok(())
}

pub fn leetcode_handle(value: &str) -> Result<(), ServiceError> {
    if value.is_empty() {
        return Err(invalid("LeetCode username is required"));
    }
    if value.chars().count() > 50 {
        return Err(invalid("LeetCode username must be 1-50 characters"));
    }
    Ok(())
}

pub fn education_level(value: &str) -> Result<(), ServiceError> {
    if !EDUCATION_LEVELS.contains(&value) {
        return Err(invalid("Education level is required"));
    }
    Ok(())
}

// Ranged checks count characters, not bytes, so non-ASCII names are
// measured the way a user sees them.
pub fn institution_name(value: &str) -> Result<(), ServiceError> {
    let length = value.chars().count();
    if length < 2 || length > 100 {
        return Err(invalid("Institution name must be 2-100 characters"));
    }
    Ok(())
}

pub fn year(value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(invalid("Year/level is required"));
    }
    Ok(())
}
