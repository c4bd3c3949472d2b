use std::sync::OnceLock;

use api_core::Violation;
use regex::Regex;

use crate::contract::model::{Credentials, NewUser};

/// Minimum accepted password length.
pub const PASSWORD_MIN_LEN: usize = 6;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("valid email regex")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Check registration input, collecting every violation instead of
/// stopping at the first one.
pub fn validate_registration(new_user: &NewUser) -> Vec<Violation> {
    let mut violations = Vec::new();

    if new_user.name.trim().is_empty() {
        violations.push(Violation {
            field: "name".to_string(),
            message: "Name is required".to_string(),
        });
    }
    if !is_valid_email(new_user.email.trim()) {
        violations.push(Violation {
            field: "email".to_string(),
            message: "Please enter a valid email".to_string(),
        });
    }
    if new_user.password.len() < PASSWORD_MIN_LEN {
        violations.push(Violation {
            field: "password".to_string(),
            message: "Password must be at least 6 characters".to_string(),
        });
    }

    violations
}

/// Check login input. Password content is not policed here, only presence;
/// the stored hash decides whether it matches.
pub fn validate_login(credentials: &Credentials) -> Vec<Violation> {
    let mut violations = Vec::new();

    if !is_valid_email(credentials.email.trim()) {
        violations.push(Violation {
            field: "email".to_string(),
            message: "Please enter a valid email".to_string(),
        });
    }
    if credentials.password.is_empty() {
        violations.push(Violation {
            field: "password".to_string(),
            message: "Password is required".to_string(),
        });
    }

    violations
}
