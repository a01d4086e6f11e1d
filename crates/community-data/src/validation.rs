//! Input checks run before any I/O.
//!
//! Each `validate` returns every problem found, in field order; an empty list
//! means the input is acceptable.

use community_shared::constants::MIN_PASSWORD_LEN;

use crate::error::{DataError, Result};

#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_email(&self.email, &mut errors);
        if self.password.trim().is_empty() {
            errors.push("Password is required".to_string());
        }
        errors
    }
}

#[derive(Debug, Clone)]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl RegisterData {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_email(&self.email, &mut errors);
        check_new_password("Password is required", &self.password, &mut errors);
        if self.password != self.confirm_password {
            errors.push("Passwords do not match".to_string());
        }
        errors
    }
}

#[derive(Debug, Clone)]
pub struct PasswordResetConfirmation {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordResetConfirmation {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.token.trim().is_empty() {
            errors.push("Reset token is required".to_string());
        }
        check_new_password("New password is required", &self.new_password, &mut errors);
        if self.new_password != self.confirm_password {
            errors.push("Passwords do not match".to_string());
        }
        errors
    }
}

/// Checks for a password change; the confirmation is the new password itself.
pub fn validate_password_change(current: &str, new: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if current.trim().is_empty() {
        errors.push("Current password is required".to_string());
    }
    check_new_password("New password is required", new, &mut errors);
    errors
}

pub fn validate_email(email: &str) -> Vec<String> {
    let mut errors = Vec::new();
    check_email(email, &mut errors);
    errors
}

/// Turn a list of problems into a `Validation` error.
pub(crate) fn ensure_valid(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(DataError::Validation(errors))
    }
}

/// `local@domain.tld`, no whitespace, one `@`.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

fn check_email(email: &str, errors: &mut Vec<String>) {
    if email.trim().is_empty() {
        errors.push("Email is required".to_string());
    } else if !is_valid_email(email.trim()) {
        errors.push("Invalid email format".to_string());
    }
}

fn check_new_password(missing: &str, password: &str, errors: &mut Vec<String>) {
    if password.trim().is_empty() {
        errors.push(missing.to_string());
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!("Password must be at least {MIN_PASSWORD_LEN} characters"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str, confirm: &str) -> RegisterData {
        RegisterData {
            email: email.into(),
            password: password.into(),
            confirm_password: confirm.into(),
            name: None,
            phone: None,
        }
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("ada"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada@@example.com"));
        assert!(!is_valid_email("ada @example.com"));
    }

    #[test]
    fn login_requires_both_fields() {
        let ok = LoginCredentials {
            email: "ada@example.com".into(),
            password: "x".into(),
        };
        assert!(ok.validate().is_empty());

        let blank = LoginCredentials {
            email: " ".into(),
            password: "".into(),
        };
        assert_eq!(blank.validate(), vec!["Email is required", "Password is required"]);
    }

    #[test]
    fn register_collects_every_problem() {
        assert!(register("ada@example.com", "secret1", "secret1").validate().is_empty());
        assert_eq!(
            register("nope", "abc", "abd").validate(),
            vec![
                "Invalid email format",
                "Password must be at least 6 characters",
                "Passwords do not match",
            ]
        );
    }

    #[test]
    fn reset_confirmation_needs_token() {
        let confirm = PasswordResetConfirmation {
            token: "".into(),
            new_password: "secret1".into(),
            confirm_password: "secret1".into(),
        };
        assert_eq!(confirm.validate(), vec!["Reset token is required"]);
    }

    #[test]
    fn ensure_valid_maps_to_error() {
        assert!(ensure_valid(vec![]).is_ok());
        assert!(matches!(
            ensure_valid(validate_password_change("", "short")),
            Err(DataError::Validation(errors)) if errors.len() == 2
        ));
    }
}
