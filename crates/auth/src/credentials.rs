//! Sign-up and login form validation.
//!
//! Checks run in a fixed order and the first failure wins, so a user always
//! sees one actionable message at a time.

use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 16;

const SPECIAL_CHARACTERS: &str = "!@#$%^&*()-_=+[]{}|\\:;\"'<>,.?/";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Missing email")]
    MissingEmail,

    #[error("Missing password")]
    MissingPassword,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password needs at least 8 characters")]
    PasswordTooShort,

    #[error("Password cannot have more than 16 characters")]
    PasswordTooLong,

    #[error("Password requires at least a number")]
    MissingNumber,

    #[error("Password requires at least a lowercase character")]
    MissingLowercase,

    #[error("Password requires at least an uppercase character")]
    MissingUppercase,

    #[error("Password requires at least a special character")]
    MissingSpecial,
}

/// Canonical form of an account email (trimmed, lower-cased).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

fn short_enough(password: &str) -> bool {
    password.chars().count() <= MAX_PASSWORD_LEN
}

/// Validate a sign-up form.
pub fn validate_sign_up(email: &str, password: &str, confirmation: &str) -> Result<(), CredentialError> {
    if email.trim().is_empty() {
        return Err(CredentialError::MissingEmail);
    }
    if password.is_empty() {
        return Err(CredentialError::MissingPassword);
    }
    if password != confirmation {
        return Err(CredentialError::PasswordMismatch);
    }
    if !long_enough(password) {
        return Err(CredentialError::PasswordTooShort);
    }
    if !short_enough(password) {
        return Err(CredentialError::PasswordTooLong);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(CredentialError::MissingNumber);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(CredentialError::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(CredentialError::MissingUppercase);
    }
    if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        return Err(CredentialError::MissingSpecial);
    }
    Ok(())
}

/// Validate a login form (presence only; the identity provider decides the rest).
pub fn validate_login(email: &str, password: &str) -> Result<(), CredentialError> {
    if email.trim().is_empty() {
        return Err(CredentialError::MissingEmail);
    }
    if password.is_empty() {
        return Err(CredentialError::MissingPassword);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "Sup3r$ecret";

    #[test]
    fn accepts_a_strong_password() {
        assert_eq!(validate_sign_up("a@b.io", GOOD, GOOD), Ok(()));
    }

    #[test]
    fn presence_checks_come_first() {
        assert_eq!(validate_sign_up("  ", "", ""), Err(CredentialError::MissingEmail));
        assert_eq!(validate_sign_up("a@b.io", "", ""), Err(CredentialError::MissingPassword));
        assert_eq!(
            validate_sign_up("a@b.io", GOOD, "Sup3r$ecreT"),
            Err(CredentialError::PasswordMismatch)
        );
    }

    #[test]
    fn length_bounds_are_inclusive() {
        let seven = "Ab1$xyz";
        assert_eq!(validate_sign_up("a@b.io", seven, seven), Err(CredentialError::PasswordTooShort));

        let eight = "Ab1$xyzw";
        assert_eq!(validate_sign_up("a@b.io", eight, eight), Ok(()));

        let sixteen = "Ab1$xyzwAb1$xyzw";
        assert_eq!(validate_sign_up("a@b.io", sixteen, sixteen), Ok(()));

        let seventeen = "Ab1$xyzwAb1$xyzwq";
        assert_eq!(
            validate_sign_up("a@b.io", seventeen, seventeen),
            Err(CredentialError::PasswordTooLong)
        );
    }

    #[test]
    fn character_class_checks_in_order() {
        let cases = [
            ("Abcdefg$", CredentialError::MissingNumber),
            ("ABCDEF1$", CredentialError::MissingLowercase),
            ("abcdef1$", CredentialError::MissingUppercase),
            ("Abcdef12", CredentialError::MissingSpecial),
        ];
        for (password, expected) in cases {
            assert_eq!(validate_sign_up("a@b.io", password, password), Err(expected), "{password}");
        }
    }

    #[test]
    fn error_messages_are_user_facing() {
        assert_eq!(CredentialError::PasswordTooShort.to_string(), "Password needs at least 8 characters");
        assert_eq!(CredentialError::MissingEmail.to_string(), "Missing email");
    }

    #[test]
    fn login_only_checks_presence() {
        assert_eq!(validate_login("a@b.io", "x"), Ok(()));
        assert_eq!(validate_login("", "x"), Err(CredentialError::MissingEmail));
        assert_eq!(validate_login("a@b.io", ""), Err(CredentialError::MissingPassword));
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }
}
