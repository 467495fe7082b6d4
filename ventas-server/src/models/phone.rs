//! Phone number validation

use super::ValidationError;

/// Maximum length for a phone number
const MAX_PHONE_LEN: usize = 32;

/// Validated phone number
///
/// Lookups and registration key on (client, phone), so the same loose
/// format must be accepted everywhere: digits with optional `+`,
/// separators, and parentheses, as WhatsApp hands them over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Create a validated phone number.
    ///
    /// # Rules
    /// - Not empty after trimming
    /// - Max 32 characters
    /// - Only digits, `+`, `-`, spaces, and parentheses
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "phone" });
        }

        if trimmed.len() > MAX_PHONE_LEN {
            return Err(ValidationError::TooLong {
                field: "phone",
                max: MAX_PHONE_LEN,
            });
        }

        let valid = trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));
        if !valid {
            return Err(ValidationError::InvalidFormat {
                field: "phone",
                reason: "only digits, '+', '-', spaces and parentheses are allowed",
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Get the phone number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_formats() {
        assert!(PhoneNumber::new("987").is_ok());
        assert!(PhoneNumber::new("000").is_ok());
        assert!(PhoneNumber::new("+57 310 123 4567").is_ok());
        assert!(PhoneNumber::new("(310) 123-4567").is_ok());
    }

    #[test]
    fn trims_whitespace() {
        let phone = PhoneNumber::new("  987 ").unwrap();
        assert_eq!(phone.as_str(), "987");
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            PhoneNumber::new("   "),
            Err(ValidationError::Empty { field: "phone" })
        ));
    }

    #[test]
    fn rejects_letters() {
        assert!(PhoneNumber::new("call-me-maybe").is_err());
    }

    #[test]
    fn rejects_overlong() {
        let long = "1".repeat(MAX_PHONE_LEN + 1);
        assert!(matches!(
            PhoneNumber::new(&long),
            Err(ValidationError::TooLong { .. })
        ));
    }
}
