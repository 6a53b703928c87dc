//! Public contact form submission.

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating a [`ContactMessage`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("email address is not valid")]
    InvalidEmail,
}

/// A validated message from the public contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

impl ContactMessage {
    pub const MAX_NAME: usize = 120;
    pub const MAX_EMAIL: usize = 254;
    pub const MAX_MESSAGE: usize = 5000;

    /// Validate raw form fields.
    ///
    /// All text is trimmed; empty optional fields become `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if name, email or message is missing, too long, or
    /// the email has no `local@domain` shape.
    pub fn parse(
        name: &str,
        email: &str,
        phone: Option<&str>,
        subject: Option<&str>,
        message: &str,
    ) -> Result<Self, ContactError> {
        let name = required("name", name, Self::MAX_NAME)?;
        let email = required("email", email, Self::MAX_EMAIL)?;
        let message = required("message", message, Self::MAX_MESSAGE)?;

        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err(ContactError::InvalidEmail),
        }

        Ok(Self {
            name,
            email,
            phone: optional(phone),
            subject: optional(subject),
            message,
        })
    }
}

fn required(field: &'static str, value: &str, max: usize) -> Result<String, ContactError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ContactError::MissingField(field));
    }
    if trimmed.chars().count() > max {
        return Err(ContactError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_message() {
        let msg = ContactMessage::parse(
            " Abena ",
            "abena@example.com",
            Some(""),
            Some(" Bulk maize "),
            "Do you deliver to Kumasi?",
        )
        .unwrap();
        assert_eq!(msg.name, "Abena");
        assert_eq!(msg.phone, None);
        assert_eq!(msg.subject.as_deref(), Some("Bulk maize"));
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            ContactMessage::parse("", "a@b.com", None, None, "hi"),
            Err(ContactError::MissingField("name"))
        );
        assert_eq!(
            ContactMessage::parse("Kojo", "a@b.com", None, None, "  "),
            Err(ContactError::MissingField("message"))
        );
    }

    #[test]
    fn test_invalid_email() {
        for email in ["no-at", "@example.com", "user@localhost"] {
            assert_eq!(
                ContactMessage::parse("Kojo", email, None, None, "hi"),
                Err(ContactError::InvalidEmail),
                "{email}"
            );
        }
    }
}
