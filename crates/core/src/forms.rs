//! Form validation for guest details and admin user forms.
//!
//! Field rules are declared with `validator` derives. [`FormErrors`] keeps
//! the messages per field in the order they were raised so a page can show
//! the first one next to each input.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::access::{ACCESS_LEVEL_ADMIN, ACCESS_LEVEL_STAFF};

/// Message for a required field that was left blank.
pub const MSG_REQUIRED: &str = "This field cannot be blank";

// ---------------------------------------------------------------------------
// FormErrors
// ---------------------------------------------------------------------------

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// First message recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flag every listed field whose value is blank.
    pub fn required(&mut self, fields: &[(&str, &str)]) {
        for (name, value) in fields {
            if value.trim().is_empty() {
                self.add(name, MSG_REQUIRED);
            }
        }
    }

    /// Merge `validator` errors, skipping fields already flagged as blank.
    pub fn merge_validation(&mut self, errors: &validator::ValidationErrors) {
        for (field, field_errors) in errors.field_errors() {
            if self.get(&field).is_some_and(|m| m == MSG_REQUIRED) {
                continue;
            }
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {field}"));
                self.add(&field, message);
            }
        }
    }

    fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

// ---------------------------------------------------------------------------
// GuestDetails
// ---------------------------------------------------------------------------

/// Guest details collected by the booking form and the admin edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct GuestDetails {
    #[serde(default)]
    #[validate(length(min = 3, message = "This field must be at least 3 characters long"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(min = 3, message = "This field must be at least 3 characters long"))]
    pub last_name: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl GuestDetails {
    /// Trim surrounding whitespace from every field.
    pub fn normalized(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }

    /// Required presence on all four fields, minimum length on names and an
    /// email-format check.
    pub fn check(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        errors.required(&[
            ("first_name", self.first_name.as_str()),
            ("last_name", self.last_name.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
        ]);
        if let Err(e) = self.validate() {
            errors.merge_validation(&e);
        }
        errors.into_result()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ---------------------------------------------------------------------------
// NewUserForm
// ---------------------------------------------------------------------------

/// Admin "create user" form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewUserForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    #[serde(default = "default_access_level")]
    #[validate(custom(function = "validate_access_level"))]
    pub access_level: i32,
}

fn default_access_level() -> i32 {
    ACCESS_LEVEL_STAFF
}

fn validate_access_level(level: i32) -> Result<(), validator::ValidationError> {
    if (ACCESS_LEVEL_STAFF..=ACCESS_LEVEL_ADMIN).contains(&level) {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("access_level");
        error.message = Some("Unknown access level".into());
        Err(error)
    }
}

impl NewUserForm {
    pub fn check(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        errors.required(&[
            ("first_name", self.first_name.as_str()),
            ("last_name", self.last_name.as_str()),
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
        ]);
        if let Err(e) = self.validate() {
            errors.merge_validation(&e);
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_guest() -> GuestDetails {
        GuestDetails {
            first_name: "John".into(),
            last_name: "Smith".into(),
            email: "john@smith.com".into(),
            phone: "555-555-5555".into(),
        }
    }

    #[test]
    fn valid_guest_passes() {
        assert!(valid_guest().check().is_ok());
    }

    #[test]
    fn bad_email_is_reported_on_email_field() {
        let guest = GuestDetails {
            email: "not-an-email".into(),
            ..valid_guest()
        };
        let errors = guest.check().unwrap_err();
        assert_eq!(errors.get("email"), Some("Invalid email address"));
        assert!(!errors.has("first_name"));
    }

    #[test]
    fn blank_fields_report_required_first() {
        let errors = GuestDetails::default().check().unwrap_err();
        for field in ["first_name", "last_name", "email", "phone"] {
            assert_eq!(errors.get(field), Some(MSG_REQUIRED), "field {field}");
        }
    }

    #[test]
    fn short_names_fail_min_length() {
        let guest = GuestDetails {
            first_name: "Jo".into(),
            ..valid_guest()
        };
        let errors = guest.check().unwrap_err();
        assert_eq!(
            errors.get("first_name"),
            Some("This field must be at least 3 characters long")
        );
    }

    #[test]
    fn normalized_trims_whitespace() {
        let guest = GuestDetails {
            first_name: "  John ".into(),
            ..valid_guest()
        }
        .normalized();
        assert_eq!(guest.first_name, "John");
        assert_eq!(guest.full_name(), "John Smith");
    }

    #[test]
    fn new_user_rejects_unknown_access_level() {
        let form = NewUserForm {
            first_name: "Ada".into(),
            last_name: "Admin".into(),
            email: "ada@example.com".into(),
            password: "long-enough-password".into(),
            access_level: 9,
        };
        let errors = form.check().unwrap_err();
        assert_eq!(errors.get("access_level"), Some("Unknown access level"));
    }

    #[test]
    fn new_user_accepts_every_known_access_level() {
        for access_level in [ACCESS_LEVEL_STAFF, 2, ACCESS_LEVEL_ADMIN] {
            let form = NewUserForm {
                first_name: "Ada".into(),
                last_name: "Admin".into(),
                email: "ada@example.com".into(),
                password: "long-enough-password".into(),
                access_level,
            };
            assert!(form.check().is_ok(), "access level {access_level}");
        }
    }

    #[test]
    fn new_user_short_password() {
        let form = NewUserForm {
            first_name: "Ada".into(),
            last_name: "Admin".into(),
            email: "ada@example.com".into(),
            password: "short".into(),
            access_level: ACCESS_LEVEL_ADMIN,
        };
        let errors = form.check().unwrap_err();
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 8 characters long")
        );
    }
}
