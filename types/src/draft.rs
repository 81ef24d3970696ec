//! New-user form draft and its local validation.
//!
//! The draft is edited one field at a time and validated only on submit.
//! Validation mirrors what a browser enforces for a `required` text input and a
//! `required` email input, so an invalid draft never reaches the network.

use std::fmt;

use thiserror::Error;

use crate::{NewUser, Role, RoleParseError};

/// Characters HTML allows in the local part of an email address.
const EMAIL_LOCAL_SPECIALS: &str = ".!#$%&'*+/=?^_`{|}~-";
const MAX_DOMAIN_LABEL_LEN: usize = 63;

/// One editable control of the new-user form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Email,
    Role,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Name, FormField::Email, FormField::Role];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Email => "Email",
            FormField::Role => "Role",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Name is required")]
    MissingName,
    #[error("Email is required")]
    MissingEmail,
    #[error("Email must look like name@example.com")]
    InvalidEmail,
}

impl DraftError {
    /// The form control the error points at.
    #[must_use]
    pub const fn field(&self) -> FormField {
        match self {
            DraftError::MissingName => FormField::Name,
            DraftError::MissingEmail | DraftError::InvalidEmail => FormField::Email,
        }
    }
}

/// In-progress values of the new-user form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Draft {
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Draft {
    /// Current text of a field. The role reads as its wire name.
    #[must_use]
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Role => self.role.as_str(),
        }
    }

    /// Replace a single field.
    ///
    /// Text fields accept any value. The role field only accepts the two known
    /// roles; on rejection the draft is left unchanged.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) -> Result<(), RoleParseError> {
        let value = value.into();
        match field {
            FormField::Name => self.name = value,
            FormField::Email => self.email = value,
            FormField::Role => self.role = Role::parse(&value)?,
        }
        Ok(())
    }

    /// Check the draft and build the create request.
    ///
    /// The name is sent as typed; the email is trimmed, as a browser email input
    /// does before validation.
    pub fn validate(&self) -> Result<NewUser, DraftError> {
        if self.name.trim().is_empty() {
            return Err(DraftError::MissingName);
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(DraftError::MissingEmail);
        }
        if !is_valid_email(email) {
            return Err(DraftError::InvalidEmail);
        }
        Ok(NewUser {
            name: self.name.clone(),
            email: email.to_string(),
            role: self.role,
        })
    }
}

/// Email shape check following the HTML "valid e-mail address" grammar:
/// `local@label(.label)*` with no whitespace.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || EMAIL_LOCAL_SPECIALS.contains(c));
    local_ok && domain.split('.').all(is_valid_domain_label)
}

fn is_valid_domain_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_DOMAIN_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, email: &str) -> Draft {
        Draft {
            name: name.to_string(),
            email: email.to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn default_draft_is_empty_user() {
        let d = Draft::default();
        assert_eq!(d.name, "");
        assert_eq!(d.email, "");
        assert_eq!(d.role, Role::User);
    }

    #[test]
    fn set_updates_one_field_at_a_time() {
        let mut d = Draft::default();
        d.set(FormField::Name, "Bob").unwrap();
        assert_eq!(d.value(FormField::Name), "Bob");
        assert_eq!(d.value(FormField::Email), "");
        d.set(FormField::Role, "admin").unwrap();
        assert_eq!(d.role, Role::Admin);
    }

    #[test]
    fn set_rejects_unknown_role_and_keeps_draft() {
        let mut d = draft("Bob", "b@x.com");
        d.role = Role::Admin;
        let before = d.clone();
        assert!(d.set(FormField::Role, "superuser").is_err());
        assert_eq!(d, before);
    }

    #[test]
    fn validate_requires_name() {
        assert_eq!(draft("", "b@x.com").validate(), Err(DraftError::MissingName));
        assert_eq!(draft("   ", "b@x.com").validate(), Err(DraftError::MissingName));
    }

    #[test]
    fn validate_requires_email() {
        assert_eq!(draft("Bob", "").validate(), Err(DraftError::MissingEmail));
        assert_eq!(draft("Bob", "  ").validate(), Err(DraftError::MissingEmail));
    }

    #[test]
    fn validate_checks_email_shape() {
        for bad in ["bob", "bob@", "@x.com", "b ob@x.com", "b@x..com", "b@-x.com", "a@b@c"] {
            assert_eq!(
                draft("Bob", bad).validate(),
                Err(DraftError::InvalidEmail),
                "{bad} should be rejected"
            );
        }
        for good in ["b@x.com", "b@localhost", "first.last+tag@sub.example.org"] {
            assert!(draft("Bob", good).validate().is_ok(), "{good} should pass");
        }
    }

    #[test]
    fn validate_trims_email_but_not_name() {
        let user = draft(" Bob ", "  b@x.com ").validate().unwrap();
        assert_eq!(user.name(), " Bob ");
        assert_eq!(user.email(), "b@x.com");
    }

    #[test]
    fn errors_point_at_their_field() {
        assert_eq!(DraftError::MissingName.field(), FormField::Name);
        assert_eq!(DraftError::InvalidEmail.field(), FormField::Email);
    }
}
