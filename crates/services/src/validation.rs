//! Input shapes accepted by the services and the field rules they obey.
//!
//! Each input derives [`Validate`]; rules that need a specific message per
//! failure mode are custom functions. Failures become
//! `DomainError::Validation` with one message per offending field.

use std::borrow::Cow;

use domains::{DomainError, DomainResult, FieldErrors};
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

pub const MIN_PURPOSE_CHARS: usize = 10;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Runs the derived rules and maps failures into the domain error.
pub fn validate<T: Validate>(input: &T) -> DomainResult<()> {
    input.validate().map_err(to_domain_error)
}

fn to_domain_error(errors: ValidationErrors) -> DomainError {
    let fields: FieldErrors = errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            let first = errs.first()?;
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{field} is invalid"));
            Some((field.to_string(), message))
        })
        .collect();
    let message = match fields.len() {
        1 => fields.values().next().cloned().unwrap_or_default(),
        _ => "Validation failed".to_string(),
    };
    DomainError::fields(message, fields)
}

/// Trims in place and turns a blank value into `None`.
pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `\S+@\S+\.\S+` anywhere in the value.
fn looks_like_email(value: &str) -> bool {
    value.split_whitespace().any(|token| {
        token.char_indices().any(|(at, c)| {
            c == '@' && at > 0 && {
                let domain = &token[at + 1..];
                domain
                    .char_indices()
                    .any(|(dot, d)| d == '.' && dot > 0 && dot + 1 < domain.len())
            }
        })
    })
}

fn is_strong(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

fn check_username(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(invalid("required", "Username is required"));
    }
    if len < 3 {
        return Err(invalid("length", "Username must be at least 3 characters"));
    }
    if len > 50 {
        return Err(invalid("length", "Username is too long (max 50 characters)"));
    }
    Ok(())
}

fn check_full_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", "Full name is required"));
    }
    Ok(())
}

fn check_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Email is required"));
    }
    if !looks_like_email(value) {
        return Err(invalid("email", "Please provide a valid email address"));
    }
    Ok(())
}

fn check_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Password is required"));
    }
    if value.chars().count() < 6 {
        return Err(invalid("length", "Password must be at least 6 characters"));
    }
    if !is_strong(value) {
        return Err(invalid("strength", "Password must contain lowercase, uppercase, and number"));
    }
    Ok(())
}

fn check_new_password(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < 6 {
        return Err(invalid("length", "New password must be at least 6 characters long"));
    }
    if !is_strong(value) {
        return Err(invalid(
            "strength",
            "New password must contain at least one lowercase letter, one uppercase letter, and one number",
        ));
    }
    Ok(())
}

fn check_contact_number(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Contact number is required"));
    }
    if value.chars().count() < 10 {
        return Err(invalid("length", "Contact number must be at least 10 digits"));
    }
    Ok(())
}

fn check_barangay(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", "Barangay is required for residents"));
    }
    Ok(())
}

fn check_municipality(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", "Municipality is required for residents"));
    }
    Ok(())
}

fn check_province(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", "Province is required for residents"));
    }
    Ok(())
}

fn check_required_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Password is required"));
    }
    Ok(())
}

fn check_current_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", "Current password is required"));
    }
    Ok(())
}

fn check_profile_name(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if !(2..=100).contains(&len) {
        return Err(invalid("length", "Full name must be between 2 and 100 characters"));
    }
    if !value.chars().all(|c| c.is_ascii_alphabetic() || c.is_whitespace()) {
        return Err(invalid("charset", "Full name can only contain letters and spaces"));
    }
    Ok(())
}

fn check_profile_barangay(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if !(2..=100).contains(&len) {
        return Err(invalid("length", "Barangay must be between 2 and 100 characters"));
    }
    Ok(())
}

fn check_profile_contact(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if !(10..=20).contains(&len) {
        return Err(invalid("length", "Contact number must be between 10 and 20 characters"));
    }
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')');
    if !value.chars().all(allowed) {
        return Err(invalid(
            "charset",
            "Contact number can only contain numbers, spaces, and basic symbols",
        ));
    }
    Ok(())
}

fn check_purpose(value: &str) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(invalid("required", "Purpose is required"));
    }
    if len < MIN_PURPOSE_CHARS {
        return Err(invalid("length", "Purpose must be at least 10 characters long"));
    }
    Ok(())
}

/// Resident self-registration, also used for resubmission after denial.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterResidentInput {
    #[validate(custom(function = "check_username"))]
    pub username: String,
    #[validate(custom(function = "check_full_name"))]
    pub full_name: String,
    #[validate(custom(function = "check_email"))]
    pub email: String,
    #[validate(custom(function = "check_password"))]
    pub password: String,
    #[validate(custom(function = "check_contact_number"))]
    pub contact_number: String,
    #[validate(custom(function = "check_barangay"))]
    pub barangay: String,
    #[validate(custom(function = "check_municipality"))]
    pub municipality: String,
    #[validate(custom(function = "check_province"))]
    pub province: String,
}

impl RegisterResidentInput {
    /// Trims every field except the password.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.username,
            &mut self.full_name,
            &mut self.email,
            &mut self.contact_number,
            &mut self.barangay,
            &mut self.municipality,
            &mut self.province,
        ] {
            *field = field.trim().to_string();
        }
        self
    }
}

/// Exactly one of `email` / `username`, plus the password.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginInput {
    pub email: Option<String>,
    pub username: Option<String>,
    #[validate(custom(function = "check_required_password"))]
    pub password: String,
}

impl LoginInput {
    /// Picks the identifier, enforcing the one-of rule and its shape.
    pub fn identifier(&self) -> DomainResult<domains::LoginIdentifier> {
        let email = trimmed(self.email.clone());
        let username = trimmed(self.username.clone());
        match (email, username) {
            (None, None) => Err(DomainError::field(
                "identifier",
                "Please provide either email or username",
            )),
            (Some(_), Some(_)) => Err(DomainError::field(
                "identifier",
                "Please provide either email or username, not both",
            )),
            (Some(email), None) => {
                if !email.contains('@') {
                    return Err(DomainError::field("email", "Please provide a valid email address"));
                }
                if email.chars().count() < 5 {
                    return Err(DomainError::field("email", "Email address is too short"));
                }
                Ok(domains::LoginIdentifier::Email(email))
            }
            (None, Some(username)) => {
                check_username(&username).map_err(|err| {
                    DomainError::field("username", err.message.unwrap_or_default())
                })?;
                if !username
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
                {
                    return Err(DomainError::field(
                        "username",
                        "Username can only contain letters, numbers, hyphens, and underscores",
                    ));
                }
                Ok(domains::LoginIdentifier::Username(username))
            }
        }
    }
}

/// Partial self-service profile update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ProfileInput {
    #[validate(custom(function = "check_profile_name"))]
    pub full_name: Option<String>,
    #[validate(custom(function = "check_profile_barangay"))]
    pub barangay: Option<String>,
    #[validate(custom(function = "check_profile_contact"))]
    pub contact_number: Option<String>,
}

impl ProfileInput {
    pub fn normalized(self) -> Self {
        Self {
            full_name: trimmed(self.full_name),
            barangay: trimmed(self.barangay),
            contact_number: trimmed(self.contact_number),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    #[validate(custom(function = "check_current_password"))]
    pub current_password: String,
    #[validate(custom(function = "check_new_password"))]
    pub new_password: String,
}

impl ChangePasswordInput {
    pub const CURRENT_FIELD: &'static str = "currentPassword";
    pub const NEW_FIELD: &'static str = "newPassword";

    /// Like [`validate`], with field errors keyed by the JSON names.
    pub fn check(&self) -> DomainResult<()> {
        validate(self).map_err(|err| match err {
            DomainError::Validation { message, fields } => DomainError::Validation {
                message,
                fields: fields
                    .into_iter()
                    .map(|(field, text)| {
                        let wire = match field.as_str() {
                            "current_password" => Self::CURRENT_FIELD.to_string(),
                            "new_password" => Self::NEW_FIELD.to_string(),
                            _ => field,
                        };
                        (wire, text)
                    })
                    .collect(),
            },
            other => other,
        })
    }
}

/// Admin-provisioned admin account. Every field is required.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateAdminInput {
    #[validate(custom(function = "check_username"))]
    pub username: String,
    #[validate(custom(function = "check_full_name"))]
    pub full_name: String,
    #[validate(custom(function = "check_email"))]
    pub email: String,
    #[validate(custom(function = "check_password"))]
    pub password: String,
    #[validate(custom(function = "check_contact_number"))]
    pub contact_number: String,
}

impl CreateAdminInput {
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.username,
            &mut self.full_name,
            &mut self.email,
            &mut self.contact_number,
        ] {
            *field = field.trim().to_string();
        }
        self
    }
}

/// Item offer as submitted. Enum fields stay strings until validated so
/// that a bad value is reported against its field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewItemInput {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub condition: Option<String>,
    /// `YYYY-MM-DD`; required for lending, ignored for donations.
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct NewRequestInput {
    pub item_id: Option<i64>,
    #[validate(custom(function = "check_purpose"))]
    pub purpose: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resident() -> RegisterResidentInput {
        RegisterResidentInput {
            username: "res1".into(),
            full_name: "Ana Reyes".into(),
            email: "a@x.com".into(),
            password: "Secret123".into(),
            contact_number: "09171234567".into(),
            barangay: "San Isidro".into(),
            municipality: "Tanay".into(),
            province: "Rizal".into(),
        }
    }

    fn field_message(err: DomainError, field: &str) -> String {
        match err {
            DomainError::Validation { fields, .. } => fields.get(field).cloned().unwrap_or_default(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn valid_resident_passes() {
        assert!(validate(&resident()).is_ok());
    }

    #[test]
    fn weak_password_is_reported_on_its_field() {
        let input = RegisterResidentInput {
            password: "secret".into(),
            ..resident()
        };
        let err = validate(&input).unwrap_err();
        assert_eq!(
            err,
            DomainError::field("password", "Password must contain lowercase, uppercase, and number")
        );
    }

    #[test]
    fn several_failures_are_reported_together() {
        let input = RegisterResidentInput {
            username: "ab".into(),
            email: "nope".into(),
            province: "  ".into(),
            ..resident()
        };
        match validate(&input).unwrap_err() {
            DomainError::Validation { message, fields } => {
                assert_eq!(message, "Validation failed");
                assert_eq!(fields["username"], "Username must be at least 3 characters");
                assert_eq!(fields["email"], "Please provide a valid email address");
                assert_eq!(fields["province"], "Province is required for residents");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn email_shape_matches_loose_rule() {
        assert!(looks_like_email("a@x.com"));
        assert!(looks_like_email("first.last@sub.domain.ph"));
        assert!(!looks_like_email("a@x"));
        assert!(!looks_like_email("@x.com"));
        assert!(!looks_like_email("a@.com"));
    }

    #[test]
    fn login_requires_exactly_one_identifier() {
        let both = LoginInput {
            email: Some("a@x.com".into()),
            username: Some("res1".into()),
            password: "x".into(),
        };
        assert_eq!(
            field_message(both.identifier().unwrap_err(), "identifier"),
            "Please provide either email or username, not both"
        );

        let neither = LoginInput {
            email: Some("  ".into()),
            ..Default::default()
        };
        assert!(neither.identifier().is_err());

        let by_name = LoginInput {
            username: Some("Admin".into()),
            password: "x".into(),
            ..Default::default()
        };
        assert_eq!(
            by_name.identifier().unwrap(),
            domains::LoginIdentifier::Username("Admin".into())
        );
    }

    #[test]
    fn login_username_charset_is_restricted() {
        let input = LoginInput {
            username: Some("bad name!".into()),
            password: "x".into(),
            ..Default::default()
        };
        assert_eq!(
            field_message(input.identifier().unwrap_err(), "username"),
            "Username can only contain letters, numbers, hyphens, and underscores"
        );
    }

    #[test]
    fn profile_rules_apply_only_to_present_fields() {
        assert!(validate(&ProfileInput::default()).is_ok());

        let input = ProfileInput {
            full_name: Some("R2-D2".into()),
            contact_number: Some("0917-123-4567".into()),
            ..Default::default()
        };
        let err = validate(&input).unwrap_err();
        assert_eq!(
            field_message(err, "full_name"),
            "Full name can only contain letters and spaces"
        );
    }

    #[test]
    fn blank_profile_fields_are_dropped_by_normalization() {
        let input = ProfileInput {
            full_name: Some("   ".into()),
            barangay: Some(" Poblacion ".into()),
            contact_number: None,
        }
        .normalized();
        assert_eq!(input.full_name, None);
        assert_eq!(input.barangay.as_deref(), Some("Poblacion"));
    }

    #[test]
    fn purpose_is_measured_after_trimming() {
        let short = NewRequestInput {
            item_id: Some(1),
            purpose: "   short    ".into(),
        };
        assert_eq!(
            field_message(validate(&short).unwrap_err(), "purpose"),
            "Purpose must be at least 10 characters long"
        );
        let ok = NewRequestInput {
            item_id: Some(1),
            purpose: "Fixing the roof".into(),
        };
        assert!(validate(&ok).is_ok());
    }

    #[test]
    fn new_password_must_be_strong() {
        let input = ChangePasswordInput {
            current_password: "Old12345".into(),
            new_password: "alllowercase1".into(),
        };
        assert!(validate(&input).is_err());
    }

    #[test]
    fn password_errors_use_json_field_names() {
        let input: ChangePasswordInput =
            serde_json::from_str(r#"{"currentPassword": "", "newPassword": "weak"}"#).unwrap();
        let err = input.check().unwrap_err();
        let DomainError::Validation { fields, .. } = err else {
            panic!("expected a validation error, got {err:?}");
        };
        assert_eq!(fields.get("currentPassword").map(String::as_str), Some("Current password is required"));
        assert!(fields.contains_key("newPassword"));
        assert!(!fields.contains_key("current_password"));
    }
}
