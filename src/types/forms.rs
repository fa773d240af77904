//! URL-encoded form bodies and their validation rules.
//!
//! Every field is optional at the decoding stage so that a missing field
//! surfaces as a field error instead of a body rejection. Blank values are
//! treated the same as missing ones.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

const REQUIRED: &str = "This field is required.";
const PASSWORDS_DIFFER: &str = "Passwords do not match.";

/// Field name to messages, sorted by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FormErrors::default();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

/// A form redisplayed to the client together with what was wrong with it.
#[derive(Debug, Clone, Serialize)]
pub struct FormPage {
    pub form: &'static str,
    pub errors: FormErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn collect(validated: Result<(), ValidationErrors>) -> FormErrors {
    validated.map_or_else(FormErrors::from, |_| FormErrors::default())
}

fn check_repeat(
    errors: &mut FormErrors,
    field: &str,
    password: &Option<String>,
    repeat: &Option<String>,
) {
    if let (Some(password), Some(repeat)) = (password, repeat)
        && password != repeat
    {
        errors.add(field, PASSWORDS_DIFFER);
    }
}

fn validate_pad_id(pad: &str) -> Result<(), ValidationError> {
    match pad.trim().parse::<i64>() {
        Ok(id) if id >= 0 => Ok(()),
        _ => {
            let mut error = ValidationError::new("pad");
            error.message = Some(Cow::Borrowed("Not a valid choice."));
            Err(error)
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct SignupForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."), email(message = "Invalid email address."))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub repeat_password: Option<String>,
}

/// Signup fields that passed validation.
#[derive(Debug)]
pub struct SignupData {
    pub email: String,
    pub password: String,
}

impl SignupForm {
    pub fn check(self) -> Result<SignupData, FormErrors> {
        let mut errors = collect(self.validate());
        check_repeat(
            &mut errors,
            "repeat_password",
            &self.password,
            &self.repeat_password,
        );
        errors.into_result()?;
        match (self.email, self.password) {
            (Some(email), Some(password)) => Ok(SignupData {
                email: email.trim().to_string(),
                password,
            }),
            _ => Err(FormErrors::single("email", REQUIRED)),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct SigninForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."), email(message = "Invalid email address."))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub password: Option<String>,
}

impl SigninForm {
    pub fn check(self) -> Result<(String, String), FormErrors> {
        collect(self.validate()).into_result()?;
        match (self.email, self.password) {
            (Some(email), Some(password)) => Ok((email.trim().to_string(), password)),
            _ => Err(FormErrors::single("email", REQUIRED)),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct PadForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub name: Option<String>,
}

impl PadForm {
    pub fn check(self) -> Result<String, FormErrors> {
        collect(self.validate()).into_result()?;
        self.name
            .map(|name| name.trim().to_string())
            .ok_or_else(|| FormErrors::single("name", REQUIRED))
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct NoteForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(
        required(message = "This field is required."),
        custom(function = "validate_pad_id")
    )]
    pub pad: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub text: Option<String>,
}

/// Note fields that passed validation. `pad` is `0` when no pad was picked.
#[derive(Debug)]
pub struct NoteData {
    pub name: String,
    pub pad: i64,
    pub text: String,
}

impl NoteForm {
    pub fn check(self) -> Result<NoteData, FormErrors> {
        collect(self.validate()).into_result()?;
        let pad = self
            .pad
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .ok_or_else(|| FormErrors::single("pad", REQUIRED))?;
        match (self.name, self.text) {
            (Some(name), Some(text)) => Ok(NoteData {
                name: name.trim().to_string(),
                pad,
                text,
            }),
            _ => Err(FormErrors::single("name", REQUIRED)),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct SettingsForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub current_password: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub new_password: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub repeat_new_password: Option<String>,
}

impl SettingsForm {
    /// Returns `(current_password, new_password)`.
    pub fn check(self) -> Result<(String, String), FormErrors> {
        let mut errors = collect(self.validate());
        check_repeat(
            &mut errors,
            "repeat_new_password",
            &self.new_password,
            &self.repeat_new_password,
        );
        errors.into_result()?;
        match (self.current_password, self.new_password) {
            (Some(current), Some(new)) => Ok((current, new)),
            _ => Err(FormErrors::single("current_password", REQUIRED)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(errors: &FormErrors) -> Vec<&str> {
        errors.fields().collect()
    }

    fn signup(email: &str, password: &str, repeat: &str) -> SignupForm {
        decode(&[
            ("email", email),
            ("password", password),
            ("repeat_password", repeat),
        ])
    }

    fn decode<T: for<'de> Deserialize<'de>>(pairs: &[(&str, &str)]) -> T {
        let map: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map)).expect("form should decode")
    }

    #[test]
    fn signup_empty_reports_every_field() {
        let errors = SignupForm::default().check().unwrap_err();
        assert_eq!(fields(&errors), vec!["email", "password", "repeat_password"]);
    }

    #[test]
    fn signup_blank_values_count_as_missing() {
        let errors = signup("  ", "", " ").check().unwrap_err();
        assert_eq!(fields(&errors), vec!["email", "password", "repeat_password"]);
    }

    #[test]
    fn signup_invalid_email_only_flags_email() {
        let errors = signup("invalid email", "pw", "pw").check().unwrap_err();
        assert_eq!(fields(&errors), vec!["email"]);
    }

    #[test]
    fn signup_password_mismatch_flags_repeat_only() {
        let errors = signup("a@example.com", "one", "two").check().unwrap_err();
        assert_eq!(fields(&errors), vec!["repeat_password"]);
    }

    #[test]
    fn signup_valid_data_passes() {
        let data = signup("a@example.com", "secret", "secret").check().unwrap();
        assert_eq!(data.email, "a@example.com");
        assert_eq!(data.password, "secret");
    }

    #[test]
    fn signin_requires_email_and_password() {
        let errors = SigninForm::default().check().unwrap_err();
        assert_eq!(fields(&errors), vec!["email", "password"]);
    }

    #[test]
    fn pad_name_is_required() {
        let errors = PadForm::default().check().unwrap_err();
        assert_eq!(fields(&errors), vec!["name"]);
    }

    #[test]
    fn note_requires_all_fields() {
        let errors = NoteForm::default().check().unwrap_err();
        assert_eq!(fields(&errors), vec!["name", "pad", "text"]);
    }

    #[test]
    fn note_pad_must_be_a_number() {
        let form: NoteForm =
            decode(&[("name", "n"), ("pad", "abc"), ("text", "t")]);
        let errors = form.check().unwrap_err();
        assert_eq!(fields(&errors), vec!["pad"]);
    }

    #[test]
    fn note_accepts_zero_pad() {
        let form: NoteForm = decode(&[("name", "n"), ("pad", "0"), ("text", "t")]);
        assert_eq!(form.check().unwrap().pad, 0);
    }

    #[test]
    fn settings_mismatch_flags_repeat() {
        let form: SettingsForm = decode(&[
            ("current_password", "old"),
            ("new_password", "new"),
            ("repeat_new_password", "other"),
        ]);
        let errors = form.check().unwrap_err();
        assert_eq!(fields(&errors), vec!["repeat_new_password"]);
    }
}
