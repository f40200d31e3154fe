//! Contact form validation and the simulated submission.

use gloo_timers::future::TimeoutFuture;
use log::{info, warn};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::config::{
    FALLBACK_EMAIL, MIN_MESSAGE_LEN, MIN_NAME_LEN, MIN_SUBJECT_LEN, SUBMIT_DELAY_MS,
    SUBMIT_SUCCESS_RATE,
};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static MOBILE_UA_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"iPad|iPhone|iPod|Android").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Subject, Field::Message];

    /// Form control name, also the prefix of its error element id.
    pub fn id(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Subject => "subject",
            Field::Message => "message",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Subject => "Subject",
            Field::Message => "Message",
        }
    }

    fn min_len(self) -> Option<usize> {
        match self {
            Field::Name => Some(MIN_NAME_LEN),
            Field::Subject => Some(MIN_SUBJECT_LEN),
            Field::Message => Some(MIN_MESSAGE_LEN),
            Field::Email => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Subject => &self.subject,
            Field::Message => &self.message,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Subject => self.subject = value,
            Field::Message => self.message = value,
        }
    }
}

pub type FieldErrors = BTreeMap<Field, String>;

/// Validate one field. The value is trimmed first; every field is required.
pub fn validate_field(field: Field, raw: &str) -> Result<(), String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(format!("{} is required", field.label()));
    }

    if field == Field::Email && !EMAIL_REGEX.is_match(value) {
        return Err("Please enter a valid email address".to_string());
    }

    if let Some(min) = field.min_len() {
        // Lengths are counted in UTF-16 code units, as the browser does.
        if value.encode_utf16().count() < min {
            return Err(format!(
                "{} must be at least {} characters long",
                field.label(),
                min
            ));
        }
    }
    Ok(())
}

/// All field errors; an empty map means the form may be submitted.
pub fn validate_form(form: &ContactForm) -> FieldErrors {
    Field::ALL
        .iter()
        .filter_map(|&field| {
            validate_field(field, form.value(field))
                .err()
                .map(|msg| (field, msg))
        })
        .collect()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("form has {0} invalid field(s)")]
    Invalid(usize),

    #[error("Network error")]
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

/// Banner shown under the form after a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormMessage {
    pub kind: MessageKind,
    pub title: String,
    pub body: String,
}

impl FormMessage {
    pub fn success() -> Self {
        Self {
            kind: MessageKind::Success,
            title: "Message Sent Successfully!".to_string(),
            body: "Thank you for reaching out. I'll get back to you within 24 hours.".to_string(),
        }
    }

    pub fn failure() -> Self {
        Self {
            kind: MessageKind::Error,
            title: "Message Failed to Send".to_string(),
            body: format!(
                "Something went wrong. Please try again or email me directly at {}",
                FALLBACK_EMAIL
            ),
        }
    }

    pub fn for_result(result: &Result<(), SubmitError>) -> Self {
        match result {
            Ok(()) => Self::success(),
            Err(_) => Self::failure(),
        }
    }

    /// Success banners go away on their own; errors stay until replaced.
    pub fn auto_hides(&self) -> bool {
        self.kind == MessageKind::Success
    }

    /// Text read out to screen readers when the banner appears.
    pub fn announcement(&self) -> String {
        format!("{}. {}", self.title, self.body)
    }
}

/// Phones and tablets get the native mail app instead of the options panel.
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    MOBILE_UA_REGEX.is_match(user_agent)
}

/// Decide the fate of a simulated submission.
pub fn simulate_outcome(rng: &mut impl Rng) -> Result<(), SubmitError> {
    if rng.random_bool(SUBMIT_SUCCESS_RATE) {
        Ok(())
    } else {
        Err(SubmitError::Network)
    }
}

/// Stand-in for a real backend: validates, waits, then succeeds most of
/// the time.
pub async fn submit(form: &ContactForm) -> Result<(), SubmitError> {
    let errors = validate_form(form);
    if !errors.is_empty() {
        return Err(SubmitError::Invalid(errors.len()));
    }

    let outcome = simulate_outcome(&mut rand::rng());
    TimeoutFuture::new(SUBMIT_DELAY_MS).await;

    match &outcome {
        Ok(()) => info!("Contact form submitted (subject: {})", form.subject.trim()),
        Err(e) => warn!("Contact form submission failed: {}", e),
    }
    outcome
}
