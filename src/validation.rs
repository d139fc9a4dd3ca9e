//! Field rules applied at the entity-mutation boundary.
//!
//! Every create and update goes through one of the draft constructors below, which
//! collect all missing fields and rule violations into a single [`ValidationError`]
//! before anything reaches the store.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{brand, offer};

pub const TITLE_MIN_CHARS: usize = 3;
pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const DISCOUNT_RANGE: std::ops::RangeInclusive<i64> = 1..=100;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Collected validation failures for one payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub missing: Vec<String>,
    pub fields: BTreeMap<String, String>,
}

impl ValidationError {
    /// Single-field failure, used where only one rule can fail.
    pub fn field(field: &str, reason: impl Into<String>) -> Self {
        let mut errors = FieldErrors::default();
        errors.invalid(field, reason);
        errors.into_error()
    }

    /// JSON value placed under `details` in the error body.
    pub fn details(&self) -> serde_json::Value {
        let mut details = serde_json::Map::new();
        if !self.missing.is_empty() {
            details.insert("missing".into(), json!(self.missing));
        }
        if !self.fields.is_empty() {
            details.insert("fields".into(), json!(self.fields));
        }
        serde_json::Value::Object(details)
    }
}

#[derive(Debug, Default)]
pub struct FieldErrors {
    missing: Vec<String>,
    fields: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn missing(&mut self, field: &str) {
        self.missing.push(field.to_string());
    }

    pub fn invalid(&mut self, field: &str, reason: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| reason.into());
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.fields.is_empty()
    }

    /// Require a non-blank string, returning the trimmed value.
    pub fn require(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim) {
            Some(value) if !value.is_empty() => Some(value.to_string()),
            _ => {
                self.missing(field);
                None
            }
        }
    }

    pub fn into_error(self) -> ValidationError {
        let message = if self.missing.is_empty() {
            let names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
            format!("Invalid value for: {}", names.join(", "))
        } else {
            format!("Missing required fields: {}", self.missing.join(", "))
        };

        ValidationError {
            message,
            missing: self.missing,
            fields: self.fields,
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }
}

/// Parse a date as sent by forms or API clients.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD` (midnight UTC) and the
/// `datetime-local` shape `YYYY-MM-DDTHH:MM[:SS]` (read as UTC).
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
    }

    Err(format!("'{value}' is not a valid date"))
}

/// Deserialize helper that distinguishes an absent key (`None`) from an explicit
/// `null` (`Some(None)`). Pair with `#[serde(default)]`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn check_title(errors: &mut FieldErrors, title: &str) {
    if title.chars().count() < TITLE_MIN_CHARS {
        errors.invalid(
            "title",
            format!("must be at least {TITLE_MIN_CHARS} characters"),
        );
    }
}

fn check_description(errors: &mut FieldErrors, description: &str) {
    if description.chars().count() < DESCRIPTION_MIN_CHARS {
        errors.invalid(
            "description",
            format!("must be at least {DESCRIPTION_MIN_CHARS} characters"),
        );
    }
}

fn check_discount(errors: &mut FieldErrors, discount: Option<i64>) -> Option<i32> {
    let discount = discount?;
    if DISCOUNT_RANGE.contains(&discount) {
        i32::try_from(discount).ok()
    } else {
        errors.invalid(
            "discountPercent",
            format!(
                "must be between {} and {}",
                DISCOUNT_RANGE.start(),
                DISCOUNT_RANGE.end()
            ),
        );
        None
    }
}

fn check_window(errors: &mut FieldErrors, start: DateTime<Utc>, end: Option<DateTime<Utc>>) {
    if end.is_some_and(|end| end < start) {
        errors.invalid("endDate", "must be on or after startDate");
    }
}

fn parse_date_field(errors: &mut FieldErrors, field: &str, value: &str) -> Option<DateTime<Utc>> {
    match parse_datetime(value) {
        Ok(parsed) => Some(parsed),
        Err(reason) => {
            errors.invalid(field, reason);
            None
        }
    }
}

/// Optional end date: blank strings mean "no end date".
fn parse_end_date(errors: &mut FieldErrors, value: Option<&str>) -> Option<DateTime<Utc>> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => parse_date_field(errors, "endDate", value),
        _ => None,
    }
}

// --- brands ---------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub location: Option<String>,
}

/// Validated brand ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandDraft {
    pub name: String,
    pub description: String,
    pub logo: String,
    pub location: Option<String>,
}

impl BrandDraft {
    pub fn from_input(input: BrandInput) -> Result<Self, ValidationError> {
        let mut errors = FieldErrors::default();
        let name = errors.require("name", input.name.as_deref());
        let logo = errors.require("logo", input.logo.as_deref());
        let description = errors.require("description", input.description.as_deref());

        match (name, logo, description) {
            (Some(name), Some(logo), Some(description)) if errors.is_empty() => Ok(Self {
                name,
                description,
                logo,
                location: blank_to_none(input.location),
            }),
            _ => Err(errors.into_error()),
        }
    }
}

/// Partial brand update. Keys that are not brand columns (`id`, `images`,
/// `offers`, `createdAt`, `updatedAt`) are ignored by deserialization.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub location: Option<Option<String>>,
}

impl BrandPatch {
    /// Apply the patch on top of the stored brand and validate the merged result.
    pub fn merge(self, existing: &brand::Model) -> Result<BrandDraft, ValidationError> {
        let mut errors = FieldErrors::default();

        let mut pick = |field: &str, supplied: Option<String>, current: &str| match supplied {
            Some(value) if value.trim().is_empty() => {
                errors.invalid(field, "must not be empty");
                current.to_string()
            }
            Some(value) => value.trim().to_string(),
            None => current.to_string(),
        };

        let name = pick("name", self.name, &existing.name);
        let description = pick("description", self.description, &existing.description);
        let logo = pick("logo", self.logo, &existing.logo);
        let location = match self.location {
            Some(location) => blank_to_none(location),
            None => existing.location.clone(),
        };

        errors.finish()?;
        Ok(BrandDraft {
            name,
            description,
            logo,
            location,
        })
    }
}

// --- offers ---------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferInput {
    pub brand_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub coupon_code: Option<String>,
    pub discount_percent: Option<i64>,
    pub active: Option<bool>,
}

/// Validated offer ready to insert or write back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferDraft {
    pub brand_id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub coupon_code: Option<String>,
    pub discount_percent: Option<i32>,
    pub active: bool,
}

impl OfferDraft {
    /// Validate a create payload. `path_brand` takes precedence over `brandId`
    /// in the body when the offer is created under a brand route.
    pub fn from_input(input: OfferInput, path_brand: Option<Uuid>) -> Result<Self, ValidationError> {
        let mut errors = FieldErrors::default();

        let brand_id = path_brand.or(input.brand_id);
        let title = errors.require("title", input.title.as_deref());
        let description = errors.require("description", input.description.as_deref());
        let start_raw = errors.require("startDate", input.start_date.as_deref());
        if brand_id.is_none() {
            errors.missing("brandId");
        }

        if let Some(title) = &title {
            check_title(&mut errors, title);
        }
        if let Some(description) = &description {
            check_description(&mut errors, description);
        }
        let start_date = start_raw.and_then(|raw| parse_date_field(&mut errors, "startDate", &raw));
        let end_date = parse_end_date(&mut errors, input.end_date.as_deref());
        if let Some(start) = start_date {
            check_window(&mut errors, start, end_date);
        }
        let discount_percent = check_discount(&mut errors, input.discount_percent);

        match (brand_id, title, description, start_date) {
            (Some(brand_id), Some(title), Some(description), Some(start_date))
                if errors.is_empty() =>
            {
                Ok(Self {
                    brand_id,
                    title,
                    description,
                    start_date,
                    end_date,
                    coupon_code: blank_to_none(input.coupon_code),
                    discount_percent,
                    active: input.active.unwrap_or(true),
                })
            }
            _ => Err(errors.into_error()),
        }
    }
}

/// Partial offer update. Relationship and generated keys in the payload are
/// ignored. `endDate`, `couponCode` and `discountPercent` may be cleared with an
/// explicit `null`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferPatch {
    pub brand_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub end_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub coupon_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<i64>)]
    pub discount_percent: Option<Option<i64>>,
    pub active: Option<bool>,
}

impl OfferPatch {
    /// Apply the patch on top of the stored offer and validate the merged record.
    pub fn merge(self, existing: &offer::Model) -> Result<OfferDraft, ValidationError> {
        let mut errors = FieldErrors::default();

        let title = match self.title {
            Some(title) => title.trim().to_string(),
            None => existing.title.clone(),
        };
        let description = match self.description {
            Some(description) => description.trim().to_string(),
            None => existing.description.clone(),
        };
        check_title(&mut errors, &title);
        check_description(&mut errors, &description);

        let existing_start = existing.start_date.with_timezone(&Utc);
        let start_date = match self.start_date.as_deref().map(str::trim) {
            Some("") => {
                errors.invalid("startDate", "must not be empty");
                existing_start
            }
            Some(raw) => parse_date_field(&mut errors, "startDate", raw).unwrap_or(existing_start),
            None => existing_start,
        };
        let end_date = match self.end_date {
            Some(raw) => parse_end_date(&mut errors, raw.as_deref()),
            None => existing.end_date.map(|end| end.with_timezone(&Utc)),
        };
        check_window(&mut errors, start_date, end_date);

        let discount_percent = match self.discount_percent {
            Some(discount) => check_discount(&mut errors, discount),
            None => existing.discount_percent,
        };
        let coupon_code = match self.coupon_code {
            Some(code) => blank_to_none(code),
            None => existing.coupon_code.clone(),
        };

        errors.finish()?;
        Ok(OfferDraft {
            brand_id: self.brand_id.unwrap_or(existing.brand_id),
            title,
            description,
            start_date,
            end_date,
            coupon_code,
            discount_percent,
            active: self.active.unwrap_or(existing.active),
        })
    }
}

// --- images ---------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageInput {
    pub url: Option<String>,
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDraft {
    pub url: String,
    pub alt_text: String,
}

impl ImageDraft {
    /// Alt text falls back to `"<brand name> image"`.
    pub fn from_input(input: ImageInput, brand_name: &str) -> Result<Self, ValidationError> {
        let mut errors = FieldErrors::default();
        let url = errors.require("url", input.url.as_deref());

        match url {
            Some(url) => Ok(Self {
                url,
                alt_text: blank_to_none(input.alt_text)
                    .unwrap_or_else(|| format!("{brand_name} image")),
            }),
            None => Err(errors.into_error()),
        }
    }
}

// --- users ----------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub admin_key: Option<String>,
}

/// Registration fields that passed the presence check. The admin key is checked
/// separately so a wrong key is reported as 403 before any field rule.
#[derive(Debug, Clone)]
pub struct RegistrationFields {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegistrationFields {
    pub fn require(input: &RegistrationInput) -> Result<Self, ValidationError> {
        let mut errors = FieldErrors::default();
        let name = errors.require("name", input.name.as_deref());
        let email = errors.require("email", input.email.as_deref());
        let password = match input.password.as_deref() {
            Some(password) if !password.is_empty() => Some(password.to_string()),
            _ => {
                errors.missing("password");
                None
            }
        };

        match (name, email, password) {
            (Some(name), Some(email), Some(password)) => Ok(Self {
                name,
                email: normalize_email(&email),
                password,
            }),
            _ => Err(errors.into_error()),
        }
    }

    pub fn check_rules(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        if !is_valid_email(&self.email) {
            errors.invalid("email", "must be a valid email address");
        }
        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            errors.invalid(
                "password",
                format!("must be at least {PASSWORD_MIN_CHARS} characters"),
            );
        }
        errors.finish()
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}
