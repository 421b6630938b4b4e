//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every failure becomes `invalid_request` with `details.field` and
//! `details.code`, so clients can attach messages to form fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::json;

use crate::domain::{
    Error, EventValidationError, IdValidationError, LoginValidationError, ReportRangeError,
    ResourceValidationError, UserValidationError,
};

/// Timestamp layouts accepted without an offset; these are read as UTC.
const NAIVE_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];
const DATE_LAYOUT: &str = "%Y-%m-%d";

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidId,
    InvalidTimestamp,
    InvalidDate,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidId => "invalid_id",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn value_error(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(field, ErrorCode::MissingField, format!("missing required field: {name}"))
}

/// Unwrap a required field, rejecting absent values.
pub(crate) fn required<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Parse an identifier with `parse` (one of the `*Id::new` constructors).
pub(crate) fn parse_id<'a, T>(
    value: &'a str,
    field: FieldName,
    parse: impl FnOnce(&'a str) -> Result<T, IdValidationError>,
) -> Result<T, Error> {
    parse(value).map_err(|_| {
        let name = field.as_str();
        value_error(field, ErrorCode::InvalidId, format!("{name} must be a valid UUID"), value)
    })
}

/// Parse an ISO-8601 timestamp. Values without an offset are read as UTC.
pub(crate) fn parse_timestamp(value: &str, field: FieldName) -> Result<DateTime<Utc>, Error> {
    let trimmed = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(trimmed, layout).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            let name = field.as_str();
            value_error(
                field,
                ErrorCode::InvalidTimestamp,
                format!("{name} must be an ISO-8601 timestamp"),
                value,
            )
        })
}

/// Parse a `YYYY-MM-DD` calendar date.
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), DATE_LAYOUT).map_err(|_| {
        let name = field.as_str();
        value_error(
            field,
            ErrorCode::InvalidDate,
            format!("{name} must be a date in YYYY-MM-DD format"),
            value,
        )
    })
}

pub(crate) fn map_event_validation_error(err: EventValidationError) -> Error {
    let field = match err {
        EventValidationError::EmptyTitle | EventValidationError::TitleTooLong { .. } => "title",
        EventValidationError::CategoryTooLong { .. } => "category",
        EventValidationError::EmptyInterval => "endTime",
    };
    field_error(FieldName::new(field), ErrorCode::InvalidValue, err.to_string())
}

pub(crate) fn map_resource_validation_error(err: ResourceValidationError) -> Error {
    let field = match err {
        ResourceValidationError::EmptyName | ResourceValidationError::NameTooLong { .. } => "name",
        ResourceValidationError::EmptyKind | ResourceValidationError::KindTooLong { .. } => "type",
        ResourceValidationError::EmptyUpdate => "body",
    };
    field_error(FieldName::new(field), ErrorCode::InvalidValue, err.to_string())
}

pub(crate) fn map_login_validation_error(err: LoginValidationError) -> Error {
    let (field, code) = match &err {
        LoginValidationError::EmptyUsername => ("username", "empty_username"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
        LoginValidationError::PasswordTooShort { .. } => ("password", "password_too_short"),
        LoginValidationError::Account(UserValidationError::InvalidEmail) => {
            ("email", "invalid_email")
        }
        LoginValidationError::Account(UserValidationError::EmptyUsername) => {
            ("username", "empty_username")
        }
        LoginValidationError::Account(_) => ("username", "invalid_username"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": field,
        "code": code,
    }))
}

pub(crate) fn map_report_range_error(err: ReportRangeError) -> Error {
    field_error(
        FieldName::new("start_date"),
        ErrorCode::InvalidValue,
        err.to_string(),
    )
}
