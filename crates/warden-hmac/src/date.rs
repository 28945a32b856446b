//! Request dates.
//!
//! The signed date has the shape `DOW, DD MM YYYY HH:MM:SS GMT`, for example
//! `SUN, 15 01 2012 16:43:21 GMT`. The weekday is always recomputed from the
//! calendar date, so a caller-supplied weekday is discarded.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{SignerError, SignerResult};

/// Layout of the date fields that follow the weekday.
const DATE_FIELDS_FORMAT: &str = "%d %m %Y %H:%M:%S";

/// A caller-supplied request date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignDate {
    /// Text in the zero-padded form `DD MM YYYY HH:MM:SS`, optionally
    /// prefixed with a weekday (`Sun, `) and suffixed with ` GMT`. The fields
    /// are echoed verbatim. RFC 3339 text is accepted
    /// as well and converted to UTC.
    Text(String),
    /// A wall-clock value whose fields are echoed as-is.
    Naive(NaiveDateTime),
    /// A UTC instant.
    Utc(DateTime<Utc>),
}

impl SignDate {
    /// Resolve the date into its calendar fields.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::InvalidArgument`] if text input does not match
    /// any accepted layout.
    pub fn resolve(&self) -> SignerResult<NaiveDateTime> {
        match self {
            Self::Text(text) => parse_date_text(text),
            Self::Naive(dt) => Ok(*dt),
            Self::Utc(dt) => Ok(dt.naive_utc()),
        }
    }

    /// Resolve and render the date in signing format.
    ///
    /// # Errors
    ///
    /// See [`SignDate::resolve`].
    pub fn to_signing_string(&self) -> SignerResult<String> {
        self.resolve().map(|dt| format_sign_date(&dt))
    }
}

impl From<&str> for SignDate {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SignDate {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDateTime> for SignDate {
    fn from(value: NaiveDateTime) -> Self {
        Self::Naive(value)
    }
}

impl From<DateTime<Utc>> for SignDate {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Utc(value)
    }
}

/// Render calendar fields as `DOW, DD MM YYYY HH:MM:SS GMT`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use warden_hmac::date::format_sign_date;
///
/// let dt = NaiveDate::from_ymd_opt(2012, 7, 17)
///     .unwrap()
///     .and_hms_opt(10, 20, 30)
///     .unwrap();
/// assert_eq!(format_sign_date(&dt), "TUE, 17 07 2012 10:20:30 GMT");
/// ```
#[must_use]
pub fn format_sign_date(dt: &NaiveDateTime) -> String {
    let weekday = dt.format("%a").to_string().to_ascii_uppercase();
    format!("{weekday}, {} GMT", dt.format(DATE_FIELDS_FORMAT))
}

/// The current time in signing format.
#[must_use]
pub fn now() -> String {
    format_sign_date(&Utc::now().naive_utc())
}

fn parse_date_text(text: &str) -> SignerResult<NaiveDateTime> {
    let trimmed = text.trim();

    let without_weekday = match trimmed.split_once(", ") {
        Some((weekday, rest))
            if weekday.len() == 3 && weekday.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            rest
        }
        _ => trimmed,
    };
    let fields = without_weekday
        .strip_suffix(" GMT")
        .unwrap_or(without_weekday)
        .trim();

    if let Ok(dt) = NaiveDateTime::parse_from_str(fields, DATE_FIELDS_FORMAT) {
        // The signed fields echo the input, so only the zero-padded form is
        // accepted.
        if dt.format(DATE_FIELDS_FORMAT).to_string() != fields {
            return Err(SignerError::invalid(format!(
                "date fields must be zero-padded \"DD MM YYYY HH:MM:SS\", got {text:?}"
            )));
        }
        return Ok(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc).naive_utc());
    }

    Err(SignerError::invalid(format!(
        "unparseable date {text:?}, expected \"DD MM YYYY HH:MM:SS\""
    )))
}
