//! Submission validation.
//!
//! Turns a raw request body into a [`FeedbackInput`] or a [`ValidationError`].
//! Nothing here touches storage.
//!
//! Policy: both category lists must be non-empty arrays of strings. A user with
//! nothing to report sends the "Nada a destacar hoje" sentinel instead of `[]`.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::db::{models::feedback::DATE_FORMAT, FeedbackInput};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Request body must be a JSON object")]
    MalformedBody,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("{0} must be an array of strings")]
    NotAStringArray(&'static str),

    #[error("{0} must contain at least one category")]
    EmptySelection(&'static str),

    #[error("{0} must be a non-empty string")]
    NotAString(&'static str),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

pub fn parse_submission(body: &[u8]) -> Result<FeedbackInput, ValidationError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ValidationError::MalformedBody)?;
    validate(&value)
}

pub fn validate(value: &Value) -> Result<FeedbackInput, ValidationError> {
    let object = value.as_object().ok_or(ValidationError::MalformedBody)?;

    let positive = category_list(object, "positive")?;
    let negative = category_list(object, "negative")?;
    let date = required_string(object, "date")?;
    let prefix = date
        .get(..10)
        .ok_or_else(|| ValidationError::InvalidDate(date.clone()))?;
    parse_day(prefix)?;
    let source = required_string(object, "source")?;

    Ok(FeedbackInput {
        positive,
        negative,
        date,
        source,
    })
}

/// Parse a zero-padded `YYYY-MM-DD` calendar date, as used by date filters.
///
/// Stored dates are matched on their first ten characters, so `2024-3-10` is
/// rejected even though chrono would read it.
pub fn parse_day(raw: &str) -> Result<NaiveDate, ValidationError> {
    let invalid = || ValidationError::InvalidDate(raw.to_string());
    let day = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| invalid())?;
    if day.format(DATE_FORMAT).to_string() != raw {
        return Err(invalid());
    }
    Ok(day)
}

/// Optional `?date=` query value. Absent or empty means no day filter.
pub fn day_filter(raw: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_day(raw).map(Some),
    }
}

fn field<'a>(object: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, ValidationError> {
    match object.get(name) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(name)),
        Some(value) => Ok(value),
    }
}

fn category_list(
    object: &Map<String, Value>,
    name: &'static str,
) -> Result<Vec<String>, ValidationError> {
    let items = field(object, name)?
        .as_array()
        .ok_or(ValidationError::NotAStringArray(name))?;

    if items.is_empty() {
        return Err(ValidationError::EmptySelection(name));
    }

    let mut labels: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let label = item.as_str().ok_or(ValidationError::NotAStringArray(name))?;
        if !labels.iter().any(|existing| existing == label) {
            labels.push(label.to_string());
        }
    }

    Ok(labels)
}

fn required_string(
    object: &Map<String, Value>,
    name: &'static str,
) -> Result<String, ValidationError> {
    match field(object, name)?.as_str() {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        _ => Err(ValidationError::NotAString(name)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn valid() -> Value {
        json!({
            "positive": ["Reuniões"],
            "negative": ["Nada a destacar hoje"],
            "date": "2024-01-10T09:00:00Z",
            "source": "link"
        })
    }

    #[test]
    fn accepts_well_formed_payload() {
        let input = validate(&valid()).unwrap();
        assert_eq!(input.positive, vec!["Reuniões"]);
        assert_eq!(input.negative, vec!["Nada a destacar hoje"]);
        assert_eq!(input.date, "2024-01-10T09:00:00Z");
        assert_eq!(input.source, "link");
    }

    #[test]
    fn accepts_any_source_tag() {
        let mut body = valid();
        body["source"] = json!("kiosk-3");
        assert_eq!(validate(&body).unwrap().source, "kiosk-3");
    }

    #[test]
    fn rejects_missing_and_null_fields() {
        let mut body = valid();
        body["date"] = Value::Null;
        assert_eq!(validate(&body), Err(ValidationError::MissingField("date")));

        for name in ["positive", "negative", "date", "source"] {
            let mut body = valid();
            body.as_object_mut().unwrap().remove(name);
            assert_eq!(validate(&body), Err(ValidationError::MissingField(name)));
        }
    }

    #[test]
    fn rejects_wrong_typed_categories() {
        let mut body = valid();
        body["positive"] = json!("Reuniões");
        assert_eq!(validate(&body), Err(ValidationError::NotAStringArray("positive")));

        let mut body = valid();
        body["negative"] = json!([1, 2]);
        assert_eq!(validate(&body), Err(ValidationError::NotAStringArray("negative")));
    }

    #[test]
    fn rejects_empty_selection() {
        let mut body = valid();
        body["negative"] = json!([]);
        assert_eq!(validate(&body), Err(ValidationError::EmptySelection("negative")));
    }

    #[test]
    fn rejects_bad_date_and_blank_source() {
        let mut body = valid();
        body["date"] = json!("yesterday");
        assert!(matches!(validate(&body), Err(ValidationError::InvalidDate(_))));

        let mut body = valid();
        body["source"] = json!("  ");
        assert_eq!(validate(&body), Err(ValidationError::NotAString("source")));
    }

    #[test]
    fn collapses_duplicate_labels() {
        let mut body = valid();
        body["positive"] = json!(["Reuniões", "Colaboração", "Reuniões"]);
        assert_eq!(validate(&body).unwrap().positive, vec!["Reuniões", "Colaboração"]);
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert_eq!(parse_submission(b"positive=1"), Err(ValidationError::MalformedBody));
        assert_eq!(parse_submission(b"[1,2]"), Err(ValidationError::MalformedBody));
    }

    #[test]
    fn parse_day_accepts_calendar_dates_only() {
        assert_eq!(parse_day("2024-03-01"), Ok(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(parse_day("2024-02-30").is_err());
        assert!(parse_day("03/01/2024").is_err());
    }

    #[test]
    fn rejects_dates_without_zero_padding() {
        for date in ["2024-3-10", "2024-03-1", "2024-3-10T09:00:00Z", "2024-03-1T09:00"] {
            let mut body = valid();
            body["date"] = json!(date);
            assert!(
                matches!(validate(&body), Err(ValidationError::InvalidDate(_))),
                "{date} should be rejected"
            );
        }
        assert!(parse_day("2024-3-10").is_err());

        let mut body = valid();
        body["date"] = json!("2024-03-10");
        assert_eq!(validate(&body).unwrap().date, "2024-03-10");
    }

    #[test]
    fn empty_day_filter_means_all_time() {
        assert_eq!(day_filter(None), Ok(None));
        assert_eq!(day_filter(Some("")), Ok(None));
        assert_eq!(
            day_filter(Some("2024-03-10")),
            Ok(Some(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()))
        );
        assert!(day_filter(Some("2024-3-10")).is_err());
    }
}
