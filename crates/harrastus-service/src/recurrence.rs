//! Recurring event expansion.

use chrono::NaiveDate;
use harrastus_core::error::{FieldErrors, HarrastusResult};
use harrastus_core::models::event::{CreateHobbyEvent, HobbyEvent};
use serde_json::{Map, Value};

pub const TOO_MANY_EVENTS: &str = "too many recurrent events";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Days,
    Weeks,
}

impl Cadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
        }
    }

    fn length_in_days(&self) -> i64 {
        match self {
            Self::Days => 1,
            Self::Weeks => 7,
        }
    }
}

/// A validated "repeat every N days/weeks until end_date" request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceRequest {
    pub cadence: Cadence,
    pub amount: u32,
    /// Last date (inclusive) a generated event may start on.
    pub end_date: NaiveDate,
}

impl RecurrenceRequest {
    pub fn new(cadence: Cadence, amount: u32, end_date: NaiveDate) -> HarrastusResult<Self> {
        if amount == 0 {
            return Err(FieldErrors::single(
                cadence.as_str(),
                "Ensure this value is greater than or equal to 1.",
            )
            .into());
        }
        Ok(Self {
            cadence,
            amount,
            end_date,
        })
    }

    /// Parse a `{"days" | "weeks": int, "end_date": "YYYY-MM-DD"}` body.
    pub fn from_json(body: &Map<String, Value>) -> HarrastusResult<Self> {
        let mut errors = FieldErrors::new();

        let end_date = match body.get("end_date") {
            None | Some(Value::Null) => {
                errors.add("end_date", "This field is required.");
                None
            }
            Some(value) => {
                let parsed = value
                    .as_str()
                    .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
                if parsed.is_none() {
                    errors.add("end_date", "Enter a valid date.");
                }
                parsed
            }
        };

        let mut cadences = Vec::new();
        for (key, value) in body {
            let cadence = match key.as_str() {
                "end_date" => continue,
                "days" => Cadence::Days,
                "weeks" => Cadence::Weeks,
                other => {
                    errors.add(other, "Unknown recurrence unit.");
                    continue;
                }
            };
            match value.as_i64() {
                Some(amount) if amount >= 1 => match u32::try_from(amount) {
                    Ok(amount) => cadences.push((cadence, amount)),
                    Err(_) => errors.add(key.as_str(), "A valid integer is required."),
                },
                Some(_) => errors.add(
                    key.as_str(),
                    "Ensure this value is greater than or equal to 1.",
                ),
                None => errors.add(key.as_str(), "A valid integer is required."),
            }
        }

        let unit_given = body.contains_key("days") || body.contains_key("weeks");
        if !unit_given {
            errors.add_non_field("Either days or weeks is required.");
        } else if body.contains_key("days") && body.contains_key("weeks") {
            errors.add_non_field("Only one of days or weeks may be given.");
        }
        errors.into_result()?;

        match (cadences.as_slice(), end_date) {
            ([(cadence, amount)], Some(end_date)) => Self::new(*cadence, *amount, end_date),
            _ => Err(FieldErrors::non_field("Invalid recurrence request.").into()),
        }
    }

    fn step_days(&self) -> i64 {
        i64::from(self.amount) * self.cadence.length_in_days()
    }

    /// Number of siblings this request generates for a base starting on
    /// `start_date`.
    pub fn occurrences_after(&self, start_date: NaiveDate) -> usize {
        if self.end_date < start_date {
            return 0;
        }
        let span = (self.end_date - start_date).num_days();
        usize::try_from(span / self.step_days()).unwrap_or(usize::MAX)
    }
}

/// Build the siblings of `base` for `request`.
///
/// Siblings start `k * step` days after the base for k = 1, 2, ... up to
/// and including the request's end date. Fails before building anything
/// when more than `cap` siblings would be produced.
pub fn expand(
    base: &HobbyEvent,
    request: &RecurrenceRequest,
    cap: usize,
) -> HarrastusResult<Vec<CreateHobbyEvent>> {
    let count = request.occurrences_after(base.start_date);
    if count > cap {
        return Err(FieldErrors::non_field(TOO_MANY_EVENTS).into());
    }
    let step = request.step_days();
    (1..=count as i64)
        .map(|k| base.derive_sibling(k * step))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveTime, Utc};
    use harrastus_core::error::HarrastusError;
    use harrastus_core::models::event::iso_weekday;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn base() -> HobbyEvent {
        // A Monday.
        let start = NaiveDate::from_ymd_opt(2024, 3, 18).unwrap();
        HobbyEvent {
            id: Uuid::new_v4(),
            hobby_id: Uuid::new_v4(),
            start_date: start,
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end_date: start + Duration::days(1),
            end_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            start_weekday: iso_weekday(start),
            recurrence_start_event: None,
            data_source: "test".into(),
            origin_id: None,
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }

    fn weekly(end: NaiveDate) -> RecurrenceRequest {
        RecurrenceRequest::new(Cadence::Weeks, 1, end).unwrap()
    }

    #[test]
    fn week_boundary_is_inclusive() {
        let base = base();
        let three_weeks = base.start_date + Duration::weeks(3);
        assert_eq!(expand(&base, &weekly(three_weeks), 50).unwrap().len(), 3);
        let almost = three_weeks - Duration::days(1);
        assert_eq!(expand(&base, &weekly(almost), 50).unwrap().len(), 2);
    }

    #[test]
    fn cadence_amount_scales_step() {
        let base = base();
        let end = base.start_date + Duration::weeks(5) + Duration::days(1);
        let every_other = RecurrenceRequest::new(Cadence::Weeks, 2, end).unwrap();
        assert_eq!(expand(&base, &every_other, 50).unwrap().len(), 2);
        assert_eq!(expand(&base, &weekly(end), 50).unwrap().len(), 5);

        let daily = RecurrenceRequest::new(Cadence::Days, 3, base.start_date + Duration::days(9))
            .unwrap();
        let siblings = expand(&base, &daily, 50).unwrap();
        let offsets: Vec<i64> = siblings
            .iter()
            .map(|s| (s.start_date - base.start_date).num_days())
            .collect();
        assert_eq!(offsets, vec![3, 6, 9]);
    }

    #[test]
    fn siblings_copy_base_and_shift_dates() {
        let base = base();
        let siblings = expand(&base, &weekly(base.start_date + Duration::weeks(2)), 50).unwrap();
        for (k, sibling) in siblings.iter().enumerate() {
            let delta = Duration::weeks(k as i64 + 1);
            assert_eq!(sibling.start_date, base.start_date + delta);
            assert_eq!(sibling.end_date, base.end_date + delta);
            assert_eq!(sibling.start_time, base.start_time);
            assert_eq!(sibling.end_time, base.end_time);
            assert_eq!(sibling.hobby_id, base.hobby_id);
            assert_eq!(sibling.recurrence_start_event, Some(base.id));
            assert_eq!(sibling.data_source, "test");
            assert_eq!(sibling.start_weekday(), 1);
        }
    }

    #[test]
    fn end_before_first_candidate_is_empty() {
        let base = base();
        assert!(expand(&base, &weekly(base.start_date), 50).unwrap().is_empty());
        let past = base.start_date - Duration::days(30);
        assert!(expand(&base, &weekly(past), 50).unwrap().is_empty());
    }

    #[test]
    fn cap_is_enforced() {
        let base = base();
        let daily = |days| {
            RecurrenceRequest::new(Cadence::Days, 1, base.start_date + Duration::days(days))
                .unwrap()
        };
        assert_eq!(expand(&base, &daily(50), 50).unwrap().len(), 50);
        let err = expand(&base, &daily(51), 50).unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.get("non_field_errors").unwrap(), [TOO_MANY_EVENTS]);
    }

    #[test]
    fn siblings_beyond_the_calendar_fail_without_panicking() {
        let mut base = base();
        base.end_date = NaiveDate::MAX;
        base.start_date = NaiveDate::MAX - Duration::days(10);
        let request = weekly(NaiveDate::MAX);

        let err = expand(&base, &request, 50).unwrap_err();
        assert!(err.field_errors().unwrap().contains("end_date"));
    }

    #[test]
    fn parses_request_body() {
        let body = json!({"weeks": 2, "end_date": "2024-05-01"});
        let request = RecurrenceRequest::from_json(body.as_object().unwrap()).unwrap();
        assert_eq!(request.cadence, Cadence::Weeks);
        assert_eq!(request.amount, 2);
        assert_eq!(request.end_date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn rejects_malformed_bodies() {
        let cases = [
            (json!({"weeks": 1}), "end_date"),
            (json!({"weeks": 1, "end_date": "1.5.2024"}), "end_date"),
            (json!({"end_date": "2024-05-01"}), "non_field_errors"),
            (json!({"days": 1, "weeks": 1, "end_date": "2024-05-01"}), "non_field_errors"),
            (json!({"months": 1, "end_date": "2024-05-01"}), "months"),
            (json!({"days": 0, "end_date": "2024-05-01"}), "days"),
            (json!({"days": "x", "end_date": "2024-05-01"}), "days"),
        ];
        for (body, field) in cases {
            let err = RecurrenceRequest::from_json(body.as_object().unwrap()).unwrap_err();
            assert!(
                matches!(&err, HarrastusError::Validation(f) if f.contains(field)),
                "{body} should fail on {field}, got {err}"
            );
        }
    }
}
