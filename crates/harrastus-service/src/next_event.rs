//! Next-event selection for a hobby.

use chrono::NaiveDate;
use harrastus_core::models::event::HobbyEvent;
use uuid::Uuid;

/// How a hobby's next event was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextEvent {
    /// Starts today or later.
    Upcoming(Uuid),
    /// Already started but ends today or later.
    Ongoing(Uuid),
    None,
}

impl NextEvent {
    pub fn id(&self) -> Option<Uuid> {
        match self {
            Self::Upcoming(id) | Self::Ongoing(id) => Some(*id),
            Self::None => None,
        }
    }
}

/// Pick the event a hobby should surface on `today`.
///
/// The earliest event starting on or after `today` wins. Otherwise the
/// earliest-starting event that has not yet ended. Ties break on start
/// time, then id.
pub fn select_next(events: &[HobbyEvent], today: NaiveDate) -> NextEvent {
    let earliest = |keep: &dyn Fn(&HobbyEvent) -> bool| {
        events
            .iter()
            .filter(|&e| keep(e))
            .min_by_key(|e| (e.start_date, e.start_time, e.id))
            .map(|e| e.id)
    };

    if let Some(id) = earliest(&|e| e.start_date >= today) {
        return NextEvent::Upcoming(id);
    }
    match earliest(&|e| e.end_date >= today) {
        Some(id) => NextEvent::Ongoing(id),
        None => NextEvent::None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveTime, Utc};
    use harrastus_core::models::event::iso_weekday;

    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn event(start: u32, end: u32, hour: u32) -> HobbyEvent {
        HobbyEvent {
            id: Uuid::new_v4(),
            hobby_id: Uuid::nil(),
            start_date: date(start),
            start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            end_date: date(end),
            end_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            start_weekday: iso_weekday(date(start)),
            recurrence_start_event: None,
            data_source: String::new(),
            origin_id: None,
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }

    #[test]
    fn prefers_upcoming_over_ongoing() {
        let ongoing = event(10, 20, 12);
        let later = event(18, 18, 12);
        let soon = event(16, 16, 12);
        let events = [ongoing, later, soon.clone()];
        assert_eq!(select_next(&events, date(15)), NextEvent::Upcoming(soon.id));
    }

    #[test]
    fn event_starting_today_is_upcoming() {
        let today = event(15, 15, 8);
        assert_eq!(
            select_next(std::slice::from_ref(&today), date(15)),
            NextEvent::Upcoming(today.id)
        );
    }

    #[test]
    fn falls_back_to_earliest_ongoing() {
        let long = event(1, 30, 12);
        let short = event(10, 16, 12);
        let events = [short, long.clone()];
        assert_eq!(select_next(&events, date(15)), NextEvent::Ongoing(long.id));
    }

    #[test]
    fn only_past_events_yield_none() {
        let events = [event(1, 2, 12), event(5, 14, 12)];
        assert_eq!(select_next(&events, date(15)), NextEvent::None);
        assert_eq!(select_next(&[], date(15)).id(), None);
    }

    #[test]
    fn same_day_ties_break_on_time_then_id() {
        let evening = event(16, 16, 18);
        let morning = event(16, 16, 9);
        let events = [evening, morning.clone()];
        assert_eq!(select_next(&events, date(15)).id(), Some(morning.id));

        let mut a = event(16, 16, 9);
        let mut b = event(16, 16, 9);
        a.id = Uuid::from_u128(2);
        b.id = Uuid::from_u128(1);
        assert_eq!(select_next(&[a, b], date(15)).id(), Some(Uuid::from_u128(1)));
    }
}
