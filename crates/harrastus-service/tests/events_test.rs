//! Event writes, recurrence and next-event maintenance.

mod common;

use common::{Harness, date, time};
use harrastus_core::error::HarrastusError;
use harrastus_core::models::event::{CreateHobbyEvent, UpdateHobbyEvent};
use harrastus_core::models::hobby::CreateHobby;
use harrastus_core::repository::{CatalogRepositories, HobbyEventRepository, HobbyRepository};
use harrastus_db::SurrealCatalog;
use harrastus_service::{
    Cadence, EventService, NextEvent, RecurrenceRequest, ServiceConfig, TOO_MANY_EVENTS,
};
use serde_json::json;
use surrealdb::engine::local::Db;
use uuid::Uuid;

fn service(h: &Harness) -> EventService<SurrealCatalog<Db>> {
    EventService::new(h.catalog.clone(), ServiceConfig::default())
}

async fn hobby(h: &Harness, name: &str) -> Uuid {
    h.catalog
        .hobbies()
        .create(CreateHobby::new(name))
        .await
        .unwrap()
        .id
}

fn evening(hobby_id: Uuid, y: i32, m: u32, d: u32) -> CreateHobbyEvent {
    CreateHobbyEvent::new(hobby_id, date(y, m, d), time(18, 0), date(y, m, d), time(19, 30))
}

#[tokio::test]
async fn creating_event_sets_next_event() {
    let h = Harness::new().await;
    let events = service(&h);
    let hobby_id = hobby(&h, "Yoga").await;
    let today = date(2026, 3, 1);

    let later = events
        .create_event(evening(hobby_id, 2026, 3, 20), today)
        .await
        .unwrap();
    let sooner = events
        .create_event(evening(hobby_id, 2026, 3, 5), today)
        .await
        .unwrap();

    let stored = h.catalog.hobbies().get_by_id(hobby_id).await.unwrap();
    assert_eq!(stored.next_event_id, Some(sooner.id));

    events.delete_event(sooner.id, today).await.unwrap();
    let stored = h.catalog.hobbies().get_by_id(hobby_id).await.unwrap();
    assert_eq!(stored.next_event_id, Some(later.id));
}

#[tokio::test]
async fn event_for_missing_hobby_is_not_found() {
    let h = Harness::new().await;
    let err = service(&h)
        .create_event(evening(Uuid::new_v4(), 2026, 3, 5), date(2026, 3, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, HarrastusError::NotFound { .. }));
    assert!(h.catalog.events().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn moving_event_refreshes_both_hobbies() {
    let h = Harness::new().await;
    let events = service(&h);
    let yoga = hobby(&h, "Yoga").await;
    let pilates = hobby(&h, "Pilates").await;
    let today = date(2026, 3, 1);

    let event = events
        .create_event(evening(yoga, 2026, 3, 5), today)
        .await
        .unwrap();
    events
        .update_event(
            event.id,
            UpdateHobbyEvent {
                hobby_id: Some(pilates),
                ..Default::default()
            },
            today,
        )
        .await
        .unwrap();

    let yoga = h.catalog.hobbies().get_by_id(yoga).await.unwrap();
    let pilates = h.catalog.hobbies().get_by_id(pilates).await.unwrap();
    assert_eq!(yoga.next_event_id, None);
    assert_eq!(pilates.next_event_id, Some(event.id));
}

#[tokio::test]
async fn weekly_recurrence_persists_siblings() {
    let h = Harness::new().await;
    let events = service(&h);
    let hobby_id = hobby(&h, "Yoga").await;
    let today = date(2026, 3, 1);
    let base = events
        .create_event(evening(hobby_id, 2026, 3, 2), today)
        .await
        .unwrap();

    let body = json!({"weeks": 1, "end_date": "2026-03-23"});
    let request = RecurrenceRequest::from_json(body.as_object().unwrap()).unwrap();
    let created = events
        .create_recurrence(base.id, &request, today)
        .await
        .unwrap();
    assert_eq!(created.len(), 3);

    let stored = h.catalog.events().list_by_hobby(hobby_id).await.unwrap();
    assert_eq!(stored.len(), 4);
    for sibling in stored.iter().filter(|e| e.id != base.id) {
        assert_eq!(sibling.recurrence_start_event, Some(base.id));
        assert_eq!(sibling.start_weekday, base.start_weekday);
        assert_eq!(sibling.start_time, base.start_time);
    }
}

#[tokio::test]
async fn oversized_recurrence_stores_nothing() {
    let h = Harness::new().await;
    let events = service(&h);
    let hobby_id = hobby(&h, "Yoga").await;
    let today = date(2026, 3, 1);
    let base = events
        .create_event(evening(hobby_id, 2026, 3, 2), today)
        .await
        .unwrap();

    let request = RecurrenceRequest::new(Cadence::Days, 1, date(2026, 4, 22)).unwrap();
    assert_eq!(request.occurrences_after(base.start_date), 51);
    let err = events
        .create_recurrence(base.id, &request, today)
        .await
        .unwrap_err();
    assert!(err.to_string().contains(TOO_MANY_EVENTS));

    let stored = h.catalog.events().list_by_hobby(hobby_id).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn recurrence_cap_is_inclusive() {
    let h = Harness::new().await;
    let events = service(&h);
    let hobby_id = hobby(&h, "Yoga").await;
    let today = date(2026, 3, 1);
    let base = events
        .create_event(evening(hobby_id, 2026, 3, 2), today)
        .await
        .unwrap();

    let request = RecurrenceRequest::new(Cadence::Days, 1, date(2026, 4, 21)).unwrap();
    let created = events
        .create_recurrence(base.id, &request, today)
        .await
        .unwrap();
    assert_eq!(created.len(), 50);
}

#[tokio::test]
async fn refresh_all_reports_and_is_stable() {
    let h = Harness::new().await;
    let events = service(&h);
    let today = date(2026, 3, 10);
    let upcoming = hobby(&h, "Upcoming").await;
    let ongoing = hobby(&h, "Ongoing").await;
    let idle = hobby(&h, "Idle").await;

    h.catalog
        .events()
        .create(evening(upcoming, 2026, 3, 12))
        .await
        .unwrap();
    let camp = h
        .catalog
        .events()
        .create(CreateHobbyEvent::new(
            ongoing,
            date(2026, 3, 8),
            time(9, 0),
            date(2026, 3, 14),
            time(16, 0),
        ))
        .await
        .unwrap();
    h.catalog
        .events()
        .create(evening(idle, 2026, 2, 1))
        .await
        .unwrap();

    let report = events.refresh_all_next_events(today).await.unwrap();
    assert_eq!(report.upcoming, 1);
    assert_eq!(report.ongoing, 1);
    assert_eq!(report.none, 1);
    assert_eq!(report.total(), 3);

    assert_eq!(
        events.refresh_next_event(ongoing, today).await.unwrap(),
        NextEvent::Ongoing(camp.id)
    );
    assert_eq!(events.refresh_all_next_events(today).await.unwrap(), report);
}
