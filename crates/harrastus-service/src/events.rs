//! Hobby event write paths.
//!
//! Every event write ends by recomputing the owning hobby's next-event
//! pointer, so the pointer never needs to be set by hand.

use chrono::NaiveDate;
use harrastus_core::error::HarrastusResult;
use harrastus_core::models::event::{CreateHobbyEvent, HobbyEvent, UpdateHobbyEvent};
use harrastus_core::repository::{CatalogRepositories, HobbyEventRepository, HobbyRepository};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::next_event::{NextEvent, select_next};
use crate::recurrence::{self, RecurrenceRequest};

/// Counts from a full next-event refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NextEventReport {
    pub upcoming: usize,
    pub ongoing: usize,
    pub none: usize,
}

impl NextEventReport {
    pub fn total(&self) -> usize {
        self.upcoming + self.ongoing + self.none
    }

    fn record(&mut self, next: NextEvent) {
        match next {
            NextEvent::Upcoming(_) => self.upcoming += 1,
            NextEvent::Ongoing(_) => self.ongoing += 1,
            NextEvent::None => self.none += 1,
        }
    }
}

pub struct EventService<R: CatalogRepositories> {
    repos: R,
    config: ServiceConfig,
}

impl<R: CatalogRepositories> EventService<R> {
    pub fn new(repos: R, config: ServiceConfig) -> Self {
        Self { repos, config }
    }

    pub async fn create_event(
        &self,
        input: CreateHobbyEvent,
        today: NaiveDate,
    ) -> HarrastusResult<HobbyEvent> {
        // Fail early with NotFound for a dangling hobby reference.
        self.repos.hobbies().get_by_id(input.hobby_id).await?;
        let event = self.repos.events().create(input).await?;
        self.refresh_next_event(event.hobby_id, today).await?;
        Ok(event)
    }

    /// Update an event. When it moves to another hobby both hobbies get
    /// their pointer recomputed.
    pub async fn update_event(
        &self,
        id: Uuid,
        input: UpdateHobbyEvent,
        today: NaiveDate,
    ) -> HarrastusResult<HobbyEvent> {
        let before = self.repos.events().get_by_id(id).await?;
        if let Some(hobby_id) = input.hobby_id {
            self.repos.hobbies().get_by_id(hobby_id).await?;
        }
        let event = self.repos.events().update(id, input).await?;
        self.refresh_next_event(event.hobby_id, today).await?;
        if before.hobby_id != event.hobby_id {
            self.refresh_next_event(before.hobby_id, today).await?;
        }
        Ok(event)
    }

    pub async fn delete_event(&self, id: Uuid, today: NaiveDate) -> HarrastusResult<()> {
        let event = self.repos.events().get_by_id(id).await?;
        self.repos.events().delete(id).await?;
        self.refresh_next_event(event.hobby_id, today).await?;
        Ok(())
    }

    /// Generate and store the siblings of `base_event_id`. Nothing is
    /// stored when the request would exceed the configured cap.
    pub async fn create_recurrence(
        &self,
        base_event_id: Uuid,
        request: &RecurrenceRequest,
        today: NaiveDate,
    ) -> HarrastusResult<Vec<Uuid>> {
        let base = self.repos.events().get_by_id(base_event_id).await?;
        let siblings = recurrence::expand(&base, request, self.config.recurrence_cap)?;
        if siblings.is_empty() {
            return Ok(Vec::new());
        }

        let created = self.repos.events().create_many(siblings).await?;
        info!(
            base_event_id = %base.id,
            hobby_id = %base.hobby_id,
            cadence = request.cadence.as_str(),
            amount = request.amount,
            created = created.len(),
            "Created recurrent events"
        );
        self.refresh_next_event(base.hobby_id, today).await?;
        Ok(created.into_iter().map(|e| e.id).collect())
    }

    /// Recompute and store one hobby's next-event pointer.
    pub async fn refresh_next_event(
        &self,
        hobby_id: Uuid,
        today: NaiveDate,
    ) -> HarrastusResult<NextEvent> {
        let events = self.repos.events().list_by_hobby(hobby_id).await?;
        let next = select_next(&events, today);
        self.repos
            .hobbies()
            .set_next_event(hobby_id, next.id())
            .await?;
        debug!(hobby_id = %hobby_id, next_event_id = ?next.id(), "Updated next event");
        Ok(next)
    }

    /// Recompute the pointer of every hobby. Running it twice on the same
    /// day changes nothing the second time.
    pub async fn refresh_all_next_events(
        &self,
        today: NaiveDate,
    ) -> HarrastusResult<NextEventReport> {
        let hobbies = self.repos.hobbies().list().await?;
        let mut report = NextEventReport::default();
        for hobby in &hobbies {
            let next = self.refresh_next_event(hobby.id, today).await?;
            report.record(next);
        }
        info!(
            hobbies = report.total(),
            upcoming = report.upcoming,
            ongoing = report.ongoing,
            none = report.none,
            "Refreshed next events"
        );
        Ok(report)
    }
}
