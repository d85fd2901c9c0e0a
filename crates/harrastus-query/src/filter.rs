//! List pipelines for hobbies, hobby events, promotions, locations and
//! organizers.
//!
//! Every stage narrows the result and is skipped when its parameter is
//! absent. Ordering always runs last.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use harrastus_core::error::{HarrastusError, HarrastusResult};
use harrastus_core::models::{
    event::{HobbyEvent, iso_weekday},
    hobby::{Hobby, PriceType},
    location::Location,
    organizer::Organizer,
    promotion::Promotion,
};
use tracing::debug;
use uuid::Uuid;

use crate::catalog::{Caller, Catalog};
use crate::geo::{SortDirection, order_by_distance};
use crate::hierarchy::CategoryTree;
use crate::params::{EventOrdering, HobbyEventQuery, HobbyQuery, PromotionQuery, TemporalFilter};

// ---------------------------------------------------------------------------
// Stage helpers
// ---------------------------------------------------------------------------

/// Anything with a start and end that the temporal stage can inspect.
trait Scheduled {
    fn start_date(&self) -> NaiveDate;
    fn start_time(&self) -> NaiveTime;
    fn end_date(&self) -> NaiveDate;
    fn end_time(&self) -> NaiveTime;
    fn start_weekday(&self) -> u8;
}

impl Scheduled for HobbyEvent {
    fn start_date(&self) -> NaiveDate {
        self.start_date
    }
    fn start_time(&self) -> NaiveTime {
        self.start_time
    }
    fn end_date(&self) -> NaiveDate {
        self.end_date
    }
    fn end_time(&self) -> NaiveTime {
        self.end_time
    }
    fn start_weekday(&self) -> u8 {
        self.start_weekday
    }
}

impl Scheduled for Promotion {
    fn start_date(&self) -> NaiveDate {
        self.start_date
    }
    fn start_time(&self) -> NaiveTime {
        self.start_time
    }
    fn end_date(&self) -> NaiveDate {
        self.end_date
    }
    fn end_time(&self) -> NaiveTime {
        self.end_time
    }
    fn start_weekday(&self) -> u8 {
        iso_weekday(self.start_date)
    }
}

fn matches_temporal<T: Scheduled>(item: &T, filter: &TemporalFilter, now: NaiveDateTime) -> bool {
    if filter.start_date_from.is_some_and(|from| item.start_date() < from)
        || filter.start_date_to.is_some_and(|to| item.start_date() > to)
        || filter.start_time_from.is_some_and(|from| item.start_time() < from)
        || filter.start_time_to.is_some_and(|to| item.start_time() > to)
    {
        return false;
    }
    if !filter.start_weekdays.is_empty() && !filter.start_weekdays.contains(&item.start_weekday()) {
        return false;
    }
    if filter.exclude_past_events {
        let today = now.date();
        let ended = item.end_date() < today
            || (item.end_date() == today && item.end_time() < now.time());
        if ended {
            return false;
        }
    }
    true
}

/// Expand a taxonomy selection. `None` means the stage is not requested.
fn expand_selection(
    tree: &CategoryTree,
    requested: &BTreeSet<Uuid>,
) -> HarrastusResult<Option<BTreeSet<Uuid>>> {
    if requested.is_empty() {
        return Ok(None);
    }
    tree.expand_to_descendants(requested).map(Some)
}

fn tagged_with(tags: &[Uuid], selection: Option<&BTreeSet<Uuid>>) -> bool {
    selection.is_none_or(|wanted| tags.iter().any(|tag| wanted.contains(tag)))
}

/// Every term must appear in at least one of the texts.
fn text_matches(terms: &[String], texts: &[&str]) -> bool {
    terms.iter().all(|term| {
        let needle = term.to_lowercase();
        texts.iter().any(|text| text.to_lowercase().contains(&needle))
    })
}

/// Categories whose name contains any term, plus their descendants.
fn categories_matching_terms(tree: &CategoryTree, terms: &[String]) -> BTreeSet<Uuid> {
    let mut ids = BTreeSet::new();
    for term in terms {
        for id in tree.search(term) {
            ids.insert(id);
            ids.extend(tree.descendants(id));
        }
    }
    ids
}

/// Hobby-level criteria shared by the hobby and event pipelines.
struct HobbyCriteria<'q> {
    categories: Option<BTreeSet<Uuid>>,
    audiences: Option<BTreeSet<Uuid>>,
    search: &'q [String],
    search_categories: BTreeSet<Uuid>,
    price_type: Option<PriceType>,
}

impl<'q> HobbyCriteria<'q> {
    fn new(
        catalog: &Catalog,
        categories: &BTreeSet<Uuid>,
        audiences: &BTreeSet<Uuid>,
        search: &'q [String],
        price_type: Option<PriceType>,
    ) -> HarrastusResult<Self> {
        Ok(Self {
            categories: expand_selection(catalog.categories(), categories)?,
            audiences: expand_selection(catalog.audiences(), audiences)?,
            search,
            search_categories: categories_matching_terms(catalog.categories(), search),
            price_type,
        })
    }

    fn matches(&self, hobby: &Hobby) -> bool {
        tagged_with(&hobby.categories, self.categories.as_ref())
            && tagged_with(&hobby.audiences, self.audiences.as_ref())
            && self.price_type.is_none_or(|p| hobby.price_type == p)
            && self.matches_search(hobby)
    }

    fn matches_search(&self, hobby: &Hobby) -> bool {
        self.search.is_empty()
            || text_matches(self.search, &[hobby.name.as_str(), hobby.description.as_str()])
            || hobby
                .categories
                .iter()
                .any(|c| self.search_categories.contains(c))
    }
}

fn sorted_by_name<'a, T>(mut items: Vec<&'a T>, name: impl Fn(&T) -> &str) -> Vec<&'a T> {
    items.sort_by(|a, b| name(a).cmp(name(b)));
    items
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Runs list queries against a [`Catalog`] snapshot as of `now`.
pub struct FilterEngine<'a> {
    catalog: &'a Catalog,
    now: NaiveDateTime,
}

impl<'a> FilterEngine<'a> {
    pub fn new(catalog: &'a Catalog, now: NaiveDateTime) -> Self {
        Self { catalog, now }
    }

    pub fn hobbies(&self, query: &HobbyQuery, caller: &Caller) -> HarrastusResult<Vec<&'a Hobby>> {
        let criteria = HobbyCriteria::new(
            self.catalog,
            &query.categories,
            &query.audiences,
            &query.search,
            query.price_type,
        )?;
        let mut hobbies: Vec<&Hobby> = self
            .catalog
            .hobbies()
            .iter()
            .filter(|h| criteria.matches(h))
            .collect();
        if query.editable_only {
            hobbies.retain(|h| caller.can_edit(h.id));
        }

        if let Some(point) = &query.geo {
            hobbies = order_by_distance(hobbies, point, |h| {
                self.catalog.location_coordinate(h.location_id)
            });
        }
        debug!(count = hobbies.len(), "Filtered hobbies");
        Ok(hobbies)
    }

    /// Events matching the query, without collapsing per hobby.
    pub fn hobby_events(&self, query: &HobbyEventQuery) -> HarrastusResult<Vec<&'a HobbyEvent>> {
        self.run_events(query, false)
    }

    /// Events for a list view: unless a single hobby is requested, only
    /// each hobby's next event is returned.
    pub fn list_hobby_events(
        &self,
        query: &HobbyEventQuery,
    ) -> HarrastusResult<Vec<&'a HobbyEvent>> {
        self.run_events(query, query.hobby.is_none())
    }

    fn run_events(
        &self,
        query: &HobbyEventQuery,
        collapse: bool,
    ) -> HarrastusResult<Vec<&'a HobbyEvent>> {
        if let Some(hobby_id) = query.hobby {
            if self.catalog.hobby(hobby_id).is_none() {
                return Err(HarrastusError::not_found("Hobby", hobby_id));
            }
        }
        let criteria = HobbyCriteria::new(
            self.catalog,
            &query.categories,
            &query.audiences,
            &query.search,
            query.price_type,
        )?;
        let next_events = collapse.then(|| self.catalog.next_event_ids());

        let mut events: Vec<&HobbyEvent> = self
            .catalog
            .events()
            .iter()
            .filter(|e| query.hobby.is_none_or(|h| e.hobby_id == h))
            .filter(|e| next_events.as_ref().is_none_or(|ids| ids.contains(&e.id)))
            .filter(|e| matches_temporal(*e, &query.temporal, self.now))
            .filter(|e| {
                self.catalog
                    .hobby(e.hobby_id)
                    .is_some_and(|h| criteria.matches(h))
            })
            .collect();

        match &query.ordering {
            None => {}
            Some(EventOrdering::Nearest(point)) => {
                events = order_by_distance(events, point, |e| {
                    self.catalog.hobby_coordinate(e.hobby_id)
                });
            }
            Some(EventOrdering::StartDate(direction)) => {
                events.sort_by_key(|e| (e.start_date, e.start_time));
                if *direction == SortDirection::Descending {
                    events.reverse();
                }
            }
        }
        debug!(count = events.len(), collapse, "Filtered hobby events");
        Ok(events)
    }

    pub fn promotions(
        &self,
        query: &PromotionQuery,
        caller: &Caller,
    ) -> HarrastusResult<Vec<&'a Promotion>> {
        let mut promotions: Vec<&Promotion> = self
            .catalog
            .promotions()
            .iter()
            .filter(|p| matches_temporal(*p, &query.temporal, self.now))
            .filter(|p| !query.usable_only || p.is_usable())
            .filter(|p| !query.editable_only || caller.can_edit(p.id))
            .filter(|p| {
                query.search.is_empty()
                    || text_matches(&query.search, &[p.name.as_str(), p.description.as_str()])
            })
            .collect();

        if let Some(point) = &query.geo {
            promotions = order_by_distance(promotions, point, |p| {
                self.catalog.location_coordinate(p.location_id)
            });
        }
        debug!(count = promotions.len(), "Filtered promotions");
        Ok(promotions)
    }

    /// Authenticated callers see the locations they may edit; anonymous
    /// callers see all of them.
    pub fn locations(&self, caller: &Caller) -> Vec<&'a Location> {
        let visible = self
            .catalog
            .locations()
            .iter()
            .filter(|l| !caller.is_authenticated() || caller.can_edit(l.id))
            .collect();
        sorted_by_name(visible, |l| l.name.as_str())
    }

    pub fn organizers(&self, caller: &Caller) -> Vec<&'a Organizer> {
        let visible = self
            .catalog
            .organizers()
            .iter()
            .filter(|o| !caller.is_authenticated() || caller.can_edit(o.id))
            .collect();
        sorted_by_name(visible, |o| o.name.as_str())
    }
}
