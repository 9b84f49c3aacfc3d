//! Read access to the event log.
//!
//! The engine never talks to a database directly. Every component receives
//! an [`EventStore`] and describes what it needs with an [`EventQuery`];
//! `bt-db` implements the trait over SQLite and [`MemoryStore`] implements it
//! over a plain vector for tests and embedders.

use std::convert::Infallible;
use std::ops::{Bound, RangeBounds};

use chrono::{DateTime, Utc};

use crate::event::Event;
use crate::event_kind::EventKind;

/// Timestamp ordering of query results. Ties are broken by event ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Constraint on the `detail` column.
///
/// Events with no detail never match `Equals` and are never excluded by
/// `Excludes`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetailFilter {
    #[default]
    Any,
    Equals(String),
    Excludes(Vec<String>),
}

impl DetailFilter {
    pub fn matches(&self, detail: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Equals(expected) => detail == Some(expected.as_str()),
            Self::Excludes(excluded) => {
                detail.is_none_or(|detail| !excluded.iter().any(|e| e == detail))
            }
        }
    }
}

/// A range query over the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    /// Kinds to include. Empty means every kind.
    pub kinds: Vec<EventKind>,
    pub detail: DetailFilter,
    /// Lower bound on `timestamp`.
    pub from: Bound<DateTime<Utc>>,
    /// Upper bound on `timestamp`.
    pub to: Bound<DateTime<Utc>>,
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            kinds: Vec::new(),
            detail: DetailFilter::Any,
            from: Bound::Unbounded,
            to: Bound::Unbounded,
            order: SortOrder::Ascending,
            limit: None,
        }
    }
}

impl EventQuery {
    /// Matches events of any of the given kinds.
    pub fn kinds(kinds: &[EventKind]) -> Self {
        Self {
            kinds: kinds.to_vec(),
            ..Self::default()
        }
    }

    /// Matches events of a single kind.
    pub fn kind(kind: EventKind) -> Self {
        Self::kinds(&[kind])
    }

    /// Only sessions still in progress.
    #[must_use]
    pub fn ongoing(mut self) -> Self {
        self.detail = DetailFilter::Equals(crate::duration::ONGOING.to_string());
        self
    }

    /// Excludes sessions still in progress.
    #[must_use]
    pub fn not_ongoing(mut self) -> Self {
        self.detail = DetailFilter::Excludes(vec![crate::duration::ONGOING.to_string()]);
        self
    }

    /// Inclusive lower bound.
    #[must_use]
    pub fn since(mut self, start: DateTime<Utc>) -> Self {
        self.from = Bound::Included(start);
        self
    }

    /// Exclusive upper bound.
    #[must_use]
    pub fn before(mut self, end: DateTime<Utc>) -> Self {
        self.to = Bound::Excluded(end);
        self
    }

    /// Inclusive upper bound.
    #[must_use]
    pub fn through(mut self, end: DateTime<Utc>) -> Self {
        self.to = Bound::Included(end);
        self
    }

    #[must_use]
    pub fn descending(mut self) -> Self {
        self.order = SortOrder::Descending;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether an event satisfies every constraint except ordering and limit.
    pub fn matches(&self, event: &Event) -> bool {
        (self.kinds.is_empty() || self.kinds.contains(&event.kind))
            && self.detail.matches(event.detail.as_deref())
            && (self.from, self.to).contains(&event.timestamp)
    }
}

/// Ordered range queries over the event log.
///
/// Implementations must return events sorted by `timestamp` in the requested
/// order, breaking ties by `id`, and apply `limit` after sorting.
pub trait EventStore {
    /// Storage failure. The engine propagates it unchanged.
    type Error: std::error::Error + Send + Sync + 'static;

    fn query(&self, query: &EventQuery) -> Result<Vec<Event>, Self::Error>;

    /// The most recent matching event.
    fn latest(&self, query: &EventQuery) -> Result<Option<Event>, Self::Error> {
        let query = query.clone().descending().limit(1);
        Ok(self.query(&query)?.into_iter().next())
    }
}

impl<S: EventStore + ?Sized> EventStore for &S {
    type Error = S::Error;

    fn query(&self, query: &EventQuery) -> Result<Vec<Event>, Self::Error> {
        (**self).query(query)
    }

    fn latest(&self, query: &EventQuery) -> Result<Option<Event>, Self::Error> {
        (**self).latest(query)
    }
}

/// An in-memory event log snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    events: Vec<Event>,
}

impl MemoryStore {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventStore for MemoryStore {
    type Error = Infallible;

    fn query(&self, query: &EventQuery) -> Result<Vec<Event>, Self::Error> {
        let mut matched: Vec<Event> = self
            .events
            .iter()
            .filter(|event| query.matches(event))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        if query.order == SortOrder::Descending {
            matched.reverse();
        }
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    }

    fn event(id: i64, kind: EventKind, minutes: i64, detail: Option<&str>) -> Event {
        let mut event = Event::new(id, kind, base() + Duration::minutes(minutes));
        event.detail = detail.map(str::to_string);
        event
    }

    fn ids(events: &[Event]) -> Vec<i64> {
        events.iter().map(|e| e.id).collect()
    }

    fn store() -> MemoryStore {
        MemoryStore::new(vec![
            event(1, EventKind::Feeding, 0, Some("00:10:00")),
            event(2, EventKind::Pee, 5, None),
            event(3, EventKind::Feeding, 10, Some("ongoing")),
            event(4, EventKind::Mixed, 10, None),
            event(5, EventKind::Feeding, 20, None),
        ])
    }

    #[test]
    fn filters_by_kind_and_orders_ascending() {
        let found = store()
            .query(&EventQuery::kinds(&[EventKind::Pee, EventKind::Mixed]))
            .unwrap();
        assert_eq!(ids(&found), vec![2, 4]);
    }

    #[test]
    fn descending_breaks_ties_by_id() {
        let found = store()
            .query(&EventQuery::default().descending())
            .unwrap();
        assert_eq!(ids(&found), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn detail_filters_treat_null_as_not_ongoing() {
        let store = store();
        let ongoing = store
            .query(&EventQuery::kind(EventKind::Feeding).ongoing())
            .unwrap();
        assert_eq!(ids(&ongoing), vec![3]);

        let completed = store
            .query(&EventQuery::kind(EventKind::Feeding).not_ongoing())
            .unwrap();
        assert_eq!(ids(&completed), vec![1, 5]);
    }

    #[test]
    fn bounds_are_respected() {
        let store = store();
        let half_open = store
            .query(
                &EventQuery::default()
                    .since(base() + Duration::minutes(5))
                    .before(base() + Duration::minutes(20)),
            )
            .unwrap();
        assert_eq!(ids(&half_open), vec![2, 3, 4]);

        let closed = store
            .query(&EventQuery::default().through(base() + Duration::minutes(20)))
            .unwrap();
        assert_eq!(closed.len(), 5);
    }

    #[test]
    fn latest_returns_most_recent_match() {
        let latest = store()
            .latest(&EventQuery::kind(EventKind::Feeding).not_ongoing())
            .unwrap();
        assert_eq!(latest.map(|e| e.id), Some(5));

        let none = store().latest(&EventQuery::kind(EventKind::Growth)).unwrap();
        assert!(none.is_none());
    }
}
