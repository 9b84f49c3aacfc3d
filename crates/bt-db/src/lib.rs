//! Storage layer for the baby tracker.
//!
//! Persists the care log in SQLite using `rusqlite` and implements
//! [`EventStore`] over it so the engine in `bt-core` can read from disk.
//!
//! # Thread Safety
//!
//! [`Database`] wraps a `rusqlite::Connection`, which is `Send` but not
//! `Sync`. Move it between threads freely, but wrap it in a `Mutex` (or open
//! one per thread) to share it.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC form with millisecond
//! precision (e.g. `2025-01-15T10:30:00.000Z`). Every write goes through
//! [`format_timestamp`], so lexicographic order matches chronological order
//! and range queries can compare strings.
//!
//! `kind` and `orientation` hold the canonical names from `bt-core`
//! (`Feeding`, `Left`, ...). `detail` holds free text, `ongoing`, or the
//! `HH:MM:SS` length of a completed session.

use std::ops::Bound;
use std::path::Path;

use bt_core::duration::{self, ONGOING};
use bt_core::{DetailFilter, Event, EventKind, EventQuery, EventStore, Orientation, SortOrder};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored timestamp is not valid RFC 3339.
    #[error("invalid timestamp for event {event_id}: {timestamp}")]
    TimestampParse {
        event_id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row does not describe a valid event.
    #[error("invalid event data for {event_id}: {message}")]
    InvalidEventData { event_id: i64, message: String },
    /// Rejected write: an ongoing session cannot already have ended.
    #[error("ongoing {kind} session cannot have an end timestamp")]
    OngoingWithEnd { kind: EventKind },
    /// Rejected write: the end timestamp precedes the start.
    #[error("{kind} event ends before it starts")]
    EndBeforeStart { kind: EventKind },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Fields of an event to be written. The ID is assigned by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub kind: EventKind,
    pub detail: Option<String>,
    /// Defaults to the write time when `None`.
    pub timestamp: Option<DateTime<Utc>>,
    pub end_timestamp: Option<DateTime<Utc>>,
    pub orientation: Option<Orientation>,
    pub feed_id: Option<i64>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub comments: Option<String>,
}

impl NewEvent {
    pub const fn new(kind: EventKind) -> Self {
        Self {
            kind,
            detail: None,
            timestamp: None,
            end_timestamp: None,
            orientation: None,
            feed_id: None,
            weight: None,
            height: None,
            comments: None,
        }
    }

    /// An ongoing session of `kind` starting at `start`.
    pub fn session(kind: EventKind, start: DateTime<Utc>) -> Self {
        Self {
            detail: Some(ONGOING.to_string()),
            timestamp: Some(start),
            ..Self::new(kind)
        }
    }

    /// The stored form of this event, with `fallback` as its timestamp when
    /// none was given.
    fn into_event(self, id: i64, fallback: DateTime<Utc>) -> Event {
        Event {
            id,
            kind: self.kind,
            detail: self.detail,
            timestamp: self.timestamp.unwrap_or(fallback),
            end_timestamp: self.end_timestamp,
            orientation: self.orientation,
            feed_id: self.feed_id,
            weight: self.weight,
            height: self.height,
            comments: self.comments,
        }
    }

    /// Checks the event as it would be stored with `start` as its timestamp.
    fn validate(&self, start: DateTime<Utc>) -> Result<(), DbError> {
        if self.detail.as_deref() == Some(ONGOING) && self.end_timestamp.is_some() {
            return Err(DbError::OngoingWithEnd { kind: self.kind });
        }
        if self.end_timestamp.is_some_and(|end| end < start) {
            return Err(DbError::EndBeforeStart { kind: self.kind });
        }
        Ok(())
    }
}

const EVENT_COLUMNS: &str =
    "id, kind, detail, timestamp, end_timestamp, orientation, feed_id, weight, height, comments";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- timestamp/end_timestamp: RFC 3339 UTC with milliseconds
            -- detail: free text, 'ongoing', or HH:MM:SS for completed sessions
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                detail TEXT,
                timestamp TEXT NOT NULL,
                end_timestamp TEXT,
                orientation TEXT,
                feed_id INTEGER,
                weight REAL,
                height REAL,
                comments TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp);
            CREATE INDEX IF NOT EXISTS idx_events_kind ON events(kind);
            ",
        )?;
        Ok(())
    }

    /// Appends an event and returns it as stored.
    pub fn insert_event(&mut self, event: NewEvent, now: DateTime<Utc>) -> Result<Event, DbError> {
        event.validate(event.timestamp.unwrap_or(now))?;
        let id = insert_row(&self.conn, &event, now)?;
        tracing::debug!(id, kind = %event.kind, "inserted event");
        Ok(event.into_event(id, now))
    }

    /// Replaces every field of an existing event.
    ///
    /// Returns `None` when no event has this ID. A `None` timestamp keeps the
    /// stored one.
    pub fn update_event(&mut self, id: i64, event: NewEvent) -> Result<Option<Event>, DbError> {
        let tx = self.conn.transaction()?;
        let existing = select_one(&tx, "WHERE id = ?", params![id])?;
        let Some(existing) = existing else {
            return Ok(None);
        };
        let timestamp = event.timestamp.unwrap_or(existing.timestamp);
        event.validate(timestamp)?;
        tx.execute(
            "
            UPDATE events
            SET kind = ?, detail = ?, timestamp = ?, end_timestamp = ?, orientation = ?,
                feed_id = ?, weight = ?, height = ?, comments = ?
            WHERE id = ?
            ",
            params![
                event.kind.as_str(),
                event.detail,
                format_timestamp(timestamp),
                event.end_timestamp.map(format_timestamp),
                event.orientation.map(Orientation::as_str),
                event.feed_id,
                event.weight,
                event.height,
                event.comments,
                id,
            ],
        )?;
        tx.commit()?;

        Ok(Some(event.into_event(id, timestamp)))
    }

    /// Deletes an event. Returns whether it existed.
    pub fn delete_event(&mut self, id: i64) -> Result<bool, DbError> {
        let deleted = self.conn.execute("DELETE FROM events WHERE id = ?", [id])?;
        Ok(deleted > 0)
    }

    pub fn get_event(&self, id: i64) -> Result<Option<Event>, DbError> {
        select_one(&self.conn, "WHERE id = ?", params![id])
    }

    /// Lists events newest first, optionally of a single kind.
    pub fn list_events(
        &self,
        kind: Option<EventKind>,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Event>, DbError> {
        let skip = i64::try_from(skip).unwrap_or(i64::MAX);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let sql = format!(
            "
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE (?1 IS NULL OR kind = ?1)
            ORDER BY timestamp DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![kind.map(EventKind::as_str), limit, skip], EventRow::from_row)?;
        collect_events(rows)
    }

    /// Stops the most recent ongoing session of `kind` at `now`.
    ///
    /// Records `now` as the end and the elapsed `HH:MM:SS` as the detail.
    /// Returns `None` when nothing of that kind is ongoing.
    pub fn stop_ongoing_session(
        &mut self,
        kind: EventKind,
        now: DateTime<Utc>,
    ) -> Result<Option<Event>, DbError> {
        let tx = self.conn.transaction()?;
        let stopped = stop_latest_ongoing(&tx, kind, now)?;
        tx.commit()?;
        Ok(stopped)
    }

    /// Starts a feed on the given side.
    ///
    /// Any ongoing feed is stopped first. The new feed is numbered one past
    /// the highest feed ID recorded so far.
    pub fn start_feed(
        &mut self,
        orientation: Orientation,
        now: DateTime<Utc>,
    ) -> Result<Event, DbError> {
        let tx = self.conn.transaction()?;
        stop_latest_ongoing(&tx, EventKind::Feeding, now)?;
        let feed_id = max_feed_id(&tx)? + 1;
        let mut event = NewEvent::session(EventKind::Feeding, now);
        event.orientation = Some(orientation);
        event.feed_id = Some(feed_id);
        let id = insert_row(&tx, &event, now)?;
        tx.commit()?;
        tracing::debug!(id, feed_id, side = %orientation, "started feed");

        Ok(event.into_event(id, now))
    }

    /// Starts a sleep session.
    pub fn start_sleep(&mut self, now: DateTime<Utc>) -> Result<Event, DbError> {
        self.insert_event(NewEvent::session(EventKind::Sleep, now), now)
    }

    /// Highest feed ID recorded, or 0 when there is none.
    pub fn latest_feed_id(&self) -> Result<i64, DbError> {
        max_feed_id(&self.conn)
    }
}

impl EventStore for Database {
    type Error = DbError;

    fn query(&self, query: &EventQuery) -> Result<Vec<Event>, Self::Error> {
        let (sql, values) = build_query(query);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), EventRow::from_row)?;
        collect_events(rows)
    }
}

/// Translates an [`EventQuery`] into SQL with positional parameters.
fn build_query(query: &EventQuery) -> (String, Vec<Value>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if !query.kinds.is_empty() {
        clauses.push(format!("kind IN ({})", placeholders(query.kinds.len())));
        values.extend(query.kinds.iter().map(|kind| Value::Text(kind.as_str().to_string())));
    }

    match &query.detail {
        DetailFilter::Any => {}
        DetailFilter::Equals(detail) => {
            clauses.push("detail = ?".to_string());
            values.push(Value::Text(detail.clone()));
        }
        DetailFilter::Excludes(excluded) if excluded.is_empty() => {}
        DetailFilter::Excludes(excluded) => {
            clauses.push(format!(
                "(detail IS NULL OR detail NOT IN ({}))",
                placeholders(excluded.len())
            ));
            values.extend(excluded.iter().cloned().map(Value::Text));
        }
    }

    for (bound, inclusive, exclusive) in [(query.from, ">=", ">"), (query.to, "<=", "<")] {
        match bound {
            Bound::Included(at) => {
                clauses.push(format!("timestamp {inclusive} ?"));
                values.push(Value::Text(format_timestamp(at)));
            }
            Bound::Excluded(at) => {
                clauses.push(format!("timestamp {exclusive} ?"));
                values.push(Value::Text(format_timestamp(at)));
            }
            Bound::Unbounded => {}
        }
    }

    let mut sql = format!("SELECT {EVENT_COLUMNS} FROM events");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(match query.order {
        SortOrder::Ascending => " ORDER BY timestamp ASC, id ASC",
        SortOrder::Descending => " ORDER BY timestamp DESC, id DESC",
    });
    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
    }
    (sql, values)
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// A row as stored, before its text columns are parsed.
#[derive(Debug)]
struct EventRow {
    id: i64,
    kind: String,
    detail: Option<String>,
    timestamp: String,
    end_timestamp: Option<String>,
    orientation: Option<String>,
    feed_id: Option<i64>,
    weight: Option<f64>,
    height: Option<f64>,
    comments: Option<String>,
}

impl EventRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            kind: row.get(1)?,
            detail: row.get(2)?,
            timestamp: row.get(3)?,
            end_timestamp: row.get(4)?,
            orientation: row.get(5)?,
            feed_id: row.get(6)?,
            weight: row.get(7)?,
            height: row.get(8)?,
            comments: row.get(9)?,
        })
    }

    fn into_event(self) -> Result<Event, DbError> {
        let kind = self
            .kind
            .parse::<EventKind>()
            .map_err(|err| DbError::InvalidEventData {
                event_id: self.id,
                message: err.to_string(),
            })?;
        let orientation = self
            .orientation
            .as_deref()
            .map(str::parse::<Orientation>)
            .transpose()
            .map_err(|err| DbError::InvalidEventData {
                event_id: self.id,
                message: err.to_string(),
            })?;
        let timestamp = parse_timestamp(&self.timestamp, self.id)?;
        let end_timestamp = self
            .end_timestamp
            .as_deref()
            .map(|end| parse_timestamp(end, self.id))
            .transpose()?;

        Ok(Event {
            id: self.id,
            kind,
            detail: self.detail,
            timestamp,
            end_timestamp,
            orientation,
            feed_id: self.feed_id,
            weight: self.weight,
            height: self.height,
            comments: self.comments,
        })
    }
}

fn collect_events(
    rows: impl Iterator<Item = rusqlite::Result<EventRow>>,
) -> Result<Vec<Event>, DbError> {
    let mut events = Vec::new();
    for row in rows {
        events.push(row?.into_event()?);
    }
    Ok(events)
}

fn select_one(
    conn: &Connection,
    filter: &str,
    params: impl rusqlite::Params,
) -> Result<Option<Event>, DbError> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events {filter} LIMIT 1");
    conn.query_row(&sql, params, EventRow::from_row)
        .optional()?
        .map(EventRow::into_event)
        .transpose()
}

fn insert_row(conn: &Connection, event: &NewEvent, now: DateTime<Utc>) -> Result<i64, DbError> {
    conn.execute(
        "
        INSERT INTO events
        (kind, detail, timestamp, end_timestamp, orientation, feed_id, weight, height, comments)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
        params![
            event.kind.as_str(),
            event.detail,
            format_timestamp(event.timestamp.unwrap_or(now)),
            event.end_timestamp.map(format_timestamp),
            event.orientation.map(Orientation::as_str),
            event.feed_id,
            event.weight,
            event.height,
            event.comments,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn stop_latest_ongoing(
    conn: &Connection,
    kind: EventKind,
    now: DateTime<Utc>,
) -> Result<Option<Event>, DbError> {
    let ongoing = select_one(
        conn,
        "WHERE kind = ? AND detail = ? ORDER BY timestamp DESC, id DESC",
        params![kind.as_str(), ONGOING],
    )?;
    let Some(mut event) = ongoing else {
        return Ok(None);
    };

    let detail = duration::format_seconds((now - event.timestamp).num_seconds());
    conn.execute(
        "UPDATE events SET end_timestamp = ?, detail = ? WHERE id = ?",
        params![format_timestamp(now), detail, event.id],
    )?;
    tracing::debug!(id = event.id, kind = %kind, duration = %detail, "stopped session");

    event.end_timestamp = Some(now);
    event.detail = Some(detail);
    Ok(Some(event))
}

fn max_feed_id(conn: &Connection) -> Result<i64, DbError> {
    let max: Option<i64> = conn.query_row(
        "SELECT MAX(feed_id) FROM events WHERE kind = ?",
        [EventKind::Feeding.as_str()],
        |row| row.get(0),
    )?;
    Ok(max.unwrap_or(0))
}

fn parse_timestamp(timestamp: &str, event_id: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            event_id,
            timestamp: timestamp.to_string(),
            source,
        })
}

/// Formats a timestamp the way it is stored.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
