use super::models::{CalendarEvent, EventType};
use super::time::MonthRange;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Most indicator dots a single day cell shows
pub const MAX_DAY_INDICATORS: usize = 3;

/// Fallback color for events of an unrecognized type
pub const PRIMARY_COLOR: &str = "#7BC567";

/// Palette keyed by the known event types
pub fn type_color(event_type: &EventType) -> &'static str {
    match event_type {
        EventType::Assignment => "#3b82f6",
        EventType::Quiz => "#a855f7",
        EventType::Event => "#14b8a6",
        EventType::Reminder => "#f97316",
        EventType::Other(_) => PRIMARY_COLOR,
    }
}

/// Display color: the event's own override, else the palette color for its type
pub fn event_color(event: &CalendarEvent) -> &str {
    match event.color.as_deref() {
        Some(color) if !color.trim().is_empty() => color,
        _ => type_color(&event.event_type),
    }
}

/// Seven-column month layout: leading blanks, then days 1..N
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<Option<u32>>,
}

impl MonthGrid {
    /// Build the grid for a 1-based month; `None` for an invalid month
    pub fn build(year: i32, month: u32) -> Option<Self> {
        let range = MonthRange::for_month(year, month)?;
        let leading = range.start.weekday().num_days_from_sunday() as usize;
        let days = range.days();

        let mut cells = Vec::with_capacity(leading + days as usize);
        cells.extend(std::iter::repeat(None).take(leading));
        cells.extend((1..=days).map(Some));

        Some(Self { year, month, cells })
    }

    /// Grid for the month containing `date`
    pub fn for_date(date: NaiveDate) -> Self {
        Self::build(date.year(), date.month()).unwrap_or(Self {
            year: date.year(),
            month: date.month(),
            cells: Vec::new(),
        })
    }

    pub fn leading_blanks(&self) -> usize {
        self.cells.iter().take_while(|c| c.is_none()).count()
    }

    pub fn days(&self) -> u32 {
        self.cells.iter().flatten().count() as u32
    }

    /// Rows of seven cells; the last row may be short
    pub fn weeks(&self) -> impl Iterator<Item = &[Option<u32>]> {
        self.cells.chunks(7)
    }

    /// Date-portion prefix events of `day` must start with
    pub fn day_key(&self, day: u32) -> String {
        day_key(self.year, self.month, day)
    }

    /// Events that start on `day` of this month, in received order
    pub fn events_on<'a>(&self, events: &'a [CalendarEvent], day: u32) -> Vec<&'a CalendarEvent> {
        events_for_day(events, self.year, self.month, day)
    }

    /// Every day of the month that has events, with its events in received order
    pub fn bucket<'a>(&self, events: &'a [CalendarEvent]) -> BTreeMap<u32, Vec<&'a CalendarEvent>> {
        let mut buckets = BTreeMap::new();
        for day in 1..=self.days() {
            let day_events = self.events_on(events, day);
            if !day_events.is_empty() {
                buckets.insert(day, day_events);
            }
        }
        buckets
    }
}

/// `YYYY-MM-DD` key for a day
pub fn day_key(year: i32, month: u32, day: u32) -> String {
    format!("{}-{:02}-{:02}", year, month, day)
}

/// Events whose start timestamp begins with the day's `YYYY-MM-DD`.
///
/// Timestamps are matched as text, no timezone conversion happens.
pub fn events_for_day(
    events: &[CalendarEvent],
    year: i32,
    month: u32,
    day: u32,
) -> Vec<&CalendarEvent> {
    let key = day_key(year, month, day);
    events.iter().filter(|e| e.start.starts_with(&key)).collect()
}

/// Events on a calendar date
pub fn events_on_date(events: &[CalendarEvent], date: NaiveDate) -> Vec<&CalendarEvent> {
    events_for_day(events, date.year(), date.month(), date.day())
}

/// Dot colors for a day cell: the first three events, unsorted
pub fn day_indicators<'a>(day_events: &[&'a CalendarEvent]) -> Vec<&'a str> {
    day_events
        .iter()
        .take(MAX_DAY_INDICATORS)
        .map(|e| event_color(e))
        .collect()
}
