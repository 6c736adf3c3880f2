pub mod grid;
pub mod models;
pub mod render;
pub mod time;

use crate::api::LmsApi;
use crate::error::{validation_error, ClientResult};
use chrono::{Datelike, NaiveDate};
use grid::{day_indicators, MonthGrid};
use models::CalendarEvent;
use std::sync::Arc;
use self::time::{month_range, MonthRange};
use tracing::{debug, info};

pub use grid::{event_color, events_for_day, MAX_DAY_INDICATORS};
pub use self::time::{current_semester_code, semester_code, semester_matches, semester_options};

/// One displayed month: its query range, grid, and the events fetched for it
#[derive(Debug, Clone)]
pub struct MonthView {
    pub range: MonthRange,
    pub grid: MonthGrid,
    pub course_id: Option<i64>,
    pub events: Vec<CalendarEvent>,
}

impl MonthView {
    /// Events starting on `day` of this month, in received order
    pub fn events_on(&self, day: u32) -> Vec<&CalendarEvent> {
        self.grid.events_on(&self.events, day)
    }

    /// Events of a calendar date; empty for dates outside this month
    pub fn agenda(&self, date: NaiveDate) -> Vec<&CalendarEvent> {
        if !self.range.contains(date) {
            return Vec::new();
        }
        self.events_on(date.day())
    }

    /// Indicator colors of a day cell, at most three
    pub fn indicators(&self, day: u32) -> Vec<&str> {
        day_indicators(&self.events_on(day))
    }

    pub fn render(&self, today: Option<NaiveDate>) -> String {
        render::render_month(&self.grid, &self.events, today)
    }
}

/// Fetches calendar months through the API
#[derive(Clone)]
pub struct CalendarService {
    api: Arc<dyn LmsApi>,
}

impl CalendarService {
    pub fn new(api: Arc<dyn LmsApi>) -> Self {
        Self { api }
    }

    /// Fetch the month containing `anchor`, optionally filtered to one course
    pub async fn fetch_month(
        &self,
        anchor: NaiveDate,
        course_id: Option<i64>,
    ) -> ClientResult<MonthView> {
        let range = month_range(anchor);
        let grid = MonthGrid::build(anchor.year(), anchor.month())
            .ok_or_else(|| validation_error(&format!("Invalid month for {}", anchor)))?;

        debug!(
            "Fetching calendar events {} to {}",
            range.start, range.end
        );
        let response = self.api.calendar_events(&range, course_id).await?;
        info!(
            "Fetched {} calendar events for {}",
            response.events.len(),
            anchor.format("%Y-%m")
        );

        Ok(MonthView {
            range,
            grid,
            course_id,
            events: response.events,
        })
    }

    /// Ask the server to regenerate deadline events, then re-fetch the same month
    pub async fn sync_and_refetch(&self, view: &MonthView) -> ClientResult<MonthView> {
        info!("Syncing calendar");
        self.api.sync_calendar().await?;
        self.fetch_month(view.range.start, view.course_id).await
    }
}
