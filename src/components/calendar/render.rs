use super::grid::{day_indicators, events_on_date, MonthGrid, MAX_DAY_INDICATORS};
use super::models::{CalendarEvent, EventType};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt::Write;

const WEEKDAY_HEADER: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const CELL_WIDTH: usize = 6;

/// Short label shown next to an event
pub fn event_label(event_type: &EventType) -> &'static str {
    match event_type {
        EventType::Assignment => "[A]",
        EventType::Quiz => "[Q]",
        EventType::Reminder => "[!]",
        EventType::Event | EventType::Other(_) => "[E]",
    }
}

/// Start time as `HH:MM`, or "all day"
pub fn format_event_time(event: &CalendarEvent) -> String {
    if event.all_day {
        return "all day".to_string();
    }
    // Offsets and fractions are ignored; the wall-clock part is displayed as sent
    let head: String = event.start.chars().take(19).collect();
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&head, fmt).ok())
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// Month grid as text: a header row, then one line per week with `*` per indicator dot
pub fn render_month(grid: &MonthGrid, events: &[CalendarEvent], today: Option<NaiveDate>) -> String {
    let mut out = String::new();
    let title = NaiveDate::from_ymd_opt(grid.year, grid.month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_default();
    let _ = writeln!(out, "{:^width$}", title, width = CELL_WIDTH * 7);

    for name in WEEKDAY_HEADER {
        let _ = write!(out, "{:<width$}", name, width = CELL_WIDTH);
    }
    out.push('\n');

    let buckets = grid.bucket(events);
    for week in grid.weeks() {
        for cell in week {
            let text = match cell {
                None => String::new(),
                Some(day) => {
                    let dots = buckets
                        .get(day)
                        .map(|day_events| day_indicators(day_events).len())
                        .unwrap_or(0)
                        .min(MAX_DAY_INDICATORS);
                    let is_today = today
                        .and_then(|t| NaiveDate::from_ymd_opt(grid.year, grid.month, *day).map(|d| d == t))
                        .unwrap_or(false);
                    let marker = if is_today { ">" } else { "" };
                    format!("{}{}{}", marker, day, "*".repeat(dots))
                }
            };
            let _ = write!(out, "{:<width$}", text, width = CELL_WIDTH);
        }
        out.push('\n');
    }

    out
}

/// Agenda lines for one date, in received order
pub fn render_agenda(events: &[CalendarEvent], date: NaiveDate) -> String {
    let day_events = events_on_date(events, date);
    let mut message = format!("{}:\n", date.format("%A %d.%m."));

    if day_events.is_empty() {
        message.push_str("  No events\n");
        return message;
    }

    for event in day_events {
        let _ = write!(
            message,
            "  {} {} ({})",
            event_label(&event.event_type),
            event.title,
            format_event_time(event)
        );
        if let Some(course) = &event.course_name {
            let _ = write!(message, " - {}", course);
        }
        message.push('\n');
    }
    message
}
