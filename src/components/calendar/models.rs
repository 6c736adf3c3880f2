use serde::{Deserialize, Serialize};

/// Kind of calendar entry. Unknown server values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Assignment,
    Quiz,
    Event,
    Reminder,
    Other(String),
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "assignment" => EventType::Assignment,
            "quiz" => EventType::Quiz,
            "event" => EventType::Event,
            "reminder" => EventType::Reminder,
            _ => EventType::Other(value),
        }
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.as_str().to_string()
    }
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Assignment => "assignment",
            EventType::Quiz => "quiz",
            EventType::Event => "event",
            EventType::Reminder => "reminder",
            EventType::Other(other) => other,
        }
    }
}

/// Calendar event as returned by `GET /calendar/events`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(rename = "Eventid")]
    pub id: i64,
    #[serde(rename = "Eventtitle")]
    pub title: String,
    #[serde(rename = "Eventdescription", default)]
    pub description: Option<String>,
    #[serde(rename = "Eventtype")]
    pub event_type: EventType,
    /// ISO timestamp, compared textually against display dates
    #[serde(rename = "Eventstart")]
    pub start: String,
    #[serde(rename = "Eventend", default)]
    pub end: Option<String>,
    #[serde(rename = "Eventallday", default)]
    pub all_day: bool,
    #[serde(rename = "Eventcolor", default)]
    pub color: Option<String>,
    #[serde(rename = "Courseid", default)]
    pub course_id: Option<i64>,
    #[serde(rename = "Coursename", default)]
    pub course_name: Option<String>,
    #[serde(rename = "Referencetype", default)]
    pub reference_type: Option<String>,
    #[serde(rename = "Referenceid", default)]
    pub reference_id: Option<i64>,
}

/// Envelope of the calendar listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarEventsResponse {
    #[serde(rename = "Startdate", default)]
    pub start_date: String,
    #[serde(rename = "Enddate", default)]
    pub end_date: String,
    #[serde(rename = "Totalevents", default)]
    pub total_events: usize,
    #[serde(rename = "Events", default)]
    pub events: Vec<CalendarEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_server_shape_with_missing_optionals() {
        let event: CalendarEvent = serde_json::from_value(json!({
            "Eventid": 3,
            "Eventtitle": "Midterm",
            "Eventtype": "quiz",
            "Eventstart": "2024-03-05T10:00:00",
            "Eventcolor": null
        }))
        .unwrap();
        assert_eq!(event.event_type, EventType::Quiz);
        assert!(!event.all_day);
        assert!(event.color.is_none());
        assert!(event.course_id.is_none());
    }

    #[test]
    fn unknown_type_is_kept() {
        let ty = EventType::from("office_hours".to_string());
        assert_eq!(ty, EventType::Other("office_hours".to_string()));
        assert_eq!(String::from(ty), "office_hours");
    }
}
