//! Schedule types
//!
//! A schedule item is a calendar event on one date with an optional time range.

use super::{Id, Task};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event as returned by `/schedules/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default)]
    pub color: ScheduleColor,
    #[serde(default)]
    pub location: String,
    /// Linked customer, if any
    #[serde(default)]
    pub customer: Option<Id>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Schedule {
    /// `HH:MM` or `HH:MM-HH:MM`, empty for all-day events
    pub fn time_label(&self) -> String {
        if self.is_all_day {
            return String::new();
        }
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
            (Some(start), None) => start.format("%H:%M").to_string(),
            _ => String::new(),
        }
    }

    pub fn to_draft(&self) -> ScheduleDraft {
        ScheduleDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            is_all_day: self.is_all_day,
            color: self.color,
            location: self.location.clone(),
            customer: self.customer,
        }
    }
}

/// Color tag of a schedule item
///
/// Unknown tags coming from the backend fall back to `Blue`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ScheduleColor {
    #[default]
    Blue,
    Green,
    Red,
    Yellow,
    Purple,
    Pink,
    Gray,
}

impl From<String> for ScheduleColor {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl std::str::FromStr for ScheduleColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blue" => Ok(ScheduleColor::Blue),
            "green" => Ok(ScheduleColor::Green),
            "red" => Ok(ScheduleColor::Red),
            "yellow" => Ok(ScheduleColor::Yellow),
            "purple" => Ok(ScheduleColor::Purple),
            "pink" => Ok(ScheduleColor::Pink),
            "gray" | "grey" => Ok(ScheduleColor::Gray),
            other => Err(format!("unknown color: {}", other)),
        }
    }
}

impl std::fmt::Display for ScheduleColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScheduleColor::Blue => "blue",
            ScheduleColor::Green => "green",
            ScheduleColor::Red => "red",
            ScheduleColor::Yellow => "yellow",
            ScheduleColor::Purple => "purple",
            ScheduleColor::Pink => "pink",
            ScheduleColor::Gray => "gray",
        };
        f.write_str(name)
    }
}

/// Create/update payload for a schedule item
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScheduleDraft {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub is_all_day: bool,
    pub color: ScheduleColor,
    pub location: String,
    pub customer: Option<Id>,
}

impl ScheduleDraft {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            date,
            start_time: None,
            end_time: None,
            is_all_day: false,
            color: ScheduleColor::default(),
            location: String::new(),
            customer: None,
        }
    }

    /// Timed event; clears the all-day flag
    pub fn between(mut self, start: NaiveTime, end: Option<NaiveTime>) -> Self {
        self.start_time = Some(start);
        self.end_time = end;
        self.is_all_day = false;
        self
    }

    pub fn all_day(mut self) -> Self {
        self.is_all_day = true;
        self.start_time = None;
        self.end_time = None;
        self
    }

    pub fn color(mut self, color: ScheduleColor) -> Self {
        self.color = color;
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn customer(mut self, customer: Id) -> Self {
        self.customer = Some(customer);
        self
    }
}

/// Schedules and due tasks inside a date window (`/schedules/calendar/`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CalendarWindow {
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Schedules and due tasks of a single day (`/schedules/daily/`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyAgenda {
    pub date: NaiveDate,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json(color: &str) -> String {
        format!(
            r#"{{
                "id": 3,
                "customer_name": "Tanaka",
                "title": "Site visit",
                "description": "",
                "date": "2024-03-05",
                "start_time": "10:00:00",
                "end_time": "11:30:00",
                "is_all_day": false,
                "color": "{}",
                "location": "Osaka",
                "customer": 12
            }}"#,
            color
        )
    }

    #[test]
    fn test_schedule_deserializes() {
        let schedule: Schedule = serde_json::from_str(&sample_json("green")).unwrap();
        assert_eq!(schedule.color, ScheduleColor::Green);
        assert_eq!(schedule.customer, Some(12));
        assert_eq!(schedule.time_label(), "10:00-11:30");
    }

    #[test]
    fn test_unknown_color_falls_back_to_blue() {
        let schedule: Schedule = serde_json::from_str(&sample_json("teal")).unwrap();
        assert_eq!(schedule.color, ScheduleColor::Blue);
    }

    #[test]
    fn test_color_serializes_lowercase() {
        assert_eq!(serde_json::to_value(ScheduleColor::Purple).unwrap(), "purple");
    }

    #[test]
    fn test_all_day_has_no_time_label() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let draft = ScheduleDraft::new("Holiday", date).all_day();
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["is_all_day"], true);
        assert!(value["start_time"].is_null());
    }

    #[test]
    fn test_calendar_window_tolerates_missing_lists() {
        let window: CalendarWindow = serde_json::from_str(r#"{"schedules": []}"#).unwrap();
        assert!(window.tasks.is_empty());
    }
}
