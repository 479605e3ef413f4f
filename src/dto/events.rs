use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::validate::{FieldError, char_len, parse_form_datetime};

pub const EVENT_TYPES: &[&str] = &["walk", "poop", "pee", "vomit", "nap"];

#[derive(Debug, Default, Deserialize)]
pub struct EventForm {
    #[serde(default)]
    pub dog_id: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub end_timestamp: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub bristol_stool_scale: String,
    #[serde(default)]
    pub csrf_token: String,
}

#[derive(Debug, Clone)]
pub struct EventInput {
    pub dog_id: String,
    pub event_type: String,
    pub timestamp: NaiveDateTime,
    pub end_timestamp: Option<NaiveDateTime>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub bristol_stool_scale: Option<i32>,
}

impl EventForm {
    pub fn validate(&self) -> Result<EventInput, Vec<FieldError>> {
        let mut errors = Vec::new();
        let dog_id = self.dog_id.trim();
        let event_type = self.event_type.trim();
        let timestamp_raw = self.timestamp.trim();
        let end_raw = self.end_timestamp.trim();
        let location = self.location.trim();
        let notes = self.notes.trim();
        let bristol_raw = self.bristol_stool_scale.trim();

        if dog_id.is_empty() {
            errors.push(FieldError::new("dog_id", "Dog is required"));
        }

        if event_type.is_empty() {
            errors.push(FieldError::new("event_type", "Event type is required"));
        } else if !EVENT_TYPES.contains(&event_type) {
            errors.push(FieldError::new("event_type", "Not a valid choice."));
        }

        let timestamp = if timestamp_raw.is_empty() {
            errors.push(FieldError::new("timestamp", "Start time is required"));
            None
        } else {
            match parse_form_datetime(timestamp_raw) {
                Some(parsed) => Some(parsed),
                None => {
                    errors.push(FieldError::new("timestamp", "Not a valid datetime value."));
                    None
                }
            }
        };

        let end_timestamp = if end_raw.is_empty() {
            None
        } else {
            match parse_form_datetime(end_raw) {
                Some(parsed) => Some(parsed),
                None => {
                    errors.push(FieldError::new("end_timestamp", "Not a valid datetime value."));
                    None
                }
            }
        };

        if let (Some(start), Some(end)) = (timestamp, end_timestamp) {
            if end < start {
                errors.push(FieldError::new(
                    "end_timestamp",
                    "End time cannot be before start time",
                ));
            }
        }

        if char_len(location) > 200 {
            errors.push(FieldError::new(
                "location",
                "Location cannot exceed 200 characters",
            ));
        }

        if char_len(notes) > 1000 {
            errors.push(FieldError::new("notes", "Notes cannot exceed 1000 characters"));
        }

        let bristol_stool_scale = if bristol_raw.is_empty() {
            None
        } else {
            match bristol_raw.parse::<i32>() {
                Ok(value) if (1..=7).contains(&value) => Some(value),
                _ => {
                    errors.push(FieldError::new("bristol_stool_scale", "Not a valid choice."));
                    None
                }
            }
        };

        let (Some(timestamp), true) = (timestamp, errors.is_empty()) else {
            return Err(errors);
        };
        Ok(EventInput {
            dog_id: dog_id.to_string(),
            event_type: event_type.to_string(),
            timestamp,
            end_timestamp,
            location: (!location.is_empty()).then(|| location.to_string()),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
            bristol_stool_scale,
        })
    }
}
