//! Competition document model.
//!
//! The shared schedule document exchanged with the registration service:
//! events with their rounds, the schedule, and the registered persons.
//! Only the fields the grouping engine reads are typed; everything else is
//! preserved through flattened maps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Person, Schedule};
use crate::config::EventConfiguration;
use crate::error::{GroupingError, Result};

/// The competition document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub persons: Vec<Person>,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Competition {
    /// Creates an empty competition.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            events: Vec::new(),
            persons: Vec::new(),
            schedule: Schedule::default(),
            other: Map::new(),
        }
    }

    /// Reads a document from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(GroupingError::from)
    }

    /// Writes the document as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(GroupingError::from)
    }

    /// Looks up an event by id.
    pub fn event(&self, event_id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == event_id)
    }
}

/// An event (puzzle discipline) of the competition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    #[serde(default)]
    pub rounds: Vec<Round>,
    /// Grouping caps; filled in during normalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<EventConfiguration>,
    /// Start of the first round-1 activity. Derived, not serialized.
    #[serde(skip)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Event {
    /// Creates an event with the given number of rounds.
    pub fn new(id: impl Into<String>, rounds: u32) -> Self {
        let id = id.into();
        let rounds = (1..=rounds)
            .map(|r| Round::new(format!("{id}-r{r}")))
            .collect();
        Self {
            id,
            rounds,
            configuration: None,
            start_time: None,
            other: Map::new(),
        }
    }

    /// Sets the grouping configuration.
    pub fn with_configuration(mut self, configuration: EventConfiguration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    /// The first round, if any.
    pub fn first_round(&self) -> Option<&Round> {
        self.rounds.first()
    }

    /// The grouping configuration, or an error if normalization has not run.
    pub fn config(&self) -> Result<&EventConfiguration> {
        self.configuration
            .as_ref()
            .ok_or_else(|| GroupingError::UnknownEvent(format!("{} has no configuration", self.id)))
    }
}

/// A round of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: String,
    /// Number of scramble sets prepared for the round.
    #[serde(default)]
    pub scramble_set_count: u32,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Round {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scramble_set_count: 1,
            other: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_roundtrip_preserves_unknown_fields() {
        let json = r#"{
            "formatVersion": "1.0",
            "id": "Open2024",
            "name": "Open 2024",
            "events": [{ "id": "333", "rounds": [{ "id": "333-r1", "scrambleSetCount": 3, "format": "a" }] }],
            "persons": [],
            "schedule": { "startDate": "2024-05-04", "numberOfDays": 1, "venues": [] }
        }"#;
        let competition = Competition::from_json(json).unwrap();
        assert_eq!(competition.event("333").unwrap().rounds[0].scramble_set_count, 3);
        assert!(competition.event("444").is_none());

        let back: Value = serde_json::from_str(&competition.to_json().unwrap()).unwrap();
        let original: Value = serde_json::from_str(json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_event_builder() {
        let event = Event::new("pyram", 2);
        assert_eq!(event.rounds.len(), 2);
        assert_eq!(event.first_round().unwrap().id, "pyram-r1");
        assert!(event.config().is_err());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Competition::from_json("{"),
            Err(GroupingError::Json(_))
        ));
    }
}
