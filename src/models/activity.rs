//! Activity, room and venue models.
//!
//! An activity is a time-boxed block of the competition schedule. Round-level
//! activities (`333-r1`) are split into child activities, one per group and
//! stage (`333-r1-g1`, `333-r1-g2`, ...).
//!
//! # Activity Codes
//!
//! The canonical string form is `eventId-r{round}[-g{group}][-a{attempt}]`.
//! Activities that do not belong to an event (lunch, awards) use codes
//! starting with `other-` and are never parsed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::GroupingError;

/// Prefix of activity codes that are not tied to an event.
pub const OTHER_ACTIVITY_PREFIX: &str = "other";

/// Structured form of an activity code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActivityCode {
    /// Event identifier (e.g., "333").
    pub event_id: String,
    /// Round number (1-based).
    pub round_number: u32,
    /// Group number (1-based). `None` for round-level activities.
    pub group_number: Option<u32>,
    /// Attempt number for multi-attempt events (FMC, MBLD).
    pub attempt_number: Option<u32>,
}

impl ActivityCode {
    /// Creates a round-level code.
    pub fn new(event_id: impl Into<String>, round_number: u32) -> Self {
        Self {
            event_id: event_id.into(),
            round_number,
            group_number: None,
            attempt_number: None,
        }
    }

    /// Sets the group number.
    pub fn with_group(mut self, group_number: u32) -> Self {
        self.group_number = Some(group_number);
        self
    }

    /// Sets the attempt number.
    pub fn with_attempt(mut self, attempt_number: u32) -> Self {
        self.attempt_number = Some(attempt_number);
        self
    }

    /// Whether this code belongs to the first round (and first attempt, if any).
    ///
    /// Only these activities carry group labels; later rounds are assigned
    /// from results.
    pub fn is_first_round(&self) -> bool {
        self.round_number == 1 && matches!(self.attempt_number, None | Some(1))
    }

    /// Human-readable name, e.g. "3x3x3 Cube, Round 1, Group 2".
    pub fn display_name(&self) -> String {
        let mut name = format!("{}, Round {}", event_name(&self.event_id), self.round_number);
        if let Some(group) = self.group_number {
            name.push_str(&format!(", Group {group}"));
        }
        if let Some(attempt) = self.attempt_number {
            name.push_str(&format!(", Attempt {attempt}"));
        }
        name
    }
}

impl fmt::Display for ActivityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-r{}", self.event_id, self.round_number)?;
        if let Some(group) = self.group_number {
            write!(f, "-g{group}")?;
        }
        if let Some(attempt) = self.attempt_number {
            write!(f, "-a{attempt}")?;
        }
        Ok(())
    }
}

impl FromStr for ActivityCode {
    type Err = GroupingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GroupingError::Format(format!("invalid activity code '{s}'"));

        let mut parts = s.split('-');
        let event_id = parts.next().filter(|e| !e.is_empty()).ok_or_else(invalid)?;

        let mut round_number = None;
        let mut group_number = None;
        let mut attempt_number = None;
        for part in parts {
            let mut chars = part.chars();
            let prefix = chars.next().ok_or_else(invalid)?;
            let value: u32 = chars.as_str().parse().map_err(|_| invalid())?;
            let slot = match prefix {
                'r' => &mut round_number,
                'g' => &mut group_number,
                'a' => &mut attempt_number,
                _ => return Err(invalid()),
            };
            if slot.replace(value).is_some() {
                return Err(invalid());
            }
        }

        Ok(Self {
            event_id: event_id.to_string(),
            round_number: round_number.ok_or_else(invalid)?,
            group_number,
            attempt_number,
        })
    }
}

/// A scheduled activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Unique non-negative identifier across the whole schedule.
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Activity code in string form.
    pub activity_code: String,
    /// Start of the activity.
    pub start_time: DateTime<Utc>,
    /// End of the activity.
    pub end_time: DateTime<Utc>,
    /// Nested activities (groups of a round).
    #[serde(default)]
    pub child_activities: Vec<Activity>,
    /// Unrecognised fields, preserved on round trip.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Activity {
    /// Creates an activity with no children.
    pub fn new(
        id: i64,
        activity_code: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: String::new(),
            activity_code: activity_code.into(),
            start_time,
            end_time,
            child_activities: Vec::new(),
            other: Map::new(),
        }
    }

    /// Adds a child activity.
    pub fn with_child(mut self, child: Activity) -> Self {
        self.child_activities.push(child);
        self
    }

    /// Whether this activity is not tied to an event (lunch, awards, ...).
    pub fn is_other(&self) -> bool {
        self.activity_code.starts_with(OTHER_ACTIVITY_PREFIX)
    }

    /// Parses the activity code.
    pub fn code(&self) -> Result<ActivityCode, GroupingError> {
        self.activity_code.parse()
    }
}

/// A room of a venue. Each room is a stage with its own color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// The competition schedule: venues → rooms → activities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default)]
    pub venues: Vec<Venue>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Schedule {
    /// All rooms in venue order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.venues.iter().flat_map(|v| v.rooms.iter())
    }

    /// All activities, each round-level activity followed by its children.
    pub fn all_activities(&self) -> Vec<&Activity> {
        let mut all = Vec::new();
        for room in self.rooms() {
            for activity in &room.activities {
                all.push(activity);
                all.extend(activity.child_activities.iter());
            }
        }
        all
    }

    /// Highest activity identifier in the schedule, or `None` when empty.
    pub fn highest_activity_id(&self) -> Option<i64> {
        self.all_activities().iter().map(|a| a.id).max()
    }

    /// Finds an activity (round-level or child) by identifier.
    pub fn find_activity(&self, id: i64) -> Option<&Activity> {
        self.all_activities().into_iter().find(|a| a.id == id)
    }
}

/// Display names of the official events.
fn event_name(event_id: &str) -> &str {
    match event_id {
        "222" => "2x2x2 Cube",
        "333" => "3x3x3 Cube",
        "444" => "4x4x4 Cube",
        "555" => "5x5x5 Cube",
        "666" => "6x6x6 Cube",
        "777" => "7x7x7 Cube",
        "333bf" => "3x3x3 Blindfolded",
        "333fm" => "3x3x3 Fewest Moves",
        "333oh" => "3x3x3 One-Handed",
        "333ft" => "3x3x3 With Feet",
        "clock" => "Clock",
        "minx" => "Megaminx",
        "pyram" => "Pyraminx",
        "skewb" => "Skewb",
        "sq1" => "Square-1",
        "444bf" => "4x4x4 Blindfolded",
        "555bf" => "5x5x5 Blindfolded",
        "333mbf" => "3x3x3 Multi-Blind",
        other => other,
    }
}
