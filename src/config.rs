//! Grouping configuration.
//!
//! Two layers:
//! - [`GeneralConfiguration`]: competition-wide policy (strategy, who may
//!   judge, station numbering per room). Loadable from JSON.
//! - [`EventConfiguration`]: per-event caps (groups, stages, staff per group).
//!   Seeded from a static table of defaults during normalization.

use serde::{Deserialize, Serialize};

use crate::error::{GroupingError, Result};

/// Grouping strategy, selected by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupStrategy {
    /// Random groups.
    #[default]
    Basic,
    /// Fastest competitors first.
    BasicBySpeed,
    /// Slowest competitors first.
    BasicBySpeedReverse,
    /// Random groups with scramblers, runners and judges.
    Advanced,
}

/// Competition-wide grouping policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralConfiguration {
    pub group_strategy: GroupStrategy,
    /// Delegates and organizers are never assigned to judge.
    pub skip_delegates_and_organizers: bool,
    /// Disables the judging pass entirely.
    pub do_not_assign_judges: bool,
    /// Newcomers are never assigned to judge.
    pub do_not_assign_tasks_to_new_competitors: bool,
    /// Every person may scramble every event and run.
    pub everyone_can_scramble_and_run: bool,
    /// Build the staff roster from personal bests when no CSV is provided.
    pub auto_pick_scramblers_and_runners: bool,
    /// Fill every used timer with a judge (competitors stay seated).
    pub fixed_seating: bool,
    /// Judges per group; copied into every event configuration.
    pub total_number_of_timers: u32,
    /// How many of the fastest competitors are moved towards the last groups.
    pub top_competitors: usize,
    /// Station numbering per room. Derived from the schedule when empty.
    pub rooms: Vec<RoomConfiguration>,
}

impl Default for GeneralConfiguration {
    fn default() -> Self {
        Self {
            group_strategy: GroupStrategy::Basic,
            skip_delegates_and_organizers: true,
            do_not_assign_judges: false,
            do_not_assign_tasks_to_new_competitors: false,
            everyone_can_scramble_and_run: false,
            auto_pick_scramblers_and_runners: false,
            fixed_seating: false,
            total_number_of_timers: 16,
            top_competitors: 5,
            rooms: Vec::new(),
        }
    }
}

impl GeneralConfiguration {
    /// Reads a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(GroupingError::from)
    }

    pub fn with_strategy(mut self, strategy: GroupStrategy) -> Self {
        self.group_strategy = strategy;
        self
    }

    /// First station number of a room (defaults to 1).
    pub fn station_number_from(&self, room_id: i64) -> i64 {
        self.rooms
            .iter()
            .find(|r| r.id == room_id)
            .map_or(1, |r| r.station_number_from)
    }
}

/// Station numbering for one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomConfiguration {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default = "first_station")]
    pub station_number_from: i64,
}

fn first_station() -> i64 {
    1
}

/// Per-event grouping caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventConfiguration {
    /// Sequential time slots per stage.
    pub scramble_groups: u32,
    /// Parallel physical areas running the round.
    pub stages: u32,
    /// Scramblers per group.
    pub scramblers: u32,
    /// Runners per group.
    pub runners: u32,
    /// Judges per group.
    pub timers: u32,
    /// Whether grouping skips this event.
    pub skip: bool,
}

impl EventConfiguration {
    pub fn new(scramble_groups: u32, stages: u32) -> Self {
        Self {
            scramble_groups,
            stages,
            scramblers: 2,
            runners: 2,
            timers: 16,
            skip: false,
        }
    }

    /// Sets scramblers, runners and judges per group.
    pub fn with_staff(mut self, scramblers: u32, runners: u32, timers: u32) -> Self {
        self.scramblers = scramblers;
        self.runners = runners;
        self.timers = timers;
        self
    }

    pub fn with_skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    /// Total parallel group slots (`stages × scrambleGroups`).
    pub fn number_of_groups(&self) -> u32 {
        self.stages * self.scramble_groups
    }

    /// Default configuration for an event.
    ///
    /// Blindfolded multi-attempt and fewest-moves events are skipped by
    /// default: they run as a single group.
    pub fn default_for(event_id: &str, timers: u32) -> Self {
        let (scramblers, runners, skip, scramble_groups) = match event_id {
            "666" | "777" | "333ft" => (2, 1, false, 2),
            "333bf" => (1, 1, false, 2),
            "444bf" | "555bf" | "333mbf" | "333fm" => (2, 0, true, 1),
            _ => (2, 2, false, 2),
        };
        Self {
            scramble_groups,
            stages: 1,
            scramblers,
            runners,
            timers,
            skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_defaults() {
        let config = GeneralConfiguration::default();
        assert_eq!(config.group_strategy, GroupStrategy::Basic);
        assert!(config.skip_delegates_and_organizers);
        assert!(!config.do_not_assign_judges);
        assert_eq!(config.station_number_from(3), 1);
    }

    #[test]
    fn test_from_json_partial() {
        let config = GeneralConfiguration::from_json(
            r#"{ "groupStrategy": "basicBySpeedReverse", "fixedSeating": true,
                 "rooms": [{ "id": 3, "name": "Side", "stationNumberFrom": 21 }] }"#,
        )
        .unwrap();
        assert_eq!(config.group_strategy, GroupStrategy::BasicBySpeedReverse);
        assert!(config.fixed_seating);
        assert!(config.skip_delegates_and_organizers);
        assert_eq!(config.station_number_from(3), 21);
        assert_eq!(config.station_number_from(4), 1);
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        assert!(GeneralConfiguration::from_json(r#"{ "groupStrategy": "optimal" }"#).is_err());
    }

    #[test]
    fn test_event_defaults() {
        let c = EventConfiguration::default_for("333", 12);
        assert_eq!((c.scramblers, c.runners, c.timers, c.skip), (2, 2, 12, false));
        assert_eq!(c.number_of_groups(), 2);

        let fm = EventConfiguration::default_for("333fm", 12);
        assert!(fm.skip);
        assert_eq!(fm.scramble_groups, 1);

        assert_eq!(EventConfiguration::default_for("777", 8).runners, 1);
        assert_eq!(EventConfiguration::default_for("333bf", 8).scramblers, 1);
    }
}
