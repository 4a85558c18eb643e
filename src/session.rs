//! Grouping session: one competition document from load to upload.
//!
//! A session validates and normalizes the document, owns the roster built
//! from its accepted persons, and exposes the expansion, grouping and
//! synchronization steps. [`GroupingSession::into_document`] merges the
//! persons back for upload.
//!
//! # Normalization
//!
//! 1. Validate the document (fatal on failure).
//! 2. Derive each event's start time from its round-1 activities and order
//!    events by it, unscheduled events last.
//! 3. Build the roster from accepted persons. Competing persons start in
//!    group 1.
//! 4. Seed every event's configuration from the defaults table, raising
//!    the group count to the round-1 scramble set count.
//! 5. Derive per-room station numbering from the schedule unless configured.

use rand::Rng;

use crate::config::{EventConfiguration, GeneralConfiguration, RoomConfiguration};
use crate::error::{GroupingError, Result};
use crate::expansion::expand_rounds;
use crate::grouping::{GroupingEngine, GroupingKpi, GroupingReport};
use crate::models::{Competition, Event};
use crate::roster::Roster;
use crate::staff::StaffRoster;
use crate::sync;
use crate::validation::{validate_document, ValidationError, ValidationErrorKind};

/// A normalized competition with its roster.
#[derive(Debug, Clone)]
pub struct GroupingSession {
    /// The document without its persons; they live in `roster`.
    document: Competition,
    roster: Roster,
    configuration: GeneralConfiguration,
}

impl GroupingSession {
    /// Validates and normalizes a competition document.
    ///
    /// Persons without an accepted registration are dropped.
    ///
    /// # Errors
    /// [`GroupingError::Validation`] if the document has no events, no
    /// (accepted) persons, an event without rounds, duplicate activity ids
    /// or malformed activity codes.
    pub fn new(mut document: Competition, mut configuration: GeneralConfiguration) -> Result<Self> {
        validate_document(&document).map_err(GroupingError::Validation)?;

        for index in 0..document.events.len() {
            let start_time = first_round_start(&document, &document.events[index].id);
            document.events[index].start_time = start_time;
        }
        document
            .events
            .sort_by_key(|e| (e.start_time.is_none(), e.start_time));

        let event_ids: Vec<&str> = document.events.iter().map(|e| e.id.as_str()).collect();
        let roster = Roster::from_persons(std::mem::take(&mut document.persons), &event_ids);
        if roster.is_empty() {
            return Err(GroupingError::Validation(vec![ValidationError::new(
                ValidationErrorKind::NoCompetitors,
                "No accepted competitors found",
            )]));
        }

        for event in &mut document.events {
            let mut defaults = EventConfiguration::default_for(&event.id, configuration.total_number_of_timers);
            let scramble_sets = event.first_round().map_or(0, |r| r.scramble_set_count);
            defaults.scramble_groups = defaults.scramble_groups.max(scramble_sets);
            event.configuration = Some(defaults);
        }

        if configuration.rooms.is_empty() {
            configuration.rooms = document
                .schedule
                .rooms()
                .map(|room| RoomConfiguration {
                    id: room.id,
                    name: room.name.clone(),
                    color: room.color.clone(),
                    station_number_from: 1,
                })
                .collect();
        }

        tracing::info!(
            competition = %document.id,
            events = document.events.len(),
            competitors = roster.len(),
            "normalized competition"
        );
        Ok(Self {
            document,
            roster,
            configuration,
        })
    }

    /// Reads a document from JSON and normalizes it.
    pub fn from_json(json: &str, configuration: GeneralConfiguration) -> Result<Self> {
        Self::new(Competition::from_json(json)?, configuration)
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Events in start-time order, with their configurations.
    pub fn events(&self) -> &[Event] {
        &self.document.events
    }

    pub fn configuration(&self) -> &GeneralConfiguration {
        &self.configuration
    }

    /// The document, without its persons.
    pub fn document(&self) -> &Competition {
        &self.document
    }

    /// Mutable access to an event's configuration, e.g. to add a stage.
    pub fn event_configuration_mut(&mut self, event_id: &str) -> Result<&mut EventConfiguration> {
        self.document
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .and_then(|e| e.configuration.as_mut())
            .ok_or_else(|| GroupingError::UnknownEvent(event_id.to_string()))
    }

    /// Splits every round into group activities. See [`expand_rounds`].
    pub fn expand_activities(&mut self) -> Result<usize> {
        expand_rounds(&mut self.document)
    }

    /// Groups one event with the configured strategy.
    pub fn generate_grouping<R: Rng>(
        &mut self,
        event_id: &str,
        staff: Option<&StaffRoster>,
        rng: &mut R,
    ) -> Result<GroupingReport> {
        GroupingEngine::new(&mut self.roster, &self.document.events, &self.configuration).generate(event_id, staff, rng)
    }

    /// Groups every event in start-time order.
    pub fn generate_all<R: Rng>(&mut self, staff: Option<&StaffRoster>, rng: &mut R) -> Result<Vec<GroupingReport>> {
        GroupingEngine::new(&mut self.roster, &self.document.events, &self.configuration).generate_all(staff, rng)
    }

    /// Current per-group counts of an event.
    pub fn kpi(&self, event_id: &str) -> Result<GroupingKpi> {
        let event = self
            .document
            .event(event_id)
            .ok_or_else(|| GroupingError::UnknownEvent(event_id.to_string()))?;
        Ok(GroupingKpi::calculate(&self.roster, event_id, event.config()?.number_of_groups()))
    }

    /// Writes assignment records from the labels. See [`sync::export_assignments`].
    pub fn export_assignments(&mut self) -> Result<usize> {
        sync::export_assignments(&mut self.roster, &self.document.schedule, &self.configuration)
    }

    /// Rebuilds labels from assignment records. See [`sync::import_assignments`].
    pub fn import_assignments(&mut self) -> Result<()> {
        sync::import_assignments(&mut self.roster, &self.document.schedule, &mut self.document.events)
    }

    /// Reads labels from an organizer sheet. See [`sync::import_groups_from_csv`].
    pub fn import_groups_from_csv(&mut self, text: &str) -> Result<usize> {
        sync::import_groups_from_csv(&mut self.roster, &mut self.document.events, text)
    }

    /// Merges the persons back into the document.
    pub fn into_document(self) -> Competition {
        let mut document = self.document;
        document.persons = self.roster.into_persons();
        document
    }
}

/// Earliest start among an event's round-1 activities.
fn first_round_start(document: &Competition, event_id: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    document
        .schedule
        .rooms()
        .flat_map(|room| room.activities.iter())
        .filter(|a| !a.is_other())
        .filter(|a| {
            a.code()
                .is_ok_and(|code| code.event_id == event_id && code.round_number == 1)
        })
        .map(|a| a.start_time)
        .min()
}
